//! HTTP request handlers.

pub mod common;
pub mod health;
pub mod milestones;
pub mod stages;
pub mod uploads;

pub use common::*;
pub use health::*;
pub use milestones::*;
pub use stages::*;
pub use uploads::*;
