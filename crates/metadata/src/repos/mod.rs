//! Repository traits for metadata operations.

pub mod bootstrap;
pub mod milestones;
pub mod stages;

pub use bootstrap::BootstrapRepo;
pub use milestones::MilestoneRepo;
pub use stages::StageRepo;
