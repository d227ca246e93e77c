//! Stage defaults.

/// Color assigned to a stage created without one.
pub const DEFAULT_STAGE_COLOR: &str = "#4f46e5";

/// A stage inserted when the stage table is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultStage {
    pub name: &'static str,
    pub color: &'static str,
}

/// Stages seeded on first start, in insertion (and therefore id) order.
pub const DEFAULT_STAGES: [DefaultStage; 4] = [
    DefaultStage {
        name: "Planning",
        color: "#4f46e5",
    },
    DefaultStage {
        name: "Execution",
        color: "#059669",
    },
    DefaultStage {
        name: "Finished",
        color: "#b91c1c",
    },
    DefaultStage {
        name: "On-hold",
        color: "#d97706",
    },
];
