//! Administrative commands and the interaction command table
//!
//! Commands take already-split, typed arguments and report their outcome
//! as text. They never panic on bad input.

pub mod hurt;
pub mod rejuvenate;
pub mod resolver;
pub mod table;

pub use hurt::{hurt, list_damage_groups, HURT_USAGE};
pub use rejuvenate::rejuvenate;
pub use resolver::{MatchReason, TargetMatch, TargetResolver, TargetSelector};
pub use table::{CommandSpec, CommandTable, InteractionAction, InteractionContext};

/// Result of running an administrative command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub lines: Vec<String>,
}

impl CommandOutput {
    pub fn ok(lines: Vec<String>) -> Self {
        Self {
            success: true,
            lines,
        }
    }

    pub fn failed(lines: Vec<String>) -> Self {
        Self {
            success: false,
            lines,
        }
    }
}
