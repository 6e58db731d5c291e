//! Data-driven interaction table
//!
//! Maps a capability to the named actions an actor can perform on an entity
//! that has it. The world dispatches every action through this table.

use crate::ecs::entity::Capability;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InteractionAction {
    /// Actor climbs into the target
    Enter,
    /// Target releases what it holds
    Eject,
    /// Actor puts another entity into the target
    Insert,
}

impl InteractionAction {
    pub fn name(&self) -> &'static str {
        match self {
            InteractionAction::Enter => "enter",
            InteractionAction::Eject => "eject",
            InteractionAction::Insert => "insert",
        }
    }
}

/// What visibility predicates can see
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InteractionContext {
    pub actor_can_act: bool,
    pub target_occupied: bool,
}

#[derive(Clone, Copy)]
pub struct CommandSpec {
    pub capability: Capability,
    pub action: InteractionAction,
    pub label: &'static str,
    pub visible: fn(&InteractionContext) -> bool,
}

#[derive(Clone)]
pub struct CommandTable {
    specs: Vec<CommandSpec>,
}

fn when_empty(ctx: &InteractionContext) -> bool {
    ctx.actor_can_act && !ctx.target_occupied
}

fn when_occupied(ctx: &InteractionContext) -> bool {
    ctx.actor_can_act && ctx.target_occupied
}

impl Default for CommandTable {
    fn default() -> Self {
        Self {
            specs: vec![
                CommandSpec {
                    capability: Capability::MedicalScanner,
                    action: InteractionAction::Enter,
                    label: "Enter",
                    visible: when_empty,
                },
                CommandSpec {
                    capability: Capability::MedicalScanner,
                    action: InteractionAction::Eject,
                    label: "Eject",
                    visible: when_occupied,
                },
                CommandSpec {
                    capability: Capability::MedicalScanner,
                    action: InteractionAction::Insert,
                    label: "Insert",
                    visible: when_empty,
                },
            ],
        }
    }
}

impl CommandTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, spec: CommandSpec) {
        self.specs.push(spec);
    }

    pub fn specs_for(&self, capability: Capability) -> impl Iterator<Item = &CommandSpec> {
        self.specs.iter().filter(move |s| s.capability == capability)
    }

    /// Actions visible for a target carrying `capabilities`
    pub fn visible_actions(
        &self,
        capabilities: &[Capability],
        ctx: &InteractionContext,
    ) -> Vec<InteractionAction> {
        self.specs
            .iter()
            .filter(|s| capabilities.contains(&s.capability) && (s.visible)(ctx))
            .map(|s| s.action)
            .collect()
    }

    /// Capability that provides `action`, if any visible spec does
    pub fn find(
        &self,
        capabilities: &[Capability],
        action: InteractionAction,
        ctx: &InteractionContext,
    ) -> Option<&CommandSpec> {
        self.specs.iter().find(|s| {
            s.action == action && capabilities.contains(&s.capability) && (s.visible)(ctx)
        })
    }
}
