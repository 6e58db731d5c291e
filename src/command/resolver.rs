//! Target resolution - converts an admin selector string to a concrete entity

use crate::core::types::EntityId;
use crate::ecs::world::World;
use crate::engine::EngineBridge;

/// Who an administrative command is aimed at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSelector {
    /// `_`: the entity the player is attached to
    Player,
    Id(EntityId),
    Name(String),
}

impl TargetSelector {
    pub fn parse(arg: &str) -> Self {
        if arg == "_" {
            return TargetSelector::Player;
        }
        match EntityId::parse(arg) {
            Some(id) => TargetSelector::Id(id),
            None => TargetSelector::Name(arg.to_string()),
        }
    }
}

/// A resolved target
#[derive(Debug, Clone)]
pub struct TargetMatch {
    pub entity_id: EntityId,
    pub name: String,
    pub match_reason: MatchReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchReason {
    Player,
    Id,
    ExactName,
    PartialName,
}

/// Resolves selectors against a world
pub struct TargetResolver<'a, B: EngineBridge> {
    world: &'a World<B>,
}

impl<'a, B: EngineBridge> TargetResolver<'a, B> {
    pub fn new(world: &'a World<B>) -> Self {
        Self { world }
    }

    /// Resolve a selector, or explain in one line why it could not be
    pub fn resolve(&self, selector: &TargetSelector) -> Result<TargetMatch, String> {
        match selector {
            TargetSelector::Player => {
                let id = self.world.player().ok_or_else(|| {
                    "You must have a player entity to use this command without specifying an entity."
                        .to_string()
                })?;
                self.matched(id, MatchReason::Player)
                    .ok_or_else(|| format!("No entity found with id {}", id))
            }
            TargetSelector::Id(id) => self
                .matched(*id, MatchReason::Id)
                .ok_or_else(|| format!("No entity found with id {}", id)),
            TargetSelector::Name(name) => self
                .find_by_name(name)
                .ok_or_else(|| format!("No entity found named {}", name)),
        }
    }

    fn matched(&self, id: EntityId, match_reason: MatchReason) -> Option<TargetMatch> {
        self.world.entity(id).map(|e| TargetMatch {
            entity_id: id,
            name: e.name.clone(),
            match_reason,
        })
    }

    /// Exact name first, then the first entity whose name starts with `name`
    pub fn find_by_name(&self, name: &str) -> Option<TargetMatch> {
        let name_lower = name.to_lowercase();

        let exact = self
            .world
            .entities()
            .find(|e| e.name.to_lowercase() == name_lower);
        if let Some(entity) = exact {
            return self.matched(entity.id, MatchReason::ExactName);
        }

        let partial = self
            .world
            .entities()
            .find(|e| e.name.to_lowercase().starts_with(&name_lower));
        partial.and_then(|e| self.matched(e.id, MatchReason::PartialName))
    }
}
