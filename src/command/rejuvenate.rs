//! The `rejuvenate` admin command

use super::resolver::{TargetResolver, TargetSelector};
use super::CommandOutput;
use crate::ecs::world::World;
use crate::engine::EngineBridge;

/// Fully heal and revive every selected entity, or the player when none are given
pub fn rejuvenate<B: EngineBridge>(world: &mut World<B>, targets: &[TargetSelector]) -> CommandOutput {
    let player = [TargetSelector::Player];
    let targets = if targets.is_empty() { &player[..] } else { targets };

    let mut output = CommandOutput::ok(Vec::new());
    for target in targets {
        let found = match TargetResolver::new(world).resolve(target) {
            Ok(found) => found,
            Err(message) => {
                output.success = false;
                output.lines.push(message);
                continue;
            }
        };
        match world.rejuvenate(found.entity_id) {
            Ok(()) => output
                .lines
                .push(format!("Rejuvenated {} with id {}", found.name, found.entity_id)),
            Err(e) => {
                output.success = false;
                output.lines.push(e.to_string());
            }
        }
    }
    output
}
