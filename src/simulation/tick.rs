//! Tick system - orchestrates derived-damage updates
//!
//! Each tick advances the simulation one step, processing all entities:
//! deferred damage -> producers (thirst, hunger, temperature, respiration)
//! -> damage pipeline -> tick counter.

use super::events::SimulationEvent;
use crate::core::types::Seconds;
use crate::ecs::world::World;
use crate::engine::EngineBridge;

/// Run a single simulation tick
///
/// Order of operations:
/// 1. Apply damage that observers deferred during the previous tick
/// 2. Update every producer of every entity, in spawn order
/// 3. Advance tick counter
///
/// A faulting producer is logged and skipped; the entity's other producers
/// and every other entity still run. Returns every event raised during the tick.
pub fn run_simulation_tick<B: EngineBridge>(world: &mut World<B>, elapsed: Seconds) -> Vec<SimulationEvent> {
    world.apply_deferred();
    update_producers(world, elapsed);
    world.advance_tick();
    world.drain_events()
}

fn update_producers<B: EngineBridge>(world: &mut World<B>, elapsed: Seconds) {
    // Entities destroyed mid-tick drop out of the world; iterate a snapshot
    let ids: Vec<_> = world.entity_ids().to_vec();
    for id in ids {
        if let Err(e) = world.update_producers(id, elapsed) {
            tracing::debug!("Tick {}: {} finished with a producer fault: {}", world.current_tick, id, e);
        }
    }
}
