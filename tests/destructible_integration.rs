//! Integration tests for destructible thresholds
//!
//! Verifies the threshold pipeline end to end on the shipped prototypes:
//! - Thresholds fire once, in ascending order, even when one hit jumps several
//! - Behaviors reach the engine bridge as requests
//! - A destruction act removes the entity from the world

use std::path::Path;

use station_vitals::core::config::SimulationConfig;
use station_vitals::damage::DamageClass;
use station_vitals::destructible::ActKind;
use station_vitals::ecs::world::World;
use station_vitals::engine::EngineRequest;
use station_vitals::prototypes::PrototypeCatalog;
use station_vitals::simulation::SimulationEvent;

fn world() -> World {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/prototypes");
    let catalog = PrototypeCatalog::load_dir(&path).unwrap();
    World::new(catalog, SimulationConfig::default()).unwrap()
}

fn crossed(events: &[SimulationEvent]) -> Vec<usize> {
    events
        .iter()
        .filter_map(|e| match e {
            SimulationEvent::ThresholdCrossed { threshold, .. } => Some(*threshold),
            _ => None,
        })
        .collect()
}

#[test]
fn test_locker_breaks_in_two_steps() {
    let mut world = world();
    let locker = world.spawn("Locker").unwrap();
    let blunt = DamageClass::damage_type("Blunt");
    world.drain_events();

    // Half of max_damage: only the sound threshold
    world.try_change_damage(locker, &blunt, 160, true);
    assert_eq!(crossed(&world.drain_events()), vec![0]);
    assert!(world.contains(locker));
    assert!(world.bridge().requests().iter().any(|r| matches!(
        r,
        EngineRequest::PlaySound { entity, .. } if *entity == locker
    )));

    // Staying above the first threshold does not re-fire it
    world.try_change_damage(locker, &blunt, 10, true);
    assert!(crossed(&world.drain_events()).is_empty());

    world.try_change_damage(locker, &blunt, 200, true);
    let events = world.drain_events();
    assert_eq!(crossed(&events), vec![1]);
    assert_eq!(events.last(), Some(&SimulationEvent::EntityDestroyed { entity: locker }));
    assert!(!world.contains(locker));

    let requests = world.bridge().requests();
    let steel: u32 = requests
        .iter()
        .filter_map(|r| match r {
            EngineRequest::SpawnEntities { at, kind, count } if *at == locker && kind == "SheetSteel1" => {
                Some(*count)
            }
            _ => None,
        })
        .sum();
    assert!((1..=2).contains(&steel));
    assert!(requests.contains(&EngineRequest::Act {
        entity: locker,
        act: ActKind::Destruction
    }));
    assert!(requests.contains(&EngineRequest::DeleteEntity { entity: locker }));
}

#[test]
fn test_single_hit_fires_every_crossed_threshold_in_order() {
    let mut world = world();
    let locker = world.spawn("Locker").unwrap();
    world.drain_events();

    world.try_change_damage(locker, &DamageClass::damage_type("Slash"), 1_000, true);
    let events = world.drain_events();
    assert_eq!(crossed(&events), vec![0, 1]);
    assert!(!world.contains(locker));
}

#[test]
fn test_window_or_trigger_breaks_on_heat() {
    let mut world = world();
    let window = world.spawn("Window").unwrap();

    world.try_change_damage(window, &DamageClass::damage_type("Heat"), 39, false);
    assert!(world.contains(window));

    world.try_change_damage(window, &DamageClass::damage_type("Heat"), 1, false);
    assert!(!world.contains(window));
    assert!(world.bridge().requests().iter().any(|r| matches!(
        r,
        EngineRequest::SpawnEntities { kind, .. } if kind == "ShardGlass"
    )));
}

#[test]
fn test_destroyed_entity_rejects_further_damage() {
    let mut world = world();
    let window = world.spawn("Window").unwrap();
    world.try_change_damage(window, &DamageClass::damage_type("Blunt"), 500, true);

    assert!(!world.try_change_damage(window, &DamageClass::damage_type("Blunt"), 1, true));
    assert_eq!(world.entity_count(), 0);
}
