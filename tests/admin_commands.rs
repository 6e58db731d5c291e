//! Integration tests for the hurt and rejuvenate admin commands

use std::path::Path;

use station_vitals::command::{hurt, rejuvenate, TargetSelector};
use station_vitals::core::config::SimulationConfig;
use station_vitals::ecs::world::World;
use station_vitals::prototypes::PrototypeCatalog;

fn world() -> World {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/prototypes");
    let catalog = PrototypeCatalog::load_dir(&path).unwrap();
    World::new(catalog, SimulationConfig::default()).unwrap()
}

#[test]
fn test_hurt_player_then_rejuvenate() {
    let mut world = world();
    let human = world.spawn_named("MobHuman", Some("Urist McHands")).unwrap();
    world.set_player(Some(human)).unwrap();

    let output = hurt(&mut world, "Brute", 300, &TargetSelector::Player, false);
    assert!(output.success);
    assert_eq!(
        output.lines,
        vec![format!(
            "Damaged entity Urist McHands with id {} for 300 Brute damage.",
            human
        )]
    );
    assert!(world.mob_state(human).unwrap().is_dead());

    let output = rejuvenate(&mut world, &[TargetSelector::parse("urist")]);
    assert!(output.success);
    assert!(world.mob_state(human).unwrap().is_alive());
    assert_eq!(world.damageable(human).unwrap().total_damage(), 0);
}

#[test]
fn test_hurt_lists_groups() {
    let mut world = world();
    let output = hurt(&mut world, "?", 0, &TargetSelector::Player, false);
    assert!(output.success);
    assert_eq!(output.lines[0], "Damage Types:");
    assert!(output
        .lines
        .contains(&"Brute: Blunt|Slash|Piercing".to_string()));
    assert!(output.lines.contains(&"Airloss: Asphyxiation|Bloodloss".to_string()));
}

#[test]
fn test_hurt_unsupported_group_on_locker() {
    let mut world = world();
    let locker = world.spawn("Locker").unwrap();

    let output = hurt(&mut world, "Toxin", 10, &TargetSelector::Id(locker), false);
    assert!(!output.success);
    assert_eq!(
        output.lines,
        vec![format!(
            "Entity locker with id {} can not be damaged with damage group Toxin",
            locker
        )]
    );
    assert_eq!(world.damageable(locker).unwrap().total_damage(), 0);
}

#[test]
fn test_hurt_unknown_entity() {
    let mut world = world();
    let ghost = station_vitals::core::types::EntityId::new();
    let output = hurt(&mut world, "Blunt", 10, &TargetSelector::Id(ghost), true);
    assert!(!output.success);
    assert_eq!(output.lines[0], format!("No entity found with id {}", ghost));
}

#[test]
fn test_rejuvenate_is_idempotent_on_healthy_targets() {
    let mut world = world();
    let human = world.spawn("MobHuman").unwrap();
    let locker = world.spawn("Locker").unwrap();

    for _ in 0..2 {
        let output = rejuvenate(&mut world, &[TargetSelector::Id(human), TargetSelector::Id(locker)]);
        assert!(output.success);
        assert_eq!(output.lines.len(), 2);
    }
    assert!(world.mob_state(human).unwrap().is_alive());
    assert_eq!(world.damageable(locker).unwrap().total_damage(), 0);
}

#[test]
fn test_hurt_with_min_amount_heals_group() {
    let mut world = world();
    let human = world.spawn("MobHuman").unwrap();
    hurt(&mut world, "Brute", 90, &TargetSelector::Id(human), true);

    let output = hurt(&mut world, "Brute", i32::MIN, &TargetSelector::Id(human), false);
    assert!(output.success);
    assert_eq!(world.damageable(human).unwrap().total_damage(), 0);

    let again = hurt(&mut world, "Brute", i32::MIN, &TargetSelector::Id(human), false);
    assert!(!again.success);
    assert_eq!(
        again.lines,
        vec![format!("Entity Human with id {} received no damage.", human)]
    );
}
