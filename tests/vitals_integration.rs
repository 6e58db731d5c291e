//! Integration tests for damage, mob state and rejuvenation
//!
//! These tests drive the world the way the host engine would:
//! - Spawn from prototypes (inline and the shipped data/ catalogue)
//! - Apply damage by type and by group
//! - Watch life-state transitions and the requests they emit
//! - Rejuvenate back to full health

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use station_vitals::core::config::SimulationConfig;
use station_vitals::damage::{DamageClass, DamageTypeId};
use station_vitals::ecs::world::World;
use station_vitals::engine::{AppearanceVisual, DamageStateVisual, EngineRequest};
use station_vitals::mob_state::MobStateKind;
use station_vitals::prototypes::PrototypeCatalog;
use station_vitals::simulation::SimulationEvent;

const SCENARIO: &str = r#"
[[damage_type]]
id = "Blunt"

[[damage_type]]
id = "Toxin"

[[damage_group]]
id = "Toxin"
types = ["Toxin"]

[[damage_container]]
id = "Scenario"
supported_types = ["Blunt", "Toxin"]

[[entity]]
id = "Subject"
[entity.damageable]
container = "Scenario"
[entity.mob_state]
thresholds = [
    { damage = 0, state = "normal" },
    { damage = 100, state = "critical" },
    { damage = 200, state = "dead" },
]
"#;

fn scenario_world() -> World {
    let catalog = PrototypeCatalog::from_toml_str(SCENARIO).unwrap();
    World::new(catalog, SimulationConfig::default()).unwrap()
}

fn data_world() -> World {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/prototypes");
    let catalog = PrototypeCatalog::load_dir(&path).unwrap();
    World::new(catalog, SimulationConfig::default()).unwrap()
}

// ============================================================================
// Rejuvenate
// ============================================================================

/// Kill with a huge toxin dose, then rejuvenate back to full health
#[test]
fn test_rejuvenate_revives_after_massive_toxin_damage() {
    let mut world = scenario_world();
    let id = world.spawn("Subject").unwrap();

    assert!(world.try_change_damage(id, &DamageClass::group("Toxin"), 10_000_000, false));
    assert_eq!(world.damageable(id).unwrap().total_damage(), 10_000_000);
    assert!(world.mob_state(id).unwrap().is_dead());

    world.rejuvenate(id).unwrap();
    let mob = world.mob_state(id).unwrap();
    assert_eq!(world.damageable(id).unwrap().total_damage(), 0);
    assert!(mob.is_alive());
    assert!(!mob.is_dead());
}

/// Observers never see a half-healed body
#[test]
fn test_rejuvenate_is_one_notification() {
    let mut world = scenario_world();
    let id = world.spawn("Subject").unwrap();
    world.try_change_damage(id, &DamageClass::damage_type("Blunt"), 150, true);
    world.try_change_damage(id, &DamageClass::damage_type("Toxin"), 120, true);

    let totals = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&totals);
    world.subscribe(move |event, _| {
        if let SimulationEvent::DamageChanged { total, changes, .. } = event {
            log.borrow_mut().push((*total, changes.len()));
        }
    });

    world.rejuvenate(id).unwrap();
    assert_eq!(*totals.borrow(), vec![(0, 2)]);

    // Nothing left to heal: no further damage notification
    world.rejuvenate(id).unwrap();
    assert_eq!(totals.borrow().len(), 1);
    assert!(world.mob_state(id).unwrap().is_alive());
}

// ============================================================================
// Mob state
// ============================================================================

#[test]
fn test_state_transitions_follow_damage() {
    let mut world = scenario_world();
    let id = world.spawn("Subject").unwrap();
    world.drain_events();

    world.try_change_damage(id, &DamageClass::damage_type("Blunt"), 120, false);
    world.try_change_damage(id, &DamageClass::damage_type("Blunt"), 100, false);
    world.try_change_damage(id, &DamageClass::damage_type("Blunt"), -200, false);

    let transitions: Vec<(Option<MobStateKind>, MobStateKind)> = world
        .drain_events()
        .into_iter()
        .filter_map(|e| match e {
            SimulationEvent::StateTransitioned { from, to, .. } => Some((from, to)),
            _ => None,
        })
        .collect();
    assert_eq!(
        transitions,
        vec![
            (Some(MobStateKind::Normal), MobStateKind::Critical),
            (Some(MobStateKind::Critical), MobStateKind::Dead),
            (Some(MobStateKind::Dead), MobStateKind::Normal),
        ]
    );
}

#[test]
fn test_critical_locks_movement() {
    let mut world = scenario_world();
    let id = world.spawn("Subject").unwrap();
    world.bridge_mut().clear();

    world.try_change_damage(id, &DamageClass::damage_type("Toxin"), 150, false);
    let requests = world.bridge().requests();
    assert!(requests.contains(&EngineRequest::SetAppearance {
        entity: id,
        visual: AppearanceVisual::DamageState(DamageStateVisual::Critical)
    }));
    assert!(requests.contains(&EngineRequest::SetMovementLocked {
        entity: id,
        locked: true
    }));
}

// ============================================================================
// Shipped catalogue
// ============================================================================

#[test]
fn test_group_damage_splits_over_members() {
    let mut world = data_world();
    let human = world.spawn("MobHuman").unwrap();

    world.try_change_damage(human, &DamageClass::group("Brute"), 31, false);
    let damageable = world.damageable(human).unwrap();
    assert_eq!(damageable.total_damage(), 31);
    assert_eq!(damageable.damage_of(&DamageTypeId::from("Blunt")), Some(11));
    assert_eq!(damageable.damage_of(&DamageTypeId::from("Slash")), Some(10));
    assert_eq!(damageable.damage_of(&DamageTypeId::from("Piercing")), Some(10));
}

#[test]
fn test_metallic_resistances_apply_unless_ignored() {
    let mut world = data_world();
    let locker = world.spawn("Locker").unwrap();
    let blunt = DamageClass::damage_type("Blunt");

    // (105 - 5) * 0.7
    world.try_change_damage(locker, &blunt, 105, false);
    assert_eq!(world.damageable(locker).unwrap().total_damage(), 70);

    world.try_change_damage(locker, &blunt, 10, true);
    assert_eq!(world.damageable(locker).unwrap().total_damage(), 80);

    // A hit fully absorbed by the flat reduction changes nothing
    assert!(!world.try_change_damage(locker, &blunt, 5, false));
}
