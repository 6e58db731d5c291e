//! The `hurt` admin command

use super::resolver::{TargetResolver, TargetSelector};
use super::CommandOutput;
use crate::damage::{DamageClass, DamageError};
use crate::ecs::world::World;
use crate::engine::EngineBridge;
use crate::prototypes::PrototypeCatalog;

pub const HURT_USAGE: &str = "Usage: hurt <type/?> <amount> (<entity uid/name/_>) (<ignoreResistances>)";

/// Every damage group with its member types
pub fn list_damage_groups(catalog: &PrototypeCatalog) -> CommandOutput {
    let mut lines = vec!["Damage Types:".to_string()];
    for group in catalog.damage_groups() {
        if group.damage_types.is_empty() {
            lines.push(group.id.to_string());
        } else {
            let members: Vec<String> = group.damage_types.iter().map(|t| t.to_string()).collect();
            lines.push(format!("{}: {}", group.id, members.join("|")));
        }
    }
    CommandOutput::ok(lines)
}

/// Apply `amount` of a damage group or type to the selected entity.
///
/// `class` is resolved as a group first, then as a type; `?` lists groups.
pub fn hurt<B: EngineBridge>(
    world: &mut World<B>,
    class: &str,
    amount: i32,
    target: &TargetSelector,
    ignore_resistances: bool,
) -> CommandOutput {
    if class == "?" {
        return list_damage_groups(world.catalog());
    }

    let Some(damage_class) = world.catalog().resolve_damage_class(class) else {
        let mut output = list_damage_groups(world.catalog());
        output.lines.insert(0, format!("{} is not a valid damage class or type.", class));
        output.success = false;
        return output;
    };

    let found = match TargetResolver::new(world).resolve(target) {
        Ok(found) => found,
        Err(message) => return CommandOutput::failed(vec![message, HURT_USAGE.to_string()]),
    };
    let (id, name) = (found.entity_id, found.name);

    let Some(damageable) = world.damageable(id) else {
        return CommandOutput::failed(vec![format!(
            "Entity {} with id {} does not have a Damageable.",
            name, id
        )]);
    };

    if !damageable.supports(&damage_class) {
        let kind = match damage_class {
            DamageClass::Group(_) => "damage group",
            DamageClass::Type(_) => "damage type",
        };
        return CommandOutput::failed(vec![format!(
            "Entity {} with id {} can not be damaged with {} {}",
            name, id, kind, damage_class
        )]);
    }

    match world.change_damage(id, &damage_class, amount, ignore_resistances) {
        Ok(_) => {
            tracing::info!("hurt {} {} {} (ignore resistances: {})", name, amount, damage_class, ignore_resistances);
            let suffix = if ignore_resistances { ", ignoring resistances." } else { "." };
            CommandOutput::ok(vec![format!(
                "Damaged entity {} with id {} for {} {} damage{}",
                name, id, amount, damage_class, suffix
            )])
        }
        Err(DamageError::NoEffectChange) => CommandOutput::failed(vec![format!(
            "Entity {} with id {} received no damage.",
            name, id
        )]),
        Err(e) => CommandOutput::failed(vec![format!("Entity {} with id {}: {}", name, id, e)]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SimulationConfig;

    const PROTOTYPES: &str = r#"
[[damage_type]]
id = "Blunt"

[[damage_type]]
id = "Toxin"

[[damage_type]]
id = "Heat"

[[damage_group]]
id = "Toxin"
types = ["Toxin"]

[[damage_group]]
id = "Brute"
types = ["Blunt"]

[[damage_container]]
id = "Biological"
supported_types = ["Blunt", "Toxin"]

[[entity]]
id = "Mob"
[entity.damageable]
container = "Biological"

[[entity]]
id = "Rock"
"#;

    fn world() -> World {
        World::new(
            PrototypeCatalog::from_toml_str(PROTOTYPES).unwrap(),
            SimulationConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_list_groups() {
        let world = world();
        let output = list_damage_groups(world.catalog());
        assert!(output.success);
        assert_eq!(output.lines, vec!["Damage Types:", "Brute: Blunt", "Toxin: Toxin"]);
    }

    #[test]
    fn test_hurt_reports_success_text() {
        let mut world = world();
        let id = world.spawn_named("Mob", Some("Urist")).unwrap();

        let output = hurt(&mut world, "Toxin", 10, &TargetSelector::Id(id), true);
        assert!(output.success);
        assert_eq!(
            output.lines[0],
            format!("Damaged entity Urist with id {} for 10 Toxin damage, ignoring resistances.", id)
        );

        let output = hurt(&mut world, "Blunt", 5, &TargetSelector::Name("urist".into()), false);
        assert!(output.lines[0].ends_with("for 5 Blunt damage."));
        assert_eq!(world.damageable(id).unwrap().total_damage(), 15);
    }

    #[test]
    fn test_hurt_failures_are_text() {
        let mut world = world();
        let mob = world.spawn("Mob").unwrap();
        let rock = world.spawn("Rock").unwrap();

        let unknown = hurt(&mut world, "Laser", 5, &TargetSelector::Id(mob), false);
        assert!(!unknown.success);
        assert_eq!(unknown.lines[0], "Laser is not a valid damage class or type.");

        let no_player = hurt(&mut world, "Blunt", 5, &TargetSelector::Player, false);
        assert!(no_player.lines[0].contains("player entity"));

        let no_body = hurt(&mut world, "Blunt", 5, &TargetSelector::Id(rock), false);
        assert!(no_body.lines[0].ends_with("does not have a Damageable."));

        let unsupported = hurt(&mut world, "Heat", 5, &TargetSelector::Id(mob), false);
        assert!(unsupported.lines[0].ends_with("can not be damaged with damage type Heat"));

        let healed = hurt(&mut world, "Blunt", -5, &TargetSelector::Id(mob), false);
        assert!(healed.lines[0].ends_with("received no damage."));
        assert_eq!(world.damageable(mob).unwrap().total_damage(), 0);
    }
}
