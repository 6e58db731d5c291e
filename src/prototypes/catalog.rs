//! Loading, merging and validating prototype documents

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::entity::EntityPrototype;
use super::PrototypeError;
use crate::damage::{
    DamageClass, DamageContainerPrototype, DamageGroupId, DamageGroupPrototype, DamageTypeId,
    DamageTypePrototype, Damageable, ResistanceSet, ResistanceSetPrototype,
};
use crate::destructible::{Destructible, DestructibleDef};
use crate::mob_state::MobState;
use crate::producers::{Respiration, Temperature};

/// One TOML file's worth of prototypes
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PrototypeDocument {
    damage_type: Vec<DamageTypePrototype>,
    damage_group: Vec<DamageGroupPrototype>,
    damage_container: Vec<DamageContainerPrototype>,
    resistance_set: Vec<ResistanceSetPrototype>,
    entity: Vec<EntityPrototype>,
}

/// Every prototype known to the simulation
#[derive(Debug, Clone, Default)]
pub struct PrototypeCatalog {
    damage_types: BTreeMap<DamageTypeId, DamageTypePrototype>,
    damage_groups: BTreeMap<DamageGroupId, DamageGroupPrototype>,
    containers: BTreeMap<String, DamageContainerPrototype>,
    resistance_sets: BTreeMap<String, ResistanceSetPrototype>,
    entities: BTreeMap<String, EntityPrototype>,
}

impl PrototypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a single document
    pub fn from_toml_str(content: &str) -> Result<Self, PrototypeError> {
        let mut catalog = Self::new();
        catalog.merge_toml_str(content)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load and validate one file
    pub fn load_file(path: &Path) -> Result<Self, PrototypeError> {
        let mut catalog = Self::new();
        catalog.merge_file(path)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load every .toml file under `path`, recursively, then validate
    pub fn load_dir(path: &Path) -> Result<Self, PrototypeError> {
        let mut files = Vec::new();
        collect_toml_files(path, &mut files)?;
        // read_dir order is platform dependent
        files.sort();

        let mut catalog = Self::new();
        for file in &files {
            catalog.merge_file(file)?;
        }
        catalog.validate()?;
        tracing::info!(
            "Loaded {} entity prototypes from {} files in {}",
            catalog.entities.len(),
            files.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Add a document's prototypes without validating cross references
    pub fn merge_toml_str(&mut self, content: &str) -> Result<(), PrototypeError> {
        let document: PrototypeDocument = toml::from_str(content)?;
        self.merge(document)
    }

    fn merge_file(&mut self, path: &Path) -> Result<(), PrototypeError> {
        let content = std::fs::read_to_string(path)?;
        self.merge_toml_str(&content)?;
        tracing::debug!("Merged prototypes from {}", path.display());
        Ok(())
    }

    fn merge(&mut self, document: PrototypeDocument) -> Result<(), PrototypeError> {
        for proto in document.damage_type {
            insert_unique(&mut self.damage_types, proto.id.clone(), proto, "damage_type")?;
        }
        for proto in document.damage_group {
            insert_unique(&mut self.damage_groups, proto.id.clone(), proto, "damage_group")?;
        }
        for proto in document.damage_container {
            insert_unique(&mut self.containers, proto.id.clone(), proto, "damage_container")?;
        }
        for proto in document.resistance_set {
            insert_unique(&mut self.resistance_sets, proto.id.clone(), proto, "resistance_set")?;
        }
        for proto in document.entity {
            insert_unique(&mut self.entities, proto.id.clone(), proto, "entity")?;
        }
        Ok(())
    }

    /// Check every cross reference and every threshold table
    pub fn validate(&self) -> Result<(), PrototypeError> {
        for group in self.damage_groups.values() {
            if group.damage_types.is_empty() {
                return Err(PrototypeError::EmptyDamageGroup(group.id.clone()));
            }
            for damage_type in &group.damage_types {
                self.require_type(damage_type)?;
            }
        }

        for container in self.containers.values() {
            for group in &container.supported_groups {
                if !self.damage_groups.contains_key(group) {
                    return Err(PrototypeError::UnknownDamageGroup(group.clone()));
                }
            }
            for damage_type in &container.supported_types {
                self.require_type(damage_type)?;
            }
        }

        for set in self.resistance_sets.values() {
            for damage_type in set.coefficients.keys().chain(set.flat_reductions.keys()) {
                self.require_type(damage_type)?;
            }
        }

        for proto in self.entities.values() {
            self.validate_entity(proto)?;
        }
        Ok(())
    }

    fn validate_entity(&self, proto: &EntityPrototype) -> Result<(), PrototypeError> {
        let invalid = |component: &'static str, reason: String| PrototypeError::InvalidComponent {
            entity: proto.id.clone(),
            component,
            reason,
        };

        if let Some(damageable) = &proto.damageable {
            if !self.containers.contains_key(&damageable.container) {
                return Err(PrototypeError::UnknownDamageContainer(
                    damageable.container.clone(),
                ));
            }
            if let Some(set) = &damageable.resistance_set {
                if !self.resistance_sets.contains_key(set) {
                    return Err(PrototypeError::UnknownResistanceSet(set.clone()));
                }
            }
        }

        let needs_body = [
            ("mob_state", proto.mob_state.is_some()),
            ("destructible", proto.destructible.is_some()),
        ];
        for (component, present) in needs_body {
            if present && proto.damageable.is_none() {
                return Err(invalid(component, "requires a damageable".into()));
            }
        }

        if let Some(mob_state) = &proto.mob_state {
            MobState::from_entries(mob_state.entries(), 1).map_err(|e| {
                PrototypeError::InvalidThresholdConfiguration(format!("{}: {}", proto.id, e))
            })?;
        }

        if let Some(destructible) = &proto.destructible {
            self.validate_destructible(&proto.id, destructible)?;
        }

        for need in [&proto.thirst, &proto.hunger].into_iter().flatten() {
            self.require_type(&need.damage_type)?;
            if need.base_decay_rate.is_some_and(|r| r < 0.0) {
                return Err(invalid("need", "base_decay_rate must not be negative".into()));
            }
        }

        if let Some(temperature) = &proto.temperature {
            self.require_type(&temperature.heat_damage_type)?;
            self.require_type(&temperature.cold_damage_type)?;
            Temperature::new(temperature, 1.0).map_err(|e| invalid("temperature", e))?;
        }

        if let Some(respiration) = &proto.respiration {
            self.require_type(&respiration.damage_type)?;
            Respiration::new(respiration).map_err(|e| invalid("respiration", e))?;
        }
        Ok(())
    }

    fn validate_destructible(&self, id: &str, def: &DestructibleDef) -> Result<(), PrototypeError> {
        for threshold in &def.thresholds {
            threshold.trigger.validate().map_err(|e| {
                PrototypeError::InvalidThresholdConfiguration(format!("{}: {}", id, e))
            })?;
            for behavior in &threshold.behaviors {
                behavior
                    .validate()
                    .map_err(|e| PrototypeError::InvalidBehavior(format!("{}: {}", id, e)))?;
            }
        }
        Destructible::from_def(def).map_err(|e| {
            PrototypeError::InvalidThresholdConfiguration(format!("{}: {}", id, e))
        })?;
        Ok(())
    }

    fn require_type(&self, damage_type: &DamageTypeId) -> Result<(), PrototypeError> {
        if self.damage_types.contains_key(damage_type) {
            Ok(())
        } else {
            Err(PrototypeError::UnknownDamageType(damage_type.clone()))
        }
    }

    pub fn damage_type(&self, id: &DamageTypeId) -> Option<&DamageTypePrototype> {
        self.damage_types.get(id)
    }

    pub fn damage_group(&self, id: &DamageGroupId) -> Option<&DamageGroupPrototype> {
        self.damage_groups.get(id)
    }

    /// Groups in id order
    pub fn damage_groups(&self) -> impl Iterator<Item = &DamageGroupPrototype> {
        self.damage_groups.values()
    }

    pub fn damage_types(&self) -> impl Iterator<Item = &DamageTypePrototype> {
        self.damage_types.values()
    }

    pub fn entity(&self, id: &str) -> Option<&EntityPrototype> {
        self.entities.get(id)
    }

    pub fn entities(&self) -> impl Iterator<Item = &EntityPrototype> {
        self.entities.values()
    }

    /// Resolve a damage class by name. Groups win over types.
    pub fn resolve_damage_class(&self, name: &str) -> Option<DamageClass> {
        let group = DamageGroupId::from(name);
        if self.damage_groups.contains_key(&group) {
            return Some(DamageClass::Group(group));
        }
        let damage_type = DamageTypeId::from(name);
        if self.damage_types.contains_key(&damage_type) {
            return Some(DamageClass::Type(damage_type));
        }
        None
    }

    /// Types supported by a container: its groups' members, then its own list
    pub fn supported_types(&self, container: &str) -> Result<Vec<DamageTypeId>, PrototypeError> {
        let proto = self
            .containers
            .get(container)
            .ok_or_else(|| PrototypeError::UnknownDamageContainer(container.to_string()))?;

        let mut types: Vec<DamageTypeId> = Vec::new();
        for group_id in &proto.supported_groups {
            let group = self
                .damage_groups
                .get(group_id)
                .ok_or_else(|| PrototypeError::UnknownDamageGroup(group_id.clone()))?;
            for damage_type in &group.damage_types {
                if !types.contains(damage_type) {
                    types.push(damage_type.clone());
                }
            }
        }
        for damage_type in &proto.supported_types {
            if !types.contains(damage_type) {
                types.push(damage_type.clone());
            }
        }
        Ok(types)
    }

    pub fn build_damageable(
        &self,
        container: &str,
        resistance_set: Option<&str>,
    ) -> Result<Damageable, PrototypeError> {
        let types = self.supported_types(container)?;
        let resistances = match resistance_set {
            Some(id) => Some(ResistanceSet::from(
                self.resistance_sets
                    .get(id)
                    .ok_or_else(|| PrototypeError::UnknownResistanceSet(id.to_string()))?,
            )),
            None => None,
        };
        let groups: Vec<DamageGroupPrototype> = self.damage_groups.values().cloned().collect();
        Ok(Damageable::new(types, &groups, resistances))
    }
}

fn insert_unique<K: Ord, V>(
    map: &mut BTreeMap<K, V>,
    key: K,
    value: V,
    kind: &'static str,
) -> Result<(), PrototypeError>
where
    K: std::fmt::Display,
{
    if map.contains_key(&key) {
        return Err(PrototypeError::Duplicate {
            kind,
            id: key.to_string(),
        });
    }
    map.insert(key, value);
    Ok(())
}

fn collect_toml_files(path: &Path, files: &mut Vec<PathBuf>) -> Result<(), PrototypeError> {
    for entry in std::fs::read_dir(path)? {
        let entry_path = entry?.path();
        if entry_path.is_dir() {
            collect_toml_files(&entry_path, files)?;
        } else if entry_path.extension().is_some_and(|ext| ext == "toml") {
            files.push(entry_path);
        }
    }
    Ok(())
}
