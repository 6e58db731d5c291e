//! Damage prototype definitions.
//!
//! These are the already-parsed forms of the damage data files: the global
//! catalogue of damage types and groups, the containers that declare which
//! types an entity can take, and resistance sets.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identifier of an atomic damage type (Blunt, Heat, Toxin...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display)]
#[serde(transparent)]
pub struct DamageTypeId(pub String);

impl From<&str> for DamageTypeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Identifier of a named group of damage types (Brute, Burn...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display)]
#[serde(transparent)]
pub struct DamageGroupId(pub String);

impl From<&str> for DamageGroupId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A damage type as declared in the catalogue
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DamageTypePrototype {
    pub id: DamageTypeId,
    /// Display name, defaults to the id
    #[serde(default)]
    pub name: Option<String>,
}

impl DamageTypePrototype {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id.0)
    }
}

/// A damage group. Member order is the declaration order and never changes
/// after load.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DamageGroupPrototype {
    pub id: DamageGroupId,
    #[serde(rename = "types")]
    pub damage_types: Vec<DamageTypeId>,
}

/// Declares the set of damage types an entity supports
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DamageContainerPrototype {
    pub id: String,
    /// Every member type of these groups is supported
    #[serde(default)]
    pub supported_groups: Vec<DamageGroupId>,
    /// Individually supported types
    #[serde(default)]
    pub supported_types: Vec<DamageTypeId>,
}

/// Per-type damage modifiers applied unless resistances are ignored
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResistanceSetPrototype {
    pub id: String,
    #[serde(default)]
    pub coefficients: BTreeMap<DamageTypeId, f32>,
    #[serde(default)]
    pub flat_reductions: BTreeMap<DamageTypeId, i32>,
}

/// The target of a damage change: one type, or a whole group
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display)]
pub enum DamageClass {
    #[display(fmt = "{}", _0)]
    Type(DamageTypeId),
    #[display(fmt = "{}", _0)]
    Group(DamageGroupId),
}

impl DamageClass {
    pub fn damage_type(id: &str) -> Self {
        DamageClass::Type(DamageTypeId::from(id))
    }

    pub fn group(id: &str) -> Self {
        DamageClass::Group(DamageGroupId::from(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_deserializes_member_types_in_order() {
        let group: DamageGroupPrototype =
            toml::from_str("id = \"Brute\"\ntypes = [\"Blunt\", \"Slash\", \"Piercing\"]").unwrap();
        assert_eq!(group.id, DamageGroupId::from("Brute"));
        assert_eq!(
            group.damage_types,
            vec![
                DamageTypeId::from("Blunt"),
                DamageTypeId::from("Slash"),
                DamageTypeId::from("Piercing")
            ]
        );
    }

    #[test]
    fn test_type_display_name_falls_back_to_id() {
        let ty: DamageTypePrototype = toml::from_str("id = \"Heat\"").unwrap();
        assert_eq!(ty.display_name(), "Heat");
        let ty: DamageTypePrototype = toml::from_str("id = \"Heat\"\nname = \"Burns\"").unwrap();
        assert_eq!(ty.display_name(), "Burns");
    }

    #[test]
    fn test_damage_class_display() {
        assert_eq!(DamageClass::group("Toxin").to_string(), "Toxin");
        assert_eq!(DamageClass::damage_type("Blunt").to_string(), "Blunt");
    }
}
