//! Resistance sets: per-type coefficient and flat reduction.

use std::collections::BTreeMap;

use super::prototypes::{DamageTypeId, ResistanceSetPrototype};

/// Runtime resistance modifiers for one entity
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResistanceSet {
    coefficients: BTreeMap<DamageTypeId, f32>,
    flat_reductions: BTreeMap<DamageTypeId, i32>,
}

impl ResistanceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_coefficient(mut self, damage_type: DamageTypeId, coefficient: f32) -> Self {
        self.coefficients.insert(damage_type, coefficient);
        self
    }

    pub fn with_flat_reduction(mut self, damage_type: DamageTypeId, reduction: i32) -> Self {
        self.flat_reductions.insert(damage_type, reduction);
        self
    }

    pub fn coefficient(&self, damage_type: &DamageTypeId) -> f32 {
        self.coefficients.get(damage_type).copied().unwrap_or(1.0)
    }

    pub fn flat_reduction(&self, damage_type: &DamageTypeId) -> i32 {
        self.flat_reductions.get(damage_type).copied().unwrap_or(0)
    }

    /// Modify a per-type amount.
    ///
    /// Damage loses the flat reduction first (never going below zero) and
    /// is then scaled, rounding up. Healing is only scaled.
    pub fn apply(&self, damage_type: &DamageTypeId, amount: i32) -> i32 {
        let amount = if amount > 0 {
            (amount - self.flat_reduction(damage_type)).max(0)
        } else {
            amount
        };
        let scaled = (amount as f64 * self.coefficient(damage_type) as f64).ceil();
        scaled.clamp(i32::MIN as f64, i32::MAX as f64) as i32
    }
}

impl From<&ResistanceSetPrototype> for ResistanceSet {
    fn from(proto: &ResistanceSetPrototype) -> Self {
        Self {
            coefficients: proto.coefficients.clone(),
            flat_reductions: proto.flat_reductions.clone(),
        }
    }
}
