//! Carries sub-unit damage across ticks

/// Fixed-point resolution: one damage unit
const UNIT: i64 = 1_000_000;

/// Sums fractional damage and releases it in whole units.
///
/// Amounts are stored as millionths so repeated small additions do not
/// drift: ten additions of 0.6 release exactly 6.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DamageAccumulator {
    micro_units: i64,
}

impl DamageAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `amount` and return the whole units now ready to apply
    pub fn accumulate(&mut self, amount: f32) -> i32 {
        if !amount.is_finite() {
            return 0;
        }
        self.micro_units = self
            .micro_units
            .saturating_add((amount as f64 * UNIT as f64).round() as i64);
        let whole = self.micro_units / UNIT;
        self.micro_units -= whole * UNIT;
        whole.clamp(i32::MIN as i64, i32::MAX as i64) as i32
    }

    /// Fraction held back for later ticks
    pub fn pending(&self) -> f32 {
        (self.micro_units as f64 / UNIT as f64) as f32
    }

    pub fn reset(&mut self) {
        self.micro_units = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fractional_ticks_sum_exactly() {
        let mut acc = DamageAccumulator::new();
        let total: i32 = (0..10).map(|_| acc.accumulate(2.0 * 0.3)).sum();
        assert_eq!(total, 6);
        assert_eq!(acc.pending(), 0.0);
    }

    #[test]
    fn test_holds_remainder() {
        let mut acc = DamageAccumulator::new();
        assert_eq!(acc.accumulate(0.4), 0);
        assert_eq!(acc.accumulate(0.4), 0);
        assert_eq!(acc.accumulate(0.4), 1);
        assert!((acc.pending() - 0.2).abs() < 1e-6);

        acc.reset();
        assert_eq!(acc.pending(), 0.0);
    }

    #[test]
    fn test_whole_amounts_pass_through() {
        let mut acc = DamageAccumulator::new();
        assert_eq!(acc.accumulate(3.0), 3);
        assert_eq!(acc.accumulate(f32::NAN), 0);
    }

    #[test]
    fn test_huge_amounts_saturate() {
        let mut acc = DamageAccumulator::new();
        assert_eq!(acc.accumulate(f32::MAX), i32::MAX);
        assert_eq!(acc.accumulate(f32::MAX), i32::MAX);
        assert!(acc.pending() < 1.0);
    }
}
