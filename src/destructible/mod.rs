//! Destructible thresholds: damage triggers that fire one-shot or repeatable behaviors

pub mod behavior;
pub mod threshold;
pub mod trigger;

pub use behavior::{ActKind, BehaviorError, MinMax, ThresholdBehavior};
pub use threshold::{
    Destructible, DestructibleDef, Threshold, ThresholdDef, ThresholdFiring, ThresholdPhase,
};
pub use trigger::ThresholdTrigger;
