pub mod events;
pub mod tick;

pub use events::{Deferred, DeferredDamage, Observer, SimulationEvent};
pub use tick::run_simulation_tick;
