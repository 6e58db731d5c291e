pub mod entity;
pub mod world;

pub use entity::{Capabilities, Capability, Entity};
pub use world::World;
