//! Physics seam movement core
//!
//! Core не знает про конкретный движок: только SpatialQuery (probe'ы)
//! и CharacterBody (позиция/скорость/поворот).
//! - rapier: запросы через Rapier context (игра)
//! - static_world: AABB мир без Rapier (headless, тесты)

pub mod body;
pub mod query;
pub mod rapier;
pub mod static_world;

// Re-export основных типов
pub use body::{CharacterBody, PhysicsBody, TransformBody};
pub use query::{EmptyWorld, Hit, SpatialQuery};
pub use rapier::RapierSpatialQuery;
pub use static_world::{Obstacle, StaticWorld};
