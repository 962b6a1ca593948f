//! Spatial queries, которые потребляет movement core
//!
//! Реализации: RapierSpatialQuery (игра) и StaticWorld (headless/тесты).
//! Все запросы read-only снапшоты мира на момент вызова.

use bevy::prelude::*;

/// Попадание запроса: чей collider и на какой дистанции вдоль каста
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub collider: Entity,
    pub distance: f32,
}

pub trait SpatialQuery {
    /// Sweep capsule (отрезок start–end, radius) вдоль direction на max_distance
    fn capsule_cast_all(
        &self,
        start: Vec3,
        end: Vec3,
        radius: f32,
        direction: Vec3,
        max_distance: f32,
    ) -> Vec<Hit>;

    /// Все colliders, пересекающие сферу
    fn overlap_sphere_all(&self, center: Vec3, radius: f32) -> Vec<Hit>;
}

/// Есть ли попадание в чужой collider (пустой список = коллизии нет)
pub fn has_foreign_hit(hits: &[Hit], own_collider: Option<Entity>) -> bool {
    hits.iter().any(|hit| Some(hit.collider) != own_collider)
}

/// Пустой мир: ни одного collider'а
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyWorld;

impl SpatialQuery for EmptyWorld {
    fn capsule_cast_all(&self, _: Vec3, _: Vec3, _: f32, _: Vec3, _: f32) -> Vec<Hit> {
        Vec::new()
    }

    fn overlap_sphere_all(&self, _: Vec3, _: f32) -> Vec<Hit> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_own_collider_is_ignored() {
        let own = Entity::from_raw(7);
        let wall = Entity::from_raw(8);

        assert!(!has_foreign_hit(&[], Some(own)));
        assert!(!has_foreign_hit(&[Hit { collider: own, distance: 0.0 }], Some(own)));
        assert!(has_foreign_hit(
            &[Hit { collider: own, distance: 0.0 }, Hit { collider: wall, distance: 0.3 }],
            Some(own)
        ));
        assert!(has_foreign_hit(&[Hit { collider: own, distance: 0.0 }], None));
    }
}
