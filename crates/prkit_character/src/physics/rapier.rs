//! SpatialQuery поверх Rapier context
//!
//! Rapier cast_shape возвращает только первое попадание, поэтому "cast all"
//! собираем повторными кастами с исключением уже найденных colliders.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::query::{Hit, SpatialQuery};

/// Сколько раз максимум повторяем каст (защита от бесконечного цикла)
const MAX_CAST_HITS: usize = 8;

pub struct RapierSpatialQuery<'a> {
    context: &'a RapierContext<'a>,
}

impl<'a> RapierSpatialQuery<'a> {
    pub fn new(context: &'a RapierContext<'a>) -> Self {
        Self { context }
    }
}

impl SpatialQuery for RapierSpatialQuery<'_> {
    fn capsule_cast_all(
        &self,
        start: Vec3,
        end: Vec3,
        radius: f32,
        direction: Vec3,
        max_distance: f32,
    ) -> Vec<Hit> {
        let direction = direction.normalize_or_zero();
        let center = (start + end) * 0.5;
        let half_height = start.distance(end) * 0.5;
        // capsule_y выровнен по Y; поворачиваем под фактический отрезок
        let axis = (end - start).normalize_or_zero();
        let rotation = if axis == Vec3::ZERO {
            Quat::IDENTITY
        } else {
            Quat::from_rotation_arc(Vec3::Y, axis)
        };
        let shape = Collider::capsule_y(half_height, radius);
        let options = ShapeCastOptions {
            max_time_of_impact: max_distance.max(0.0),
            target_distance: 0.0,
            stop_at_penetration: true,
            compute_impact_geometry_on_penetration: false,
        };

        let mut excluded: Vec<Entity> = Vec::new();
        let mut hits = Vec::new();

        while hits.len() < MAX_CAST_HITS {
            let predicate = |entity: Entity| !excluded.contains(&entity);
            let filter = QueryFilter::default()
                .exclude_sensors()
                .predicate(&predicate);

            let Some((entity, hit)) =
                self.context
                    .cast_shape(center, rotation, direction, &*shape.raw, options, filter)
            else {
                break;
            };

            hits.push(Hit {
                collider: entity,
                distance: hit.time_of_impact,
            });
            excluded.push(entity);
        }

        hits
    }

    fn overlap_sphere_all(&self, center: Vec3, radius: f32) -> Vec<Hit> {
        let shape = Collider::ball(radius);
        let mut hits = Vec::new();

        self.context.intersect_shape(
            center,
            Quat::IDENTITY,
            &*shape.raw,
            QueryFilter::default().exclude_sensors(),
            |entity| {
                hits.push(Hit { collider: entity, distance: 0.0 });
                true
            },
        );

        hits
    }
}
