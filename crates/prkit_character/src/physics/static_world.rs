//! Headless мир без Rapier: набор статичных AABB препятствий
//!
//! Используется в headless симуляции и тестах. Capsule cast сэмплируется
//! шагами не больше половины радиуса — для коробок уровня (пол, стены,
//! ступени) этого достаточно, тонкие препятствия < radius/2 могут быть
//! пропущены.

use bevy::prelude::*;

use super::query::{Hit, SpatialQuery};

/// Статичное препятствие (axis-aligned box)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub collider: Entity,
    pub min: Vec3,
    pub max: Vec3,
}

impl Obstacle {
    pub fn from_center(collider: Entity, center: Vec3, half_extents: Vec3) -> Self {
        Self {
            collider,
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    fn distance_to(&self, point: Vec3) -> f32 {
        point.distance(point.clamp(self.min, self.max))
    }
}

#[derive(Resource, Debug, Clone, Default)]
pub struct StaticWorld {
    obstacles: Vec<Obstacle>,
}

impl StaticWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, obstacle: Obstacle) {
        self.obstacles.push(obstacle);
    }

    pub fn with(mut self, obstacle: Obstacle) -> Self {
        self.add(obstacle);
        self
    }

    /// Убирает все препятствия данного collider'а
    pub fn remove(&mut self, collider: Entity) {
        self.obstacles.retain(|o| o.collider != collider);
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    fn capsule_touches(obstacle: &Obstacle, start: Vec3, end: Vec3, radius: f32) -> bool {
        let length = start.distance(end);
        let samples = sample_count(length, radius);
        (0..=samples).any(|i| {
            let point = start.lerp(end, i as f32 / samples as f32);
            obstacle.distance_to(point) <= radius
        })
    }
}

const REFINE_ITERATIONS: usize = 16;

fn sample_count(length: f32, radius: f32) -> usize {
    let step = (radius * 0.5).max(0.01);
    ((length / step).ceil() as usize).clamp(1, 256)
}

impl SpatialQuery for StaticWorld {
    fn capsule_cast_all(
        &self,
        start: Vec3,
        end: Vec3,
        radius: f32,
        direction: Vec3,
        max_distance: f32,
    ) -> Vec<Hit> {
        let direction = direction.normalize_or_zero();
        let max_distance = max_distance.max(0.0);
        let steps = sample_count(max_distance, radius);

        let mut hits = Vec::new();
        for obstacle in &self.obstacles {
            let touches = |offset: f32| {
                let shift = direction * offset;
                Self::capsule_touches(obstacle, start + shift, end + shift, radius)
            };

            // Первое касание вдоль sweep (включая пересечение в начале)
            let contact = (0..=steps).find(|&i| touches(max_distance * i as f32 / steps as f32));

            if let Some(i) = contact {
                let mut distance = max_distance * i as f32 / steps as f32;
                if i > 0 {
                    // Уточняем бисекцией между последним свободным и первым касающимся сэмплом
                    let mut free = max_distance * (i - 1) as f32 / steps as f32;
                    for _ in 0..REFINE_ITERATIONS {
                        let mid = (free + distance) * 0.5;
                        if touches(mid) {
                            distance = mid;
                        } else {
                            free = mid;
                        }
                    }
                }
                hits.push(Hit { collider: obstacle.collider, distance });
            }
        }

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    fn overlap_sphere_all(&self, center: Vec3, radius: f32) -> Vec<Hit> {
        self.obstacles
            .iter()
            .filter(|o| o.distance_to(center) <= radius)
            .map(|o| Hit { collider: o.collider, distance: 0.0 })
            .collect()
    }
}
