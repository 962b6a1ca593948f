//! Kinematic mover: target position → ограниченный сдвиг за тик
//!
//! Перед сдвигом — forward probe (capsule cast). Любое чужое попадание
//! полностью отменяет сдвиг на этот тик (без скольжения вдоль стены).

use bevy::prelude::*;

use crate::config::ProbeSettings;
use crate::physics::body::{facing_rotation, CharacterBody};
use crate::physics::query::{has_foreign_hit, SpatialQuery};

use super::hitbox::Hitbox;

/// Допуск прибытия: остаток пути меньше шага + epsilon → встаём ровно в target
const ARRIVAL_EPSILON: f32 = 1e-4;

/// Всё, что нужно для probe'ов одного персонажа на текущем тике
pub struct Probe<'a> {
    pub query: &'a dyn SpatialQuery,
    pub own_collider: Option<Entity>,
    pub hitbox: &'a Hitbox,
    pub settings: &'a ProbeSettings,
}

impl Probe<'_> {
    /// Capsule cast вдоль direction на distance
    ///
    /// Capsule уже hitbox'а на lateral padding, верх опущен на vertical
    /// padding, низ поднят на step height (низкие препятствия перешагиваем).
    pub fn forward_blocked(&self, position: Vec3, direction: Vec3, distance: f32) -> bool {
        let (bottom, top) = self.hitbox.segment(position);
        let radius = (self.hitbox.current().radius - self.settings.lateral_padding).max(0.01);
        let top = top - Vec3::Y * self.settings.vertical_padding;
        let bottom = (bottom + Vec3::Y * self.settings.step_height).min(top);

        let hits = self
            .query
            .capsule_cast_all(bottom, top, radius, direction, distance);
        has_foreign_hit(&hits, self.own_collider)
    }

    /// Есть ли опора под hitbox
    pub fn has_support(&self, position: Vec3) -> bool {
        let (center, radius) = ground_probe(self.hitbox, position, self.settings);
        has_foreign_hit(&self.query.overlap_sphere_all(center, radius), self.own_collider)
    }

    /// Вертикальная поправка, ставящая низ hitbox на верх опоры
    ///
    /// Сфера (уже hitbox'а на lateral padding) опускается из центра capsule,
    /// поэтому провал ниже поверхности тоже исправляется. None = опоры нет.
    pub fn support_offset(&self, position: Vec3) -> Option<f32> {
        let shape = self.hitbox.current();
        let radius = (shape.radius - self.settings.lateral_padding).max(0.01);
        let bottom = self.hitbox.bottom(position);
        let center = (position + shape.center).max(bottom + Vec3::Y * radius);
        let lift = center.y - radius - bottom.y;

        self.query
            .capsule_cast_all(center, center, radius, Vec3::NEG_Y, lift + self.settings.ground_probe_distance)
            .into_iter()
            .find(|hit| Some(hit.collider) != self.own_collider)
            .map(|hit| lift - hit.distance)
    }
}

/// Сфера под hitbox: касается опоры, если до неё не больше probe distance
pub fn ground_probe(hitbox: &Hitbox, position: Vec3, settings: &ProbeSettings) -> (Vec3, f32) {
    let radius = settings.ground_probe_radius;
    let center = hitbox.bottom(position) + Vec3::Y * (radius - settings.ground_probe_distance);
    (center, radius)
}

/// Результат тика движения
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoveOutcome {
    Idle,
    Moved { displacement: Vec3 },
    Blocked,
    Arrived,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct KinematicMover {
    target: Option<Vec3>,
    /// Время непрерывного движения (вход acceleration curve)
    movement_time: f32,
}

impl KinematicMover {
    pub fn target(&self) -> Option<Vec3> {
        self.target
    }

    pub fn movement_time(&self) -> f32 {
        self.movement_time
    }

    pub fn move_to(&mut self, position: Vec3) {
        self.target = Some(position);
    }

    pub fn stop(&mut self) {
        self.target = None;
    }

    pub(crate) fn advance_time(&mut self, delta: f32) {
        self.movement_time += delta;
    }

    pub(crate) fn reset_time(&mut self) {
        self.movement_time = 0.0;
    }

    /// Один тик движения к target
    ///
    /// speed вычисляется снаружи после advance movement_time
    /// (CurrentSpeed зависит от режима). direct_write = Transform режим
    /// интеграции: позиция пишется напрямую вместо move_position.
    pub fn step(
        &mut self,
        body: &mut dyn CharacterBody,
        probe: &Probe<'_>,
        speed: f32,
        delta: f32,
        direct_write: bool,
    ) -> MoveOutcome {
        let Some(target) = self.target else {
            self.movement_time = 0.0;
            return MoveOutcome::Idle;
        };

        let position = body.position();
        let to_target = target - position;
        let remaining = to_target.length();
        let direction = to_target.normalize_or_zero();
        let step = speed * delta;

        // MoveTowards: последний шаг обрезается до target
        let (next, distance) = if remaining <= step + ARRIVAL_EPSILON {
            (target, remaining)
        } else {
            (position + direction * step, step)
        };

        if distance > 0.0 && probe.forward_blocked(position, direction, distance) {
            return MoveOutcome::Blocked;
        }

        if direct_write {
            body.set_position(next);
        } else {
            body.move_position(next);
        }

        if let Some(rotation) = facing_rotation(direction) {
            body.set_rotation(rotation);
        }

        if body.position() == target {
            self.target = None;
            return MoveOutcome::Arrived;
        }

        MoveOutcome::Moved {
            displacement: next - position,
        }
    }
}
