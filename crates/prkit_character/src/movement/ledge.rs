//! Ledge grabbing: привязка к уступу, позиция вдоль уступа, regrab cooldown
//!
//! Уступ живёт отдельно от персонажа. Персонаж хранит только Entity уступа
//! и каждый тик достаёт его параметры через LedgeLookup.

use std::collections::HashMap;

use bevy::prelude::*;

use crate::physics::body::facing_rotation;

/// Уступ, за который можно схватиться
///
/// Направления заданы в local space anchor'а, world-версии получаем
/// поворотом Transform уступа.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct GrabbableLedge {
    /// Вдоль чего двигаемся (unit vector)
    pub direction: Vec3,
    /// Нормаль стены уступа (смотрит от стены)
    pub normal: Vec3,
    /// Максимальное |смещение| от anchor вдоль direction
    pub max_distance: f32,
}

impl Default for GrabbableLedge {
    fn default() -> Self {
        Self {
            direction: Vec3::X,
            normal: Vec3::Z,
            max_distance: 2.0,
        }
    }
}

/// World-space снапшот уступа на момент тика
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LedgeAnchor {
    pub position: Vec3,
    pub direction: Vec3,
    pub normal: Vec3,
    pub max_distance: f32,
}

impl LedgeAnchor {
    /// World space уступа (учитывает родителей: платформы, лифты)
    pub fn from_global(ledge: &GrabbableLedge, transform: &GlobalTransform) -> Self {
        let (_, rotation, translation) = transform.to_scale_rotation_translation();
        Self {
            position: translation,
            direction: rotation * ledge.direction,
            normal: rotation * ledge.normal,
            max_distance: ledge.max_distance,
        }
    }

    /// Поворот персонажа на уступе: лицом к стене (против normal)
    pub fn facing(&self) -> Quat {
        facing_rotation(-self.normal).unwrap_or(Quat::IDENTITY)
    }

    /// holding_offset (local space персонажа) → world space
    pub fn holding_offset_world(&self, holding_offset: Vec3) -> Vec3 {
        self.facing() * holding_offset
    }

    /// Куда прибит персонаж при данном lateral offset
    pub fn pinned_position(&self, ledge_distance: f32, holding_offset: Vec3) -> Vec3 {
        self.position + self.direction * ledge_distance + self.holding_offset_world(holding_offset)
    }

    /// Скалярная проекция позиции персонажа на direction уступа
    pub fn project(&self, position: Vec3, holding_offset: Vec3) -> f32 {
        (position - self.holding_offset_world(holding_offset) - self.position).dot(self.direction)
    }
}

/// Доступ к внешнему реестру уступов
pub trait LedgeLookup {
    fn ledge(&self, id: Entity) -> Option<LedgeAnchor>;
}

/// Простой реестр в памяти (headless, тесты)
#[derive(Debug, Clone, Default)]
pub struct LedgeRegistry {
    ledges: HashMap<Entity, LedgeAnchor>,
}

impl LedgeRegistry {
    pub fn insert(&mut self, id: Entity, anchor: LedgeAnchor) {
        self.ledges.insert(id, anchor);
    }

    pub fn remove(&mut self, id: Entity) -> Option<LedgeAnchor> {
        self.ledges.remove(&id)
    }
}

impl LedgeLookup for LedgeRegistry {
    fn ledge(&self, id: Entity) -> Option<LedgeAnchor> {
        self.ledges.get(&id).copied()
    }
}

/// Нет ни одного уступа
pub struct NoLedges;

impl LedgeLookup for NoLedges {
    fn ledge(&self, _: Entity) -> Option<LedgeAnchor> {
        None
    }
}

/// Состояние привязки к уступу
///
/// current сохраняется после схода, пока идёт cooldown: повторный
/// SnapToLedge на тот же уступ в это время игнорируется.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LedgeTracker {
    current: Option<Entity>,
    /// Смещение вдоль direction уступа относительно anchor
    ledge_distance: f32,
    /// None = cooldown не идёт
    cooldown: Option<f32>,
}

impl LedgeTracker {
    pub fn current(&self) -> Option<Entity> {
        self.current
    }

    pub fn ledge_distance(&self) -> f32 {
        self.ledge_distance
    }

    pub fn cooldown(&self) -> Option<f32> {
        self.cooldown
    }

    /// Нужно ли привязываться (иначе SnapToLedge — no-op)
    pub fn should_attach(&self, ledge: Entity, overwrite_cooldown: bool) -> bool {
        self.current != Some(ledge) || overwrite_cooldown
    }

    pub fn attach(&mut self, ledge: Entity, ledge_distance: f32) {
        self.current = Some(ledge);
        self.ledge_distance = ledge_distance;
        self.cooldown = None;
    }

    pub fn add_distance(&mut self, delta: f32) {
        self.ledge_distance += delta;
    }

    pub fn exceeded(&self, max_distance: f32) -> bool {
        self.ledge_distance.abs() > max_distance
    }

    /// Запускает cooldown (если ещё не идёт)
    pub fn start_cooldown(&mut self, duration: f32) {
        if self.cooldown.is_none() {
            self.cooldown = Some(duration);
        }
    }

    /// Тикает cooldown. true = cooldown истёк и уступ забыт
    pub fn tick_cooldown(&mut self, delta: f32) -> bool {
        let Some(remaining) = self.cooldown else {
            return false;
        };

        let remaining = remaining - delta;
        if remaining <= 0.0 {
            self.cooldown = None;
            self.current = None;
            true
        } else {
            self.cooldown = Some(remaining);
            false
        }
    }
}

/// Скаляр сдвига вдоль уступа из нормализованного направления движения
///
/// Покомпонентное произведение с direction уступа и сумма компонент.
/// Длину direction не нормализуем: ненормированный уступ масштабирует сдвиг.
pub fn lateral_input(movement_direction: Vec3, ledge_direction: Vec3) -> f32 {
    let scaled = movement_direction * ledge_direction;
    scaled.x + scaled.y + scaled.z
}
