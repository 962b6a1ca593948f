//! Hitbox персонажа: capsule, размер зависит от режима движения
//!
//! Базовые размеры фиксируются один раз при инициализации, текущие
//! пересчитываются на каждом переходе режима.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::mode::{ModeProfiles, ModeTransition};

/// Размеры capsule (local space персонажа, ось Y вверх)
#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct HitboxShape {
    pub center: Vec3,
    /// Полная высота capsule (включая полусферы)
    pub height: f32,
    pub radius: f32,
}

impl Default for HitboxShape {
    fn default() -> Self {
        Self {
            center: Vec3::new(0.0, 1.0, 0.0),
            height: 2.0,
            radius: 0.4,
        }
    }
}

impl HitboxShape {
    /// Половина отрезка между центрами полусфер (>= 0)
    pub fn half_segment(&self) -> f32 {
        (self.height * 0.5 - self.radius).max(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hitbox {
    base: HitboxShape,
    current: HitboxShape,
}

impl Hitbox {
    pub fn new(base: HitboxShape) -> Self {
        Self { base, current: base }
    }

    pub fn base(&self) -> HitboxShape {
        self.base
    }

    pub fn current(&self) -> HitboxShape {
        self.current
    }

    /// Реакция на смену режима
    ///
    /// Crouch/Prone: height = base × multiplier, центр уходит вниз на
    /// половину потерянной высоты. Остальные режимы: ровно base.
    pub fn on_mode_changed(&mut self, transition: ModeTransition, profiles: &ModeProfiles) {
        match profiles.height_multiplier(transition.new) {
            Some(multiplier) => {
                let height = self.base.height * multiplier;
                let reduction = self.base.height - height;
                self.current = HitboxShape {
                    center: self.base.center - Vec3::Y * (reduction * 0.5),
                    height,
                    radius: self.base.radius,
                };
            }
            None => self.current = self.base,
        }
    }

    /// Нижняя и верхняя точки отрезка capsule в world space
    pub fn segment(&self, position: Vec3) -> (Vec3, Vec3) {
        let center = position + self.current.center;
        let half = Vec3::Y * self.current.half_segment();
        (center - half, center + half)
    }

    /// Самая нижняя точка capsule в world space
    pub fn bottom(&self, position: Vec3) -> Vec3 {
        position + self.current.center - Vec3::Y * (self.current.height * 0.5)
    }
}
