//! Настройки персонажа (serde, RON)
//!
//! Все значения проходят validated() при создании контроллера: всё, что
//! можно clamp'нуть, clamp'ится с warning; остальное — ConfigError.

use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::movement::curve::AccelerationCurve;
use crate::movement::hitbox::HitboxShape;
use crate::movement::mode::{clamp_min, ModeProfiles};

/// Где и с каким delta интегрируется движение
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect, Serialize, Deserialize)]
pub enum IntegrationMode {
    /// FixedUpdate + collision-aware move_position
    #[default]
    PhysicsBody,
    /// Каждый кадр (Update), позиция пишется напрямую
    Transform,
}

/// Параметры forward/ground probe
#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeSettings {
    /// Насколько поднят низ forward probe (перешагиваем ступени ниже)
    pub step_height: f32,
    /// На сколько probe уже hitbox'а
    pub lateral_padding: f32,
    /// На сколько опущен верх probe
    pub vertical_padding: f32,
    /// Максимальный зазор до опоры, при котором считаемся на земле
    pub ground_probe_distance: f32,
    pub ground_probe_radius: f32,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            step_height: 0.3,
            lateral_padding: 0.05,
            vertical_padding: 0.05,
            ground_probe_distance: 0.1,
            ground_probe_radius: 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterConfig {
    /// Базовая скорость (m/s)
    pub movement_speed: f32,
    pub acceleration: AccelerationCurve,
    /// Канал GameTime, из которого берём delta
    pub time_channel: String,
    pub integration: IntegrationMode,
    pub profiles: ModeProfiles,
    /// Высота прыжка при force_scale = 1 (метры)
    pub jump_height: f32,
    pub gravity: Vec3,
    pub hitbox: HitboxShape,
    pub probes: ProbeSettings,
}

impl Default for CharacterConfig {
    fn default() -> Self {
        Self {
            movement_speed: 1.0,
            acceleration: AccelerationCurve::default(),
            time_channel: "CharacterTime".to_string(),
            integration: IntegrationMode::default(),
            profiles: ModeProfiles::default(),
            jump_height: 1.0,
            gravity: Vec3::new(0.0, -9.81, 0.0),
            hitbox: HitboxShape::default(),
            probes: ProbeSettings::default(),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("I/O while reading character config: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON parse error: {0}")]
    Ron(String),
    #[error("Invalid value for '{field}': {value}")]
    InvalidValue { field: &'static str, value: f32 },
}

impl CharacterConfig {
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(source).map_err(|e| ConfigError::Ron(e.to_string()))?;
        config.validated()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_ron_str(&source)
    }

    pub fn gravity_magnitude(&self) -> f32 {
        self.gravity.length()
    }

    /// Проверка + clamp в допустимые диапазоны
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        require_finite("movement_speed", self.movement_speed)?;
        require_finite("jump_height", self.jump_height)?;
        require_finite("hitbox.height", self.hitbox.height)?;
        require_finite("hitbox.radius", self.hitbox.radius)?;
        if !self.gravity.is_finite() {
            return Err(ConfigError::InvalidValue {
                field: "gravity",
                value: self.gravity.length(),
            });
        }
        if self.hitbox.height <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "hitbox.height",
                value: self.hitbox.height,
            });
        }

        self.movement_speed = clamp_min("movement_speed", self.movement_speed, 0.0);
        self.jump_height = clamp_min("jump_height", self.jump_height, 0.0);
        self.hitbox.radius = clamp_min("hitbox.radius", self.hitbox.radius, 0.01);
        self.probes.ground_probe_radius =
            clamp_min("probes.ground_probe_radius", self.probes.ground_probe_radius, 0.01);
        self.probes.step_height = clamp_min("probes.step_height", self.probes.step_height, 0.0);
        self.profiles = self.profiles.validated();
        Ok(self)
    }
}

fn require_finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue { field, value })
    }
}
