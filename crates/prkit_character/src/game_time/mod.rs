//! Именованные time channels с независимым масштабом
//!
//! Базовые delta синхронизируются из Bevy Time каждый кадр/тик, каналы
//! только масштабируют их (пауза персонажей, slow-mo и т.п.).

use std::collections::HashMap;

use bevy::prelude::*;

/// Источник времени для movement core
pub trait TimeSource {
    fn delta_time(&self, channel: &str) -> f32;
    fn fixed_delta_time(&self, channel: &str) -> f32;
    fn has_channel(&self, channel: &str) -> bool;
    fn register_channel(&mut self, channel: &str);
}

#[derive(Resource, Debug, Clone)]
pub struct GameTime {
    channels: HashMap<String, f32>,
    delta: f32,
    fixed_delta: f32,
}

impl Default for GameTime {
    fn default() -> Self {
        Self {
            channels: HashMap::new(),
            delta: 0.0,
            fixed_delta: 1.0 / 60.0,
        }
    }
}

impl GameTime {
    pub fn new(delta: f32, fixed_delta: f32) -> Self {
        Self {
            delta,
            fixed_delta,
            ..default()
        }
    }

    pub fn set_delta(&mut self, delta: f32) {
        self.delta = delta;
    }

    pub fn set_fixed_delta(&mut self, fixed_delta: f32) {
        self.fixed_delta = fixed_delta;
    }

    /// Масштаб канала (регистрирует канал при необходимости)
    pub fn set_channel_scale(&mut self, channel: &str, scale: f32) {
        self.channels.insert(channel.to_string(), scale.max(0.0));
    }

    /// Незарегистрированные каналы идут с масштабом 1
    pub fn channel_scale(&self, channel: &str) -> f32 {
        self.channels.get(channel).copied().unwrap_or(1.0)
    }
}

impl TimeSource for GameTime {
    fn delta_time(&self, channel: &str) -> f32 {
        self.delta * self.channel_scale(channel)
    }

    fn fixed_delta_time(&self, channel: &str) -> f32 {
        self.fixed_delta * self.channel_scale(channel)
    }

    fn has_channel(&self, channel: &str) -> bool {
        self.channels.contains_key(channel)
    }

    fn register_channel(&mut self, channel: &str) {
        self.channels.entry(channel.to_string()).or_insert(1.0);
    }
}

/// Система: frame delta (Update)
pub fn sync_frame_time(time: Res<Time>, mut game_time: ResMut<GameTime>) {
    game_time.set_delta(time.delta_secs());
}

/// Система: fixed delta (FixedUpdate)
///
/// Берём timestep, а не delta: так тик детерминирован даже при ручном
/// запуске FixedUpdate schedule.
pub fn sync_fixed_time(time: Res<Time<Fixed>>, mut game_time: ResMut<GameTime>) {
    game_time.set_fixed_delta(time.timestep().as_secs_f32());
}
