//! Movement modes: состояние персонажа, профили по режимам, observer list
//!
//! Режимы взаимоисключающие. Профили (crouch/prone/ledge) хранятся рядом,
//! выбор через match по MovementMode — добавление режима локализовано тут.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::logger;

/// Минимальный множитель высоты hitbox (иначе capsule вырождается)
pub const MIN_HEIGHT_MULTIPLIER: f32 = 0.5;

/// Режим движения персонажа
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect, Serialize, Deserialize)]
pub enum MovementMode {
    /// Начальный режим
    #[default]
    Standard,
    Sprint,
    Crouch,
    Prone,
    /// Висим на уступе (ставит только LedgeTracker)
    LedgeGrabbing,
}

/// Профиль для Crouch/Prone
#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct CrouchProfile {
    pub speed_multiplier: f32,
    /// Инвариант: >= MIN_HEIGHT_MULTIPLIER (clamp при валидации конфига)
    pub height_multiplier: f32,
}

impl Default for CrouchProfile {
    fn default() -> Self {
        Self {
            speed_multiplier: 0.5,
            height_multiplier: 0.5,
        }
    }
}

/// Профиль для LedgeGrabbing
#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgeProfile {
    pub speed_multiplier: f32,
    /// Сколько секунд нельзя перехватить тот же уступ после схода
    pub regrab_cooldown: f32,
    /// Смещение персонажа от anchor уступа (local space персонажа)
    pub holding_offset: Vec3,
}

impl Default for LedgeProfile {
    fn default() -> Self {
        Self {
            speed_multiplier: 0.5,
            regrab_cooldown: 0.5,
            holding_offset: Vec3::new(0.0, -1.8, 0.3),
        }
    }
}

/// Все mode-keyed настройки
#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct ModeProfiles {
    pub sprint_multiplier: f32,
    pub crouch: CrouchProfile,
    pub prone: CrouchProfile,
    pub ledge: LedgeProfile,
}

impl Default for ModeProfiles {
    fn default() -> Self {
        Self {
            sprint_multiplier: 1.5,
            crouch: CrouchProfile::default(),
            prone: CrouchProfile {
                speed_multiplier: 0.25,
                height_multiplier: 0.5,
            },
            ledge: LedgeProfile::default(),
        }
    }
}

impl ModeProfiles {
    /// Множитель скорости для режима (1.0 для немодифицированных)
    pub fn speed_modifier(&self, mode: MovementMode) -> f32 {
        match mode {
            MovementMode::Sprint => self.sprint_multiplier,
            MovementMode::Crouch => self.crouch.speed_multiplier,
            MovementMode::Prone => self.prone.speed_multiplier,
            MovementMode::LedgeGrabbing => self.ledge.speed_multiplier,
            MovementMode::Standard => 1.0,
        }
    }

    /// Множитель высоты hitbox; None = базовая высота
    pub fn height_multiplier(&self, mode: MovementMode) -> Option<f32> {
        match mode {
            MovementMode::Crouch => Some(self.crouch.height_multiplier),
            MovementMode::Prone => Some(self.prone.height_multiplier),
            _ => None,
        }
    }

    /// Clamp значений в допустимые диапазоны (с warning в лог)
    pub fn validated(mut self) -> Self {
        self.sprint_multiplier = clamp_min("sprint_multiplier", self.sprint_multiplier, 0.0);
        self.crouch.speed_multiplier = clamp_min("crouch.speed_multiplier", self.crouch.speed_multiplier, 0.0);
        self.prone.speed_multiplier = clamp_min("prone.speed_multiplier", self.prone.speed_multiplier, 0.0);
        self.ledge.speed_multiplier = clamp_min("ledge.speed_multiplier", self.ledge.speed_multiplier, 0.0);
        self.crouch.height_multiplier = clamp_min(
            "crouch.height_multiplier",
            self.crouch.height_multiplier,
            MIN_HEIGHT_MULTIPLIER,
        );
        self.prone.height_multiplier = clamp_min(
            "prone.height_multiplier",
            self.prone.height_multiplier,
            MIN_HEIGHT_MULTIPLIER,
        );
        self.ledge.regrab_cooldown = clamp_min("ledge.regrab_cooldown", self.ledge.regrab_cooldown, 0.0);
        self
    }
}

pub(crate) fn clamp_min(field: &str, value: f32, min: f32) -> f32 {
    if value < min {
        logger::log_warning(&format!("config: {} = {} clamped to {}", field, value, min));
        min
    } else {
        value
    }
}

/// Переход режима (old → new)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeTransition {
    pub old: MovementMode,
    pub new: MovementMode,
}

/// Подписчик на смену режима
///
/// Вызывается синхронно, в порядке регистрации, до возврата из SetMovementType.
pub trait ModeObserver: Send + Sync {
    fn on_mode_changed(&mut self, transition: ModeTransition);
}

impl<F> ModeObserver for F
where
    F: FnMut(ModeTransition) + Send + Sync,
{
    fn on_mode_changed(&mut self, transition: ModeTransition) {
        self(transition)
    }
}

/// State machine режимов движения
///
/// Никаких проверок легальности переходов: вызывающий код отвечает за это.
#[derive(Default)]
pub struct MovementStateMachine {
    current: MovementMode,
    observers: Vec<Box<dyn ModeObserver>>,
}

impl MovementStateMachine {
    pub fn current(&self) -> MovementMode {
        self.current
    }

    /// Перезаписывает режим безусловно (даже если new == old)
    pub fn transition(&mut self, new: MovementMode) -> ModeTransition {
        let old = self.current;
        self.current = new;
        ModeTransition { old, new }
    }

    /// Рассылает transition всем подписчикам
    pub fn notify(&mut self, transition: ModeTransition) {
        for observer in self.observers.iter_mut() {
            observer.on_mode_changed(transition);
        }
    }

    pub fn subscribe(&mut self, observer: impl ModeObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }
}

impl std::fmt::Debug for MovementStateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MovementStateMachine")
            .field("current", &self.current)
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_speed_modifier_per_mode() {
        let profiles = ModeProfiles {
            sprint_multiplier: 1.8,
            crouch: CrouchProfile { speed_multiplier: 0.6, height_multiplier: 0.7 },
            prone: CrouchProfile { speed_multiplier: 0.3, height_multiplier: 0.5 },
            ledge: LedgeProfile { speed_multiplier: 0.4, ..default() },
        };

        assert_eq!(profiles.speed_modifier(MovementMode::Standard), 1.0);
        assert_eq!(profiles.speed_modifier(MovementMode::Sprint), 1.8);
        assert_eq!(profiles.speed_modifier(MovementMode::Crouch), 0.6);
        assert_eq!(profiles.speed_modifier(MovementMode::Prone), 0.3);
        assert_eq!(profiles.speed_modifier(MovementMode::LedgeGrabbing), 0.4);
    }

    #[test]
    fn test_height_multiplier_clamped() {
        let profiles = ModeProfiles {
            crouch: CrouchProfile { speed_multiplier: 0.5, height_multiplier: 0.1 },
            ..default()
        }
        .validated();

        assert_eq!(profiles.crouch.height_multiplier, MIN_HEIGHT_MULTIPLIER);
        assert_eq!(profiles.height_multiplier(MovementMode::Crouch), Some(0.5));
        assert_eq!(profiles.height_multiplier(MovementMode::Sprint), None);
    }

    #[test]
    fn test_observers_called_in_registration_order() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut machine = MovementStateMachine::default();

        for id in 0..3 {
            let calls = calls.clone();
            machine.subscribe(move |t: ModeTransition| {
                calls.lock().unwrap().push((id, t.old, t.new));
            });
        }

        let transition = machine.transition(MovementMode::Crouch);
        machine.notify(transition);

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0], (0, MovementMode::Standard, MovementMode::Crouch));
        assert_eq!(calls[2].0, 2);
        assert_eq!(machine.current(), MovementMode::Crouch);
    }
}
