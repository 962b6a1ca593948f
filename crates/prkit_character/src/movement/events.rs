//! Movement events

use bevy::prelude::*;

use super::mode::MovementMode;

/// Команда персонажу (публичный интерфейс movement core через ECS)
///
/// Генерируется:
/// - Player input (DirectControl)
/// - AI / скрипты уровня
///
/// Обрабатывается: apply_character_commands (FixedUpdate, до тика движения)
#[derive(Event, Debug, Clone, PartialEq)]
pub enum CharacterCommand {
    MoveTo { entity: Entity, position: Vec3 },
    StopMoving { entity: Entity },
    WarpTo { entity: Entity, position: Vec3, cancel_movement: bool },
    Jump { entity: Entity, force_scale: f32 },
    SetMovementType { entity: Entity, mode: MovementMode },
    ForceGroundedState { entity: Entity, grounded: bool },
    SnapToLedge { entity: Entity, ledge: Entity, overwrite_cooldown: bool },
}

impl CharacterCommand {
    pub fn entity(&self) -> Entity {
        match self {
            Self::MoveTo { entity, .. }
            | Self::StopMoving { entity }
            | Self::WarpTo { entity, .. }
            | Self::Jump { entity, .. }
            | Self::SetMovementType { entity, .. }
            | Self::ForceGroundedState { entity, .. }
            | Self::SnapToLedge { entity, .. } => *entity,
        }
    }
}

/// Event: режим движения сменился (old → new)
///
/// Зеркало core observer channel для остальных ECS систем
/// (анимации, звук шагов, UI).
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct MovementModeChanged {
    pub entity: Entity,
    pub old: MovementMode,
    pub new: MovementMode,
}
