//! Movement domain — movement core персонажа
//!
//! Содержит:
//! - MovementMode + профили режимов + observer list (mode)
//! - KinematicMover (target → сдвиг за тик, forward probe)
//! - GroundingController (прыжок, приземление)
//! - Hitbox (capsule под режим)
//! - LedgeTracker (висение на уступе, regrab cooldown)
//! - CharacterController (всё вместе, публичный интерфейс)
//! - ECS: CharacterCommand / MovementModeChanged, системы, plugin

use bevy::prelude::*;

pub mod controller;
pub mod curve;
pub mod events;
pub mod grounding;
pub mod hitbox;
pub mod ledge;
pub mod mode;
pub mod mover;
pub mod systems;


pub use controller::{CharacterController, LedgeOutcome, TickReport};
pub use curve::AccelerationCurve;
pub use events::{CharacterCommand, MovementModeChanged};
pub use hitbox::{Hitbox, HitboxShape};
pub use ledge::{GrabbableLedge, LedgeAnchor, LedgeLookup, LedgeRegistry};
pub use mode::{CrouchProfile, LedgeProfile, ModeObserver, ModeProfiles, ModeTransition, MovementMode};
pub use systems::{spawn_character, spawn_ledge};

use crate::control;
use crate::game_time::{self, GameTime};
use crate::physics::static_world::StaticWorld;

/// Откуда берутся spatial queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryBackend {
    /// Rapier context (нужен RapierPhysicsPlugin)
    #[default]
    Rapier,
    /// Headless StaticWorld resource (AABB препятствия)
    Static,
}

/// Plugin movement core
///
/// FixedUpdate (по порядку):
/// 1. sync_fixed_time — fixed delta в GameTime
/// 2. apply_character_commands — CharacterCommand → controller
/// 3. tick (PhysicsBody персонажи) — grounding, движение, уступы
/// 4. apply_gravity + integrate_velocity
/// 5. publish_mode_changes — MovementModeChanged events
///
/// Update: frame delta → direct control → tick Transform персонажей.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharacterMovementPlugin {
    pub backend: QueryBackend,
}

impl CharacterMovementPlugin {
    pub fn headless() -> Self {
        Self {
            backend: QueryBackend::Static,
        }
    }
}

impl Plugin for CharacterMovementPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GameTime>()
            .add_event::<CharacterCommand>()
            .add_event::<MovementModeChanged>();

        match self.backend {
            QueryBackend::Static => {
                app.init_resource::<StaticWorld>();
                app.add_systems(
                    FixedUpdate,
                    (
                        game_time::sync_fixed_time,
                        systems::apply_character_commands,
                        systems::tick_fixed_static,
                        systems::apply_gravity,
                        systems::integrate_velocity,
                        systems::publish_mode_changes,
                    )
                        .chain(),
                );
                app.add_systems(
                    Update,
                    (
                        game_time::sync_frame_time,
                        control::apply_direct_control,
                        systems::tick_frame_static,
                        systems::publish_mode_changes,
                    )
                        .chain(),
                );
            }
            QueryBackend::Rapier => {
                app.add_systems(
                    FixedUpdate,
                    (
                        game_time::sync_fixed_time,
                        systems::apply_character_commands,
                        systems::tick_fixed_rapier,
                        systems::apply_gravity,
                        systems::integrate_velocity,
                        systems::publish_mode_changes,
                        systems::sync_rapier_hitbox,
                    )
                        .chain(),
                );
                app.add_systems(
                    Update,
                    (
                        game_time::sync_frame_time,
                        control::apply_direct_control,
                        systems::tick_frame_rapier,
                        systems::publish_mode_changes,
                        systems::sync_rapier_hitbox,
                    )
                        .chain(),
                );
            }
        }
    }
}
