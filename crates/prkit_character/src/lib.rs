//! PRKit Character — movement core персонажа
//!
//! Bevy 0.16 ECS + bevy_rapier3d (spatial queries).
//!
//! Слои:
//! - movement = чистая логика (режимы, kinematic mover, grounding, hitbox, уступы)
//! - physics = seam к физике (SpatialQuery / CharacterBody), Rapier или StaticWorld
//! - control = direct control (оси ввода → MoveTo)
//! - game_time = delta time по каналам
//! - config = RON настройки персонажа

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod config;
pub mod control;
pub mod game_time;
pub mod logger;
pub mod movement;
pub mod physics;

// Re-export базовых типов для удобства
pub use config::{CharacterConfig, ConfigError, IntegrationMode, ProbeSettings};
pub use control::{AxisBinding, AxisOverride, ControlCamera, DirectControl};
pub use game_time::{GameTime, TimeSource};
pub use movement::{
    spawn_character, spawn_ledge, AccelerationCurve, CharacterCommand, CharacterController,
    CharacterMovementPlugin, GrabbableLedge, Hitbox, HitboxShape, LedgeOutcome, ModeTransition,
    MovementMode, MovementModeChanged, QueryBackend, TickReport,
};
pub use physics::{CharacterBody, Obstacle, PhysicsBody, SpatialQuery, StaticWorld};

// Re-export logger
pub use logger::{init_logger, log, log_error, log_info, log_warning, LogLevel, LogPrinter};

/// Главный plugin симуляции (movement core + fixed tick + RNG)
#[derive(Default)]
pub struct SimulationPlugin {
    pub backend: QueryBackend,
}

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app
            // Fixed timestep 60Hz для physics tick
            .insert_resource(Time::<Fixed>::from_hz(60.0))
            // Детерминистичный RNG (seed по умолчанию)
            .insert_resource(DeterministicRng::new(42))
            .add_plugins(CharacterMovementPlugin {
                backend: self.backend,
            });
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// Movement plugin со StaticWorld backend'ом уже подключен,
/// препятствия добавляются через ResMut<StaticWorld>.
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        // GlobalTransform уступов (propagation в PostUpdate)
        .add_plugins(TransformPlugin)
        .add_plugins(CharacterMovementPlugin::headless())
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(60.0)); // 60Hz FixedUpdate

    app
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    // Сериализуем в байты через Debug (простейший способ)
    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
