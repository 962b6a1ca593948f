//! ECS системы movement core
//!
//! Character entity = Transform + PhysicsBody + CharacterController.
//! Ledge entity = Transform + GrabbableLedge, читается через GlobalTransform
//! (уступ может быть child'ом движущейся платформы). Query'и разведены через
//! Without<..>.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use crate::config::{CharacterConfig, ConfigError, IntegrationMode};
use crate::game_time::{GameTime, TimeSource};
use crate::logger;
use crate::physics::body::{PhysicsBody, TransformBody};
use crate::physics::query::SpatialQuery;
use crate::physics::rapier::RapierSpatialQuery;
use crate::physics::static_world::StaticWorld;

use super::controller::CharacterController;
use super::events::{CharacterCommand, MovementModeChanged};
use super::ledge::{GrabbableLedge, LedgeAnchor, LedgeLookup};
use super::mode::MovementMode;

pub type LedgeQuery<'w, 's> =
    Query<'w, 's, (&'static GrabbableLedge, &'static GlobalTransform), Without<CharacterController>>;

pub type CharacterQuery<'w, 's> = Query<
    'w,
    's,
    (
        &'static mut CharacterController,
        &'static mut Transform,
        &'static mut PhysicsBody,
    ),
    Without<GrabbableLedge>,
>;

/// LedgeLookup поверх ECS query (ledge id = Entity уступа)
pub struct EcsLedges<'a, 'w, 's> {
    query: &'a LedgeQuery<'w, 's>,
}

impl<'a, 'w, 's> EcsLedges<'a, 'w, 's> {
    pub fn new(query: &'a LedgeQuery<'w, 's>) -> Self {
        Self { query }
    }
}

impl LedgeLookup for EcsLedges<'_, '_, '_> {
    fn ledge(&self, id: Entity) -> Option<LedgeAnchor> {
        self.query
            .get(id)
            .ok()
            .map(|(ledge, transform)| LedgeAnchor::from_global(ledge, transform))
    }
}

/// Система: публичный интерфейс (CharacterCommand) → CharacterController
pub fn apply_character_commands(
    mut commands: EventReader<CharacterCommand>,
    ledges: LedgeQuery,
    mut characters: CharacterQuery,
) {
    let ledges = EcsLedges::new(&ledges);

    for command in commands.read() {
        let Ok((mut controller, mut transform, mut physics)) = characters.get_mut(command.entity()) else {
            logger::log_warning(&format!(
                "CharacterCommand: entity {:?} has no character controller",
                command.entity()
            ));
            continue;
        };
        let mut body = TransformBody {
            transform: &mut transform,
            body: &mut physics,
        };

        match *command {
            CharacterCommand::MoveTo { position, .. } => controller.move_to(position),
            CharacterCommand::StopMoving { .. } => controller.stop_moving(),
            CharacterCommand::WarpTo { position, cancel_movement, .. } => {
                controller.warp_to(&mut body, position, cancel_movement)
            }
            CharacterCommand::Jump { force_scale, .. } => {
                controller.jump(force_scale);
            }
            CharacterCommand::SetMovementType { mode, .. } => controller.set_movement_type(mode),
            CharacterCommand::ForceGroundedState { grounded, .. } => {
                controller.force_grounded_state(grounded)
            }
            CharacterCommand::SnapToLedge { ledge, overwrite_cooldown, .. } => {
                controller.snap_to_ledge(&body, ledge, &ledges, overwrite_cooldown);
            }
        }
    }
}

/// Общий тик для всех персонажей с данным режимом интеграции
fn tick_characters(
    query: &dyn SpatialQuery,
    time: &mut GameTime,
    ledges: &LedgeQuery,
    characters: &mut CharacterQuery,
    integration: IntegrationMode,
) {
    let ledges = EcsLedges::new(ledges);

    for (mut controller, mut transform, mut physics) in characters.iter_mut() {
        if controller.integration() != integration {
            continue;
        }

        let mut body = TransformBody {
            transform: &mut transform,
            body: &mut physics,
        };

        match integration {
            IntegrationMode::PhysicsBody => {
                controller.fixed_tick(&mut body, query, &ledges, time);
            }
            IntegrationMode::Transform => {
                controller.frame_tick(&mut body, query, &ledges, time);
            }
        }
    }
}

/// Система: fixed тик (headless StaticWorld)
pub fn tick_fixed_static(
    world: Res<StaticWorld>,
    mut time: ResMut<GameTime>,
    ledges: LedgeQuery,
    mut characters: CharacterQuery,
) {
    tick_characters(&*world, &mut time, &ledges, &mut characters, IntegrationMode::PhysicsBody);
}

/// Система: frame тик (headless StaticWorld)
pub fn tick_frame_static(
    world: Res<StaticWorld>,
    mut time: ResMut<GameTime>,
    ledges: LedgeQuery,
    mut characters: CharacterQuery,
) {
    tick_characters(&*world, &mut time, &ledges, &mut characters, IntegrationMode::Transform);
}

/// Система: fixed тик (Rapier spatial queries)
pub fn tick_fixed_rapier(
    rapier: ReadRapierContext,
    mut time: ResMut<GameTime>,
    ledges: LedgeQuery,
    mut characters: CharacterQuery,
) {
    let Ok(context) = rapier.single() else {
        return;
    };
    let query = RapierSpatialQuery::new(&context);
    tick_characters(&query, &mut time, &ledges, &mut characters, IntegrationMode::PhysicsBody);
}

/// Система: frame тик (Rapier spatial queries)
pub fn tick_frame_rapier(
    rapier: ReadRapierContext,
    mut time: ResMut<GameTime>,
    ledges: LedgeQuery,
    mut characters: CharacterQuery,
) {
    let Ok(context) = rapier.single() else {
        return;
    };
    let query = RapierSpatialQuery::new(&context);
    tick_characters(&query, &mut time, &ledges, &mut characters, IntegrationMode::Transform);
}

/// Система: гравитация для персонажей в воздухе
///
/// На земле и на уступе core сам держит вертикальную скорость в нуле.
pub fn apply_gravity(
    mut query: Query<(&CharacterController, &mut PhysicsBody)>,
    time: Res<GameTime>,
) {
    for (controller, mut body) in query.iter_mut() {
        if controller.is_grounded() || controller.movement_type() == MovementMode::LedgeGrabbing {
            continue;
        }
        let delta = time.fixed_delta_time(&controller.config().time_channel);
        body.velocity += controller.config().gravity * delta;
    }
}

/// Система: velocity → Transform
///
/// Kinematic тела Rapier сами velocity не интегрируют, поэтому делаем это
/// здесь в обоих backend'ах.
pub fn integrate_velocity(
    mut query: Query<(&CharacterController, &PhysicsBody, &mut Transform)>,
    time: Res<GameTime>,
) {
    for (controller, body, mut transform) in query.iter_mut() {
        if body.velocity == Vec3::ZERO {
            continue;
        }
        let delta = time.fixed_delta_time(&controller.config().time_channel);
        transform.translation += body.velocity * delta;
    }
}

/// Система: core переходы → MovementModeChanged events
pub fn publish_mode_changes(
    mut characters: Query<(Entity, &mut CharacterController)>,
    mut events: EventWriter<MovementModeChanged>,
) {
    for (entity, mut controller) in characters.iter_mut() {
        for transition in controller.drain_transitions() {
            events.write(MovementModeChanged {
                entity,
                old: transition.old,
                new: transition.new,
            });
        }
    }
}

/// Система: размер Rapier collider'а = текущий hitbox
pub fn sync_rapier_hitbox(
    mut changes: EventReader<MovementModeChanged>,
    characters: Query<&CharacterController>,
    mut colliders: Query<(&mut Collider, &mut Transform), Without<CharacterController>>,
) {
    for change in changes.read() {
        let Ok(controller) = characters.get(change.entity) else {
            continue;
        };
        let Some(collider_entity) = controller.own_collider() else {
            continue;
        };
        let Ok((mut collider, mut transform)) = colliders.get_mut(collider_entity) else {
            continue;
        };

        let shape = controller.hitbox().current();
        *collider = Collider::capsule_y(shape.half_segment(), shape.radius);
        transform.translation = shape.center;
    }
}

/// Spawn helper: персонаж с kinematic Rapier телом
///
/// Capsule collider — отдельный child entity (смещён на hitbox.center),
/// он же own collider для probe'ов.
pub fn spawn_character(
    commands: &mut Commands,
    position: Vec3,
    config: CharacterConfig,
) -> Result<Entity, ConfigError> {
    let controller = CharacterController::new(config)?;
    let shape = controller.hitbox().current();

    let character = commands
        .spawn((
            Transform::from_translation(position),
            PhysicsBody::default(),
            RigidBody::KinematicPositionBased,
        ))
        .id();

    let collider = commands
        .spawn((
            Transform::from_translation(shape.center),
            Collider::capsule_y(shape.half_segment(), shape.radius),
            ChildOf(character),
        ))
        .id();

    commands
        .entity(character)
        .insert(controller.with_collider(collider));

    Ok(character)
}

/// Spawn helper: уступ
pub fn spawn_ledge(commands: &mut Commands, transform: Transform, ledge: GrabbableLedge) -> Entity {
    commands.spawn((transform, ledge)).id()
}
