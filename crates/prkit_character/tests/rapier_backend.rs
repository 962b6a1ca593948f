//! Rapier backend integration test
//!
//! App = MinimalPlugins + TransformPlugin + RapierPhysicsPlugin +
//! CharacterMovementPlugin (Rapier backend по умолчанию).
//!
//! Проверяем:
//! - capsule cast находит стену на правильной дистанции
//! - свой collider исключается из "чужих" попаданий
//! - sphere overlap через intersect_shape
//! - Crouch пересобирает child collider под новый hitbox

use std::time::Duration;

use bevy::ecs::system::SystemState;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use bevy_rapier3d::prelude::*;
use prkit_character::physics::query::has_foreign_hit;
use prkit_character::physics::RapierSpatialQuery;
use prkit_character::*;

fn create_rapier_app() -> App {
    let mut app = App::new();
    app.add_plugins((
        MinimalPlugins,
        TransformPlugin,
        RapierPhysicsPlugin::<NoUserData>::default(),
        CharacterMovementPlugin::default(),
    ))
    .insert_resource(Time::<Fixed>::from_hz(60.0))
    .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f32(1.0 / 60.0)));

    app.finish();
    app.update();
    app
}

/// Несколько кадров: colliders попадают в Rapier и в broad phase
fn settle(app: &mut App) {
    for _ in 0..3 {
        app.update();
    }
}

/// Стена как в StaticWorld тестах: лицевая сторона на x = 2.75
fn spawn_wall(app: &mut App) -> Entity {
    app.world_mut()
        .spawn((Transform::from_xyz(3.0, 1.0, 0.0), Collider::cuboid(0.25, 1.0, 5.0)))
        .id()
}

/// Запускает f с SpatialQuery поверх default Rapier context
fn with_query<R>(app: &mut App, f: impl FnOnce(&RapierSpatialQuery) -> R) -> R {
    let mut state = SystemState::<ReadRapierContext>::new(app.world_mut());
    let rapier = state.get(app.world());
    let context = rapier.single().expect("default rapier context");
    let query = RapierSpatialQuery::new(&context);
    f(&query)
}

#[test]
fn test_capsule_cast_hits_wall() {
    let mut app = create_rapier_app();
    let wall = spawn_wall(&mut app);
    settle(&mut app);

    let hits = with_query(&mut app, |query| {
        query.capsule_cast_all(Vec3::new(0.0, 0.7, 0.0), Vec3::new(0.0, 1.5, 0.0), 0.35, Vec3::X, 5.0)
    });

    assert_eq!(hits.len(), 1, "hits: {:?}", hits);
    assert_eq!(hits[0].collider, wall);
    // 2.75 - 0.35 = 2.4
    assert!((hits[0].distance - 2.4).abs() < 0.05, "distance {}", hits[0].distance);

    let short = with_query(&mut app, |query| {
        query.capsule_cast_all(Vec3::new(0.0, 0.7, 0.0), Vec3::new(0.0, 1.5, 0.0), 0.35, Vec3::X, 1.0)
    });
    assert!(short.is_empty(), "unexpected hits: {:?}", short);
}

#[test]
fn test_own_collider_is_not_foreign() {
    let mut app = create_rapier_app();
    let wall = spawn_wall(&mut app);
    let own = app
        .world_mut()
        .spawn((Transform::from_xyz(0.0, 1.0, 0.0), Collider::capsule_y(0.6, 0.4)))
        .id();
    settle(&mut app);

    let start = Vec3::new(0.0, 0.7, 0.0);
    let end = Vec3::new(0.0, 1.5, 0.0);

    // Вдоль +X: свой collider (пересечение в начале) и стена
    let forward = with_query(&mut app, |query| query.capsule_cast_all(start, end, 0.35, Vec3::X, 5.0));
    assert_eq!(forward.len(), 2, "hits: {:?}", forward);
    assert_eq!(forward[0].collider, own);
    assert_eq!(forward[1].collider, wall);
    assert!(has_foreign_hit(&forward, Some(own)));

    // Вдоль -X: только свой
    let backward = with_query(&mut app, |query| query.capsule_cast_all(start, end, 0.35, Vec3::NEG_X, 5.0));
    assert_eq!(backward.len(), 1);
    assert!(!has_foreign_hit(&backward, Some(own)));
    assert!(has_foreign_hit(&backward, None));
}

#[test]
fn test_sphere_overlap_finds_wall() {
    let mut app = create_rapier_app();
    let wall = spawn_wall(&mut app);
    settle(&mut app);

    let touching = with_query(&mut app, |query| query.overlap_sphere_all(Vec3::new(2.7, 1.0, 0.0), 0.3));
    assert_eq!(touching.len(), 1);
    assert_eq!(touching[0].collider, wall);

    let free = with_query(&mut app, |query| query.overlap_sphere_all(Vec3::new(1.0, 1.0, 0.0), 0.3));
    assert!(free.is_empty());
}

#[test]
fn test_crouch_resizes_rapier_collider() {
    let mut app = create_rapier_app();

    let character = spawn_character(
        &mut app.world_mut().commands(),
        Vec3::new(0.0, 0.0, 10.0),
        CharacterConfig::default(),
    )
    .expect("default config is valid");
    settle(&mut app);

    let collider_entity = app
        .world()
        .get::<CharacterController>(character)
        .and_then(|controller| controller.own_collider())
        .expect("spawn_character attaches a collider");
    let standing = app
        .world()
        .get::<Collider>(collider_entity)
        .and_then(|collider| collider.as_capsule().map(|capsule| capsule.half_height()))
        .unwrap();

    app.world_mut().send_event(CharacterCommand::SetMovementType {
        entity: character,
        mode: MovementMode::Crouch,
    });
    app.world_mut().run_schedule(FixedUpdate);

    let controller = app.world().get::<CharacterController>(character).unwrap();
    assert_eq!(controller.movement_type(), MovementMode::Crouch);
    let shape = controller.hitbox().current();

    let collider = app.world().get::<Collider>(collider_entity).unwrap();
    let capsule = collider.as_capsule().expect("character collider is a capsule");
    assert!(capsule.half_height() < standing);
    assert!((capsule.half_height() - shape.half_segment()).abs() < 1e-5);
    assert!((capsule.radius() - shape.radius).abs() < 1e-5);

    let offset = app.world().get::<Transform>(collider_entity).unwrap().translation;
    assert!(offset.distance(shape.center) < 1e-5, "collider offset {:?}", offset);
}
