//! Headless симуляция movement core
//!
//! Запускает Bevy App без рендера: пол, стена, уступ и несколько
//! персонажей, которые получают случайные команды из seeded RNG.

use bevy::prelude::*;
use rand::Rng;
use prkit_character::{
    create_headless_app, log_error, log_info, spawn_character, spawn_ledge, CharacterCommand,
    CharacterConfig, CharacterController, DeterministicRng, GrabbableLedge, Obstacle, StaticWorld,
};

const CHARACTER_COUNT: usize = 4;
const TICK_COUNT: usize = 1000;
const COMMAND_INTERVAL: usize = 60;

fn main() {
    let seed = 42;
    println!("Starting PRKit character headless simulation (seed: {})", seed);

    let mut app = create_headless_app(seed);

    // Мир: пол (верх на y = 0) и стена
    let floor = app.world_mut().spawn_empty().id();
    let wall = app.world_mut().spawn_empty().id();
    {
        let mut world = app.world_mut().resource_mut::<StaticWorld>();
        world.add(Obstacle::from_center(floor, Vec3::new(0.0, -0.5, 0.0), Vec3::new(50.0, 0.5, 50.0)));
        world.add(Obstacle::from_center(wall, Vec3::new(5.0, 1.0, 0.0), Vec3::new(0.25, 1.0, 8.0)));
    }

    let ledge = spawn_ledge(
        &mut app.world_mut().commands(),
        Transform::from_xyz(0.0, 2.0, -6.0),
        GrabbableLedge::default(),
    );

    let config = match CharacterConfig::from_ron_str("(movement_speed: 2.0, jump_height: 1.2)") {
        Ok(config) => config,
        Err(err) => {
            log_error(&format!("character config: {}", err));
            CharacterConfig::default()
        }
    };

    let mut characters = Vec::new();
    for i in 0..CHARACTER_COUNT {
        let position = Vec3::new(i as f32 * 2.0 - 3.0, 0.0, 0.0);
        match spawn_character(&mut app.world_mut().commands(), position, config.clone()) {
            Ok(entity) => characters.push(entity),
            Err(err) => log_error(&format!("spawn_character: {}", err)),
        }
    }
    app.update();

    // Первый персонаж сразу висит на уступе
    if let Some(&climber) = characters.first() {
        app.world_mut().send_event(CharacterCommand::SnapToLedge {
            entity: climber,
            ledge,
            overwrite_cooldown: true,
        });
    }

    // 1000 fixed тиков (≈16.7 сек при 60Hz)
    for tick in 0..TICK_COUNT {
        if tick % COMMAND_INTERVAL == 0 {
            issue_random_commands(&mut app, &characters);
        }

        app.world_mut().run_schedule(FixedUpdate);

        if tick % 100 == 0 {
            print_state(&mut app, tick);
        }
    }

    log_info("Simulation complete!");
}

/// Каждому персонажу — MoveTo в случайную точку или прыжок
fn issue_random_commands(app: &mut App, characters: &[Entity]) {
    for &entity in characters {
        let command = {
            let mut rng = app.world_mut().resource_mut::<DeterministicRng>();
            if rng.rng.gen_bool(0.25) {
                CharacterCommand::Jump { entity, force_scale: 1.0 }
            } else {
                let target = Vec3::new(rng.rng.gen_range(-10.0..10.0), 0.0, rng.rng.gen_range(-10.0..10.0));
                CharacterCommand::MoveTo { entity, position: target }
            }
        };
        app.world_mut().send_event(command);
    }
}

fn print_state(app: &mut App, tick: usize) {
    let world = app.world_mut();
    let mut query = world.query::<(Entity, &Transform, &CharacterController)>();
    println!("Tick {}:", tick);
    for (entity, transform, controller) in query.iter(world) {
        println!(
            "  {:?}: pos {:.2?} mode {:?} grounded {}",
            entity,
            transform.translation,
            controller.movement_type(),
            controller.is_grounded()
        );
    }
}
