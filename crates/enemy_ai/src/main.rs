//! Headless enemy AI demo
//!
//! Spawns a few patrolling enemies and a target walking through their area,
//! runs the fixed-step simulation without rendering and logs state changes.

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use bevy_rapier3d::plugin::PhysicsSet;
use bevy_rapier3d::prelude::Collider;
use enemy_ai::{
    create_headless_app, log_info, sight_groups, spawn_enemy, AgentStateChanged,
    DeterministicRng, EnemyAiConfig, EntityDied, PatrolRoute, PlayerTarget,
};

const STEP: Duration = Duration::from_micros(16_667);
const TICKS: u32 = 1200;

/// Demo target: walks along +X at constant speed
#[derive(Component)]
struct Walker {
    velocity: Vec3,
}

fn setup(mut commands: Commands, mut rng: ResMut<DeterministicRng>) {
    commands.spawn((
        PlayerTarget,
        Collider::capsule_y(0.9, 0.4),
        Walker {
            velocity: Vec3::new(1.5, 0.0, 0.0),
        },
        Transform::from_xyz(-25.0, 0.0, 0.0),
    ));

    for (index, center) in [Vec3::new(-10.0, 0.0, 4.0), Vec3::new(10.0, 0.0, -4.0)]
        .into_iter()
        .enumerate()
    {
        // Crate between the walker's path and each patrol area
        commands.spawn((
            Collider::cuboid(1.0, 1.5, 1.0),
            sight_groups(1),
            Transform::from_translation(center * Vec3::new(1.0, 0.0, 0.5) + Vec3::Y),
        ));

        let route = PatrolRoute::scattered(&mut rng.rng, center, 4, 8.0);
        let mut config = EnemyAiConfig::default();
        config.patrol.waypoints = route.waypoints().to_vec();
        config.controller.show_debug_info = false;

        if let Err(error) = spawn_enemy(&mut commands, format!("grunt-{}", index), center, &config) {
            enemy_ai::log_error(&format!("spawn failed: {}", error));
        }
    }
}

fn move_walkers(mut walkers: Query<(&Walker, &mut Transform)>, time: Res<Time<Fixed>>) {
    for (walker, mut transform) in walkers.iter_mut() {
        transform.translation += walker.velocity * time.delta_secs();
    }
}

fn log_state_changes(mut events: EventReader<AgentStateChanged>, time: Res<Time<Fixed>>) {
    for event in events.read() {
        log_info(&format!(
            "t={:.2}s {:?}: {:?} → {:?}",
            time.elapsed_secs(),
            event.entity,
            event.from,
            event.to
        ));
    }
}

/// Kills the first enemy halfway through the run
fn scripted_kill(
    agents: Query<Entity, With<enemy_ai::AiController>>,
    mut died: EventWriter<EntityDied>,
    time: Res<Time<Fixed>>,
    mut done: Local<bool>,
) {
    if *done || time.elapsed_secs() < 10.0 {
        return;
    }

    if let Some(entity) = agents.iter().min_by_key(|entity| entity.index()) {
        died.write(EntityDied {
            entity,
            killer: None,
        });
        *done = true;
    }
}

fn main() {
    let seed = 42;
    println!("Starting enemy AI headless simulation (seed: {})", seed);

    let mut app = create_headless_app(seed);
    app.insert_resource(Time::<Fixed>::from_duration(STEP))
        .insert_resource(TimeUpdateStrategy::ManualDuration(STEP))
        .add_systems(Startup, setup)
        .add_systems(
            FixedPreUpdate,
            (move_walkers, scripted_kill).before(PhysicsSet::SyncBackend),
        )
        .add_systems(FixedPostUpdate, log_state_changes);

    // First update only starts the clock
    app.update();

    for tick in 0..TICKS {
        app.update();

        if tick % 300 == 0 {
            let entity_count = app.world().entities().len();
            println!("Tick {}: {} entities", tick, entity_count);
        }
    }

    println!("Simulation complete!");
}
