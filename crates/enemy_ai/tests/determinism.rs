//! Determinism tests
//!
//! Same seed → same patrol routes → identical agent states and positions.

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use bevy_rapier3d::plugin::PhysicsSet;
use bevy_rapier3d::prelude::Collider;
use enemy_ai::{
    agent_snapshot, create_headless_app, sight_groups, DeterministicRng, EnemyAiConfig,
    EnemyBundle, PatrolRoute, PlayerTarget,
};

/// Target walking in a circle through the patrol area
#[derive(Component, Debug)]
struct Circler {
    radius: f32,
    angular_speed: f32,
}

fn move_circlers(mut query: Query<(&Circler, &mut Transform)>, time: Res<Time<Fixed>>) {
    for (circler, mut transform) in query.iter_mut() {
        let angle = time.elapsed_secs() * circler.angular_speed;
        transform.translation = Vec3::new(angle.cos(), 0.0, angle.sin()) * circler.radius;
    }
}

#[test]
fn test_determinism_same_seed() {
    const SEED: u64 = 12345;
    const AGENT_COUNT: usize = 8;
    const TICK_COUNT: usize = 600;

    let snapshot1 = run_simulation(SEED, AGENT_COUNT, TICK_COUNT);
    let snapshot2 = run_simulation(SEED, AGENT_COUNT, TICK_COUNT);

    assert_eq!(
        snapshot1, snapshot2,
        "Simulation with the same seed ({}) diverged",
        SEED
    );
}

#[test]
fn test_determinism_multiple_runs() {
    const SEED: u64 = 42;
    const AGENT_COUNT: usize = 8;
    const TICK_COUNT: usize = 600;

    let snapshots: Vec<_> = (0..3)
        .map(|_| run_simulation(SEED, AGENT_COUNT, TICK_COUNT))
        .collect();

    for (i, snapshot) in snapshots.iter().enumerate().skip(1) {
        assert_eq!(snapshots[0], *snapshot, "Run {} differs from run 0", i);
    }
}

/// Runs the simulation and returns the agent snapshot
fn run_simulation(seed: u64, agent_count: usize, tick_count: usize) -> Vec<u8> {
    let mut app = create_headless_app(seed);
    let step = app.world().resource::<Time<Fixed>>().timestep();
    app.insert_resource(TimeUpdateStrategy::ManualDuration(step))
        .add_systems(FixedPreUpdate, move_circlers.before(PhysicsSet::SyncBackend));

    app.world_mut().spawn((
        PlayerTarget,
        Collider::capsule_y(0.9, 0.4),
        Circler {
            radius: 12.0,
            angular_speed: 0.3,
        },
        Transform::from_xyz(12.0, 0.0, 0.0),
    ));

    // A few pillars so some sight rays get blocked
    for z in [-6.0, 0.0, 6.0] {
        app.world_mut().spawn((
            Collider::cuboid(0.5, 2.0, 0.5),
            sight_groups(1),
            Transform::from_xyz(3.0, 1.0, z),
        ));
    }

    for i in 0..agent_count {
        let center = Vec3::new((i as f32 - agent_count as f32 / 2.0) * 6.0, 0.0, 0.0);

        let route = {
            let mut rng = app.world_mut().resource_mut::<DeterministicRng>();
            PatrolRoute::scattered(&mut rng.rng, center, 4, 10.0)
        };

        let mut config = EnemyAiConfig::default();
        config.patrol.waypoints = route.waypoints().to_vec();
        config.controller.show_debug_info = false;

        let bundle = EnemyBundle::new(format!("grunt-{}", i), center, &config).expect("valid config");
        app.world_mut().spawn(bundle);
    }

    for _ in 0..tick_count {
        app.update();
    }

    let snapshot = agent_snapshot(app.world_mut());
    assert!(!snapshot.is_empty());
    snapshot
}
