//! Enemy AI core
//!
//! Finite-state enemy behaviour (Idle / Patrol / Chase / Attack / Dead) on Bevy 0.16.
//!
//! Layers:
//! - `ai::AiController` = decision core, talks only to capabilities
//!   (`Motion`, `Perception`, `Presentation`)
//! - ECS systems build those capabilities from components each fixed tick
//! - Navigation/animation backends (engine or headless) sit behind `NavAgent` / `AnimationCues`

use bevy::prelude::*;
use bevy::transform::TransformPlugin;
use bevy_rapier3d::prelude::{NoUserData, RapierPhysicsPlugin};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub mod ai;
pub mod config;
pub mod error;
pub mod logger;
pub mod movement;
pub mod perception;
pub mod presentation;

pub use ai::{
    spawn_enemy, AgentState, AgentStateChanged, AgentStateMachine, AiController, Capabilities,
    DeathHandle, DespawnAfter, EnemyAiPlugin, EnemyBundle, EntityDied, PatrolRoute,
    StateTransition, TickReport,
};
pub use config::{ControllerConfig, EnemyAiConfig, MotionConfig, PatrolConfig, PerceptionConfig};
pub use error::ConfigError;
pub use logger::{
    init_logger, log, log_error, log_info, log_warning, set_log_level, set_logger, LogLevel,
    LogPrinter,
};
pub use movement::{Motion, MotionController, MotionDriver, NavAgent, PathAgent};
pub use perception::{
    sight_groups, ObstacleQuery, Perception, PerceptionService, PerceptionSettings, PlayerTarget,
    RapierObstacles, RayHit, TrackedTarget,
};
pub use presentation::{AnimationCues, DebugLabel, Presentation, PresentationCue};

/// Deterministic RNG resource (seeded)
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

/// Minimal headless App: 60Hz FixedUpdate, seeded RNG, rapier colliders for
/// sight rays, AI with straight-line navigation
///
/// Rapier runs in FixedPreUpdate so colliders spawned or moved before a tick
/// are queryable by that tick's sight checks.
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins((MinimalPlugins, TransformPlugin))
        .add_plugins(RapierPhysicsPlugin::<NoUserData>::default().in_schedule(FixedPreUpdate))
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(60.0))
        .add_plugins(EnemyAiPlugin {
            headless_navigation: true,
        });

    app
}

/// Agent states + positions as JSON bytes, sorted by entity index
///
/// Used to compare runs for determinism.
pub fn agent_snapshot(world: &mut World) -> Vec<u8> {
    let mut query = world.query::<(Entity, &AiController, &Transform)>();
    let mut agents: Vec<_> = query
        .iter(world)
        .map(|(entity, controller, transform)| {
            (
                entity.index(),
                controller.current_state(),
                transform.translation.to_array(),
            )
        })
        .collect();

    agents.sort_by_key(|(index, _, _)| *index);

    serde_json::to_vec(&agents).unwrap_or_default()
}
