//! Enemy composition root: validated config → full set of agent components.

use bevy::prelude::*;

use crate::ai::components::{AgentStateMachine, PatrolRoute};
use crate::ai::controller::AiController;
use crate::config::EnemyAiConfig;
use crate::error::ConfigError;
use crate::movement::{MotionController, NavAgent};
use crate::perception::PerceptionSettings;
use crate::presentation::{AnimationCues, DebugLabel};

/// Everything one enemy needs for `enemy_ai_tick`
#[derive(Bundle)]
pub struct EnemyBundle {
    pub controller: AiController,
    pub motion: MotionController,
    pub nav: NavAgent,
    pub perception: PerceptionSettings,
    pub cues: AnimationCues,
    pub transform: Transform,
}

impl EnemyBundle {
    pub fn new(
        name: impl Into<String>,
        position: Vec3,
        config: &EnemyAiConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let machine = AgentStateMachine::new(
            PatrolRoute::new(config.patrol.waypoints.clone()),
            config.patrol.wait_time,
        );

        Ok(Self {
            controller: AiController::new(name, machine, config.controller.clone()),
            motion: MotionController::new(config.motion.clone(), position),
            nav: NavAgent::default(),
            perception: PerceptionSettings(config.perception.clone()),
            cues: AnimationCues::new(config.controller.attack_clip_secs),
            transform: Transform::from_translation(position),
        })
    }
}

/// Spawns an enemy; `DebugLabel` is attached when `show_debug_info` is set.
pub fn spawn_enemy(
    commands: &mut Commands,
    name: impl Into<String>,
    position: Vec3,
    config: &EnemyAiConfig,
) -> Result<Entity, ConfigError> {
    let name = name.into();
    let bundle = EnemyBundle::new(name.clone(), position, config)?;

    let mut entity = commands.spawn(bundle);
    if config.controller.show_debug_info {
        entity.insert(DebugLabel::default());
    }

    let id = entity.id();
    crate::log_info(&format!("👾 Spawned enemy '{}' {:?} at {:?}", name, id, position));
    Ok(id)
}
