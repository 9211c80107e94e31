//! Main AI system: builds per-agent capabilities from ECS data and ticks the controller.

use bevy::prelude::*;
use bevy_rapier3d::prelude::ReadRapierContext;

use crate::ai::controller::{AiController, Capabilities};
use crate::ai::events::AgentStateChanged;
use crate::ai::systems::death::DespawnAfter;
use crate::movement::{MotionController, MotionDriver, NavAgent};
use crate::perception::{
    AgentPose, PerceptionService, PerceptionSettings, RapierObstacles, TargetRef, TrackedTarget,
};
use crate::presentation::{AnimationCues, CueSink, PresentationCue};

/// System: one decision tick per agent (FixedUpdate)
///
/// Per agent:
/// 1. Configure the nav backend once it reports ready
/// 2. Perception against the tracked target, sight rays through the rapier context
/// 3. `AiController::tick` → AgentStateChanged event, DespawnAfter on death
///
/// The agent's own collider is excluded from its sight ray.
#[allow(clippy::too_many_arguments)]
pub fn enemy_ai_tick(
    mut commands: Commands,
    mut agents: Query<(
        Entity,
        &mut AiController,
        &mut MotionController,
        &mut NavAgent,
        &mut Transform,
        &mut AnimationCues,
        &PerceptionSettings,
    )>,
    bodies: Query<(Entity, &Transform), Without<AiController>>,
    rapier_context: ReadRapierContext,
    tracked: Res<TrackedTarget>,
    time: Res<Time<Fixed>>,
    mut state_events: EventWriter<AgentStateChanged>,
    mut cue_events: EventWriter<PresentationCue>,
) {
    let delta = time.delta_secs();

    // No physics context → rays hit nothing
    let context = rapier_context.single().ok();

    // Despawned target → weak reference resolves to None
    let target = tracked
        .entity
        .and_then(|entity| bodies.get(entity).ok())
        .map(|(entity, transform)| TargetRef {
            entity,
            position: transform.translation,
        });

    for (entity, mut controller, mut motion, mut nav, mut transform, mut cues, settings) in
        agents.iter_mut()
    {
        if motion.try_initialize(&mut *nav) {
            if controller.config().show_debug_info {
                crate::log(&format!("🧭 {}: navigation ready", controller.name()));
            }
        } else if motion.take_not_ready_notice() && controller.config().show_debug_info {
            crate::log(&format!(
                "🧭 {}: navigation not ready, motion commands dropped",
                controller.name()
            ));
        }

        let obstacles = RapierObstacles::new(context.as_ref(), entity);
        let perception = PerceptionService::new(
            AgentPose::from_transform(&transform),
            target,
            &settings.0,
            &obstacles,
        );

        let mut driver = MotionDriver {
            controller: &*motion,
            agent: &mut *nav,
            transform: &mut *transform,
            delta_secs: delta,
        };

        let mut sink = CueSink {
            entity,
            cues: &mut *cues,
            events: &mut cue_events,
        };

        let mut caps = Capabilities {
            motion: &mut driver,
            perception: &perception,
            presentation: &mut sink,
        };

        let report = controller.tick(delta, &mut caps);

        if let Some(transition) = report.transition {
            state_events.write(AgentStateChanged {
                entity,
                from: transition.from,
                to: transition.to,
            });
        }

        if let Some(delay) = report.despawn_after {
            commands.entity(entity).insert(DespawnAfter {
                despawn_time: time.elapsed_secs() + delay,
            });
        }
    }
}
