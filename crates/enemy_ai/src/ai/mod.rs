//! Enemy AI: state machine, decision core, ECS systems.
//!
//! Idle ⇄ Patrol, Chase ⇄ Attack, anything → Dead (terminal).

use bevy::prelude::*;

pub mod components;
pub mod controller;
pub mod events;
pub mod spawn;
pub mod systems;


pub use components::{AgentState, AgentStateMachine, PatrolRoute, StateTransition};
pub use controller::{AiController, Capabilities, DeathHandle, TickReport};
pub use events::{AgentStateChanged, EntityDied};
pub use spawn::{spawn_enemy, EnemyBundle};
pub use systems::{apply_death_events, despawn_after_timeout, enemy_ai_tick, DespawnAfter};

use crate::movement::step_nav_agents;
use crate::perception::{track_tagged_target, TrackedTarget};
use crate::presentation::{advance_animation_cues, update_debug_labels, PresentationCue};

/// Enemy AI Plugin
///
/// Registers the AI systems in FixedUpdate, chained:
/// 1. track_tagged_target — resolve TrackedTarget
/// 2. apply_death_events — EntityDied → mark_dead
/// 3. enemy_ai_tick — decisions
/// 4. step_nav_agents — straight-line navigation (headless only)
/// 5. advance_animation_cues — attack clip countdown
/// 6. update_debug_labels
/// 7. despawn_after_timeout
///
/// Without `headless_navigation` an engine layer is expected to drive `NavAgent`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnemyAiPlugin {
    pub headless_navigation: bool,
}

impl Plugin for EnemyAiPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<AgentStateChanged>()
            .add_event::<EntityDied>()
            .add_event::<PresentationCue>()
            .init_resource::<TrackedTarget>();

        let headless = self.headless_navigation;

        app.add_systems(
            FixedUpdate,
            (
                track_tagged_target,
                apply_death_events,
                enemy_ai_tick,
                step_nav_agents.run_if(move || headless),
                advance_animation_cues,
                update_debug_labels,
                despawn_after_timeout,
            )
                .chain(),
        );
    }
}
