//! Presentation sink: animation cues and optional debug label.
//!
//! The decision core only pushes cues here (speed, attack, death). Nothing
//! in this module feeds back into decisions; `is_playing_attack_cue` exists
//! for external inspection.

use bevy::prelude::*;

use crate::ai::AiController;

/// Presentation capability consumed by the decision core
pub trait Presentation {
    fn set_movement_speed(&mut self, speed: f32);
    fn play_attack_cue(&mut self);
    fn play_death_cue(&mut self);
    fn is_playing_attack_cue(&self) -> bool;
}

/// Event: one-shot animation trigger for the rendering/animation layer
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentationCue {
    Attack { entity: Entity },
    Death { entity: Entity },
}

/// Animation parameters per agent (read by the animation layer)
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct AnimationCues {
    /// "Speed" blend parameter
    pub movement_speed: f32,
    /// Attack clip length (seconds)
    pub attack_clip_secs: f32,
    /// Time left in the current attack clip
    pub attack_remaining: f32,
    pub death_played: bool,
}

impl AnimationCues {
    pub fn new(attack_clip_secs: f32) -> Self {
        Self {
            movement_speed: 0.0,
            attack_clip_secs,
            attack_remaining: 0.0,
            death_played: false,
        }
    }

    pub fn is_attacking(&self) -> bool {
        self.attack_remaining > 0.0
    }

    pub fn advance(&mut self, delta_secs: f32) {
        self.attack_remaining = (self.attack_remaining - delta_secs).max(0.0);
    }
}

impl Default for AnimationCues {
    fn default() -> Self {
        Self::new(1.0)
    }
}

/// Writes cues for one agent into its AnimationCues + the event stream
pub struct CueSink<'a, 'w> {
    pub entity: Entity,
    pub cues: &'a mut AnimationCues,
    pub events: &'a mut EventWriter<'w, PresentationCue>,
}

impl Presentation for CueSink<'_, '_> {
    fn set_movement_speed(&mut self, speed: f32) {
        self.cues.movement_speed = speed;
    }

    fn play_attack_cue(&mut self) {
        // Forwarded on every call; the animation layer decides whether to restart the clip
        if !self.cues.is_attacking() {
            self.cues.attack_remaining = self.cues.attack_clip_secs;
        }

        self.events.write(PresentationCue::Attack {
            entity: self.entity,
        });
    }

    fn play_death_cue(&mut self) {
        self.cues.death_played = true;
        self.cues.attack_remaining = 0.0;
        self.events.write(PresentationCue::Death {
            entity: self.entity,
        });
    }

    fn is_playing_attack_cue(&self) -> bool {
        self.cues.is_attacking()
    }
}

/// System: count down attack clips
pub fn advance_animation_cues(mut query: Query<&mut AnimationCues>, time: Res<Time<Fixed>>) {
    let delta = time.delta_secs();

    for mut cues in query.iter_mut() {
        if cues.is_attacking() {
            cues.advance(delta);
        }
    }
}

/// Diagnostic overlay text (state + speed) for agents that opt in
#[derive(Component, Debug, Clone, Default)]
pub struct DebugLabel {
    pub text: String,
}

pub fn format_debug_label(controller: &AiController, speed: f32) -> String {
    format!("State: {:?}\nSpeed: {:.1}", controller.current_state(), speed)
}

/// System: AiController + AnimationCues → DebugLabel text
pub fn update_debug_labels(mut query: Query<(&AiController, &AnimationCues, &mut DebugLabel)>) {
    for (controller, cues, mut label) in query.iter_mut() {
        let text = format_debug_label(controller, cues.movement_speed);

        // Avoid Changed<DebugLabel> spam when nothing moved
        if label.text != text {
            label.text = text;
        }
    }
}
