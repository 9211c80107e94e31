//! Decision core: per-tick FSM dispatch for one enemy.
//!
//! Tick order:
//! 1. Dead flag set → one-time death sequence (Dead state, stop, death cue, despawn request)
//! 2. Otherwise dispatch on the current state; at most one transition fires
//! 3. Forward motion speed to presentation
//!
//! Transition table (checks top to bottom, first match wins):
//! - Idle:   sees target → Chase; wait expired → Patrol            (always stops)
//! - Patrol: sees target → Chase; arrived → advance cursor, Idle   (walks to waypoint)
//! - Chase:  no target → Idle; lost (> lose radius) → Idle; in attack range → Attack
//! - Attack: no target → Idle; left attack range → Chase if still in detection range, else Idle
//! - Dead:   terminal

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bevy::prelude::*;

use crate::ai::components::{AgentState, AgentStateMachine, StateTransition};
use crate::config::ControllerConfig;
use crate::movement::Motion;
use crate::perception::Perception;
use crate::presentation::Presentation;

/// Cross-context death trigger
///
/// Cloneable, callable from any system or thread. Only flips a flag; the
/// state change itself happens on the next tick.
#[derive(Debug, Clone, Default)]
pub struct DeathHandle(Arc<AtomicBool>);

impl DeathHandle {
    pub fn mark_dead(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_dead(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Capabilities for one tick (built by the ECS layer or a test)
pub struct Capabilities<'a> {
    pub motion: &'a mut dyn Motion,
    pub perception: &'a dyn Perception,
    pub presentation: &'a mut dyn Presentation,
}

/// What a tick did
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickReport {
    pub transition: Option<StateTransition>,
    /// Set once, by the tick that ran the death sequence
    pub despawn_after: Option<f32>,
}

/// Enemy AI controller component
#[derive(Component, Debug)]
pub struct AiController {
    name: String,
    machine: AgentStateMachine,
    config: ControllerConfig,
    death: DeathHandle,
}

impl AiController {
    pub fn new(name: impl Into<String>, machine: AgentStateMachine, config: ControllerConfig) -> Self {
        Self {
            name: name.into(),
            machine,
            config,
            death: DeathHandle::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn current_state(&self) -> AgentState {
        self.machine.current_state()
    }

    pub fn previous_state(&self) -> AgentState {
        self.machine.previous_state()
    }

    pub fn state_machine(&self) -> &AgentStateMachine {
        &self.machine
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn is_dead(&self) -> bool {
        self.death.is_dead()
    }

    /// Flags the agent dead. Idempotent; the transition runs on the next tick.
    pub fn mark_dead(&self) {
        self.death.mark_dead();
    }

    pub fn death_handle(&self) -> DeathHandle {
        self.death.clone()
    }

    /// Administrative override (tooling/tests). Same rules as any change:
    /// same state is a no-op, Dead is terminal.
    ///
    /// Forcing Dead goes through `mark_dead`: nothing changes now, the next
    /// tick runs the death sequence (stop, cue, despawn delay).
    pub fn force_state(&mut self, state: AgentState) -> Option<StateTransition> {
        if state == AgentState::Dead {
            if !self.is_dead() {
                self.debug("forced death, deferred to next tick");
            }
            self.mark_dead();
            return None;
        }

        let transition = self.machine.change_state(state);
        if let Some(transition) = transition {
            self.debug(&format!("forced {:?} → {:?}", transition.from, transition.to));
        }
        transition
    }

    pub fn tick(&mut self, delta_secs: f32, caps: &mut Capabilities<'_>) -> TickReport {
        if self.is_dead() {
            if self.machine.current_state() == AgentState::Dead {
                return TickReport::default();
            }

            return self.run_death_sequence(caps);
        }

        let transition = match self.machine.current_state() {
            AgentState::Idle => self.update_idle(delta_secs, caps),
            AgentState::Patrol => self.update_patrol(caps),
            AgentState::Chase => self.update_chase(caps),
            AgentState::Attack => self.update_attack(caps),
            AgentState::Dead => None,
        };

        caps.presentation
            .set_movement_speed(caps.motion.current_speed());

        TickReport {
            transition,
            despawn_after: None,
        }
    }

    fn update_idle(&mut self, delta_secs: f32, caps: &mut Capabilities<'_>) -> Option<StateTransition> {
        caps.motion.stop();

        if caps.perception.can_see_target() {
            self.debug("target spotted, Idle → Chase");
            return self.machine.change_state(AgentState::Chase);
        }

        if self.machine.update_patrol_wait(delta_secs) {
            self.debug("wait over, starting patrol");
            return self.machine.change_state(AgentState::Patrol);
        }

        None
    }

    fn update_patrol(&mut self, caps: &mut Capabilities<'_>) -> Option<StateTransition> {
        if caps.perception.can_see_target() {
            self.debug("target spotted on patrol, Patrol → Chase");
            return self.machine.change_state(AgentState::Chase);
        }

        let patrol_point = self.machine.current_patrol_point(caps.motion.position());
        caps.motion.patrol_to(patrol_point);

        if caps.motion.has_arrived() {
            self.debug(&format!("reached patrol point {:?}", patrol_point));
            self.machine.advance_patrol();
            return self.machine.change_state(AgentState::Idle);
        }

        None
    }

    fn update_chase(&mut self, caps: &mut Capabilities<'_>) -> Option<StateTransition> {
        let Some(target_position) = caps.perception.target_position() else {
            self.debug("no target, Chase → Idle");
            return self.machine.change_state(AgentState::Idle);
        };

        if caps.perception.should_lose_target() {
            self.debug("target beyond lose radius, Chase → Idle");
            return self.machine.change_state(AgentState::Idle);
        }

        if caps.perception.is_in_attack_range() {
            self.debug("target in attack range, Chase → Attack");
            return self.machine.change_state(AgentState::Attack);
        }

        caps.motion.move_to(target_position);
        None
    }

    fn update_attack(&mut self, caps: &mut Capabilities<'_>) -> Option<StateTransition> {
        let Some(target_position) = caps.perception.target_position() else {
            self.debug("no target, Attack → Idle");
            return self.machine.change_state(AgentState::Idle);
        };

        caps.motion.stop();
        caps.motion.look_at(target_position);

        if !caps.perception.is_in_attack_range() {
            if caps.perception.is_in_range() {
                self.debug("target left attack range, Attack → Chase");
                return self.machine.change_state(AgentState::Chase);
            }

            self.debug("target too far, Attack → Idle");
            return self.machine.change_state(AgentState::Idle);
        }

        caps.presentation.play_attack_cue();
        None
    }

    fn run_death_sequence(&mut self, caps: &mut Capabilities<'_>) -> TickReport {
        self.debug("killed");

        let transition = self.machine.change_state(AgentState::Dead);
        caps.motion.stop();
        caps.presentation.play_death_cue();

        TickReport {
            transition,
            despawn_after: Some(self.config.despawn_delay),
        }
    }

    fn debug(&self, message: &str) {
        if self.config.show_debug_info {
            crate::log(&format!("🤖 {}: {}", self.name, message));
        }
    }
}
