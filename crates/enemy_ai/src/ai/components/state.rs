//! Agent state machine: current/previous state, patrol cursor, wait timer.

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// AI FSM states
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub enum AgentState {
    /// Idle — standing still, counting down the patrol wait
    #[default]
    Idle,

    /// Patrol — walking to the current waypoint
    Patrol,

    /// Chase — running after the spotted target
    Chase,

    /// Attack — target within attack radius
    Attack,

    /// Dead — terminal, no transition leaves it
    Dead,
}

/// Transition record (what `change_state` actually did)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateTransition {
    pub from: AgentState,
    pub to: AgentState,
}

/// Ordered, cyclic waypoint list with a cursor
///
/// Invariant: `index < waypoints.len()` whenever the route is non-empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatrolRoute {
    waypoints: Vec<Vec3>,
    index: usize,
}

impl PatrolRoute {
    pub fn new(waypoints: Vec<Vec3>) -> Self {
        Self { waypoints, index: 0 }
    }

    /// Random route around `center` (ring of 5..=radius meters, flat Y).
    pub fn scattered(rng: &mut impl Rng, center: Vec3, count: usize, radius: f32) -> Self {
        let min_distance = radius.min(5.0);

        let waypoints = (0..count)
            .map(|_| {
                let angle = rng.gen::<f32>() * std::f32::consts::TAU;
                let distance = min_distance + rng.gen::<f32>() * (radius - min_distance);
                center + Vec3::new(angle.cos() * distance, 0.0, angle.sin() * distance)
            })
            .collect();

        Self::new(waypoints)
    }

    pub fn waypoints(&self) -> &[Vec3] {
        &self.waypoints
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Waypoint under the cursor, `None` for an empty route.
    pub fn current(&self) -> Option<Vec3> {
        self.waypoints.get(self.index).copied()
    }

    /// Moves the cursor forward (wraps). No-op on an empty route.
    fn advance(&mut self) {
        if self.waypoints.is_empty() {
            return;
        }

        self.index = (self.index + 1) % self.waypoints.len();
    }
}

/// State machine owned by one agent
///
/// Only the tick (and the `force_state` tooling override) mutates it.
#[derive(Debug, Clone)]
pub struct AgentStateMachine {
    current: AgentState,
    previous: AgentState,
    route: PatrolRoute,
    wait_time: f32,
    /// Seconds left in Idle. Starts at 0: a fresh agent leaves Idle on its first tick.
    wait_timer: f32,
}

impl AgentStateMachine {
    pub fn new(route: PatrolRoute, wait_time: f32) -> Self {
        Self {
            current: AgentState::Idle,
            previous: AgentState::Idle,
            route,
            wait_time,
            wait_timer: 0.0,
        }
    }

    pub fn current_state(&self) -> AgentState {
        self.current
    }

    pub fn previous_state(&self) -> AgentState {
        self.previous
    }

    pub fn route(&self) -> &PatrolRoute {
        &self.route
    }

    pub fn wait_timer(&self) -> f32 {
        self.wait_timer
    }

    /// Switches state, running exit then entry logic.
    ///
    /// Same state → `None`, nothing runs. Dead is terminal.
    pub fn change_state(&mut self, new_state: AgentState) -> Option<StateTransition> {
        if self.current == new_state || self.current == AgentState::Dead {
            return None;
        }

        let old_state = self.current;
        self.on_exit(old_state);

        self.previous = old_state;
        self.current = new_state;

        self.on_enter(new_state);

        Some(StateTransition {
            from: old_state,
            to: new_state,
        })
    }

    fn on_enter(&mut self, state: AgentState) {
        match state {
            AgentState::Idle => {
                self.wait_timer = self.wait_time;
            }
            AgentState::Patrol => {
                // Cursor moves BEFORE the leg starts: first leg after spawn goes to waypoint 1
                self.route.advance();
            }
            AgentState::Chase | AgentState::Attack | AgentState::Dead => {}
        }
    }

    fn on_exit(&mut self, _state: AgentState) {
        // No per-state cleanup
    }

    /// Counts down the Idle wait; true once expired.
    ///
    /// Level-triggered: keeps returning true until the caller leaves Idle.
    pub fn update_patrol_wait(&mut self, delta_secs: f32) -> bool {
        self.wait_timer -= delta_secs;
        self.wait_timer <= 0.0
    }

    /// Waypoint under the cursor, or `own_position` for an empty route.
    pub fn current_patrol_point(&self, own_position: Vec3) -> Vec3 {
        self.route.current().unwrap_or(own_position)
    }

    /// Called when a patrol leg arrives: cursor forward + wait reset.
    ///
    /// Together with the advance on Patrol entry, every Idle → Patrol → Idle
    /// cycle moves the cursor by two (one waypoint is skipped per leg).
    pub fn advance_patrol(&mut self) {
        self.route.advance();
        self.wait_timer = self.wait_time;
    }
}

impl Default for AgentStateMachine {
    fn default() -> Self {
        Self::new(PatrolRoute::default(), 2.0)
    }
}
