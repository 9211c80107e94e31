//! AI events (ECS boundary of the decision core)

use bevy::prelude::*;

use crate::ai::components::AgentState;

/// Event: agent changed state (one per transition, including the death transition)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentStateChanged {
    pub entity: Entity,
    pub from: AgentState,
    pub to: AgentState,
}

/// Event: entity died (sent by combat or any other system)
///
/// Only flags the matching agent; the Dead transition happens on its next tick.
#[derive(Event, Debug, Clone)]
pub struct EntityDied {
    pub entity: Entity,
    pub killer: Option<Entity>,
}
