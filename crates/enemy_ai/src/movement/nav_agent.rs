//! Path-following state component + headless straight-line stepper.
//!
//! Architecture (same split as NavigationAgent in an engine):
//! - The AI writes intent: destination, speed, stopped flag
//! - The navigation layer writes back: velocity, path_pending, remaining_distance
//! - Without an engine, `step_nav_agents` does the navigation layer's job in a
//!   straight line (no navmesh, no avoidance)

use bevy::prelude::*;

use super::{heading_rotation, PathAgent};

/// Navigation agent state for one actor
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct NavAgent {
    /// Set by the navigation layer once the agent is registered
    pub ready: bool,
    pub destination: Option<Vec3>,
    pub speed: f32,
    pub stopping_distance: f32,
    pub stopped: bool,
    pub velocity: Vec3,
    /// New destination not yet processed by the navigation layer
    pub path_pending: bool,
    pub remaining_distance: f32,
}

impl PathAgent for NavAgent {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn set_destination(&mut self, destination: Vec3) {
        // Same target every tick must not re-trigger path computation
        if self.destination != Some(destination) {
            self.destination = Some(destination);
            self.path_pending = true;
        }
    }

    fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    fn set_stopping_distance(&mut self, distance: f32) {
        self.stopping_distance = distance;
    }

    fn set_stopped(&mut self, stopped: bool) {
        self.stopped = stopped;
    }

    fn clear_velocity(&mut self) {
        self.velocity = Vec3::ZERO;
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn path_pending(&self) -> bool {
        self.path_pending
    }

    fn remaining_distance(&self) -> f32 {
        self.remaining_distance
    }
}

/// System: headless navigation step (straight line toward destination)
///
/// First step only registers the agent (ready = true): AI commands issued
/// before that are dropped by MotionController, same as with a real backend.
/// Moving agents face their direction of travel.
pub fn step_nav_agents(mut agents: Query<(&mut NavAgent, &mut Transform)>, time: Res<Time<Fixed>>) {
    let delta = time.delta_secs();

    for (mut agent, mut transform) in agents.iter_mut() {
        if !agent.ready {
            agent.ready = true;
            continue;
        }

        let Some(destination) = agent.destination else {
            agent.velocity = Vec3::ZERO;
            agent.remaining_distance = 0.0;
            continue;
        };

        agent.path_pending = false;

        let to_destination = destination - transform.translation;
        let distance = to_destination.length();

        if agent.stopped || distance <= agent.stopping_distance || agent.speed <= 0.0 {
            agent.velocity = Vec3::ZERO;
            agent.remaining_distance = distance;
            continue;
        }

        let direction = to_destination / distance;
        let travel = agent.speed * delta;
        agent.velocity = direction * agent.speed;

        // Snap onto the stopping radius so arrival is exact
        if distance - travel <= agent.stopping_distance {
            transform.translation = destination - direction * agent.stopping_distance;
            agent.remaining_distance = agent.stopping_distance;
        } else {
            transform.translation += direction * travel;
            agent.remaining_distance = distance - travel;
        }

        if let Some(rotation) = heading_rotation(direction) {
            transform.rotation = rotation;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_change_marks_path_pending() {
        let mut agent = NavAgent::default();

        agent.set_destination(Vec3::X);
        assert!(agent.path_pending);

        agent.path_pending = false;
        agent.set_destination(Vec3::X);
        assert!(!agent.path_pending, "same destination must not repath");

        agent.set_destination(Vec3::Z);
        assert!(agent.path_pending);
    }

    #[test]
    fn test_headless_step_registers_then_resolves_path() {
        let mut app = App::new();
        app.insert_resource(Time::<Fixed>::from_hz(60.0));
        app.add_systems(Update, step_nav_agents);

        let entity = app
            .world_mut()
            .spawn((
                NavAgent {
                    speed: 5.0,
                    stopping_distance: 2.0,
                    ..default()
                },
                Transform::default(),
            ))
            .id();

        // Registration step, then set a destination 10m along +X
        app.update();
        let mut agent = app.world_mut().get_mut::<NavAgent>(entity).expect("agent");
        assert!(agent.ready);
        agent.set_destination(Vec3::new(10.0, 0.0, 0.0));

        // Fixed clock never advances here (delta 0): only path resolution happens
        app.update();
        let agent = app.world().get::<NavAgent>(entity).expect("agent");
        assert!(!agent.path_pending);
        assert_eq!(agent.remaining_distance, 10.0);
    }
}
