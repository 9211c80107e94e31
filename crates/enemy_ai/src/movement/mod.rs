//! Movement domain: motion commands on top of an external path follower.
//!
//! Contains:
//! - `PathAgent`: the path-following backend (engine NavigationAgent, headless `NavAgent`)
//! - `MotionController`: walk/chase speeds, stopping distance, init state, heading interpolation
//! - `Motion`: capability the decision core talks to (implemented by `MotionDriver`)
//!
//! Commands issued before the backend is ready are silently dropped: startup
//! order between the AI and the navigation layer is not an error.

use bevy::prelude::*;

use crate::config::MotionConfig;

pub mod nav_agent;

pub use nav_agent::{step_nav_agents, NavAgent};

/// Path-following backend (wrapped, never implemented by the decision core)
pub trait PathAgent {
    /// Backend finished its own startup (navmesh registered etc.)
    fn is_ready(&self) -> bool;
    fn set_destination(&mut self, destination: Vec3);
    fn set_speed(&mut self, speed: f32);
    fn set_stopping_distance(&mut self, distance: f32);
    fn set_stopped(&mut self, stopped: bool);
    fn clear_velocity(&mut self);
    fn velocity(&self) -> Vec3;
    fn path_pending(&self) -> bool;
    fn remaining_distance(&self) -> f32;
}

/// Motion capability consumed by the decision core
pub trait Motion {
    /// Current agent position.
    fn position(&self) -> Vec3;
    /// Go to `position` at chase speed.
    fn move_to(&mut self, position: Vec3);
    /// Go to `position` at walk speed.
    fn patrol_to(&mut self, position: Vec3);
    /// Halt and zero velocity.
    fn stop(&mut self);
    /// Turn toward `position` on the horizontal plane (interpolated).
    fn look_at(&mut self, position: Vec3);
    fn current_speed(&self) -> f32;
    fn has_arrived(&self) -> bool;
}

/// Motion state per agent
///
/// Wraps a `PathAgent`; holds speeds, the spawn position (for
/// `return_to_start`) and whether the backend has been configured yet.
#[derive(Component, Debug, Clone)]
pub struct MotionController {
    config: MotionConfig,
    start_position: Vec3,
    initialized: bool,
    not_ready_noticed: bool,
}

impl MotionController {
    pub fn new(config: MotionConfig, start_position: Vec3) -> Self {
        Self {
            config,
            start_position,
            initialized: false,
            not_ready_noticed: false,
        }
    }

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    pub fn start_position(&self) -> Vec3 {
        self.start_position
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Configures the backend once it reports ready. Returns true on the
    /// call that completes initialization.
    pub fn try_initialize<A: PathAgent + ?Sized>(&mut self, agent: &mut A) -> bool {
        if self.initialized || !agent.is_ready() {
            return false;
        }

        agent.set_speed(self.config.walk_speed);
        agent.set_stopping_distance(self.config.stopping_distance);
        self.initialized = true;
        true
    }

    /// True exactly once while the backend is still not ready (for a single log line).
    pub fn take_not_ready_notice(&mut self) -> bool {
        if self.initialized || self.not_ready_noticed {
            return false;
        }

        self.not_ready_noticed = true;
        true
    }

    pub fn move_to_target<A: PathAgent + ?Sized>(&self, agent: &mut A, position: Vec3) {
        self.go_to(agent, position, self.config.chase_speed);
    }

    pub fn patrol<A: PathAgent + ?Sized>(&self, agent: &mut A, position: Vec3) {
        self.go_to(agent, position, self.config.walk_speed);
    }

    /// Walk back to the spawn position (after losing the target).
    pub fn return_to_start<A: PathAgent + ?Sized>(&self, agent: &mut A) {
        self.patrol(agent, self.start_position);
    }

    fn go_to<A: PathAgent + ?Sized>(&self, agent: &mut A, position: Vec3, speed: f32) {
        if !self.initialized {
            return;
        }

        agent.set_stopped(false);
        agent.set_speed(speed);
        agent.set_destination(position);
    }

    pub fn stop<A: PathAgent + ?Sized>(&self, agent: &mut A) {
        if !self.initialized {
            return;
        }

        agent.set_stopped(true);
        agent.clear_velocity();
    }

    /// Slerps the heading toward `position`, ignoring the vertical offset.
    ///
    /// Rate scales with `delta_secs` (frame-rate independent).
    pub fn look_at_target(&self, transform: &mut Transform, position: Vec3, delta_secs: f32) {
        let Some(target_rotation) = heading_rotation(position - transform.translation) else {
            return;
        };

        let t = (delta_secs * self.config.turn_rate).clamp(0.0, 1.0);
        transform.rotation = transform.rotation.slerp(target_rotation, t);
    }

    pub fn current_speed<A: PathAgent + ?Sized>(&self, agent: &A) -> f32 {
        if !self.initialized {
            return 0.0;
        }

        agent.velocity().length()
    }

    pub fn has_reached_destination<A: PathAgent + ?Sized>(&self, agent: &A) -> bool {
        self.initialized
            && !agent.path_pending()
            && agent.remaining_distance() <= self.config.stopping_distance
    }

    pub fn distance_to(transform: &Transform, point: Vec3) -> f32 {
        transform.translation.distance(point)
    }
}

/// Yaw rotation whose forward (-Z) points along `direction` projected on XZ.
///
/// `None` when the horizontal component vanishes.
pub fn heading_rotation(direction: Vec3) -> Option<Quat> {
    let flat = Vec3::new(direction.x, 0.0, direction.z).normalize_or_zero();
    if flat == Vec3::ZERO {
        return None;
    }

    Some(Quat::from_rotation_y(f32::atan2(-flat.x, -flat.z)))
}

/// Binds one agent's controller, backend and transform for a tick
pub struct MotionDriver<'a, A: PathAgent + ?Sized> {
    pub controller: &'a MotionController,
    pub agent: &'a mut A,
    pub transform: &'a mut Transform,
    pub delta_secs: f32,
}

impl<A: PathAgent + ?Sized> Motion for MotionDriver<'_, A> {
    fn position(&self) -> Vec3 {
        self.transform.translation
    }

    fn move_to(&mut self, position: Vec3) {
        self.controller.move_to_target(&mut *self.agent, position);
    }

    fn patrol_to(&mut self, position: Vec3) {
        self.controller.patrol(&mut *self.agent, position);
    }

    fn stop(&mut self) {
        self.controller.stop(&mut *self.agent);
    }

    fn look_at(&mut self, position: Vec3) {
        self.controller
            .look_at_target(&mut *self.transform, position, self.delta_secs);
    }

    fn current_speed(&self) -> f32 {
        self.controller.current_speed(&*self.agent)
    }

    fn has_arrived(&self) -> bool {
        self.controller.has_reached_destination(&*self.agent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready_agent() -> NavAgent {
        NavAgent {
            ready: true,
            ..default()
        }
    }

    #[test]
    fn test_commands_before_init_are_noops() {
        let controller = MotionController::new(MotionConfig::default(), Vec3::ZERO);
        let mut agent = NavAgent::default();

        controller.move_to_target(&mut agent, Vec3::new(5.0, 0.0, 0.0));
        controller.patrol(&mut agent, Vec3::new(5.0, 0.0, 0.0));
        controller.stop(&mut agent);

        assert_eq!(agent.destination, None);
        assert!(!agent.stopped);
        assert_eq!(controller.current_speed(&agent), 0.0);
        assert!(!controller.has_reached_destination(&agent));
    }

    #[test]
    fn test_initialize_waits_for_backend() {
        let mut controller = MotionController::new(MotionConfig::default(), Vec3::ZERO);
        let mut agent = NavAgent::default();

        assert!(!controller.try_initialize(&mut agent));
        assert!(!controller.is_initialized());

        agent.ready = true;
        assert!(controller.try_initialize(&mut agent));
        assert!(controller.is_initialized());
        assert_eq!(agent.speed, 3.5);
        assert_eq!(agent.stopping_distance, 2.0);

        // Only once
        assert!(!controller.try_initialize(&mut agent));
    }

    #[test]
    fn test_not_ready_notice_fires_once() {
        let mut controller = MotionController::new(MotionConfig::default(), Vec3::ZERO);
        let mut agent = NavAgent::default();

        let notices = (0..10)
            .filter(|_| {
                controller.try_initialize(&mut agent);
                controller.take_not_ready_notice()
            })
            .count();
        assert_eq!(notices, 1);

        agent.ready = true;
        assert!(controller.try_initialize(&mut agent));
        assert!(!controller.take_not_ready_notice());
    }

    #[test]
    fn test_no_notice_once_initialized() {
        let mut controller = MotionController::new(MotionConfig::default(), Vec3::ZERO);
        let mut agent = ready_agent();

        controller.try_initialize(&mut agent);
        assert!(!controller.take_not_ready_notice());
    }

    #[test]
    fn test_chase_and_patrol_speeds() {
        let mut controller = MotionController::new(MotionConfig::default(), Vec3::ZERO);
        let mut agent = ready_agent();
        controller.try_initialize(&mut agent);

        controller.stop(&mut agent);
        assert!(agent.stopped);

        controller.move_to_target(&mut agent, Vec3::new(0.0, 0.0, -8.0));
        assert!(!agent.stopped);
        assert_eq!(agent.speed, 5.0);
        assert_eq!(agent.destination, Some(Vec3::new(0.0, 0.0, -8.0)));

        controller.patrol(&mut agent, Vec3::new(4.0, 0.0, 0.0));
        assert_eq!(agent.speed, 3.5);
        assert_eq!(agent.destination, Some(Vec3::new(4.0, 0.0, 0.0)));
    }

    #[test]
    fn test_stop_zeroes_velocity() {
        let mut controller = MotionController::new(MotionConfig::default(), Vec3::ZERO);
        let mut agent = ready_agent();
        controller.try_initialize(&mut agent);
        agent.velocity = Vec3::new(3.0, 0.0, 4.0);
        assert_eq!(controller.current_speed(&agent), 5.0);

        controller.stop(&mut agent);
        assert_eq!(controller.current_speed(&agent), 0.0);
    }

    #[test]
    fn test_return_to_start_patrols_home() {
        let home = Vec3::new(2.0, 0.0, 2.0);
        let mut controller = MotionController::new(MotionConfig::default(), home);
        let mut agent = ready_agent();
        controller.try_initialize(&mut agent);

        controller.return_to_start(&mut agent);
        assert_eq!(agent.destination, Some(home));
        assert_eq!(agent.speed, 3.5);
    }

    #[test]
    fn test_arrival_needs_resolved_path() {
        let mut controller = MotionController::new(MotionConfig::default(), Vec3::ZERO);
        let mut agent = ready_agent();
        controller.try_initialize(&mut agent);

        agent.path_pending = true;
        agent.remaining_distance = 0.0;
        assert!(!controller.has_reached_destination(&agent));

        agent.path_pending = false;
        agent.remaining_distance = 2.0;
        assert!(controller.has_reached_destination(&agent)); // within stopping distance

        agent.remaining_distance = 2.1;
        assert!(!controller.has_reached_destination(&agent));
    }

    #[test]
    fn test_look_at_ignores_height_and_interpolates() {
        let controller = MotionController::new(MotionConfig::default(), Vec3::ZERO);
        let mut transform = Transform::default(); // facing -Z
        let target = Vec3::new(10.0, 5.0, 0.0); // to the right (+X), above

        // Small step: partial turn only
        controller.look_at_target(&mut transform, target, 0.05);
        let forward = transform.forward().as_vec3();
        assert!(forward.x > 0.0 && forward.x < 0.99, "forward = {:?}", forward);
        assert!(forward.y.abs() < 1e-5);

        // Large step clamps to a full turn
        controller.look_at_target(&mut transform, target, 1.0);
        let forward = transform.forward().as_vec3();
        assert!((forward - Vec3::X).length() < 1e-4, "forward = {:?}", forward);
    }

    #[test]
    fn test_look_at_same_spot_keeps_heading() {
        let controller = MotionController::new(MotionConfig::default(), Vec3::ZERO);
        let mut transform = Transform::from_translation(Vec3::new(1.0, 0.0, 1.0));
        let before = transform.rotation;

        // Directly above: no horizontal direction
        controller.look_at_target(&mut transform, Vec3::new(1.0, 4.0, 1.0), 1.0);
        assert_eq!(transform.rotation, before);
    }

    #[test]
    fn test_heading_rotation_faces_direction() {
        for direction in [Vec3::X, Vec3::NEG_X, Vec3::Z, Vec3::NEG_Z, Vec3::new(1.0, 0.0, 1.0)] {
            let rotation = heading_rotation(direction).expect("horizontal direction");
            let forward = rotation * Vec3::NEG_Z;
            assert!((forward - direction.normalize()).length() < 1e-5, "{:?} → {:?}", direction, forward);
        }
        assert!(heading_rotation(Vec3::Y).is_none());
    }

    #[test]
    fn test_motion_driver_forwards_to_controller() {
        let mut controller = MotionController::new(MotionConfig::default(), Vec3::ZERO);
        let mut agent = ready_agent();
        controller.try_initialize(&mut agent);
        let mut transform = Transform::from_translation(Vec3::new(0.0, 0.0, 3.0));

        let mut driver = MotionDriver {
            controller: &controller,
            agent: &mut agent,
            transform: &mut transform,
            delta_secs: 1.0 / 60.0,
        };

        assert_eq!(driver.position(), Vec3::new(0.0, 0.0, 3.0));
        driver.move_to(Vec3::ZERO);
        assert_eq!(driver.current_speed(), 0.0);
        driver.stop();

        assert!(agent.stopped);
        assert_eq!(agent.destination, Some(Vec3::ZERO));
        assert_eq!(MotionController::distance_to(&transform, Vec3::ZERO), 3.0);
    }
}
