//! Perception domain: distance, vision cone, line of sight.
//!
//! Architecture:
//! - `PerceptionService`: pure queries against one target, recomputed on every call (no cache)
//! - `ObstacleQuery`: raycast capability (rapier query pipeline, fakes in tests)
//! - `TrackedTarget`: target provider resource (weak reference, may be absent)
//!
//! Missing target is a normal perception state: nothing is seen, the target
//! counts as lost, distance is infinite.

use bevy::prelude::*;

use crate::config::PerceptionConfig;

pub mod obstacles;
pub mod target;

pub use obstacles::{sight_filter, sight_groups, ObstacleQuery, RapierObstacles, RayHit};
pub use target::{track_tagged_target, PlayerTarget, TrackedTarget};

/// Resolved target for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetRef {
    pub entity: Entity,
    pub position: Vec3,
}

/// Agent position + facing at query time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentPose {
    pub position: Vec3,
    pub forward: Vec3,
}

impl AgentPose {
    pub fn from_transform(transform: &Transform) -> Self {
        Self {
            position: transform.translation,
            forward: transform.forward().as_vec3(),
        }
    }
}

/// Per-agent perception radii/cone (component form of `PerceptionConfig`)
#[derive(Component, Debug, Clone, Default)]
pub struct PerceptionSettings(pub PerceptionConfig);

/// All perception values computed at once (ephemeral, for logs/diagnostics)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerceptionSnapshot {
    pub distance: f32,
    pub in_range: bool,
    pub in_view: bool,
    pub line_of_sight_clear: bool,
    pub in_attack_range: bool,
}

/// Perception capability consumed by the decision core
pub trait Perception {
    /// Position of the bound target, `None` when absent.
    fn target_position(&self) -> Option<Vec3>;
    /// Within detection radius.
    fn is_in_range(&self) -> bool;
    /// Absent, or farther than the lose radius.
    fn should_lose_target(&self) -> bool;
    /// Within attack radius (inclusive).
    fn is_in_attack_range(&self) -> bool;
    /// In range AND in the vision cone AND unobstructed.
    fn can_see_target(&self) -> bool;
}

/// Perception queries for one agent against one target
pub struct PerceptionService<'a> {
    pose: AgentPose,
    target: Option<TargetRef>,
    config: &'a PerceptionConfig,
    obstacles: &'a dyn ObstacleQuery,
}

impl<'a> PerceptionService<'a> {
    pub fn new(
        pose: AgentPose,
        target: Option<TargetRef>,
        config: &'a PerceptionConfig,
        obstacles: &'a dyn ObstacleQuery,
    ) -> Self {
        Self {
            pose,
            target,
            config,
            obstacles,
        }
    }

    pub fn target(&self) -> Option<TargetRef> {
        self.target
    }

    /// Euclidean distance, `f32::INFINITY` without a target.
    pub fn distance_to_target(&self) -> f32 {
        match self.target {
            Some(target) => self.pose.position.distance(target.position),
            None => f32::INFINITY,
        }
    }

    pub fn is_in_range_of(&self, radius: f32) -> bool {
        self.target.is_some() && self.distance_to_target() <= radius
    }

    pub fn should_lose_target_at(&self, lose_radius: f32) -> bool {
        self.target.is_none() || self.distance_to_target() > lose_radius
    }

    pub fn is_in_attack_range_of(&self, attack_radius: f32) -> bool {
        self.is_in_range_of(attack_radius)
    }

    /// Angle between `forward` and the direction to the target must be
    /// strictly below `half_fov_degrees`.
    pub fn is_in_field_of_view(&self, forward: Vec3, half_fov_degrees: f32) -> bool {
        let Some(target) = self.target else {
            return false;
        };

        let direction = (target.position - self.pose.position).normalize_or_zero();

        // Target on top of the agent → zero angle
        let angle = if direction == Vec3::ZERO {
            0.0
        } else {
            forward.normalize_or_zero().angle_between(direction).to_degrees()
        };

        angle < half_fov_degrees
    }

    /// Ray from eye height toward the target, limited to detection radius.
    ///
    /// True only when the first hit is the target itself; no hit is no sight.
    pub fn has_line_of_sight(&self) -> bool {
        let Some(target) = self.target else {
            return false;
        };

        let direction = (target.position - self.pose.position).normalize_or_zero();
        if direction == Vec3::ZERO {
            return false;
        }

        let origin = self.pose.position + Vec3::Y * self.config.eye_height;

        self.obstacles
            .cast_ray(
                origin,
                direction,
                self.config.detection_radius,
                self.config.obstacle_layers,
            )
            .is_some_and(|hit| hit.entity == target.entity)
    }

    pub fn snapshot(&self) -> PerceptionSnapshot {
        PerceptionSnapshot {
            distance: self.distance_to_target(),
            in_range: self.is_in_range(),
            in_view: self.is_in_field_of_view(self.pose.forward, self.config.field_of_view_degrees / 2.0),
            line_of_sight_clear: self.has_line_of_sight(),
            in_attack_range: self.is_in_attack_range(),
        }
    }
}

impl Perception for PerceptionService<'_> {
    fn target_position(&self) -> Option<Vec3> {
        self.target.map(|target| target.position)
    }

    fn is_in_range(&self) -> bool {
        self.is_in_range_of(self.config.detection_radius)
    }

    fn should_lose_target(&self) -> bool {
        self.should_lose_target_at(self.config.lose_radius)
    }

    fn is_in_attack_range(&self) -> bool {
        self.is_in_attack_range_of(self.config.attack_radius)
    }

    fn can_see_target(&self) -> bool {
        self.is_in_range()
            && self.is_in_field_of_view(self.pose.forward, self.config.field_of_view_degrees / 2.0)
            && self.has_line_of_sight()
    }
}
