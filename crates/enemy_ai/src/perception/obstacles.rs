//! Obstacle queries for line-of-sight.
//!
//! The sight check only needs "what does this ray hit first". `ObstacleQuery`
//! is that capability; `RapierObstacles` answers it from the rapier collider
//! world, tests plug in scripted fakes.
//!
//! Layer mapping: `PerceptionConfig::obstacle_layers` is the query filter, a
//! collider takes part when its `CollisionGroups::memberships` intersect it.

use bevy::prelude::*;
use bevy_rapier3d::prelude::{CollisionGroups, Group, QueryFilter, RapierContext};

/// First thing a ray hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub entity: Entity,
    pub distance: f32,
}

/// Raycast capability (rapier context, test fake)
pub trait ObstacleQuery {
    /// Closest hit along `direction` (normalized) within `max_distance`,
    /// considering only colliders whose layers intersect `layers`.
    fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32, layers: u32) -> Option<RayHit>;
}

/// Collision groups for a collider that should block (or be hit by) sight rays
/// on `layers`.
pub fn sight_groups(layers: u32) -> CollisionGroups {
    CollisionGroups::new(Group::from_bits_truncate(layers), Group::ALL)
}

/// Query filter for one agent's sight ray: layer mask, sensors ignored,
/// the agent's own collider excluded.
pub fn sight_filter(layers: u32, agent: Entity) -> QueryFilter<'static> {
    QueryFilter::new()
        .groups(CollisionGroups::new(Group::ALL, Group::from_bits_truncate(layers)))
        .exclude_sensors()
        .exclude_collider(agent)
}

/// Sight rays through the rapier query pipeline
///
/// Without a physics context nothing is hit, so nothing is seen.
pub struct RapierObstacles<'a, 'w> {
    context: Option<&'a RapierContext<'w>>,
    agent: Entity,
}

impl<'a, 'w> RapierObstacles<'a, 'w> {
    pub fn new(context: Option<&'a RapierContext<'w>>, agent: Entity) -> Self {
        Self { context, agent }
    }
}

impl ObstacleQuery for RapierObstacles<'_, '_> {
    fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32, layers: u32) -> Option<RayHit> {
        let context = self.context?;

        context
            .cast_ray(origin, direction, max_distance, true, sight_filter(layers, self.agent))
            .map(|(entity, distance)| RayHit { entity, distance })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sight_filter_maps_layers_and_excludes_agent() {
        let agent = Entity::from_raw(9);
        let filter = sight_filter(0b10, agent);

        assert_eq!(
            filter.groups,
            Some(CollisionGroups::new(Group::ALL, Group::GROUP_2))
        );
        assert_eq!(filter.exclude_collider, Some(agent));
    }

    #[test]
    fn test_sight_groups_membership() {
        let groups = sight_groups(0b101);
        assert_eq!(groups.memberships, Group::GROUP_1 | Group::GROUP_3);
        assert_eq!(groups.filters, Group::ALL);

        // All bits → every group
        assert_eq!(sight_groups(u32::MAX).memberships, Group::ALL);
    }

    #[test]
    fn test_no_physics_context_hits_nothing() {
        let obstacles = RapierObstacles::new(None, Entity::from_raw(1));
        assert!(obstacles
            .cast_ray(Vec3::ZERO, Vec3::NEG_Z, 100.0, u32::MAX)
            .is_none());
    }
}
