//! Target provider.
//!
//! The core never searches the world for a target: it only reads
//! `TrackedTarget`. Whoever composes the app decides how the target is found;
//! `track_tagged_target` is the stock "first entity tagged PlayerTarget" resolver.

use bevy::prelude::*;

/// Marker: entity that enemies perceive and react to (player character)
#[derive(Component, Debug, Default, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct PlayerTarget;

/// Current target (weak reference)
///
/// Holds an Entity id only. If the entity is despawned the tick resolves it
/// to "no target"; the AI never keeps it alive.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct TrackedTarget {
    pub entity: Option<Entity>,
}

impl TrackedTarget {
    pub fn new(entity: Entity) -> Self {
        Self {
            entity: Some(entity),
        }
    }
}

/// System: (re)resolve TrackedTarget from PlayerTarget-tagged entities
///
/// Runs only when the target is absent or no longer valid.
pub fn track_tagged_target(
    mut tracked: ResMut<TrackedTarget>,
    tagged: Query<Entity, With<PlayerTarget>>,
) {
    if tracked.entity.is_some_and(|entity| tagged.contains(entity)) {
        return;
    }

    let resolved = tagged.iter().next();

    if tracked.entity != resolved {
        match resolved {
            Some(entity) => crate::log(&format!("🎯 TrackedTarget → {:?}", entity)),
            None => crate::log("🎯 TrackedTarget lost (no PlayerTarget in world)"),
        }
        tracked.entity = resolved;
    }
}
