//! Death entry point (EntityDied → mark_dead) and deferred despawn.

use bevy::prelude::*;

use crate::ai::controller::AiController;
use crate::ai::events::EntityDied;

/// Component: despawn the entity once the fixed clock reaches `despawn_time`
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct DespawnAfter {
    /// Fixed-clock time of removal (seconds since start)
    pub despawn_time: f32,
}

/// System: EntityDied → flag the matching agent dead
///
/// The Dead transition itself runs in the agent's next `enemy_ai_tick`.
pub fn apply_death_events(mut events: EventReader<EntityDied>, agents: Query<&AiController>) {
    for event in events.read() {
        let Ok(controller) = agents.get(event.entity) else {
            continue;
        };

        if !controller.is_dead() {
            crate::log(&format!(
                "💀 {} ({:?}) killed by {:?}",
                controller.name(),
                event.entity,
                event.killer
            ));
        }
        controller.mark_dead();
    }
}

/// System: despawn entities whose DespawnAfter time has passed
pub fn despawn_after_timeout(
    mut commands: Commands,
    query: Query<(Entity, &DespawnAfter)>,
    time: Res<Time<Fixed>>,
) {
    let current_time = time.elapsed_secs();

    for (entity, despawn_after) in query.iter() {
        if current_time >= despawn_after.despawn_time {
            crate::log(&format!("⚰️ Despawning entity {:?} (timeout)", entity));
            commands.entity(entity).despawn();
        }
    }
}
