//! Damage resolution.
//!
//! A hit on a vulnerable unit starts its cooldown. A grouped unit is knocked
//! out of its group; a free unit is removed from the world.

use crate::components::*;
use crate::groups::{despawn_unit, group_of, is_invulnerable, leave};
use bevy_ecs::prelude::*;
use tracing::{debug, trace};

/// Immunity granted after taking a hit, in milliseconds.
pub const INVULNERABILITY_COOLDOWN_MS: f32 = 3000.0;

/// Apply one hit to `unit`. Returns false when the hit had no effect.
pub fn damage(world: &mut World, unit: Entity) -> bool {
    let Some(id) = world.get::<UnitId>(unit).copied() else {
        trace!(?unit, "damage: no such unit");
        return false;
    };
    if is_invulnerable(world, unit) {
        return false;
    }

    if let Some(mut invulnerability) = world.get_mut::<Invulnerability>(unit) {
        invulnerability.timer_ms = INVULNERABILITY_COOLDOWN_MS;
    }
    match group_of(world, unit) {
        Some(group) => {
            leave(world, group, unit);
            debug!(unit = id.0, "knocked out of group");
        }
        None => {
            despawn_unit(world, unit);
            debug!(unit = id.0, "unit killed");
        }
    }
    true
}
