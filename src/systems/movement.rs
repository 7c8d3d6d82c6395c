//! Directed movement and the per-unit update pass.

use crate::components::*;
use crate::geometry::{bearing, direction_from_angle, distance, point_on_circle, Point};
use crate::groups::{followers, is_leader};
use crate::resources::{with_rng, DeltaTime};
use crate::systems::ai::run_behavior;
use crate::systems::influence::absorb_nearby;
use crate::timers::{Easing, Motion};
use bevy_ecs::prelude::*;
use rand::Rng;
use std::f32::consts::TAU;
use tracing::trace;

/// Followers never bunch up closer than this to the leader's destination.
pub const FOLLOWER_MIN_SCATTER: f32 = 10.0;

/// Give `unit` a motion goal towards `target`.
///
/// The trip lasts `distance / speed` seconds. A unit already travelling eases
/// out of its current motion, a unit at rest eases in and out. A leader also
/// sends each follower to its own scattered point around `target`.
///
/// Missing or stationary units, and units with no speed, are left alone.
pub fn move_to(world: &mut World, unit: Entity, target: Point) {
    if world.get::<Stationary>(unit).is_some() {
        return;
    }
    let (Some(pos), Some(speed), Some(heading)) = (
        world.get::<Position>(unit).copied(),
        world.get::<Speed>(unit).map(|speed| speed.0),
        world.get::<Heading>(unit).copied(),
    ) else {
        trace!(?unit, "move_to: no such unit");
        return;
    };
    if speed <= 0.0 {
        return;
    }

    if is_leader(world, unit) {
        let influence = world
            .get::<Influence>(unit)
            .map_or(DEFAULT_INFLUENCE, |influence| influence.0);
        for follower in followers(world, unit) {
            let spot = with_rng(world, |rng| {
                let radius = if influence > FOLLOWER_MIN_SCATTER {
                    rng.gen_range(FOLLOWER_MIN_SCATTER..influence)
                } else {
                    influence.max(0.0)
                };
                let angle = rng.gen_range(0.0..TAU);
                point_on_circle(target.x, target.y, angle, radius)
            });
            move_to(world, follower, spot);
        }
    }

    let origin = pos.point();
    let duration = distance(origin, target) / speed * 1000.0;
    let easing = if heading.0.is_some() {
        Easing::OutQuad
    } else {
        Easing::InOutQuad
    };
    let facing = direction_from_angle(bearing(origin, target));

    if let Some(mut f) = world.get_mut::<Facing>(unit) {
        f.0 = facing;
    }
    if let Some(mut h) = world.get_mut::<Heading>(unit) {
        h.0 = Some(target);
    }
    if let Some(mut goal) = world.get_mut::<Goal>(unit) {
        goal.0 = Some(Motion::new(origin, target, duration, easing));
    }
}

/// Step the unit's motion goal. On arrival the goal and heading are cleared.
pub fn advance_goal(world: &mut World, unit: Entity, dt_ms: f32) {
    let sample = {
        let Some(mut goal) = world.get_mut::<Goal>(unit) else {
            return;
        };
        let Some(motion) = goal.0.as_mut() else {
            return;
        };
        let sample = motion.advance(dt_ms);
        if sample.done {
            goal.0 = None;
        }
        sample
    };

    if let Some(mut pos) = world.get_mut::<Position>(unit) {
        pos.x = sample.position.x;
        pos.y = sample.position.y;
        pos.z = sample.z;
    }
    if sample.done {
        if let Some(mut heading) = world.get_mut::<Heading>(unit) {
            heading.0 = None;
        }
    }
}

/// Units in spawn order.
pub fn units_in_order(world: &mut World) -> Vec<Entity> {
    let mut query = world.query::<(Entity, &UnitId)>();
    let mut units: Vec<(UnitId, Entity)> = query.iter(world).map(|(entity, id)| (*id, entity)).collect();
    units.sort_unstable();
    units.into_iter().map(|(_, entity)| entity).collect()
}

/// Per-unit update pass.
///
/// Visits units in spawn order. Each unit ticks its invulnerability cooldown,
/// advances its goal, falls back to its idle behavior once it has no goal,
/// and, when it leads a group, recruits any free unit it now overlaps.
///
/// Runs exclusively: behaviors and recruitment touch other units.
pub fn unit_update_system(world: &mut World) {
    let dt = world.resource::<DeltaTime>().0;

    for unit in units_in_order(world) {
        // Despawned earlier in this pass.
        if world.get::<UnitId>(unit).is_none() {
            continue;
        }

        if let Some(mut invulnerability) = world.get_mut::<Invulnerability>(unit) {
            invulnerability.tick(dt);
        }

        advance_goal(world, unit, dt);
        if world.get::<Goal>(unit).is_some_and(Goal::is_idle) {
            run_behavior(world, unit);
        }

        if is_leader(world, unit) {
            absorb_nearby(world, unit);
        }
    }
}
