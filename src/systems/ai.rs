//! Idle behaviors.
//!
//! A behavior only runs when its unit has no goal. Each one picks a
//! destination and hands it to [`move_to`].

use crate::components::*;
use crate::geometry::{random_point_in_circle, Point};
use crate::groups::{group_of, is_with_group, leader_of};
use crate::resources::with_rng;
use crate::spatial::units_in_radius;
use crate::systems::movement::move_to;
use bevy_ecs::prelude::*;
use rand::Rng;

/// Wander radius around a free unit is `WANDER_MIN_RADIUS` plus up to
/// `WANDER_RADIUS_SPREAD`.
pub const WANDER_MIN_RADIUS: f32 = 50.0;
pub const WANDER_RADIUS_SPREAD: f32 = 50.0;

/// How far a hunter looks for prey.
pub const HUNT_VISION: f32 = 100.0;

/// With no prey in sight, a hunter searches within `speed * HUNT_SEARCH_FACTOR`.
pub const HUNT_SEARCH_FACTOR: f32 = 5.0;

/// Dispatch the unit's idle behavior.
pub fn run_behavior(world: &mut World, unit: Entity) {
    let Some(behavior) = world.get::<Behavior>(unit).copied() else {
        return;
    };
    match behavior {
        Behavior::Idle => {}
        Behavior::Wander => wander(world, unit),
        Behavior::Hunt => hunt(world, unit),
        Behavior::Roam { width, height } => roam(world, unit, width, height),
    }
}

// ============================================================================
// WANDER
// ============================================================================

/// Drift around. A follower that has strayed from its leader heads back
/// into the leader's influence circle instead, and one still beside the
/// leader stays put.
pub fn wander(world: &mut World, unit: Entity) {
    let Some(pos) = world.get::<Position>(unit).copied() else {
        return;
    };
    let leader = group_of(world, unit)
        .and_then(|group| leader_of(world, group))
        .filter(|&leader| leader != unit);

    let target = match leader {
        Some(leader) => {
            if is_with_group(world, unit) {
                return;
            }
            let (Some(lpos), Some(linf)) = (
                world.get::<Position>(leader).copied(),
                world.get::<Influence>(leader).map(|influence| influence.0),
            ) else {
                return;
            };
            with_rng(world, |rng| {
                let radius = if linf > 0.0 { rng.gen_range(0.0..linf) } else { 0.0 };
                random_point_in_circle(rng, lpos.x, lpos.y, radius)
            })
        }
        None => with_rng(world, |rng| {
            let radius = WANDER_MIN_RADIUS + rng.gen::<f32>() * WANDER_RADIUS_SPREAD;
            random_point_in_circle(rng, pos.x, pos.y, radius)
        }),
    };
    move_to(world, unit, target);
}

// ============================================================================
// HUNT
// ============================================================================

/// Chase the nearest free, movable unit in sight. With none in sight, ride
/// to a random nearby point.
pub fn hunt(world: &mut World, unit: Entity) {
    let (Some(pos), Some(speed)) = (
        world.get::<Position>(unit).copied(),
        world.get::<Speed>(unit).map(|speed| speed.0),
    ) else {
        return;
    };

    let prey = units_in_radius(world, pos.x, pos.y, HUNT_VISION)
        .into_iter()
        .find(|&other| {
            other != unit
                && world.get::<Stationary>(other).is_none()
                && world.get::<Membership>(other).is_some_and(Membership::is_free)
        });

    let target = match prey.and_then(|prey| world.get::<Position>(prey).copied()) {
        Some(prey_pos) => prey_pos.point(),
        None => with_rng(world, |rng| {
            random_point_in_circle(rng, pos.x, pos.y, speed * HUNT_SEARCH_FACTOR)
        }),
    };
    move_to(world, unit, target);
}

// ============================================================================
// ROAM
// ============================================================================

/// Ride to a uniformly random point of the `width` x `height` field.
pub fn roam(world: &mut World, unit: Entity, width: f32, height: f32) {
    let target = with_rng(world, |rng| {
        let x = if width > 0.0 { rng.gen_range(0.0..width) } else { 0.0 };
        let y = if height > 0.0 { rng.gen_range(0.0..height) } else { 0.0 };
        Point::new(x, y)
    });
    move_to(world, unit, target);
}
