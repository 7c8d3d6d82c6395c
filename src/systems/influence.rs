//! Recruitment and contests between groups.

use crate::components::*;
use crate::geometry::circles_intersect;
use crate::groups::{can_consume, consume, group_of, join, leader_of};
use bevy_ecs::prelude::*;
use tracing::trace;

/// Enlist every free unit whose influence circle overlaps the leader's.
///
/// Stationary units are never recruited. A unit still cooling down after
/// leaving this very group is skipped until its cooldown ends.
pub fn absorb_nearby(world: &mut World, leader: Entity) {
    let Some(group) = group_of(world, leader) else {
        return;
    };
    if leader_of(world, group) != Some(leader) {
        return;
    }
    let (Some(lpos), Some(linf)) = (
        world.get::<Position>(leader).copied(),
        world.get::<Influence>(leader).map(|influence| influence.0),
    ) else {
        return;
    };

    let mut query = world.query_filtered::<(
        Entity,
        &UnitId,
        &Position,
        &Influence,
        &Membership,
        &Invulnerability,
    ), Without<Stationary>>();
    let mut recruits: Vec<(UnitId, Entity)> = query
        .iter(world)
        .filter(|(entity, _, pos, inf, membership, invulnerability)| {
            *entity != leader
                && membership.is_free()
                && !(invulnerability.is_active() && membership.previous == Some(group))
                && circles_intersect(lpos.x, lpos.y, linf, pos.x, pos.y, inf.0)
        })
        .map(|(entity, id, ..)| (*id, entity))
        .collect();
    recruits.sort_unstable();

    for (id, unit) in recruits {
        trace!(unit = id.0, "recruited");
        join(world, group, unit);
    }
}

/// Groups in creation order.
pub fn groups_in_order(world: &mut World) -> Vec<Entity> {
    let mut query = world.query::<(Entity, &GroupId)>();
    let mut groups: Vec<(GroupId, Entity)> = query.iter(world).map(|(entity, id)| (*id, entity)).collect();
    groups.sort_unstable();
    groups.into_iter().map(|(_, entity)| entity).collect()
}

/// Let every group swallow every other group it can.
///
/// Pairs are tried in creation order. A group destroyed earlier in the pass
/// fails `can_consume` and is skipped.
pub fn group_contest_system(world: &mut World) {
    let groups = groups_in_order(world);
    for &group in &groups {
        for &target in &groups {
            if can_consume(world, group, target) {
                consume(world, group, target);
            }
        }
    }
}
