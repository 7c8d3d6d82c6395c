//! Group lifecycle and membership rules.
//!
//! A group is its own entity holding the leader handle, the member list and
//! the banner. Units point back at it through [`Membership`]. Every operation
//! here tolerates stale handles: a despawned unit or group is skipped.

use crate::components::*;
use crate::geometry::{circles_intersect, point_in_circle};
use crate::resources::Serials;
use bevy_ecs::prelude::*;
use tracing::{debug, trace};

/// Influence a leader gains per follower.
pub const INFLUENCE_PER_FOLLOWER: f32 = 1.0;

/// Immunity for a unit released from its group, in milliseconds. Never
/// shortens a longer running cooldown.
pub const REMOVAL_COOLDOWN_MS: f32 = 1000.0;

/// Group a unit currently belongs to, if that group still exists.
pub fn group_of(world: &World, unit: Entity) -> Option<Entity> {
    let group = world.get::<Membership>(unit)?.group?;
    world.get::<GroupMembers>(group).map(|_| group)
}

pub fn leader_of(world: &World, group: Entity) -> Option<Entity> {
    world.get::<GroupLeader>(group).map(|leader| leader.0)
}

/// Members of a group in join order, leader first.
pub fn members_of(world: &World, group: Entity) -> Vec<Entity> {
    world
        .get::<GroupMembers>(group)
        .map(|members| members.0.clone())
        .unwrap_or_default()
}

pub fn is_leader(world: &World, unit: Entity) -> bool {
    group_of(world, unit).and_then(|group| leader_of(world, group)) == Some(unit)
}

/// Members of the unit's group other than itself. Empty unless `unit` leads.
pub fn followers(world: &World, unit: Entity) -> Vec<Entity> {
    if !is_leader(world, unit) {
        return Vec::new();
    }
    let Some(group) = group_of(world, unit) else {
        return Vec::new();
    };
    let mut members = members_of(world, group);
    members.retain(|&member| member != unit);
    members
}

pub fn has_followers(world: &World, unit: Entity) -> bool {
    is_leader(world, unit)
        && group_of(world, unit)
            .and_then(|group| world.get::<GroupMembers>(group))
            .is_some_and(|members| members.len() > 1)
}

/// True when the unit's influence circle touches its leader's.
pub fn is_with_group(world: &World, unit: Entity) -> bool {
    let Some(leader) = group_of(world, unit).and_then(|group| leader_of(world, group)) else {
        return false;
    };
    let (Some(pos), Some(inf)) = (world.get::<Position>(unit), world.get::<Influence>(unit)) else {
        return false;
    };
    let (Some(lpos), Some(linf)) = (world.get::<Position>(leader), world.get::<Influence>(leader))
    else {
        return false;
    };
    circles_intersect(pos.x, pos.y, inf.0, lpos.x, lpos.y, linf.0)
}

/// Permanent immunity, a running cooldown, or leading a group of more than one.
pub fn is_invulnerable(world: &World, unit: Entity) -> bool {
    world
        .get::<Invulnerability>(unit)
        .is_some_and(Invulnerability::is_active)
        || has_followers(world, unit)
}

/// Create a group led by `leader`. The leader leaves its current group first.
pub fn found_group(world: &mut World, leader: Entity, banner: Banner, honorable: bool) -> Option<Entity> {
    let membership = world.get::<Membership>(leader).copied()?;
    if let Some(current) = membership.group {
        leave(world, current, leader);
    }

    let id = world.resource_mut::<Serials>().group();
    let palette = banner.palette.clone();
    let group = world
        .spawn(GroupBundle {
            id: GroupId(id),
            leader: GroupLeader(leader),
            members: GroupMembers(vec![leader]),
            banner,
            honorable: Honorable(honorable),
        })
        .id();

    if let Some(mut membership) = world.get_mut::<Membership>(leader) {
        membership.group = Some(group);
    }
    if let Some(mut appearance) = world.get_mut::<Appearance>(leader) {
        appearance.palette = Some(palette);
    }
    debug!(group = id, honorable, "group founded");
    Some(group)
}

/// Add `unit` to `group`, taking on its livery and the leader's speed.
///
/// A unit already in the group is left alone. A unit in another group leaves
/// that one first.
pub fn join(world: &mut World, group: Entity, unit: Entity) {
    let Some(membership) = world.get::<Membership>(unit).copied() else {
        trace!(?unit, "join: no such unit");
        return;
    };
    if membership.group == Some(group) {
        return;
    }
    if let Some(current) = membership.group {
        leave(world, current, unit);
    }

    let Some(leader) = leader_of(world, group) else {
        trace!(?group, "join: no such group");
        return;
    };
    let Some(palette) = world.get::<Banner>(group).map(|banner| banner.palette.clone()) else {
        return;
    };
    let speed = world.get::<Speed>(leader).map_or(DEFAULT_SPEED, |speed| speed.0);

    if let Some(mut membership) = world.get_mut::<Membership>(unit) {
        membership.group = Some(group);
    }
    if let Some(mut appearance) = world.get_mut::<Appearance>(unit) {
        appearance.palette = Some(palette);
    }
    if let Some(mut unit_speed) = world.get_mut::<Speed>(unit) {
        unit_speed.0 = speed;
    }
    if let Some(mut members) = world.get_mut::<GroupMembers>(group) {
        members.0.push(unit);
    }
    if unit != leader {
        if let Some(mut influence) = world.get_mut::<Influence>(leader) {
            influence.0 += INFLUENCE_PER_FOLLOWER;
        }
    }
}

/// Remove `unit` from `group`. When the leader leaves, the group is destroyed.
pub fn leave(world: &mut World, group: Entity, unit: Entity) {
    if !detach(world, group, unit) {
        return;
    }
    if leader_of(world, group) == Some(unit) {
        destroy(world, group);
    }
}

/// Dissolve a group: every member is released and the group entity despawned.
pub fn destroy(world: &mut World, group: Entity) {
    let Some(members) = world.get::<GroupMembers>(group).map(|members| members.0.clone()) else {
        return;
    };
    for unit in members {
        detach(world, group, unit);
    }
    let id = world.get::<GroupId>(group).map(|id| id.0);
    world.despawn(group);
    debug!(group = ?id, "group destroyed");
}

/// Strip membership without the leader check and start the removal
/// cooldown. Returns false when `unit` wasn't in `group`.
fn detach(world: &mut World, group: Entity, unit: Entity) -> bool {
    {
        let Some(mut membership) = world.get_mut::<Membership>(unit) else {
            return false;
        };
        if membership.group != Some(group) {
            return false;
        }
        membership.group = None;
        membership.previous = Some(group);
    }
    if let Some(mut invulnerability) = world.get_mut::<Invulnerability>(unit) {
        invulnerability.timer_ms = invulnerability.timer_ms.max(REMOVAL_COOLDOWN_MS);
    }
    if let Some(mut appearance) = world.get_mut::<Appearance>(unit) {
        appearance.palette = None;
    }
    if let Some(mut speed) = world.get_mut::<Speed>(unit) {
        speed.0 = DEFAULT_SPEED;
    }
    if let Some(mut members) = world.get_mut::<GroupMembers>(group) {
        members.0.retain(|&member| member != unit);
    }
    if let Some(leader) = leader_of(world, group).filter(|&leader| leader != unit) {
        if let Some(mut influence) = world.get_mut::<Influence>(leader) {
            influence.0 -= INFLUENCE_PER_FOLLOWER;
        }
    }
    true
}

/// Whether `group` may swallow `target`.
///
/// Requires two distinct live groups, a target that isn't honorable, a
/// strictly larger leader influence, and the leader standing inside the
/// target leader's influence circle.
pub fn can_consume(world: &World, group: Entity, target: Entity) -> bool {
    if group == target {
        return false;
    }
    let (Some(leader), Some(target_leader)) = (leader_of(world, group), leader_of(world, target)) else {
        return false;
    };
    if world.get::<Honorable>(target).is_some_and(|honorable| honorable.0) {
        return false;
    }
    let (Some(pos), Some(inf)) = (world.get::<Position>(leader), world.get::<Influence>(leader)) else {
        return false;
    };
    let (Some(tpos), Some(tinf)) = (
        world.get::<Position>(target_leader),
        world.get::<Influence>(target_leader),
    ) else {
        return false;
    };
    inf.0 > tinf.0 && point_in_circle(pos.point(), tpos.x, tpos.y, tinf.0)
}

/// Destroy `target` and enlist all of its members into `group`.
pub fn consume(world: &mut World, group: Entity, target: Entity) -> bool {
    if !can_consume(world, group, target) {
        return false;
    }
    let members = members_of(world, target);
    destroy(world, target);
    for unit in &members {
        join(world, group, *unit);
    }
    debug!(
        group = ?world.get::<GroupId>(group).map(|id| id.0),
        recruits = members.len(),
        "group consumed"
    );
    true
}

/// Despawn a unit, leaving its group first.
pub fn despawn_unit(world: &mut World, unit: Entity) -> bool {
    if world.get::<UnitId>(unit).is_none() {
        return false;
    }
    if let Some(group) = group_of(world, unit) {
        leave(world, group, unit);
    }
    world.despawn(unit)
}
