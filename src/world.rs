//! Snapshot types.
//!
//! The `Snapshot` struct provides a serializable view of the simulation state
//! that a renderer reads once per frame.

use crate::components::*;
use crate::geometry::{Direction, Point, Rect};
use crate::groups::{is_invulnerable, is_leader};
use crate::palette::{Hsla, Palette};
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Snapshot of a single unit's state for serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitSnapshot {
    pub id: u64,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub direction: Direction,
    pub sheet: SpriteSheet,
    pub frame: usize,
    pub palette: Option<Palette>,
    pub mount: Option<Mount>,
    /// Destination marker of an in-flight move.
    pub heading: Option<Point>,
    pub group: Option<u64>,
    pub leader: bool,
    /// Drawn blinking by the renderer.
    pub invulnerable: bool,
    pub influence: f32,
}

/// Snapshot of a group, drawn as an aura around its leader.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupSnapshot {
    pub id: u64,
    pub leader: u64,
    pub x: f32,
    pub y: f32,
    /// Aura radius.
    pub influence: f32,
    pub color: Hsla,
    pub rgba: u32,
    pub size: usize,
    pub honorable: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectileSnapshot {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub direction: Direction,
    pub frame: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecorationSnapshot {
    pub x: f32,
    pub y: f32,
    pub sheet: SpriteSheet,
    pub frame: usize,
}

/// Complete simulation state snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Current simulation tick.
    pub tick: u64,
    /// Elapsed simulation time in milliseconds.
    pub time_ms: f64,
    /// Units in spawn order.
    pub units: Vec<UnitSnapshot>,
    /// Groups in creation order.
    pub groups: Vec<GroupSnapshot>,
    pub projectiles: Vec<ProjectileSnapshot>,
    pub decorations: Vec<DecorationSnapshot>,
    /// Visible world rectangle, when there is a player to centre on.
    pub viewport: Option<Rect>,
    pub cursor: Option<Point>,
    pub player: Option<u64>,
}

fn facing_frame(sheet: SpriteSheet, direction: Direction) -> usize {
    if sheet.frame_count() > 1 {
        direction.index() % sheet.frame_count()
    } else {
        0
    }
}

impl Snapshot {
    /// Create a snapshot from the ECS world. Viewport, cursor and player are
    /// left for the caller to fill in.
    pub fn from_world(world: &mut World, tick: u64, time_ms: f64) -> Self {
        let mut query = world.query::<(
            Entity,
            &UnitId,
            &Position,
            &Facing,
            &Appearance,
            &Heading,
            &Membership,
            &Influence,
        )>();
        let mut rows: Vec<_> = query
            .iter(world)
            .map(|(entity, id, pos, facing, appearance, heading, membership, influence)| {
                (*id, entity, *pos, facing.0, appearance.clone(), heading.0, membership.group, influence.0)
            })
            .collect();
        rows.sort_by_key(|row| row.0);

        let units = rows
            .into_iter()
            .map(|(id, entity, pos, direction, appearance, heading, group, influence)| UnitSnapshot {
                id: id.0,
                x: pos.x,
                y: pos.y,
                z: pos.z,
                direction,
                sheet: appearance.sheet,
                frame: facing_frame(appearance.sheet, direction),
                palette: appearance.palette,
                mount: appearance.mount,
                heading,
                group: group.and_then(|g| world.get::<GroupId>(g)).map(|g| g.0),
                leader: is_leader(world, entity),
                invulnerable: is_invulnerable(world, entity),
                influence,
            })
            .collect();

        let mut group_query = world.query::<(&GroupId, &GroupLeader, &GroupMembers, &Banner, &Honorable)>();
        let mut groups: Vec<GroupSnapshot> = group_query
            .iter(world)
            .filter_map(|(id, leader, members, banner, honorable)| {
                let pos = world.get::<Position>(leader.0)?;
                Some(GroupSnapshot {
                    id: id.0,
                    leader: world.get::<UnitId>(leader.0)?.0,
                    x: pos.x,
                    y: pos.y,
                    influence: world.get::<Influence>(leader.0).map_or(0.0, |inf| inf.0),
                    color: banner.color,
                    rgba: banner.color.to_rgba(),
                    size: members.len(),
                    honorable: honorable.0,
                })
            })
            .collect();
        groups.sort_by_key(|group| group.id);

        let mut projectile_query = world.query::<(&Projectile, &Position)>();
        let projectiles = projectile_query
            .iter(world)
            .map(|(projectile, pos)| ProjectileSnapshot {
                x: pos.x,
                y: pos.y,
                z: pos.z,
                direction: projectile.direction,
                frame: facing_frame(SpriteSheet::Javelin, projectile.direction),
            })
            .collect();

        let mut decoration_query = world.query::<(&Decoration, &Position)>();
        let decorations = decoration_query
            .iter(world)
            .map(|(decoration, pos)| DecorationSnapshot {
                x: pos.x,
                y: pos.y,
                sheet: decoration.sheet,
                frame: decoration.frame(),
            })
            .collect();

        Self {
            tick,
            time_ms,
            units,
            groups,
            projectiles,
            decorations,
            viewport: None,
            cursor: None,
            player: None,
        }
    }

    /// Serialize snapshot to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize snapshot to pretty JSON string.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
