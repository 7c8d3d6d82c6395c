//! ECS Components for the Raise a Horde simulation.
//!
//! Components are pure data containers attached to entities.
//! Group rules live in `groups`; per-frame logic lives in systems.

use crate::geometry::{Direction, Point};
use crate::palette::{Hsla, Palette};
use crate::timers::{Motion, TimerId};
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Speed of a free unit, in world units per second.
pub const DEFAULT_SPEED: f32 = 10.0;

/// Influence radius of a free unit.
pub const DEFAULT_INFLUENCE: f32 = 10.0;

// ============================================================================
// UNIT COMPONENTS
// ============================================================================

/// Spawn serial of a unit. The update pass visits units in ascending order.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct UnitId(pub u64);

/// World position. `z` is a visual hop height and never affects collisions.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y, z: 0.0 }
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Movement speed in world units per second.
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Speed(pub f32);

impl Default for Speed {
    fn default() -> Self {
        Self(DEFAULT_SPEED)
    }
}

/// Current facing, fixed when a goal is issued.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facing(pub Direction);

/// Radius of the unit's zone of control.
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Influence(pub f32);

impl Default for Influence {
    fn default() -> Self {
        Self(DEFAULT_INFLUENCE)
    }
}

/// Active motion task. `None` means the unit is idle.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct Goal(pub Option<Motion>);

impl Goal {
    pub fn is_idle(&self) -> bool {
        self.0.is_none()
    }
}

/// Destination of an in-flight directed move, for destination markers.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Heading(pub Option<Point>);

/// What a unit does when it has no goal.
#[derive(Component, Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Behavior {
    /// Stand still until commanded.
    #[default]
    Idle,
    /// Drift around, or drift back towards the group leader.
    Wander,
    /// Chase the nearest free unit to recruit it.
    Hunt,
    /// Ride to random points across a `width` x `height` field.
    Roam { width: f32, height: f32 },
}

/// Group handles of a unit.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Membership {
    /// Group the unit belongs to.
    pub group: Option<Entity>,
    /// Group the unit was last removed from. May point at a destroyed group.
    pub previous: Option<Entity>,
}

impl Membership {
    pub fn is_free(&self) -> bool {
        self.group.is_none()
    }
}

/// Damage immunity.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Invulnerability {
    /// Remaining cooldown in milliseconds.
    pub timer_ms: f32,
    /// Never takes damage.
    pub permanent: bool,
}

impl Invulnerability {
    pub fn permanent() -> Self {
        Self {
            timer_ms: 0.0,
            permanent: true,
        }
    }

    pub fn tick(&mut self, dt_ms: f32) {
        self.timer_ms = (self.timer_ms - dt_ms).max(0.0);
    }

    pub fn is_active(&self) -> bool {
        self.permanent || self.timer_ms > 0.0
    }
}

/// Marker for units that never move and can't be recruited (yurts).
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Stationary;

/// Sprite sequences the renderer knows how to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpriteSheet {
    Rider,
    Horse,
    Yurt,
    Javelin,
    Grass1,
    Grass2,
    Grass3,
    Grass4,
    Dirt,
    Rock,
}

impl SpriteSheet {
    /// Number of frames in the sheet.
    pub fn frame_count(self) -> usize {
        match self {
            SpriteSheet::Rider | SpriteSheet::Horse => 8,
            SpriteSheet::Javelin => 8,
            SpriteSheet::Grass1 => 4,
            SpriteSheet::Grass2 => 5,
            SpriteSheet::Dirt => 6,
            SpriteSheet::Rock => 5,
            SpriteSheet::Yurt | SpriteSheet::Grass3 | SpriteSheet::Grass4 => 1,
        }
    }
}

/// Decorative sub-unit drawn beneath its rider, sharing position and facing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mount {
    pub sheet: SpriteSheet,
    pub palette: Option<Palette>,
}

/// How a unit is drawn.
#[derive(Component, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appearance {
    pub sheet: SpriteSheet,
    /// Group livery while grouped.
    pub palette: Option<Palette>,
    pub mount: Option<Mount>,
}

impl Default for Appearance {
    fn default() -> Self {
        Self {
            sheet: SpriteSheet::Rider,
            palette: None,
            mount: None,
        }
    }
}

// ============================================================================
// GROUP COMPONENTS
// ============================================================================

/// Creation serial of a group. The contest pass visits groups in ascending order.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct GroupId(pub u64);

/// The unit controlling a group.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupLeader(pub Entity);

/// Members in join order, leader included.
#[derive(Component, Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupMembers(pub Vec<Entity>);

impl GroupMembers {
    pub fn contains(&self, unit: Entity) -> bool {
        self.0.contains(&unit)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Cosmetic identity shared by every member.
#[derive(Component, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Banner {
    /// Aura colour drawn under the leader.
    pub color: Hsla,
    pub palette: Palette,
}

/// Honorable groups are never consumed by stronger groups.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Honorable(pub bool);

// ============================================================================
// PROJECTILE / DECORATION COMPONENTS
// ============================================================================

/// A thrown object in flight. Its position is driven by `timer`.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Projectile {
    pub origin: Point,
    pub landing: Point,
    pub direction: Direction,
    pub timer: TimerId,
}

/// Non-interactive animated sprite.
#[derive(Component, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decoration {
    pub sheet: SpriteSheet,
    /// Frame indices into `sheet`, played in order.
    pub frames: Vec<usize>,
    pub index: usize,
    /// Milliseconds per frame. `None` never advances.
    pub period_ms: Option<f32>,
    pub timer_ms: f32,
}

impl Decoration {
    pub fn still(sheet: SpriteSheet, frame: usize) -> Self {
        Self {
            sheet,
            frames: vec![frame],
            index: 0,
            period_ms: None,
            timer_ms: 0.0,
        }
    }

    pub fn animated(sheet: SpriteSheet, frames: Vec<usize>, period_ms: f32) -> Self {
        Self {
            sheet,
            frames,
            index: 0,
            period_ms: Some(period_ms),
            timer_ms: 0.0,
        }
    }

    /// Frame to draw right now.
    pub fn frame(&self) -> usize {
        self.frames.get(self.index).copied().unwrap_or(0)
    }

    pub fn update(&mut self, dt_ms: f32) {
        let Some(period) = self.period_ms else {
            return;
        };
        self.timer_ms += dt_ms;
        if self.timer_ms > period && !self.frames.is_empty() {
            self.index = (self.index + 1) % self.frames.len();
            self.timer_ms = 0.0;
        }
    }
}

// ============================================================================
// BUNDLE HELPERS
// ============================================================================

/// Bundle for spawning a complete unit entity.
#[derive(Bundle, Default)]
pub struct UnitBundle {
    pub id: UnitId,
    pub position: Position,
    pub speed: Speed,
    pub facing: Facing,
    pub influence: Influence,
    pub goal: Goal,
    pub heading: Heading,
    pub behavior: Behavior,
    pub membership: Membership,
    pub invulnerability: Invulnerability,
    pub appearance: Appearance,
}

impl UnitBundle {
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = Speed(speed);
        self
    }

    pub fn with_influence(mut self, influence: f32) -> Self {
        self.influence = Influence(influence);
        self
    }

    pub fn with_behavior(mut self, behavior: Behavior) -> Self {
        self.behavior = behavior;
        self
    }
}

/// Bundle for spawning a group entity.
#[derive(Bundle)]
pub struct GroupBundle {
    pub id: GroupId,
    pub leader: GroupLeader,
    pub members: GroupMembers,
    pub banner: Banner,
    pub honorable: Honorable,
}

/// Bundle for spawning a projectile entity.
#[derive(Bundle)]
pub struct ProjectileBundle {
    pub position: Position,
    pub projectile: Projectile,
}

/// Bundle for spawning a decoration entity.
#[derive(Bundle)]
pub struct DecorationBundle {
    pub position: Position,
    pub decoration: Decoration,
}
