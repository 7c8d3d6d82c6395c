//! Raise a Horde - Simulation Core
//!
//! A frame-driven ECS simulation of riders that flock into leader-led
//! groups, wander, hunt for recruits, throw javelins, and merge or dissolve
//! groups through a contest of influence.
//! Uses `bevy_ecs` for the entity-component-system architecture.

pub mod api;
pub mod archetypes;
pub mod components;
pub mod config;
pub mod geometry;
pub mod groups;
pub mod palette;
pub mod resources;
pub mod spatial;
pub mod systems;
pub mod timers;
pub mod world;

pub use api::SimWorld;
pub use archetypes::Archetype;
pub use components::*;
pub use config::{ConfigError, SimConfig};
pub use geometry::{Direction, Point, Rect};
pub use palette::{Hsla, Palette};
pub use spatial::units_in_radius;
pub use timers::{Easing, Motion, TimerId, Timers};
pub use world::Snapshot;
