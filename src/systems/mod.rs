//! ECS Systems for the Raise a Horde simulation.
//!
//! Systems contain the game logic that operates on components.
//!
//! ## Frame Order
//!
//! One `step` runs every system once, chained on a single thread:
//!
//! 1. `timer_system` - advances the world timer registry
//! 2. `projectile_flight_system` - moves javelins along their arcs
//! 3. `unit_update_system` - cooldowns, goals, idle behaviors, recruitment
//! 4. `decoration_system` - animates scenery
//! 5. `group_contest_system` - stronger groups swallow weaker ones
//! 6. `projectile_landing_system` - resolves javelin impacts
//!
//! The unit, contest and landing passes are exclusive systems: they join,
//! leave and despawn entities while iterating, so they work on `&mut World`
//! over a sorted snapshot of handles.

pub mod ai;
pub mod combat;
pub mod decorations;
pub mod influence;
pub mod movement;
pub mod projectiles;
pub mod serialization;

pub use ai::*;
pub use combat::*;
pub use decorations::*;
pub use influence::*;
pub use movement::*;
pub use projectiles::*;
pub use serialization::*;

use crate::config::SimConfig;
use crate::resources::{DeltaTime, Serials, SimRng, SimTick};
use crate::timers::{TimerFrame, Timers};
use bevy_ecs::prelude::*;

/// Install every resource the systems read.
pub fn insert_resources(world: &mut World, config: &SimConfig) {
    world.insert_resource(DeltaTime(0.0));
    world.insert_resource(SimTick(0));
    world.insert_resource(SimRng::seeded(config.seed));
    world.insert_resource(Serials::default());
    world.insert_resource(Timers::new());
    world.insert_resource(TimerFrame::default());
    world.insert_resource(LandedProjectiles::default());
    world.insert_resource(config.clone());
}
