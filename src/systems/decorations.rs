//! Scenery sprites.

use crate::components::*;
use crate::resources::DeltaTime;
use bevy_ecs::prelude::*;

/// Place a decoration in the world.
pub fn decorate(world: &mut World, decoration: Decoration, x: f32, y: f32) -> Entity {
    world
        .spawn(DecorationBundle {
            position: Position::new(x, y),
            decoration,
        })
        .id()
}

/// Step every animated decoration's frame timer.
pub fn decoration_system(dt: Res<DeltaTime>, mut query: Query<&mut Decoration>) {
    for mut decoration in query.iter_mut() {
        decoration.update(dt.0);
    }
}
