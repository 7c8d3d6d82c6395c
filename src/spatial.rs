//! Neighbour queries over units.
//!
//! Populations are small (tens to low hundreds), so queries are a linear
//! scan over every unit rather than a partitioned grid.

use crate::components::{Position, UnitId};
use crate::geometry::circles_intersect;
use bevy_ecs::prelude::*;

/// Radius of a unit's body for hit and vision tests.
pub const UNIT_HIT_RADIUS: f32 = 1.0;

/// Units whose body touches the circle at `(x, y)` with `radius`.
///
/// Returns entities sorted by distance (closest first). Ties keep spawn
/// order, so the result is stable across runs.
pub fn units_in_radius(world: &mut World, x: f32, y: f32, radius: f32) -> Vec<Entity> {
    let mut query = world.query::<(Entity, &UnitId, &Position)>();
    let mut hits: Vec<(f32, UnitId, Entity)> = query
        .iter(world)
        .filter(|(_, _, pos)| circles_intersect(x, y, radius, pos.x, pos.y, UNIT_HIT_RADIUS))
        .map(|(entity, id, pos)| {
            let dist_sq = (pos.x - x).powi(2) + (pos.y - y).powi(2);
            (dist_sq, *id, entity)
        })
        .collect();

    hits.sort_by(|a, b| {
        a.0.partial_cmp(&b.0)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.1.cmp(&b.1))
    });
    hits.into_iter().map(|(_, _, entity)| entity).collect()
}
