//! Thrown javelins.
//!
//! A throw registers a flight with the world [`Timers`] and spawns a
//! projectile entity. The flight system lerps it along its arc every frame;
//! the landing system resolves impacts once the timer reports done.
//!
//! ## Data Access
//! - `timer_system`: writes Timers, TimerFrame
//! - `projectile_flight_system`: reads TimerFrame, writes Position, LandedProjectiles
//! - `projectile_landing_system`: exclusive (damage can despawn units)

use crate::components::*;
use crate::geometry::{bearing, direction_from_angle, distance, lerp, random_point_in_circle, Direction, Point};
use crate::groups::followers;
use crate::resources::{with_rng, DeltaTime};
use crate::spatial::units_in_radius;
use crate::systems::combat::damage;
use crate::systems::decorations::decorate;
use crate::timers::{TimerFrame, TimerId, Timers};
use bevy_ecs::prelude::*;
use std::f32::consts::PI;
use tracing::trace;

/// Longest throw, in world units.
pub const THROW_MAX_RANGE: f32 = 200.0;

/// Flight speed in world units per second.
pub const PROJECTILE_SPEED: f32 = 300.0;

/// Apex of the flight arc.
pub const PROJECTILE_ARC_HEIGHT: f32 = 10.0;

/// Units within this radius of the landing point are hit.
pub const IMPACT_RADIUS: f32 = 10.0;

/// How far a javelin carries past its impact point. Kept inside
/// [`IMPACT_RADIUS`] so a unit standing on the aim point is still hit.
pub const PROJECTILE_OVERSHOOT: f32 = 5.0;

/// Followers aim within this radius of their leader's target.
pub const VOLLEY_SPREAD: f32 = 10.0;

/// Projectiles whose flight finished this frame, in launch order.
#[derive(Resource, Debug, Default)]
pub struct LandedProjectiles(pub Vec<Entity>);

/// Throw a projectile from `unit` towards `target`.
///
/// Range is capped at [`THROW_MAX_RANGE`]: a farther target is struck at the
/// capped point along the same line. The javelin then carries on for
/// [`PROJECTILE_OVERSHOOT`] before it lands. A leader's followers throw too,
/// each at a point scattered around `target`.
pub fn throw(world: &mut World, unit: Entity, target: Point) -> Option<Entity> {
    let Some(origin) = world.get::<Position>(unit).map(Position::point) else {
        trace!(?unit, "throw: no such unit");
        return None;
    };

    for follower in followers(world, unit) {
        let aim = with_rng(world, |rng| random_point_in_circle(rng, target.x, target.y, VOLLEY_SPREAD));
        throw(world, follower, aim);
    }

    let dist = distance(origin, target);
    let range = dist.min(THROW_MAX_RANGE);
    let (landing, flight) = if dist > 0.0 {
        let flight = range + PROJECTILE_OVERSHOOT;
        let k = flight / dist;
        (Point::new(lerp(origin.x, target.x, k), lerp(origin.y, target.y, k)), flight)
    } else {
        (origin, 0.0)
    };
    let direction = direction_from_angle(bearing(origin, target));
    let flight_ms = flight / PROJECTILE_SPEED * 1000.0;

    let timer = world.resource_mut::<Timers>().schedule(flight_ms, None);
    let projectile = world
        .spawn(ProjectileBundle {
            position: Position::new(origin.x, origin.y),
            projectile: Projectile {
                origin,
                landing,
                direction,
                timer,
            },
        })
        .id();
    Some(projectile)
}

/// Advance the world timer registry by one frame.
pub fn timer_system(dt: Res<DeltaTime>, mut timers: ResMut<Timers>, mut frame: ResMut<TimerFrame>) {
    frame.0 = timers.advance(dt.0);
}

/// Move projectiles along their arcs and collect the ones that landed.
pub fn projectile_flight_system(
    frame: Res<TimerFrame>,
    mut landed: ResMut<LandedProjectiles>,
    mut query: Query<(Entity, &Projectile, &mut Position)>,
) {
    if frame.0.is_empty() {
        return;
    }

    let mut done: Vec<(TimerId, Entity)> = Vec::new();
    for (entity, projectile, mut pos) in query.iter_mut() {
        let Some(report) = frame.0.iter().find(|report| report.id == projectile.timer) else {
            continue;
        };
        let t = report.t;
        pos.x = lerp(projectile.origin.x, projectile.landing.x, t);
        pos.y = lerp(projectile.origin.y, projectile.landing.y, t);
        pos.z = (t * PI).sin() * PROJECTILE_ARC_HEIGHT;
        if report.done {
            done.push((projectile.timer, entity));
        }
    }

    done.sort_unstable();
    landed.0.extend(done.into_iter().map(|(_, entity)| entity));
}

/// Resolve impacts: hit nearby units, then leave the javelin stuck in the
/// ground.
pub fn projectile_landing_system(world: &mut World) {
    let landed = std::mem::take(&mut world.resource_mut::<LandedProjectiles>().0);
    for entity in landed {
        land(world, entity);
    }
}

fn land(world: &mut World, entity: Entity) {
    let (Some(pos), Some(projectile)) = (
        world.get::<Position>(entity).copied(),
        world.get::<Projectile>(entity).copied(),
    ) else {
        return;
    };

    for unit in units_in_radius(world, pos.x, pos.y, IMPACT_RADIUS) {
        damage(world, unit);
    }
    world.despawn(entity);

    // No level sprite for east/west; the javelin rests on a diagonal.
    let resting = match projectile.direction {
        Direction::East => Direction::SouthEast,
        Direction::West => Direction::SouthWest,
        other => other,
    };
    decorate(
        world,
        Decoration::still(SpriteSheet::Javelin, resting.index()),
        pos.x,
        pos.y,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::groups::tests::{banner, unit};
    use crate::groups::{found_group, join};
    use crate::systems::tests::sim_world;

    fn projectiles(world: &mut World) -> Vec<Projectile> {
        let mut query = world.query::<&Projectile>();
        query.iter(world).copied().collect()
    }

    fn run_frame(world: &mut World, dt: f32) {
        world.resource_mut::<DeltaTime>().0 = dt;
        let mut schedule = Schedule::default();
        schedule.add_systems((timer_system, projectile_flight_system, projectile_landing_system).chain());
        schedule.run(world);
    }

    #[test]
    fn test_throw_caps_range() {
        let mut world = sim_world();
        let thrower = unit(&mut world, 0.0, 0.0);
        let javelin = throw(&mut world, thrower, Point::new(400.0, 0.0)).unwrap();

        let projectile = *world.get::<Projectile>(javelin).unwrap();
        assert!((projectile.landing.x - (THROW_MAX_RANGE + PROJECTILE_OVERSHOOT)).abs() < 1e-3);
        assert_eq!(projectile.landing.y, 0.0);
        assert_eq!(projectile.direction, Direction::East);
        assert_eq!(world.resource::<Timers>().len(), 1);
    }

    #[test]
    fn test_javelin_lands_past_the_target() {
        let mut world = sim_world();
        let thrower = unit(&mut world, 10.0, 20.0);
        let target = Point::new(40.0, 60.0);
        let javelin = throw(&mut world, thrower, target).unwrap();

        let projectile = *world.get::<Projectile>(javelin).unwrap();
        let origin = Point::new(10.0, 20.0);
        assert!((distance(origin, projectile.landing) - (50.0 + PROJECTILE_OVERSHOOT)).abs() < 1e-3);
        assert!((distance(target, projectile.landing) - PROJECTILE_OVERSHOOT).abs() < 1e-3);
        // Same bearing as the target, so still on the thrower's line.
        assert!((bearing(origin, projectile.landing) - bearing(origin, target)).abs() < 1e-5);
    }

    #[test]
    fn test_unit_on_the_aim_point_is_hit() {
        let mut world = sim_world();
        let thrower = unit(&mut world, 0.0, 0.0);
        let victim = unit(&mut world, 0.0, 60.0);
        throw(&mut world, thrower, Point::new(0.0, 60.0)).unwrap();

        // 65 units of flight: about 217 ms.
        run_frame(&mut world, 300.0);
        assert!(world.get::<UnitId>(victim).is_none());
        assert!(world.get::<UnitId>(thrower).is_some());
    }

    #[test]
    fn test_leader_throws_a_volley() {
        let mut world = sim_world();
        let leader = unit(&mut world, 0.0, 0.0);
        let a = unit(&mut world, 5.0, 0.0);
        let b = unit(&mut world, 0.0, 5.0);
        let group = found_group(&mut world, leader, banner(), false).unwrap();
        join(&mut world, group, a);
        join(&mut world, group, b);

        throw(&mut world, leader, Point::new(100.0, 100.0));
        assert_eq!(projectiles(&mut world).len(), 3);
    }

    #[test]
    fn test_projectile_flies_and_lands() {
        let mut world = sim_world();
        let thrower = unit(&mut world, 0.0, 0.0);
        let victim = unit(&mut world, 145.0, 0.0);
        let javelin = throw(&mut world, thrower, Point::new(145.0, 0.0)).unwrap();

        // 145 units plus the overshoot at 300/s: 500 ms of flight.
        run_frame(&mut world, 250.0);
        let pos = *world.get::<Position>(javelin).unwrap();
        assert!((pos.x - 75.0).abs() < 1e-3);
        assert!((pos.z - PROJECTILE_ARC_HEIGHT).abs() < 1e-3);
        assert!(world.get::<UnitId>(victim).is_some());

        run_frame(&mut world, 250.0);
        assert!(world.get::<Projectile>(javelin).is_none());
        assert!(world.get::<UnitId>(victim).is_none());
        assert!(world.get::<UnitId>(thrower).is_some());

        let mut query = world.query::<(&Decoration, &Position)>();
        let stuck: Vec<_> = query.iter(&world).collect();
        assert_eq!(stuck.len(), 1);
        assert_eq!(stuck[0].0.sheet, SpriteSheet::Javelin);
        assert_eq!(stuck[0].0.frame(), Direction::SouthEast.index());
        assert!((stuck[0].1.x - 150.0).abs() < 1e-3);
    }

    #[test]
    fn test_zero_length_throw_lands_next_frame() {
        let mut world = sim_world();
        let thrower = unit(&mut world, 0.0, 0.0);
        *world.get_mut::<Invulnerability>(thrower).unwrap() = Invulnerability::permanent();
        let javelin = throw(&mut world, thrower, Point::new(0.0, 0.0)).unwrap();

        run_frame(&mut world, 0.0);
        assert!(world.get::<Projectile>(javelin).is_none());
        assert!(world.get::<UnitId>(thrower).is_some());
    }
}
