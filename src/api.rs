//! Public API for the simulation.
//!
//! This module provides the main interface for a renderer and an input layer
//! to interact with the simulation.
//!
//! ## Frame Stepping
//!
//! `step(dt_ms)` runs the whole schedule exactly once with the given frame
//! time. Motion and flights are expressed in elapsed milliseconds, so a
//! variable frame rate only changes how finely they are sampled.

use crate::archetypes::{dirt, grass, rock, spawn_archetype, spawn_unit, Archetype};
use crate::components::*;
use crate::config::{ConfigError, SimConfig};
use crate::geometry::{Point, Rect};
use crate::groups;
use crate::resources::{with_rng, DeltaTime, SimTick};
use crate::spatial;
use crate::systems::*;
use crate::world::Snapshot;
use bevy_ecs::prelude::*;
use bevy_ecs::schedule::ExecutorKind;
use rand::Rng;
use tracing::{debug, trace};

/// Population of the default skirmish world.
const SKIRMISH_RIDERS: usize = 40;
const SKIRMISH_LEADERS: usize = 6;
const SKIRMISH_SPIRITS: usize = 2;
const SKIRMISH_YURTS: usize = 5;
const SKIRMISH_GRASS: usize = 100;
const SKIRMISH_DIRT: usize = 100;
const SKIRMISH_ROCKS: usize = 10;

/// The main simulation world container.
///
/// Holds the ECS world and schedule, providing a clean API for:
/// - Initializing the simulation
/// - Stepping the simulation forward
/// - Extracting state snapshots
/// - Issuing commands
pub struct SimWorld {
    world: World,
    schedule: Schedule,
    tick: u64,
    /// Elapsed simulation time in milliseconds.
    time: f64,
    player: Option<Entity>,
    cursor: Option<Point>,
}

impl SimWorld {
    /// Create a new empty simulation world.
    pub fn new() -> Self {
        Self::with_config(SimConfig::default())
    }

    /// Create a new simulation world with custom configuration.
    pub fn with_config(config: SimConfig) -> Self {
        let mut world = World::new();
        insert_resources(&mut world, &config);

        let mut schedule = Schedule::default();
        schedule.set_executor_kind(ExecutorKind::SingleThreaded);
        schedule.add_systems(
            (
                timer_system,
                projectile_flight_system,
                unit_update_system,
                decoration_system,
                group_contest_system,
                projectile_landing_system,
            )
                .chain(),
        );

        Self {
            world,
            schedule,
            tick: 0,
            time: 0.0,
            player: None,
            cursor: None,
        }
    }

    /// Create a world from a JSON config.
    pub fn from_json_config(json: &str) -> Result<Self, ConfigError> {
        Ok(Self::with_config(SimConfig::from_json(json)?))
    }

    /// Create a populated skirmish: a player leader in the middle of the
    /// arena, free riders, rival leaders, spirit riders, yurts and scenery.
    pub fn new_default_world() -> Self {
        Self::default_world_with_config(SimConfig::default())
    }

    pub fn default_world_with_config(config: SimConfig) -> Self {
        let (width, height) = (config.arena_width, config.arena_height);
        let mut sim = Self::with_config(config);

        for _ in 0..SKIRMISH_GRASS {
            let (x, y) = sim.random_spot(width, height);
            let decoration = with_rng(&mut sim.world, |rng| grass(rng));
            sim.decorate(decoration, x, y);
        }
        for _ in 0..SKIRMISH_DIRT {
            let (x, y) = sim.random_spot(width, height);
            let decoration = with_rng(&mut sim.world, |rng| dirt(rng));
            sim.decorate(decoration, x, y);
        }
        for _ in 0..SKIRMISH_ROCKS {
            let (x, y) = sim.random_spot(width, height);
            let decoration = with_rng(&mut sim.world, |rng| rock(rng));
            sim.decorate(decoration, x, y);
        }

        let player = sim.spawn(Archetype::Player, width / 2.0, height / 2.0);
        sim.set_player(Some(player));

        let population = [
            (Archetype::Yurt, SKIRMISH_YURTS),
            (Archetype::Rider, SKIRMISH_RIDERS),
            (Archetype::Leader, SKIRMISH_LEADERS),
            (Archetype::SpiritRider, SKIRMISH_SPIRITS),
        ];
        for (archetype, count) in population {
            for _ in 0..count {
                let (x, y) = sim.random_spot(width, height);
                sim.spawn(archetype, x, y);
            }
        }

        debug!(units = sim.unit_count(), groups = sim.group_count(), "skirmish world ready");
        sim
    }

    fn random_spot(&mut self, width: f32, height: f32) -> (f32, f32) {
        with_rng(&mut self.world, |rng| (rng.gen_range(0.0..width), rng.gen_range(0.0..height)))
    }

    /// Step the simulation forward by `dt_ms` milliseconds.
    pub fn step(&mut self, dt_ms: f32) {
        let dt = dt_ms.max(0.0);
        self.world.resource_mut::<DeltaTime>().0 = dt;
        self.world.resource_mut::<SimTick>().increment();

        self.schedule.run(&mut self.world);

        self.tick += 1;
        self.time += f64::from(dt);
    }

    /// Get a snapshot of the current simulation state.
    pub fn snapshot(&mut self) -> Snapshot {
        let mut snapshot = Snapshot::from_world(&mut self.world, self.tick, self.time);
        snapshot.viewport = self.viewport();
        snapshot.cursor = self.cursor;
        snapshot.player = self
            .player
            .and_then(|player| self.world.get::<UnitId>(player))
            .map(|id| id.0);
        snapshot
    }

    /// Get the snapshot as a JSON string.
    pub fn snapshot_json(&mut self) -> String {
        self.snapshot().to_json().unwrap_or_else(|_| "{}".to_string())
    }

    /// Get the current tick number.
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Get the elapsed simulation time in milliseconds.
    pub fn current_time(&self) -> f64 {
        self.time
    }

    pub fn config(&self) -> &SimConfig {
        self.world.resource::<SimConfig>()
    }

    // ========================================================================
    // SPAWNING
    // ========================================================================

    /// Spawn a unit of the given archetype.
    pub fn spawn(&mut self, archetype: Archetype, x: f32, y: f32) -> Entity {
        spawn_archetype(&mut self.world, archetype, x, y)
    }

    /// Spawn a custom unit.
    pub fn spawn_unit(&mut self, bundle: UnitBundle, x: f32, y: f32) -> Entity {
        spawn_unit(&mut self.world, bundle, x, y)
    }

    /// Remove a unit, releasing its group first.
    pub fn despawn(&mut self, unit: Entity) -> bool {
        let removed = groups::despawn_unit(&mut self.world, unit);
        if removed {
            debug!(?unit, "unit despawned");
            if self.player == Some(unit) {
                self.player = None;
            }
        } else {
            trace!(?unit, "despawn: no such unit");
        }
        removed
    }

    pub fn decorate(&mut self, decoration: Decoration, x: f32, y: f32) -> Entity {
        decorate(&mut self.world, decoration, x, y)
    }

    // ========================================================================
    // COMMANDS
    // ========================================================================

    /// Make `leader` the head of a new group.
    pub fn found_group(&mut self, leader: Entity, banner: Banner, honorable: bool) -> Option<Entity> {
        groups::found_group(&mut self.world, leader, banner, honorable)
    }

    pub fn join_group(&mut self, group: Entity, unit: Entity) {
        groups::join(&mut self.world, group, unit);
    }

    pub fn leave_group(&mut self, group: Entity, unit: Entity) {
        groups::leave(&mut self.world, group, unit);
    }

    /// Order a unit (and its followers, if it leads) to ride to `target`.
    pub fn move_to(&mut self, unit: Entity, target: Point) {
        move_to(&mut self.world, unit, target);
    }

    /// Order a unit (and its followers, if it leads) to throw at `target`.
    pub fn throw(&mut self, unit: Entity, target: Point) -> Option<Entity> {
        throw(&mut self.world, unit, target)
    }

    pub fn damage(&mut self, unit: Entity) -> bool {
        damage(&mut self.world, unit)
    }

    pub fn set_player(&mut self, player: Option<Entity>) {
        self.player = player;
    }

    /// The player's unit, if it is still alive.
    pub fn player(&self) -> Option<Entity> {
        self.player.filter(|&player| self.world.get::<UnitId>(player).is_some())
    }

    pub fn set_cursor(&mut self, cursor: Option<Point>) {
        self.cursor = cursor;
    }

    pub fn cursor(&self) -> Option<Point> {
        self.cursor
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    /// Units touching the circle at `(x, y)`, closest first.
    pub fn units_in_radius(&mut self, x: f32, y: f32, radius: f32) -> Vec<Entity> {
        spatial::units_in_radius(&mut self.world, x, y, radius)
    }

    /// World rectangle of the configured viewport size centred on the player.
    pub fn viewport(&self) -> Option<Rect> {
        let pos = self.world.get::<Position>(self.player()?)?;
        let config = self.config();
        let x1 = (pos.x - config.viewport_width / 2.0).floor();
        let y1 = (pos.y - config.viewport_height / 2.0).floor();
        Some(Rect {
            x1,
            y1,
            x2: x1 + config.viewport_width,
            y2: y1 + config.viewport_height,
        })
    }

    /// Translate a point on the canvas into world space.
    pub fn canvas_to_world(&self, point: Point) -> Point {
        match self.viewport() {
            Some(viewport) => Point::new(point.x + viewport.x1, point.y + viewport.y1),
            None => point,
        }
    }

    pub fn position(&self, unit: Entity) -> Option<Position> {
        self.world.get::<Position>(unit).copied()
    }

    pub fn influence(&self, unit: Entity) -> Option<f32> {
        self.world.get::<Influence>(unit).map(|influence| influence.0)
    }

    pub fn group_of(&self, unit: Entity) -> Option<Entity> {
        groups::group_of(&self.world, unit)
    }

    pub fn members(&self, group: Entity) -> Vec<Entity> {
        groups::members_of(&self.world, group)
    }

    pub fn is_leader(&self, unit: Entity) -> bool {
        groups::is_leader(&self.world, unit)
    }

    pub fn is_invulnerable(&self, unit: Entity) -> bool {
        groups::is_invulnerable(&self.world, unit)
    }

    pub fn unit_count(&mut self) -> usize {
        self.world.query::<&UnitId>().iter(&self.world).count()
    }

    pub fn group_count(&mut self) -> usize {
        self.world.query::<&GroupId>().iter(&self.world).count()
    }

    /// Get a reference to the ECS world (for advanced queries).
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Get a mutable reference to the ECS world (for advanced operations).
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}

impl Default for SimWorld {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Direction;
    use crate::groups::tests::banner;

    /// Plain unit with no behavior, so nothing moves on its own.
    fn idle_unit(sim: &mut SimWorld, x: f32, y: f32) -> Entity {
        sim.spawn_unit(UnitBundle::default(), x, y)
    }

    fn leader(sim: &mut SimWorld, x: f32, y: f32, influence: f32) -> (Entity, Entity) {
        let unit = sim.spawn_unit(UnitBundle::default().with_influence(influence), x, y);
        let group = sim.found_group(unit, banner(), false).unwrap();
        (unit, group)
    }

    #[test]
    fn test_new_world() {
        let sim = SimWorld::new();
        assert_eq!(sim.current_tick(), 0);
        assert_eq!(sim.player(), None);
        assert_eq!(sim.viewport(), None);
    }

    #[test]
    fn test_step_advances_tick() {
        let mut sim = SimWorld::new();
        sim.step(16.0);
        assert_eq!(sim.current_tick(), 1);
        sim.step(16.0);
        assert_eq!(sim.current_tick(), 2);
        assert_eq!(sim.current_time(), 32.0);
    }

    #[test]
    fn test_leader_absorbs_free_unit() {
        let mut sim = SimWorld::new();
        let (l, group) = leader(&mut sim, 0.0, 0.0, 30.0);
        let u = idle_unit(&mut sim, 35.0, 0.0);

        sim.step(16.0);

        assert_eq!(sim.group_of(u), Some(group));
        assert_eq!(sim.influence(l), Some(31.0));
        assert_eq!(sim.members(group), vec![l, u]);
    }

    #[test]
    fn test_stronger_group_consumes_weaker() {
        let mut sim = SimWorld::new();
        let (a, ga) = leader(&mut sim, 0.0, 0.0, 30.0);
        let (b, gb) = leader(&mut sim, 5.0, 0.0, 10.0);
        // Far from A so only the contest can move it.
        let c = idle_unit(&mut sim, 5.0, 100.0);
        sim.join_group(gb, c);
        assert_eq!(sim.influence(b), Some(11.0));

        sim.step(16.0);

        assert!(sim.world().get::<GroupMembers>(gb).is_none());
        assert_eq!(sim.group_of(b), Some(ga));
        assert_eq!(sim.group_of(c), Some(ga));
        assert_eq!(sim.influence(a), Some(32.0));
    }

    #[test]
    fn test_bigger_free_unit_is_still_absorbed() {
        let mut sim = SimWorld::new();
        let (a, group) = leader(&mut sim, 0.0, 0.0, 30.0);
        let b = sim.spawn_unit(UnitBundle::default().with_influence(20.0), 5.0, 0.0);

        sim.step(16.0);

        assert_eq!(sim.group_of(b), Some(group));
        assert_eq!(sim.influence(a), Some(31.0));
    }

    #[test]
    fn test_consume_at_exact_influence_edge() {
        let mut sim = SimWorld::new();
        let (a, ga) = leader(&mut sim, 0.0, 0.0, 40.0);
        let (b, gb) = leader(&mut sim, 10.0, 0.0, 10.0);
        let follower = idle_unit(&mut sim, 10.0, 5.0);
        sim.join_group(gb, follower);
        sim.world_mut().get_mut::<Influence>(b).unwrap().0 = 10.0;

        sim.step(16.0);

        assert!(sim.world().get::<GroupMembers>(gb).is_none());
        assert_eq!(sim.members(ga), vec![a, b, follower]);
        assert_eq!(sim.influence(a), Some(42.0));
    }

    #[test]
    fn test_move_to_timing() {
        let mut sim = SimWorld::new();
        let u = idle_unit(&mut sim, 0.0, 0.0);
        sim.move_to(u, Point::new(100.0, 0.0));

        for _ in 0..50 {
            sim.step(100.0);
        }
        let halfway = sim.position(u).unwrap();
        assert!((halfway.x - 50.0).abs() < 1e-2, "{}", halfway.x);

        for _ in 0..50 {
            sim.step(100.0);
        }
        let end = sim.position(u).unwrap();
        assert_eq!((end.x, end.y, end.z), (100.0, 0.0, 0.0));
        assert!(sim.world().get::<Goal>(u).unwrap().is_idle());
        assert_eq!(sim.world().get::<Heading>(u).unwrap().0, None);
    }

    #[test]
    fn test_damaging_protected_leader_is_noop() {
        let mut sim = SimWorld::new();
        let (l, group) = leader(&mut sim, 0.0, 0.0, 30.0);
        let u = idle_unit(&mut sim, 5.0, 0.0);
        sim.join_group(group, u);

        assert!(sim.is_invulnerable(l));
        assert!(!sim.damage(l));
        assert_eq!(sim.members(group), vec![l, u]);
    }

    #[test]
    fn test_knocked_out_unit_is_not_reabsorbed_while_cooling_down() {
        let mut sim = SimWorld::new();
        let (l, group) = leader(&mut sim, 0.0, 0.0, 30.0);
        let u = idle_unit(&mut sim, 5.0, 0.0);
        sim.join_group(group, u);

        assert!(sim.damage(u));
        sim.step(1000.0);
        assert_eq!(sim.group_of(u), None);

        // The cooldown runs out at the end of this frame's pass.
        sim.step(2500.0);
        assert_eq!(sim.group_of(u), None);
        sim.step(16.0);
        assert_eq!(sim.group_of(u), Some(group));
        assert_eq!(sim.influence(l), Some(31.0));
    }

    #[test]
    fn test_released_follower_is_not_reabsorbed_next_frame() {
        let mut sim = SimWorld::new();
        let (l, group) = leader(&mut sim, 0.0, 0.0, 30.0);
        let u = idle_unit(&mut sim, 5.0, 0.0);
        sim.join_group(group, u);

        sim.leave_group(group, u);
        assert!(sim.is_invulnerable(u));
        sim.step(16.0);
        assert_eq!(sim.group_of(u), None);
        assert_eq!(sim.influence(l), Some(30.0));

        // Recruited again once the removal cooldown has run out.
        sim.step(1000.0);
        sim.step(16.0);
        assert_eq!(sim.group_of(u), Some(group));
    }

    #[test]
    fn test_members_of_a_dissolved_group_are_briefly_invulnerable() {
        let mut sim = SimWorld::new();
        let (l, group) = leader(&mut sim, 0.0, 0.0, 30.0);
        let a = idle_unit(&mut sim, 5.0, 0.0);
        let b = idle_unit(&mut sim, 0.0, 5.0);
        sim.join_group(group, a);
        sim.join_group(group, b);

        sim.leave_group(group, l);
        sim.step(16.0);
        for u in [l, a, b] {
            assert_eq!(sim.group_of(u), None);
            assert!(sim.is_invulnerable(u));
            assert!(!sim.damage(u));
        }
        assert_eq!(sim.unit_count(), 3);
    }

    #[test]
    fn test_thrown_javelin_kills_free_unit() {
        let mut sim = SimWorld::new();
        let thrower = idle_unit(&mut sim, 0.0, 0.0);
        let victim = idle_unit(&mut sim, 90.0, 0.0);

        sim.throw(thrower, Point::new(90.0, 0.0));
        // 90 units plus the overshoot at 300/s: about 317 ms.
        sim.step(200.0);
        assert!(sim.position(victim).is_some());
        sim.step(200.0);
        assert!(sim.position(victim).is_none());

        let snapshot = sim.snapshot();
        assert!(snapshot.projectiles.is_empty());
        assert_eq!(snapshot.decorations.len(), 1);
        assert_eq!(snapshot.decorations[0].frame, Direction::SouthEast.index());
    }

    #[test]
    fn test_viewport_follows_player() {
        let mut sim = SimWorld::new();
        let player = sim.spawn(Archetype::Player, 300.5, 200.0);
        sim.set_player(Some(player));

        let viewport = sim.viewport().unwrap();
        assert_eq!(viewport.x1, 100.0);
        assert_eq!(viewport.y1, 87.0);
        assert_eq!(viewport.width(), 400.0);
        assert_eq!(viewport.height(), 225.0);
        assert_eq!(sim.canvas_to_world(Point::new(10.0, 10.0)), Point::new(110.0, 97.0));

        assert!(sim.despawn(player));
        assert_eq!(sim.viewport(), None);
        assert_eq!(sim.canvas_to_world(Point::new(10.0, 10.0)), Point::new(10.0, 10.0));
    }

    #[test]
    fn test_commands_on_missing_units_are_ignored() {
        let mut sim = SimWorld::new();
        let u = idle_unit(&mut sim, 0.0, 0.0);
        assert!(sim.despawn(u));

        sim.move_to(u, Point::new(10.0, 10.0));
        assert!(sim.throw(u, Point::new(10.0, 10.0)).is_none());
        assert!(!sim.damage(u));
        assert!(!sim.despawn(u));
        assert!(sim.found_group(u, banner(), false).is_none());
        sim.step(16.0);
    }

    #[test]
    fn test_default_world_runs() {
        let mut sim = SimWorld::new_default_world();
        let player = sim.player().unwrap();
        assert!(sim.is_leader(player));
        let units = sim.unit_count();
        assert_eq!(
            units,
            1 + SKIRMISH_RIDERS + SKIRMISH_LEADERS + SKIRMISH_SPIRITS + SKIRMISH_YURTS
        );

        for _ in 0..300 {
            sim.step(16.0);
        }

        // Membership stays consistent both ways.
        let world = sim.world_mut();
        let mut groups = world.query::<(Entity, &GroupLeader, &GroupMembers)>();
        let rows: Vec<_> = groups
            .iter(world)
            .map(|(group, leader, members)| (group, leader.0, members.0.clone()))
            .collect();
        for (group, leader, members) in rows {
            assert_eq!(members.iter().filter(|&&m| m == leader).count(), 1);
            for member in members {
                assert_eq!(world.get::<Membership>(member).unwrap().group, Some(group));
            }
        }
        let mut units = world.query::<(Entity, &Membership)>();
        let rows: Vec<_> = units.iter(world).map(|(e, m)| (e, m.group)).collect();
        for (unit, group) in rows {
            if let Some(group) = group {
                assert!(world.get::<GroupMembers>(group).unwrap().contains(unit));
            }
        }
    }

    #[test]
    fn test_same_seed_same_world() {
        let mut a = SimWorld::new_default_world();
        let mut b = SimWorld::new_default_world();
        for _ in 0..60 {
            a.step(16.0);
            b.step(16.0);
        }
        assert_eq!(a.snapshot_json(), b.snapshot_json());
    }

    #[test]
    fn test_snapshot_json() {
        let mut sim = SimWorld::new_default_world();
        let cursor = Point::new(12.0, 34.0);
        sim.set_cursor(Some(cursor));
        let snapshot = sim.snapshot();
        assert_eq!(snapshot.cursor, Some(cursor));
        assert!(snapshot.viewport.is_some());
        assert!(snapshot.player.is_some());
        assert!(snapshot.groups.iter().any(|g| g.color.a < 1.0));

        let json = sim.snapshot_json();
        assert!(json.contains("units"));
        assert!(json.contains("Horse"));
    }

    #[test]
    fn test_config_from_json() {
        let sim = SimWorld::from_json_config(r#"{ "viewport_width": 320, "viewport_height": 180 }"#).unwrap();
        assert_eq!(sim.config().viewport_width, 320.0);
        assert!(SimWorld::from_json_config(r#"{ "arena_width": -1 }"#).is_err());
    }

    #[test]
    fn test_spirit_rider_roams() {
        let mut sim = SimWorld::new();
        let spirit = sim.spawn(Archetype::SpiritRider, 500.0, 500.0);
        sim.step(16.0);
        let heading = sim.world().get::<Heading>(spirit).unwrap().0;
        assert!(heading.is_some());
        let target = heading.unwrap();
        assert!((0.0..1000.0).contains(&target.x) && (0.0..1000.0).contains(&target.y));
        assert!(sim.world().get::<Goal>(spirit).unwrap().0.is_some());
    }
}
