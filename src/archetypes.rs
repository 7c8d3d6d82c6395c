//! Unit and scenery factories.
//!
//! Every kind of unit in the game is an ordinary [`UnitBundle`] with a few
//! fields set, plus a group for the kinds that lead one.

use crate::components::*;
use crate::config::SimConfig;
use crate::groups::found_group;
use crate::palette::{Hsla, Palette};
use crate::resources::{with_rng, Serials};
use bevy_ecs::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Speed and starting influence of a group leader.
pub const LEADER_SPEED: f32 = 30.0;
pub const LEADER_INFLUENCE: f32 = 30.0;

/// Spirit riders outpace everyone.
pub const SPIRIT_SPEED: f32 = 60.0;

/// Chance that a new leader's group is honorable.
pub const HONORABLE_CHANCE: f64 = 0.25;

/// Aura colour of the spirit riders' groups (`#4fdaf5`, translucent).
pub const SPIRIT_COLOR: Hsla = Hsla {
    h: 190.0,
    s: 89.0,
    l: 64.0,
    a: 0.376,
};

/// Kinds of unit the world knows how to spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Archetype {
    /// Free horseman that wanders about.
    Rider,
    /// Horseman leading a group, hunting for recruits.
    Leader,
    /// Leader driven by input rather than AI.
    Player,
    /// Invulnerable ghost rider roaming the whole arena.
    SpiritRider,
    /// Tent. Never moves, never recruited, never hurt.
    Yurt,
}

/// Spawn a unit from `bundle` at `(x, y)`, assigning its serial.
pub fn spawn_unit(world: &mut World, mut bundle: UnitBundle, x: f32, y: f32) -> Entity {
    bundle.id = UnitId(world.resource_mut::<Serials>().unit());
    bundle.position = Position::new(x, y);
    let id = bundle.id.0;
    let entity = world.spawn(bundle).id();
    debug!(unit = id, x, y, "unit spawned");
    entity
}

/// Spawn a unit of the given archetype at `(x, y)`.
pub fn spawn_archetype(world: &mut World, archetype: Archetype, x: f32, y: f32) -> Entity {
    match archetype {
        Archetype::Rider => {
            let bundle = with_rng(world, |rng| rider(rng));
            spawn_unit(world, bundle, x, y)
        }
        Archetype::Leader => spawn_leader(world, x, y, Behavior::Hunt),
        Archetype::Player => spawn_leader(world, x, y, Behavior::Idle),
        Archetype::SpiritRider => spawn_spirit_rider(world, x, y),
        Archetype::Yurt => {
            let bundle = UnitBundle {
                invulnerability: Invulnerability::permanent(),
                appearance: Appearance {
                    sheet: SpriteSheet::Yurt,
                    palette: None,
                    mount: None,
                },
                ..Default::default()
            };
            let entity = spawn_unit(world, bundle, x, y);
            world.entity_mut(entity).insert(Stationary);
            entity
        }
    }
}

/// A horse with a random brown-ish coat.
pub fn horse(rng: &mut impl Rng) -> Mount {
    let coat = Hsla::new(
        rng.gen_range(10.0..40.0),
        rng.gen_range(10.0..30.0),
        rng.gen_range(30.0..60.0),
    );
    Mount {
        sheet: SpriteSheet::Horse,
        palette: Some(Palette::coat(coat)),
    }
}

fn rider(rng: &mut impl Rng) -> UnitBundle {
    UnitBundle {
        appearance: Appearance {
            mount: Some(horse(rng)),
            ..Default::default()
        },
        ..Default::default()
    }
    .with_behavior(Behavior::Wander)
}

/// Random banner for a new leader, and whether its group is honorable.
///
/// Honorable groups fly muted colours.
pub fn leader_banner(rng: &mut impl Rng) -> (Banner, bool) {
    let honorable = rng.gen_bool(HONORABLE_CHANCE);
    let h = rng.gen_range(0.0..360.0);
    let (s, l) = if honorable {
        (rng.gen_range(0.0..10.0), rng.gen_range(20.0..60.0))
    } else {
        (rng.gen_range(20.0..40.0), rng.gen_range(40.0..50.0))
    };
    let color = Hsla::new(h, s, l);
    (
        Banner {
            color,
            palette: Palette::livery(color),
        },
        honorable,
    )
}

fn spawn_leader(world: &mut World, x: f32, y: f32, behavior: Behavior) -> Entity {
    let (bundle, (banner, honorable)) = with_rng(world, |rng| {
        let bundle = rider(rng)
            .with_speed(LEADER_SPEED)
            .with_influence(LEADER_INFLUENCE)
            .with_behavior(behavior);
        (bundle, leader_banner(rng))
    });
    let leader = spawn_unit(world, bundle, x, y);
    found_group(world, leader, banner, honorable);
    leader
}

fn spawn_spirit_rider(world: &mut World, x: f32, y: f32) -> Entity {
    let (width, height) = world
        .get_resource::<SimConfig>()
        .map_or((1000.0, 1000.0), |config| (config.arena_width, config.arena_height));
    let palette = Palette::spirit();
    let bundle = UnitBundle {
        invulnerability: Invulnerability::permanent(),
        appearance: Appearance {
            mount: Some(Mount {
                sheet: SpriteSheet::Horse,
                palette: Some(palette.clone()),
            }),
            ..Default::default()
        },
        ..Default::default()
    }
    .with_speed(SPIRIT_SPEED)
    .with_behavior(Behavior::Roam { width, height });

    let spirit = spawn_unit(world, bundle, x, y);
    let banner = Banner {
        color: SPIRIT_COLOR,
        palette,
    };
    found_group(world, spirit, banner, false);
    spirit
}

// ============================================================================
// SCENERY
// ============================================================================

/// Swaying grass tuft of a random variety.
pub fn grass(rng: &mut impl Rng) -> Decoration {
    let (sheet, frames) = match rng.gen_range(0..4) {
        0 => (SpriteSheet::Grass1, (0..SpriteSheet::Grass1.frame_count()).collect()),
        1 => (SpriteSheet::Grass2, (0..SpriteSheet::Grass2.frame_count()).collect()),
        2 => (SpriteSheet::Grass3, vec![0]),
        _ => (SpriteSheet::Grass4, vec![0]),
    };
    Decoration::animated(sheet, frames, rng.gen_range(500.0..2000.0))
}

pub fn dirt(rng: &mut impl Rng) -> Decoration {
    Decoration::still(SpriteSheet::Dirt, rng.gen_range(0..SpriteSheet::Dirt.frame_count()))
}

pub fn rock(rng: &mut impl Rng) -> Decoration {
    Decoration::still(SpriteSheet::Rock, rng.gen_range(0..SpriteSheet::Rock.frame_count()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::groups::{group_of, is_invulnerable, is_leader};
    use crate::systems::movement::move_to;
    use crate::systems::tests::sim_world;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_leader_founds_a_group() {
        let mut world = sim_world();
        let leader = spawn_archetype(&mut world, Archetype::Leader, 10.0, 20.0);

        assert!(is_leader(&world, leader));
        assert_eq!(world.get::<Speed>(leader).unwrap().0, LEADER_SPEED);
        assert_eq!(world.get::<Influence>(leader).unwrap().0, LEADER_INFLUENCE);
        assert_eq!(*world.get::<Behavior>(leader).unwrap(), Behavior::Hunt);
        assert!(world.get::<Appearance>(leader).unwrap().palette.is_some());

        let player = spawn_archetype(&mut world, Archetype::Player, 0.0, 0.0);
        assert_eq!(*world.get::<Behavior>(player).unwrap(), Behavior::Idle);
        assert!(group_of(&world, player).is_some());
    }

    #[test]
    fn test_spirit_rider_is_untouchable() {
        let mut world = sim_world();
        let spirit = spawn_archetype(&mut world, Archetype::SpiritRider, 0.0, 0.0);

        assert!(is_invulnerable(&world, spirit));
        assert!(is_leader(&world, spirit));
        let config = SimConfig::default();
        assert_eq!(
            *world.get::<Behavior>(spirit).unwrap(),
            Behavior::Roam {
                width: config.arena_width,
                height: config.arena_height
            }
        );
        let appearance = world.get::<Appearance>(spirit).unwrap();
        assert_eq!(appearance.palette, Some(Palette::spirit()));
    }

    #[test]
    fn test_yurt_stays_put() {
        let mut world = sim_world();
        let yurt = spawn_archetype(&mut world, Archetype::Yurt, 5.0, 5.0);
        assert!(world.get::<Stationary>(yurt).is_some());
        assert!(is_invulnerable(&world, yurt));

        move_to(&mut world, yurt, Point::new(100.0, 100.0));
        assert!(world.get::<Goal>(yurt).unwrap().is_idle());
    }

    #[test]
    fn test_serials_increase() {
        let mut world = sim_world();
        let a = spawn_archetype(&mut world, Archetype::Rider, 0.0, 0.0);
        let b = spawn_archetype(&mut world, Archetype::Rider, 0.0, 0.0);
        assert!(world.get::<UnitId>(a).unwrap() < world.get::<UnitId>(b).unwrap());
        assert!(world.get::<Appearance>(a).unwrap().mount.is_some());
    }

    #[test]
    fn test_honorable_banners_are_muted() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let (banner, honorable) = leader_banner(&mut rng);
            if honorable {
                assert!(banner.color.s < 10.0);
            } else {
                assert!(banner.color.s >= 20.0);
            }
        }
    }

    #[test]
    fn test_decorations_reference_real_frames() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            for decoration in [grass(&mut rng), dirt(&mut rng), rock(&mut rng)] {
                let count = decoration.sheet.frame_count();
                assert!(decoration.frames.iter().all(|&frame| frame < count));
            }
        }
    }

    #[test]
    fn test_grass_plays_its_sheet_in_order() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            let tuft = grass(&mut rng);
            let expected: Vec<usize> = (0..tuft.sheet.frame_count()).collect();
            assert_eq!(tuft.frames, expected);
            assert!(tuft.period_ms.is_some_and(|period| (500.0..2000.0).contains(&period)));
        }
    }
}
