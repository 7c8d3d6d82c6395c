//! World-wide ECS resources shared by several systems.

use bevy_ecs::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Milliseconds elapsed since the previous frame.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct DeltaTime(pub f32);

/// Number of frames simulated so far.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct SimTick(pub u64);

impl SimTick {
    pub fn increment(&mut self) {
        self.0 += 1;
    }
}

/// Random source for AI scatter, palettes and world generation.
#[derive(Resource)]
pub struct SimRng(pub StdRng);

impl SimRng {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

/// Run `f` with the world's random source.
pub fn with_rng<R>(world: &mut World, f: impl FnOnce(&mut StdRng) -> R) -> R {
    let mut rng = world.resource_mut::<SimRng>();
    f(&mut rng.0)
}

/// Next spawn serials for units and groups.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct Serials {
    pub next_unit: u64,
    pub next_group: u64,
}

impl Serials {
    pub fn unit(&mut self) -> u64 {
        let id = self.next_unit;
        self.next_unit += 1;
        id
    }

    pub fn group(&mut self) -> u64 {
        let id = self.next_group;
        self.next_group += 1;
        id
    }
}
