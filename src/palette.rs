//! Cosmetic colour data.
//!
//! The simulation never touches pixels. It only carries the colour swaps a
//! renderer applies to a sprite sheet, plus the aura colour of each group.

use serde::{Deserialize, Serialize};

/// Source colours baked into the sprite sheet (RGBA).
pub const COLOR_HORSE: u32 = 0x694636ff;
pub const COLOR_HORSE_HAIR: u32 = 0x45283cff;
pub const COLOR_CLOTH: u32 = 0x8a8733ff;
pub const COLOR_LEATHER: u32 = 0x8a6f30ff;
pub const COLOR_HIGHLIGHT: u32 = 0x9b9947ff;
pub const COLOR_HAIR: u32 = 0x222034ff;
pub const COLOR_SKIN: u32 = 0xd9a066ff;
pub const COLOR_WOOD: u32 = 0x7d6429ff;

/// Hue in degrees, saturation/lightness in percent, alpha in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hsla {
    pub h: f32,
    pub s: f32,
    pub l: f32,
    pub a: f32,
}

impl Hsla {
    pub fn new(h: f32, s: f32, l: f32) -> Self {
        Self { h, s, l, a: 1.0 }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Packed `0xRRGGBBAA`. Out-of-range saturation/lightness is clamped.
    pub fn to_rgba(self) -> u32 {
        let h = self.h.rem_euclid(360.0) / 360.0;
        let s = (self.s / 100.0).clamp(0.0, 1.0);
        let l = (self.l / 100.0).clamp(0.0, 1.0);

        let (r, g, b) = if s == 0.0 {
            (l, l, l)
        } else {
            let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
            let p = 2.0 * l - q;
            (
                hue_to_channel(p, q, h + 1.0 / 3.0),
                hue_to_channel(p, q, h),
                hue_to_channel(p, q, h - 1.0 / 3.0),
            )
        };

        let byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u32;
        (byte(r) << 24) | (byte(g) << 16) | (byte(b) << 8) | byte(self.a)
    }
}

fn hue_to_channel(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

/// Ordered colour swaps: every pixel equal to `from` is drawn as `to`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    pub swaps: Vec<(u32, u32)>,
}

impl Palette {
    pub fn new(swaps: impl IntoIterator<Item = (u32, u32)>) -> Self {
        Self {
            swaps: swaps.into_iter().collect(),
        }
    }

    /// Replacement for a source colour, if any.
    pub fn lookup(&self, from: u32) -> Option<u32> {
        self.swaps.iter().find(|(src, _)| *src == from).map(|(_, dst)| *dst)
    }

    /// Group livery derived from a base colour: cloth, leather and accent.
    pub fn livery(base: Hsla) -> Self {
        Self::new([
            (COLOR_CLOTH, base.to_rgba()),
            (
                COLOR_LEATHER,
                Hsla::new(base.h - 15.0, base.s - 10.0, base.l - 10.0).to_rgba(),
            ),
            (
                COLOR_HIGHLIGHT,
                Hsla::new(base.h, base.s + 10.0, base.l + 10.0).to_rgba(),
            ),
        ])
    }

    /// Horse coat and mane derived from a base colour.
    pub fn coat(base: Hsla) -> Self {
        Self::new([
            (COLOR_HORSE, base.to_rgba()),
            (
                COLOR_HORSE_HAIR,
                Hsla::new(base.h + 20.0, base.s - 8.0, base.l - 10.0).to_rgba(),
            ),
        ])
    }

    /// Translucent ghostly colours of the spirit riders.
    pub fn spirit() -> Self {
        Self::new([
            (COLOR_CLOTH, 0x4fdaf590),
            (COLOR_LEATHER, 0x2c659b60),
            (COLOR_HIGHLIGHT, 0xa5ffff60),
            (COLOR_HORSE, 0x31717d60),
            (COLOR_HORSE_HAIR, 0x182e5560),
            (COLOR_WOOD, 0x182e5560),
            (COLOR_HAIR, 0x182e5560),
            (COLOR_SKIN, 0xc8f6ff60),
        ])
    }
}
