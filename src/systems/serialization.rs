//! Serialization utilities for simulation state.

use crate::world::Snapshot;

/// Serialize a snapshot to JSON bytes.
pub fn snapshot_to_json(snapshot: &Snapshot) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(snapshot)
}

/// Serialize a snapshot to a JSON string.
pub fn snapshot_to_json_string(snapshot: &Snapshot) -> Result<String, serde_json::Error> {
    serde_json::to_string(snapshot)
}

/// Deserialize a snapshot from JSON bytes.
pub fn snapshot_from_json(data: &[u8]) -> Result<Snapshot, serde_json::Error> {
    serde_json::from_slice(data)
}

/// Deserialize a snapshot from a JSON string.
pub fn snapshot_from_json_string(data: &str) -> Result<Snapshot, serde_json::Error> {
    serde_json::from_str(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Mount, SpriteSheet};
    use crate::geometry::{Direction, Point, Rect};
    use crate::palette::{Hsla, Palette};
    use crate::world::{GroupSnapshot, UnitSnapshot};

    #[test]
    fn test_snapshot_roundtrip() {
        let color = Hsla::new(30.0, 35.0, 45.0);
        let snapshot = Snapshot {
            tick: 42,
            time_ms: 700.0,
            units: vec![UnitSnapshot {
                id: 1,
                x: 10.0,
                y: 20.0,
                z: 1.5,
                direction: Direction::NorthWest,
                sheet: SpriteSheet::Rider,
                frame: Direction::NorthWest.index(),
                palette: Some(Palette::livery(color)),
                mount: Some(Mount {
                    sheet: SpriteSheet::Horse,
                    palette: None,
                }),
                heading: Some(Point::new(40.0, 0.0)),
                group: Some(3),
                leader: true,
                invulnerable: true,
                influence: 31.0,
            }],
            groups: vec![GroupSnapshot {
                id: 3,
                leader: 1,
                x: 10.0,
                y: 20.0,
                influence: 31.0,
                color,
                rgba: color.to_rgba(),
                size: 2,
                honorable: false,
            }],
            projectiles: vec![],
            decorations: vec![],
            viewport: Some(Rect {
                x1: -190.0,
                y1: -92.0,
                x2: 210.0,
                y2: 133.0,
            }),
            cursor: None,
            player: Some(1),
        };

        let json = snapshot_to_json_string(&snapshot).unwrap();
        let restored = snapshot_from_json_string(&json).unwrap();

        assert_eq!(restored.tick, 42);
        assert_eq!(restored.units.len(), 1);
        assert_eq!(restored.units[0].direction, Direction::NorthWest);
        assert_eq!(restored.units[0].palette, snapshot.units[0].palette);
        assert_eq!(restored.groups[0].rgba, color.to_rgba());
        assert_eq!(restored.player, Some(1));

        let bytes = snapshot_to_json(&snapshot).unwrap();
        assert_eq!(snapshot_from_json(&bytes).unwrap().viewport, snapshot.viewport);
    }
}
