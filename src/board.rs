//! Board layout descriptor
//!
//! The config collaborator supplies one of these at board-generation time;
//! the core consumes it exactly once per level via `World::generate_board`.
//! Layouts are plain data and load from JSON for custom boards.

use serde::{Deserialize, Serialize};

use crate::sim::entities::TileType;

/// Position and type for a single tile
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TileDescriptor {
    pub x: f32,
    pub y: f32,
    pub kind: TileType,
}

/// A full board worth of tiles
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoardLayout {
    pub tiles: Vec<TileDescriptor>,
}

impl BoardLayout {
    /// The stock 8x12 grid: 65 px column stride, 25 px row stride,
    /// origin (100, 100), cycling the four tile types with a per-row
    /// phase shift so no column is all one type.
    pub fn default_grid() -> Self {
        const CYCLE: [TileType; 4] = [
            TileType::Regular,
            TileType::Hard,
            TileType::Unbreakable,
            TileType::Explosive,
        ];

        let mut tiles = Vec::new();
        for row in 0..8 {
            for col in 0..12 {
                tiles.push(TileDescriptor {
                    x: 100.0 + col as f32 * 65.0,
                    y: 100.0 + row as f32 * 25.0,
                    kind: CYCLE[(col + row) % 4],
                });
            }
        }
        Self { tiles }
    }

    /// Load a layout from JSON (config collaborator format)
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{TILE_HEIGHT, TILE_WIDTH};

    #[test]
    fn test_default_grid_dimensions() {
        let layout = BoardLayout::default_grid();
        assert_eq!(layout.tiles.len(), 96);
        let first = layout.tiles[0];
        assert_eq!(first.x, 100.0);
        assert_eq!(first.y, 100.0);
        // Column stride exceeds tile width: neighbors never overlap
        assert!(65.0 > TILE_WIDTH);
        assert!(25.0 > TILE_HEIGHT);
    }

    #[test]
    fn test_default_grid_mixes_types_per_column() {
        let layout = BoardLayout::default_grid();
        let col0: Vec<TileType> = layout
            .tiles
            .iter()
            .filter(|t| t.x == 100.0)
            .map(|t| t.kind)
            .collect();
        assert!(col0.windows(2).any(|w| w[0] != w[1]));
    }

    #[test]
    fn test_layout_json_round_trip() {
        let layout = BoardLayout::default_grid();
        let json = serde_json::to_string(&layout).unwrap();
        let back = BoardLayout::from_json(&json).unwrap();
        assert_eq!(back.tiles.len(), layout.tiles.len());
    }
}
