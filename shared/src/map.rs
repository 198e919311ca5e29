//! The shared terrain grid and its wire representation.
//!
//! Terrain travels on the wire as its small-integer code so the map payload
//! stays a plain nested array of numbers. The grid validates every edit;
//! out-of-range coordinates are reported as rejected, never applied.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub const MAP_ROWS: usize = 12;
pub const MAP_COLS: usize = 16;

/// One kind of terrain, identified on the wire by its code 0-4.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terrain {
    Grass,
    Water,
    Tree,
    Sand,
    Mountain,
}

impl Terrain {
    pub fn code(self) -> u8 {
        match self {
            Terrain::Grass => 0,
            Terrain::Water => 1,
            Terrain::Tree => 2,
            Terrain::Sand => 3,
            Terrain::Mountain => 4,
        }
    }

    pub fn from_code(code: u8) -> Option<Terrain> {
        match code {
            0 => Some(Terrain::Grass),
            1 => Some(Terrain::Water),
            2 => Some(Terrain::Tree),
            3 => Some(Terrain::Sand),
            4 => Some(Terrain::Mountain),
            _ => None,
        }
    }

    /// Whether an avatar may stand on this terrain.
    pub fn is_walkable(self) -> bool {
        matches!(self, Terrain::Grass | Terrain::Sand)
    }
}

impl Serialize for Terrain {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

impl<'de> Deserialize<'de> for Terrain {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = u8::deserialize(deserializer)?;
        Terrain::from_code(code)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown terrain code {}", code)))
    }
}

use Terrain::Grass as G;
use Terrain::Mountain as M;
use Terrain::Sand as S;
use Terrain::Tree as T;
use Terrain::Water as W;

const DEFAULT_LAYOUT: [[Terrain; MAP_COLS]; MAP_ROWS] = [
    [G, G, G, G, G, G, G, G, G, G, G, G, G, G, G, G],
    [G, W, W, G, G, G, G, T, G, G, W, W, G, G, S, S],
    [G, G, G, G, T, G, G, G, G, G, G, G, G, W, W, S],
    [G, G, T, G, G, G, G, G, G, T, G, G, G, G, S, S],
    [G, G, G, G, W, W, G, G, G, G, G, T, G, M, M, G],
    [G, G, G, G, G, G, G, G, W, W, G, G, M, M, G, G],
    [G, G, G, T, G, G, G, G, G, G, G, T, M, M, G, G],
    [G, G, G, G, G, W, W, G, G, G, G, G, G, T, G, G],
    [G, G, G, G, G, G, G, G, G, W, W, G, G, G, G, G],
    [G, G, T, G, G, G, G, G, G, G, G, T, G, G, G, G],
    [G, G, G, G, G, G, G, G, G, G, G, G, G, G, G, G],
    [G, G, G, G, G, G, G, G, G, G, G, G, G, G, G, G],
];

/// The shared 12x16 terrain layout. Every cell always holds a valid terrain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MapGrid {
    cells: [[Terrain; MAP_COLS]; MAP_ROWS],
}

impl MapGrid {
    /// The layout every fresh server process starts from.
    pub fn with_default_layout() -> Self {
        MapGrid {
            cells: DEFAULT_LAYOUT,
        }
    }

    pub fn get(&self, row: usize, col: usize) -> Option<Terrain> {
        self.cells.get(row).and_then(|r| r.get(col)).copied()
    }

    /// Applies an edit if the coordinates are in range. Returns whether the
    /// edit was accepted; a rejected edit leaves the grid untouched.
    pub fn set_cell(&mut self, row: usize, col: usize, terrain: Terrain) -> bool {
        if row < MAP_ROWS && col < MAP_COLS {
            self.cells[row][col] = terrain;
            true
        } else {
            false
        }
    }

    /// Terrain-walkability predicate consulted by local movement.
    /// Out-of-range cells are not enterable.
    pub fn can_enter(&self, row: usize, col: usize) -> bool {
        self.get(row, col).map_or(false, Terrain::is_walkable)
    }
}
