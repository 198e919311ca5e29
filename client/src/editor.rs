//! Map editor glue: palette selection, click-to-edit, and persistence of
//! the map under one fixed key.
//!
//! Edits are never painted locally. The mirror changes only when the server
//! echoes map-changed, which keeps the local view identical to the accepted
//! shared state at the cost of one round trip on self-initiated edits.

use log::{info, warn};
use shared::{ClientEvent, MapGrid, Terrain, MAP_COLS, MAP_ROWS, TILE_SIZE};
use std::io;
use std::path::PathBuf;

/// The single key the map is persisted under.
pub const MAP_STORE_KEY: &str = "tileworld-map";

/// Key/value persistence the editor saves and loads maps through. A browser
/// build would back this with local storage; the native build uses one file
/// per key.
pub trait MapStore {
    fn save(&mut self, key: &str, value: &str) -> io::Result<()>;
    fn load(&self, key: &str) -> io::Result<Option<String>>;
}

/// File-backed store: each key becomes `<dir>/<key>.json`.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl MapStore for FileStore {
    fn save(&mut self, key: &str, value: &str) -> io::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.dir.join(format!("{}.json", key)), value)
    }

    fn load(&self, key: &str) -> io::Result<Option<String>> {
        match std::fs::read_to_string(self.dir.join(format!("{}.json", key))) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Editor state: whether the palette is active and which terrain paints.
pub struct MapEditor {
    pub enabled: bool,
    pub selected: Terrain,
}

impl MapEditor {
    pub fn new() -> Self {
        Self {
            enabled: false,
            selected: Terrain::Grass,
        }
    }

    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
    }

    pub fn select(&mut self, terrain: Terrain) {
        self.selected = terrain;
    }

    /// Converts a click into the edit event to send, if the editor is active
    /// and the click lands on the grid.
    pub fn edit_at(&self, x: f32, y: f32) -> Option<ClientEvent> {
        if !self.enabled || x < 0.0 || y < 0.0 {
            return None;
        }
        let col = (x / TILE_SIZE) as usize;
        let row = (y / TILE_SIZE) as usize;
        if row < MAP_ROWS && col < MAP_COLS {
            Some(ClientEvent::MapEdit {
                row,
                col,
                terrain: self.selected,
            })
        } else {
            None
        }
    }

    /// Persists the current (server-accepted) map. Failures are reported and
    /// swallowed; persistence never disturbs the sync core.
    pub fn save_map(&self, store: &mut dyn MapStore, map: &MapGrid) {
        match serde_json::to_string(map) {
            Ok(json) => match store.save(MAP_STORE_KEY, &json) {
                Ok(()) => info!("Map saved under {:?}", MAP_STORE_KEY),
                Err(e) => warn!("Failed to save map: {}", e),
            },
            Err(e) => warn!("Failed to serialize map: {}", e),
        }
    }

    /// Loads the persisted map, if any. A missing or corrupt entry is
    /// reported and treated as absent.
    pub fn load_map(&self, store: &dyn MapStore) -> Option<MapGrid> {
        match store.load(MAP_STORE_KEY) {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(map) => Some(map),
                Err(e) => {
                    warn!("Stored map is corrupt: {}", e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!("Failed to load map: {}", e);
                None
            }
        }
    }
}

impl Default for MapEditor {
    fn default() -> Self {
        Self::new()
    }
}

/// Edit events that would repaint `current` into `target`, cell by cell.
/// Restoring a saved map goes through the normal edit protocol, so the
/// repaint still lands on every client only via the server's echo.
pub fn diff_edits(current: &MapGrid, target: &MapGrid) -> Vec<ClientEvent> {
    let mut edits = Vec::new();
    for row in 0..MAP_ROWS {
        for col in 0..MAP_COLS {
            let desired = target.get(row, col);
            if desired != current.get(row, col) {
                if let Some(terrain) = desired {
                    edits.push(ClientEvent::MapEdit { row, col, terrain });
                }
            }
        }
    }
    edits
}
