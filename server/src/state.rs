//! The authoritative state store: the connected-player set and the shared
//! map grid. Single source of truth; no network or session concerns.
//!
//! Every mutation of shared state funnels through the narrow operation set
//! here. The dispatch loop calls these operations one at a time, so each is
//! atomic with respect to all others by construction.

use log::info;
use rand::Rng;
use shared::{
    MapGrid, PlayerPatch, PlayerRecord, SessionId, Terrain, DEFAULT_SPEED, PLAYER_SIZE,
    SPAWN_HEIGHT, SPAWN_WIDTH,
};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct GameState {
    players: HashMap<SessionId, PlayerRecord>,
    map: MapGrid,
}

impl GameState {
    pub fn new() -> Self {
        Self {
            players: HashMap::new(),
            map: MapGrid::with_default_layout(),
        }
    }

    /// Creates the record for a freshly opened session: random spawn inside
    /// the spawn region, random hue color, fixed tile-sized extents.
    ///
    /// Panics if the id is already tracked. Correct session-id assignment
    /// makes that impossible; silently overwriting would leak a duplicate
    /// identity, so a violation here must be loud.
    pub fn create_player(&mut self, id: SessionId) -> &PlayerRecord {
        assert!(
            !self.players.contains_key(&id),
            "session {} created twice",
            id
        );

        let mut rng = rand::thread_rng();
        let record = PlayerRecord {
            id,
            x: rng.gen::<f32>() * SPAWN_WIDTH,
            y: rng.gen::<f32>() * SPAWN_HEIGHT,
            width: PLAYER_SIZE,
            height: PLAYER_SIZE,
            speed: DEFAULT_SPEED,
            color: format!("hsl({}, 100%, 50%)", rng.gen_range(0..360)),
        };

        info!(
            "Player {} spawned at ({:.0}, {:.0})",
            id, record.x, record.y
        );
        self.players.entry(id).or_insert(record)
    }

    /// Deletes the record. Absent ids are a no-op; duplicate close signals
    /// are possible and benign.
    pub fn remove_player(&mut self, id: SessionId) -> bool {
        if self.players.remove(&id).is_some() {
            info!("Player {} removed", id);
            true
        } else {
            false
        }
    }

    /// Overwrites the position the session asserts for itself. No bounds or
    /// collision re-validation happens here; movement is authoritative on
    /// the sending client. No-op if the session already closed.
    pub fn set_player_position(&mut self, id: SessionId, x: f32, y: f32) -> bool {
        if let Some(player) = self.players.get_mut(&id) {
            player.x = x;
            player.y = y;
            true
        } else {
            false
        }
    }

    /// Merges the enumerated mutable fields into the record. No-op if the
    /// session already closed or the patch carries nothing.
    pub fn apply_player_patch(&mut self, id: SessionId, patch: &PlayerPatch) -> bool {
        if patch.is_empty() {
            return false;
        }
        if let Some(player) = self.players.get_mut(&id) {
            if let Some(speed) = patch.speed {
                player.speed = speed;
            }
            true
        } else {
            false
        }
    }

    /// Applies a terrain edit if the coordinates are in range. Rejection is
    /// silent; the caller suppresses the broadcast when this returns false.
    pub fn set_map_cell(&mut self, row: usize, col: usize, terrain: Terrain) -> bool {
        self.map.set_cell(row, col, terrain)
    }

    /// Full current state, for the initial sync of a newly joined client.
    pub fn snapshot(&self) -> (MapGrid, Vec<PlayerRecord>) {
        (self.map.clone(), self.players.values().cloned().collect())
    }

    pub fn player(&self, id: SessionId) -> Option<&PlayerRecord> {
        self.players.get(&id)
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn map(&self) -> &MapGrid {
        &self.map
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}
