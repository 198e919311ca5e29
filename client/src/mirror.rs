//! The local mirror of server-authoritative state, and the reconciliation
//! rules for folding inbound events into it.
//!
//! The own record is locally authoritative for movement and only ever
//! mutated through the explicit setters here; everything else is overwritten
//! by whatever the server broadcasts. Events naming a session the mirror no
//! longer tracks are dropped as a benign race with player-left.

use log::{debug, info};
use shared::{MapGrid, PlayerRecord, ServerEvent, SessionId};
use std::collections::HashMap;

pub struct ClientMirror {
    session_id: Option<SessionId>,
    own: Option<PlayerRecord>,
    remotes: HashMap<SessionId, PlayerRecord>,
    map: MapGrid,
}

impl ClientMirror {
    pub fn new() -> Self {
        Self {
            session_id: None,
            own: None,
            remotes: HashMap::new(),
            map: MapGrid::with_default_layout(),
        }
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.session_id
    }

    pub fn own(&self) -> Option<&PlayerRecord> {
        self.own.as_ref()
    }

    pub fn remotes(&self) -> &HashMap<SessionId, PlayerRecord> {
        &self.remotes
    }

    pub fn map(&self) -> &MapGrid {
        &self.map
    }

    /// Accepts the position local movement computed this tick.
    pub fn set_own_position(&mut self, x: f32, y: f32) {
        if let Some(own) = self.own.as_mut() {
            own.x = x;
            own.y = y;
        }
    }

    pub fn set_own_speed(&mut self, speed: f32) {
        if let Some(own) = self.own.as_mut() {
            own.speed = speed;
        }
    }

    /// Folds one inbound event into the mirror.
    pub fn apply(&mut self, event: ServerEvent) {
        match event {
            ServerEvent::Welcome { player } => {
                info!("Connected! Session ID: {}", player.id);
                self.session_id = Some(player.id);
                self.own = Some(player);
            }
            ServerEvent::GameState { map } => {
                self.map = map;
            }
            ServerEvent::PlayersList { players } => {
                // The server already excludes us; the filter guards against
                // our own record ever shadowing itself as a remote.
                self.remotes = players
                    .into_iter()
                    .filter(|p| Some(p.id) != self.session_id)
                    .map(|p| (p.id, p))
                    .collect();
            }
            ServerEvent::PlayerJoined { player } => {
                if Some(player.id) == self.session_id {
                    return;
                }
                info!("Player {} joined", player.id);
                self.remotes.insert(player.id, player);
            }
            ServerEvent::PlayerMoved { id, x, y } => {
                if let Some(remote) = self.remotes.get_mut(&id) {
                    remote.x = x;
                    remote.y = y;
                } else {
                    debug!("Dropping move for unknown session {}", id);
                }
            }
            ServerEvent::PlayerUpdated { id, patch } => {
                if let Some(remote) = self.remotes.get_mut(&id) {
                    if let Some(speed) = patch.speed {
                        remote.speed = speed;
                    }
                } else {
                    debug!("Dropping update for unknown session {}", id);
                }
            }
            ServerEvent::MapChanged { row, col, terrain } => {
                // Only range-valid edits are ever echoed, so this always
                // lands on exactly one cell.
                self.map.set_cell(row, col, terrain);
            }
            ServerEvent::PlayerLeft { id } => {
                info!("Player {} left", id);
                self.remotes.remove(&id);
            }
        }
    }
}

impl Default for ClientMirror {
    fn default() -> Self {
        Self::new()
    }
}
