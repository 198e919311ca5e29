//! The event protocol carried over each client channel.
//!
//! Every frame is one JSON object, `{"event": <name>, "data": <payload>}`.
//! Client-to-server and server-to-client events are separate enums so each
//! side can only emit what the protocol allows it to send.

use serde::{Deserialize, Serialize};

use crate::map::{MapGrid, Terrain};

/// Identifies one open channel for its lifetime. Assigned by the server at
/// connect time, never reused while the process lives.
pub type SessionId = u32;

/// The authoritative data describing one session's avatar.
///
/// `id` and `color` are fixed at creation; `x`/`y` follow validated move
/// events and `speed` follows update events, all attributed to the owning
/// session only.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PlayerRecord {
    pub id: SessionId,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub speed: f32,
    pub color: String,
}

/// The enumerated set of player fields a client may change after creation.
/// Unrecognized fields in an incoming payload are dropped during
/// deserialization, so identity fields can never be overwritten.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
pub struct PlayerPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f32>,
}

impl PlayerPatch {
    pub fn is_empty(&self) -> bool {
        self.speed.is_none()
    }
}

/// Events a client sends to the server.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    /// The sender asserts its own new position. Rate-limited by the sender.
    #[serde(rename = "player-move")]
    Move { x: f32, y: f32 },
    /// The sender asserts changes to its own mutable fields.
    #[serde(rename = "update-player")]
    Update(PlayerPatch),
    /// The sender proposes a terrain change to the shared map.
    #[serde(rename = "map-edit")]
    MapEdit {
        row: usize,
        col: usize,
        terrain: Terrain,
    },
}

/// Events the server sends to clients.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    /// First frame on a fresh channel: the recipient's own record, carrying
    /// the session id the server assigned to this channel.
    #[serde(rename = "welcome")]
    Welcome { player: PlayerRecord },
    /// Full map snapshot, sent once immediately after connect.
    #[serde(rename = "game-state")]
    GameState { map: MapGrid },
    /// All connected players except the recipient, sent once after connect.
    #[serde(rename = "players-list")]
    PlayersList { players: Vec<PlayerRecord> },
    #[serde(rename = "player-joined")]
    PlayerJoined { player: PlayerRecord },
    #[serde(rename = "player-moved")]
    PlayerMoved { id: SessionId, x: f32, y: f32 },
    #[serde(rename = "player-updated")]
    PlayerUpdated {
        id: SessionId,
        #[serde(flatten)]
        patch: PlayerPatch,
    },
    /// Broadcast to every session, including the author of the edit.
    #[serde(rename = "map-changed")]
    MapChanged {
        row: usize,
        col: usize,
        terrain: Terrain,
    },
    /// Terminal event for a session.
    #[serde(rename = "player-left")]
    PlayerLeft { id: SessionId },
}
