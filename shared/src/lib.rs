//! Types shared between the game server and client: the wire protocol,
//! the terrain grid, and the world constants both sides must agree on.

pub mod map;
pub mod protocol;

pub use map::{MapGrid, Terrain, MAP_COLS, MAP_ROWS};
pub use protocol::{ClientEvent, PlayerPatch, PlayerRecord, ServerEvent, SessionId};

/// Edge length of one terrain tile in world pixels.
pub const TILE_SIZE: f32 = 50.0;
/// Avatars are tile-sized squares.
pub const PLAYER_SIZE: f32 = 50.0;
pub const WORLD_WIDTH: f32 = MAP_COLS as f32 * TILE_SIZE;
pub const WORLD_HEIGHT: f32 = MAP_ROWS as f32 * TILE_SIZE;
/// Extent of the random spawn region (upper-left corner of the world).
pub const SPAWN_WIDTH: f32 = 600.0;
pub const SPAWN_HEIGHT: f32 = 400.0;
/// Movement rate assigned to new players, in pixels per tick.
pub const DEFAULT_SPEED: f32 = 5.0;
/// Minimum interval between outbound position updates.
pub const SYNC_INTERVAL_MS: u64 = 100;
