//! Local movement integration and the outbound position throttle.
//!
//! Movement is optimistic: integrated against the local map mirror every
//! tick, never waiting on server acknowledgement. Outbound sync is gated by
//! a timestamp check rather than a queue, so bursts of movement between
//! intervals coalesce into the latest position only.

use shared::{MapGrid, PLAYER_SIZE, SYNC_INTERVAL_MS, TILE_SIZE, WORLD_HEIGHT, WORLD_WIDTH};

/// The directional input sampled for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveIntent {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl MoveIntent {
    pub fn is_idle(&self) -> bool {
        !(self.up || self.down || self.left || self.right)
    }
}

/// Advances an avatar one tick: `speed` pixels per pressed axis, clamped to
/// the canvas, and accepted only where every tile under the avatar's box is
/// enterable. Axes resolve independently so the avatar slides along blocked
/// tiles instead of sticking.
pub fn step(map: &MapGrid, x: f32, y: f32, speed: f32, intent: MoveIntent) -> (f32, f32) {
    let mut next_x = x;
    let mut next_y = y;

    let mut dx = 0.0;
    if intent.left {
        dx -= speed;
    }
    if intent.right {
        dx += speed;
    }
    if dx != 0.0 {
        let candidate = (next_x + dx).clamp(0.0, WORLD_WIDTH - PLAYER_SIZE);
        if fits(map, candidate, next_y) {
            next_x = candidate;
        }
    }

    let mut dy = 0.0;
    if intent.up {
        dy -= speed;
    }
    if intent.down {
        dy += speed;
    }
    if dy != 0.0 {
        let candidate = (next_y + dy).clamp(0.0, WORLD_HEIGHT - PLAYER_SIZE);
        if fits(map, next_x, candidate) {
            next_y = candidate;
        }
    }

    (next_x, next_y)
}

/// Whether the avatar's box at (x, y) rests entirely on enterable tiles.
fn fits(map: &MapGrid, x: f32, y: f32) -> bool {
    let col_first = (x / TILE_SIZE) as usize;
    let col_last = ((x + PLAYER_SIZE - 1.0) / TILE_SIZE) as usize;
    let row_first = (y / TILE_SIZE) as usize;
    let row_last = ((y + PLAYER_SIZE - 1.0) / TILE_SIZE) as usize;

    for row in row_first..=row_last {
        for col in col_first..=col_last {
            if !map.can_enter(row, col) {
                return false;
            }
        }
    }
    true
}

/// Rate-limits outbound position updates by timestamp: a send happens only
/// when the minimum interval has elapsed since the last one AND the position
/// changed since it. Intermediate positions inside an interval are never
/// transmitted.
#[derive(Debug)]
pub struct PositionSync {
    last_sent: (f32, f32),
    last_sent_at_ms: u64,
}

impl PositionSync {
    pub fn new(now_ms: u64, x: f32, y: f32) -> Self {
        Self {
            last_sent: (x, y),
            last_sent_at_ms: now_ms,
        }
    }

    /// Called once per tick with the current position. Returns the position
    /// to transmit, or None when throttled or unchanged.
    pub fn poll(&mut self, now_ms: u64, x: f32, y: f32) -> Option<(f32, f32)> {
        if now_ms.saturating_sub(self.last_sent_at_ms) < SYNC_INTERVAL_MS {
            return None;
        }
        if (x, y) == self.last_sent {
            return None;
        }
        self.last_sent = (x, y);
        self.last_sent_at_ms = now_ms;
        Some((x, y))
    }
}
