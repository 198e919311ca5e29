//! # Game Server Library
//!
//! Authoritative server for the multiplayer tile world. It owns the single
//! shared map grid and the set of connected players, and keeps every client
//! consistent by re-broadcasting validated updates in arrival order.
//!
//! ## Core Responsibilities
//!
//! ### Authoritative State
//! The server holds the definitive copy of the shared state: one
//! `PlayerRecord` per open channel and the 12x16 terrain grid. Clients
//! assert their own positions; the server validates map edits against grid
//! bounds and applies everything else last-write-wins.
//!
//! ### Session Lifecycle
//! Opening a channel creates a player record and delivers the full state
//! snapshot before any incremental event; closing a channel (cleanly or by
//! abrupt drop) removes the record and announces the departure exactly once.
//! The transport's close signal is the sole trigger; no logout message is
//! required or trusted.
//!
//! ### Fan-out
//! Each accepted event is re-broadcast to the sessions that need it:
//! position and field updates to everyone but the sender, accepted map edits
//! to everyone including the sender, departures to all remaining sessions.
//!
//! ## Architecture
//!
//! All state mutation happens on one dispatch loop; connection tasks only
//! decode and forward. Events from a single channel are processed in the
//! order the transport delivered them, while events from different channels
//! interleave arbitrarily; the protocol's last-write-wins policy accepts
//! that interleaving rather than trying to serialize across sessions.
//!
//! ## Module Organization
//!
//! ### State Module (`state`)
//! The authoritative store: player creation/removal, position overwrites,
//! enumerated field patches, range-validated map edits, full snapshots.
//!
//! ### Session Module (`session`)
//! The dispatch layer mapping channel events to store operations and the
//! outbound unicast/broadcast list each one produces.
//!
//! ### Network Module (`network`)
//! WebSocket transport: handshake, per-channel reader/writer tasks, and the
//! mpsc funnel into the dispatch loop.

pub mod network;
pub mod session;
pub mod state;
