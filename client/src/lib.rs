//! # Game Client Library
//!
//! Client for the multiplayer tile world: it renders the shared grid and a
//! controllable avatar, keeps a local mirror of everything the server owns,
//! and pushes the player's own movement outward on a throttle.
//!
//! ## Architecture Overview
//!
//! The client splits authority in two. The player's own avatar is locally
//! authoritative: movement integrates against the local map mirror every
//! tick and is never blocked on a server acknowledgement. Everything else
//! (remote players, the shared map) is server-authoritative and overwritten
//! by whatever broadcasts arrive.
//!
//! ### Reconciliation
//! Inbound events fold into the mirror under fixed rules: snapshots replace
//! wholesale, incremental updates apply only to sessions the mirror still
//! tracks, and events naming departed sessions are dropped as benign races.
//!
//! ### Outbound Sync
//! Own-position deltas leave at most once per sync interval and only when
//! the position actually changed, so the outbound rate stays capped no
//! matter how fast the local tick runs. Bursts coalesce into the latest
//! position; intermediate positions are never transmitted.
//!
//! ### Edit Discipline
//! Local map edits are sent to the server and painted only when the server
//! echoes them back, so the local view never diverges from the accepted
//! shared state.
//!
//! ## Module Organization
//!
//! - `mirror`: the local copy of remote state and the reconciliation rules.
//! - `movement`: optimistic movement integration and the position throttle.
//! - `input`: key and mouse sampling into per-tick input frames.
//! - `editor`: map editor glue and local map persistence.
//! - `network`: the channel plus the select loop tying everything together.
//! - `rendering`: the macroquad consumer that draws mirror state.

pub mod editor;
pub mod input;
pub mod mirror;
pub mod movement;
pub mod network;
pub mod rendering;
