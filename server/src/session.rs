//! Session lifecycle and event dispatch.
//!
//! One explicit mapping from (lifecycle or protocol event, session id) to a
//! store operation plus the outbound deliveries it produces. The network
//! layer owns nothing but transport; everything that decides who hears what
//! lives here, independent of any socket library.

use shared::{ClientEvent, ServerEvent, SessionId};

use crate::state::GameState;

/// One delivery the network layer must perform, in list order.
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    Unicast {
        to: SessionId,
        event: ServerEvent,
    },
    /// Send to every open session, minus the excluded one.
    Broadcast {
        except: Option<SessionId>,
        event: ServerEvent,
    },
}

/// Reacts to channel events against the owned authoritative state.
pub struct SessionManager {
    state: GameState,
}

impl SessionManager {
    pub fn new(state: GameState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Channel opened: create the record, sync the newcomer, announce it.
    ///
    /// The newcomer's own snapshot (welcome, game-state, players-list) is
    /// queued before the join broadcast, so no incremental event can reach a
    /// client that lacks the base state it builds on.
    pub fn handle_connect(&mut self, id: SessionId) -> Vec<Outbound> {
        let record = self.state.create_player(id).clone();
        let (map, players) = self.state.snapshot();
        let others: Vec<_> = players.into_iter().filter(|p| p.id != id).collect();

        vec![
            Outbound::Unicast {
                to: id,
                event: ServerEvent::Welcome {
                    player: record.clone(),
                },
            },
            Outbound::Unicast {
                to: id,
                event: ServerEvent::GameState { map },
            },
            Outbound::Unicast {
                to: id,
                event: ServerEvent::PlayersList { players: others },
            },
            Outbound::Broadcast {
                except: Some(id),
                event: ServerEvent::PlayerJoined { player: record },
            },
        ]
    }

    /// Channel closed, cleanly or abruptly; the transport's close signal is
    /// the sole trigger. A duplicate close finds the record gone and emits
    /// nothing, so every session produces exactly one player-left.
    pub fn handle_disconnect(&mut self, id: SessionId) -> Vec<Outbound> {
        if self.state.remove_player(id) {
            vec![Outbound::Broadcast {
                except: None,
                event: ServerEvent::PlayerLeft { id },
            }]
        } else {
            Vec::new()
        }
    }

    /// One inbound protocol event, applied in arrival order. Concurrent
    /// writes to the same cell or record resolve last-write-wins under that
    /// order; there is no merge logic.
    pub fn handle_event(&mut self, id: SessionId, event: ClientEvent) -> Vec<Outbound> {
        match event {
            ClientEvent::Move { x, y } => {
                if self.state.set_player_position(id, x, y) {
                    vec![Outbound::Broadcast {
                        except: Some(id),
                        event: ServerEvent::PlayerMoved { id, x, y },
                    }]
                } else {
                    Vec::new()
                }
            }
            ClientEvent::Update(patch) => {
                if self.state.apply_player_patch(id, &patch) {
                    vec![Outbound::Broadcast {
                        except: Some(id),
                        event: ServerEvent::PlayerUpdated { id, patch },
                    }]
                } else {
                    Vec::new()
                }
            }
            ClientEvent::MapEdit { row, col, terrain } => {
                // Accepted edits echo to everyone, the author included; the
                // author's client paints only on that echo.
                if self.state.set_map_cell(row, col, terrain) {
                    vec![Outbound::Broadcast {
                        except: None,
                        event: ServerEvent::MapChanged { row, col, terrain },
                    }]
                } else {
                    Vec::new()
                }
            }
        }
    }
}
