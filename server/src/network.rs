//! Server network layer: WebSocket channels feeding the single dispatch loop.
//!
//! Connection tasks do nothing but the handshake, frame decode, and forward;
//! every state-changing event funnels through one mpsc into the main loop,
//! which owns the SessionManager and processes messages strictly in arrival
//! order. Outbound events leave through per-session writer tasks, so a slow
//! client never stalls dispatch.

use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use shared::{ClientEvent, ServerEvent, SessionId};
use std::collections::HashMap;
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::{accept_async, tungstenite::Message};

use crate::session::{Outbound, SessionManager};

/// Messages sent from connection tasks to the main dispatch loop.
///
/// A task emits `Opened` once before its first `Inbound`, and `Closed`
/// exactly once when the channel ends, however it ends; the mpsc preserves
/// that per-channel order all the way to the dispatcher.
#[derive(Debug)]
pub enum ChannelMessage {
    Opened {
        id: SessionId,
        addr: SocketAddr,
        sender: mpsc::UnboundedSender<Message>,
    },
    Inbound {
        id: SessionId,
        event: ClientEvent,
    },
    Closed {
        id: SessionId,
    },
}

/// The listening server. `bind` then `run`; `local_addr` reports the bound
/// address so callers may bind port 0.
pub struct Server {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl Server {
    pub async fn bind(addr: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        info!("Server listening on {}", local_addr);
        Ok(Server {
            listener,
            local_addr,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Accepts channels and dispatches their events until shutdown.
    pub async fn run(
        self,
        mut sessions: SessionManager,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let (server_tx, mut server_rx) = mpsc::unbounded_channel::<ChannelMessage>();
        let mut senders: HashMap<SessionId, mpsc::UnboundedSender<Message>> = HashMap::new();
        let mut next_session_id: SessionId = 1;

        loop {
            tokio::select! {
                result = self.listener.accept() => {
                    match result {
                        Ok((stream, addr)) => {
                            let id = next_session_id;
                            next_session_id += 1;
                            spawn_channel_task(stream, addr, id, server_tx.clone());
                        }
                        Err(e) => error!("Accept error: {}", e),
                    }
                },

                message = server_rx.recv() => {
                    match message {
                        Some(ChannelMessage::Opened { id, addr, sender }) => {
                            info!("Session {} connected from {}", id, addr);
                            senders.insert(id, sender);
                            deliver(&senders, sessions.handle_connect(id));
                        }
                        Some(ChannelMessage::Inbound { id, event }) => {
                            deliver(&senders, sessions.handle_event(id, event));
                        }
                        Some(ChannelMessage::Closed { id }) => {
                            if senders.remove(&id).is_some() {
                                info!("Session {} disconnected", id);
                            }
                            deliver(&senders, sessions.handle_disconnect(id));
                        }
                        None => {
                            info!("Server shutting down");
                            break;
                        }
                    }
                },
            }
        }

        Ok(())
    }
}

/// Performs the deliveries a dispatch step produced, in list order.
fn deliver(senders: &HashMap<SessionId, mpsc::UnboundedSender<Message>>, outbound: Vec<Outbound>) {
    for out in outbound {
        match out {
            Outbound::Unicast { to, event } => send_event(senders, to, &event),
            Outbound::Broadcast { except, event } => {
                for id in senders.keys() {
                    if Some(*id) == except {
                        continue;
                    }
                    send_event(senders, *id, &event);
                }
            }
        }
    }
}

fn send_event(
    senders: &HashMap<SessionId, mpsc::UnboundedSender<Message>>,
    to: SessionId,
    event: &ServerEvent,
) {
    let sender = match senders.get(&to) {
        Some(sender) => sender,
        None => return,
    };

    match serde_json::to_string(event) {
        Ok(text) => {
            // A send failure means the writer task already ended; the
            // channel's Closed message will clean the session up.
            if sender.send(Message::Text(text)).is_err() {
                debug!("Session {} writer gone, dropping event", to);
            }
        }
        Err(e) => error!("Failed to encode event for session {}: {}", to, e),
    }
}

/// Spawns the reader/writer pair for one accepted connection.
fn spawn_channel_task(
    stream: TcpStream,
    addr: SocketAddr,
    id: SessionId,
    server_tx: mpsc::UnboundedSender<ChannelMessage>,
) {
    tokio::spawn(async move {
        let ws_stream = match accept_async(stream).await {
            Ok(ws) => ws,
            Err(e) => {
                warn!("WebSocket handshake failed for {}: {}", addr, e);
                return;
            }
        };

        let (mut ws_sender, mut ws_receiver) = ws_stream.split();
        let (msg_tx, mut msg_rx) = mpsc::unbounded_channel::<Message>();

        if server_tx
            .send(ChannelMessage::Opened {
                id,
                addr,
                sender: msg_tx,
            })
            .is_err()
        {
            return;
        }

        // Writer task: drains queued frames onto the socket until the
        // dispatcher drops our sender or the socket dies.
        let writer = tokio::spawn(async move {
            while let Some(message) = msg_rx.recv().await {
                if ws_sender.send(message).await.is_err() {
                    break;
                }
            }
        });

        // Reader loop: forward decodable events, drop the rest silently.
        while let Some(message) = ws_receiver.next().await {
            match message {
                Ok(Message::Text(text)) => match serde_json::from_str::<ClientEvent>(&text) {
                    Ok(event) => {
                        if server_tx.send(ChannelMessage::Inbound { id, event }).is_err() {
                            break;
                        }
                    }
                    Err(e) => debug!("Undecodable frame from session {}: {}", id, e),
                },
                Ok(Message::Close(_)) => break,
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
                Ok(_) => debug!("Ignoring non-text frame from session {}", id),
                Err(e) => {
                    // An abrupt drop takes the same path as a clean close.
                    debug!("Channel error for session {}: {}", id, e);
                    break;
                }
            }
        }

        let _ = server_tx.send(ChannelMessage::Closed { id });
        writer.abort();
    });
}
