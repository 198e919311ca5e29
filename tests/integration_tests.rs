//! Integration tests for the multiplayer synchronization core.
//!
//! These tests validate cross-component interactions over real WebSocket
//! channels against a live server instance.

use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use shared::{ClientEvent, MapGrid, PlayerPatch, ServerEvent, SessionId, Terrain};
use tokio::net::TcpStream;
use tokio::time::{timeout, Duration};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

use server::network::Server;
use server::session::SessionManager;
use server::state::GameState;

type Channel = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn start_server() -> std::net::SocketAddr {
    let server = Server::bind("127.0.0.1:0").await.expect("bind server");
    let addr = server.local_addr();
    tokio::spawn(async move {
        if let Err(e) = server.run(SessionManager::new(GameState::new())).await {
            eprintln!("server terminated: {}", e);
        }
    });
    addr
}

async fn connect(addr: std::net::SocketAddr) -> Channel {
    let (channel, _) = connect_async(format!("ws://{}", addr))
        .await
        .expect("connect to server");
    channel
}

/// Reads frames until the next protocol event, skipping transport noise.
async fn recv_event(channel: &mut Channel) -> ServerEvent {
    loop {
        let message = timeout(Duration::from_secs(5), channel.next())
            .await
            .expect("timed out waiting for an event")
            .expect("channel closed while waiting for an event")
            .expect("channel error while waiting for an event");

        if let Message::Text(text) = message {
            return serde_json::from_str(&text).expect("server sent an undecodable event");
        }
    }
}

async fn send_event(channel: &mut Channel, event: &ClientEvent) {
    let text = serde_json::to_string(event).unwrap();
    channel.send(Message::Text(text)).await.expect("send event");
}

/// Runs the connect handshake and returns (session id, map, players-list).
async fn join(channel: &mut Channel) -> (SessionId, MapGrid, Vec<SessionId>) {
    let id = match recv_event(channel).await {
        ServerEvent::Welcome { player } => player.id,
        other => panic!("expected welcome first, got {:?}", other),
    };
    let map = match recv_event(channel).await {
        ServerEvent::GameState { map } => map,
        other => panic!("expected game-state second, got {:?}", other),
    };
    let others = match recv_event(channel).await {
        ServerEvent::PlayersList { players } => players.iter().map(|p| p.id).collect(),
        other => panic!("expected players-list third, got {:?}", other),
    };
    (id, map, others)
}

/// PROTOCOL TESTS
mod protocol_tests {
    use super::*;

    /// The wire frames carry exactly the documented event names.
    #[tokio::test]
    async fn event_names_match_wire_contract() {
        let cases = [
            (
                serde_json::to_value(ClientEvent::Move { x: 1.0, y: 2.0 }).unwrap(),
                "player-move",
            ),
            (
                serde_json::to_value(ClientEvent::Update(PlayerPatch { speed: Some(1.0) }))
                    .unwrap(),
                "update-player",
            ),
            (
                serde_json::to_value(ClientEvent::MapEdit {
                    row: 1,
                    col: 2,
                    terrain: Terrain::Sand,
                })
                .unwrap(),
                "map-edit",
            ),
        ];

        for (value, name) in cases {
            assert_eq!(value["event"], name);
        }
    }

    /// Malformed payloads must fail decoding before they can reach state.
    #[tokio::test]
    async fn malformed_frames_fail_to_decode() {
        let frames = [
            "",
            "not json",
            r#"{"event":"player-move"}"#,
            r#"{"event":"map-edit","data":{"row":0,"col":0,"terrain":99}}"#,
            r#"{"event":"player-move","data":{"x":"NaN","y":0}}"#,
        ];

        for frame in frames {
            let result: Result<ClientEvent, _> = serde_json::from_str(frame);
            assert!(result.is_err(), "frame should not decode: {}", frame);
        }
    }
}

/// CLIENT-SERVER SCENARIO TESTS
mod scenario_tests {
    use super::*;

    /// The full two-client session: join, observe, move, edit, leave.
    #[tokio::test]
    async fn two_client_session_end_to_end() {
        let addr = start_server().await;

        // Client A joins an empty world: default map, nobody else.
        let mut channel_a = connect(addr).await;
        let (id_a, map_a, others_a) = join(&mut channel_a).await;
        assert_eq!(map_a, MapGrid::with_default_layout());
        assert!(others_a.is_empty());

        // Client B joins: B's snapshot lists exactly A, A hears the join.
        let mut channel_b = connect(addr).await;
        let (id_b, map_b, others_b) = join(&mut channel_b).await;
        assert_ne!(id_a, id_b);
        assert_eq!(map_b, MapGrid::with_default_layout());
        assert_eq!(others_b, vec![id_a]);

        match recv_event(&mut channel_a).await {
            ServerEvent::PlayerJoined { player } => assert_eq!(player.id, id_b),
            other => panic!("expected player-joined, got {:?}", other),
        }

        // A moves; B sees the re-broadcast with A's id.
        send_event(&mut channel_a, &ClientEvent::Move { x: 100.0, y: 120.0 }).await;
        match recv_event(&mut channel_b).await {
            ServerEvent::PlayerMoved { id, x, y } => {
                assert_eq!(id, id_a);
                assert_eq!((x, y), (100.0, 120.0));
            }
            other => panic!("expected player-moved, got {:?}", other),
        }

        // A edits the map; BOTH clients receive the echo. For A this is the
        // first event since the join broadcast, which also proves A never
        // received an echo of its own player-move.
        send_event(
            &mut channel_a,
            &ClientEvent::MapEdit {
                row: 0,
                col: 0,
                terrain: Terrain::Water,
            },
        )
        .await;

        for channel in [&mut channel_a, &mut channel_b] {
            match recv_event(channel).await {
                ServerEvent::MapChanged { row, col, terrain } => {
                    assert_eq!((row, col), (0, 0));
                    assert_eq!(terrain, Terrain::Water);
                }
                other => panic!("expected map-changed, got {:?}", other),
            }
        }

        // B departs; A hears exactly one player-left with B's id.
        channel_b.close(None).await.unwrap();
        match recv_event(&mut channel_a).await {
            ServerEvent::PlayerLeft { id } => assert_eq!(id, id_b),
            other => panic!("expected player-left, got {:?}", other),
        }
    }

    /// An abrupt connection drop takes the same removal path as a clean
    /// close: remaining clients still get the player-left broadcast.
    #[tokio::test]
    async fn abrupt_drop_still_broadcasts_player_left() {
        let addr = start_server().await;

        let mut channel_a = connect(addr).await;
        let (_, _, _) = join(&mut channel_a).await;

        let mut channel_b = connect(addr).await;
        let (id_b, _, _) = join(&mut channel_b).await;

        match recv_event(&mut channel_a).await {
            ServerEvent::PlayerJoined { player } => assert_eq!(player.id, id_b),
            other => panic!("expected player-joined, got {:?}", other),
        }

        // No close handshake, just drop the socket.
        drop(channel_b);

        match recv_event(&mut channel_a).await {
            ServerEvent::PlayerLeft { id } => assert_eq!(id, id_b),
            other => panic!("expected player-left, got {:?}", other),
        }
    }

    /// Out-of-range and undecodable edits produce no broadcast at all; the
    /// next valid edit is the next thing anyone hears.
    #[tokio::test]
    async fn rejected_edits_produce_no_broadcast() {
        let addr = start_server().await;

        let mut channel_a = connect(addr).await;
        join(&mut channel_a).await;
        let mut channel_b = connect(addr).await;
        join(&mut channel_b).await;

        match recv_event(&mut channel_a).await {
            ServerEvent::PlayerJoined { .. } => {}
            other => panic!("expected player-joined, got {:?}", other),
        }

        // Out-of-range coordinates: silently rejected at the store.
        send_event(
            &mut channel_a,
            &ClientEvent::MapEdit {
                row: 99,
                col: 99,
                terrain: Terrain::Tree,
            },
        )
        .await;

        // Undecodable frames: dropped before they reach the store.
        channel_a
            .send(Message::Text("garbage".to_string()))
            .await
            .unwrap();
        channel_a
            .send(Message::Text(
                json!({"event": "map-edit", "data": {"row": 0, "col": 0, "terrain": 42}})
                    .to_string(),
            ))
            .await
            .unwrap();

        // A valid edit afterwards is the next event both clients see.
        send_event(
            &mut channel_a,
            &ClientEvent::MapEdit {
                row: 2,
                col: 3,
                terrain: Terrain::Sand,
            },
        )
        .await;

        for channel in [&mut channel_a, &mut channel_b] {
            match recv_event(channel).await {
                ServerEvent::MapChanged { row, col, terrain } => {
                    assert_eq!((row, col), (2, 3));
                    assert_eq!(terrain, Terrain::Sand);
                }
                other => panic!("expected map-changed, got {:?}", other),
            }
        }
    }

    /// Two edits to the same cell from different sessions resolve to the
    /// later one, in arrival order.
    #[tokio::test]
    async fn same_cell_edits_resolve_last_write_wins() {
        let addr = start_server().await;

        let mut channel_a = connect(addr).await;
        join(&mut channel_a).await;
        let mut channel_b = connect(addr).await;
        join(&mut channel_b).await;

        match recv_event(&mut channel_a).await {
            ServerEvent::PlayerJoined { .. } => {}
            other => panic!("expected player-joined, got {:?}", other),
        }

        send_event(
            &mut channel_a,
            &ClientEvent::MapEdit {
                row: 5,
                col: 5,
                terrain: Terrain::Tree,
            },
        )
        .await;
        // Wait for the first echo so the second edit arrives strictly later.
        match recv_event(&mut channel_a).await {
            ServerEvent::MapChanged { terrain, .. } => assert_eq!(terrain, Terrain::Tree),
            other => panic!("expected map-changed, got {:?}", other),
        }

        send_event(
            &mut channel_b,
            &ClientEvent::MapEdit {
                row: 5,
                col: 5,
                terrain: Terrain::Mountain,
            },
        )
        .await;

        // Both observers converge on the later write.
        match recv_event(&mut channel_a).await {
            ServerEvent::MapChanged { row, col, terrain } => {
                assert_eq!((row, col), (5, 5));
                assert_eq!(terrain, Terrain::Mountain);
            }
            other => panic!("expected map-changed, got {:?}", other),
        }

        // A freshly joined client's snapshot carries the final cell value.
        let mut channel_c = connect(addr).await;
        let (_, map_c, _) = join(&mut channel_c).await;
        assert_eq!(map_c.get(5, 5), Some(Terrain::Mountain));
    }
}

/// CLIENT MIRROR INTEGRATION TESTS
mod mirror_tests {
    use super::*;
    use client::mirror::ClientMirror;

    /// A mirror fed straight from the wire tracks the authoritative state.
    #[tokio::test]
    async fn mirror_follows_wire_events() {
        let addr = start_server().await;

        let mut channel_a = connect(addr).await;
        let (id_a, _, _) = join(&mut channel_a).await;

        // B's mirror is driven by exactly what B's channel delivers.
        let mut mirror = ClientMirror::new();
        let mut channel_b = connect(addr).await;
        for _ in 0..3 {
            let event = recv_event(&mut channel_b).await;
            mirror.apply(event);
        }

        assert!(mirror.session_id().is_some());
        assert_ne!(mirror.session_id(), Some(id_a));
        assert_eq!(mirror.remotes().len(), 1);
        assert!(mirror.remotes().contains_key(&id_a));
        assert_eq!(mirror.map(), &MapGrid::with_default_layout());

        send_event(&mut channel_a, &ClientEvent::Move { x: 321.0, y: 43.0 }).await;
        mirror.apply(recv_event(&mut channel_b).await);
        let remote = &mirror.remotes()[&id_a];
        assert_eq!((remote.x, remote.y), (321.0, 43.0));

        channel_a.close(None).await.unwrap();
        mirror.apply(recv_event(&mut channel_b).await);
        assert!(mirror.remotes().is_empty());
    }
}
