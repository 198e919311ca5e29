//! Client event loop: one channel to the server, folded into the mirror.
//!
//! A single select loop drives everything, so inbound events and local ticks
//! never interleave partially: each arm runs to completion against the
//! mirror before the next one starts.

use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info};
use shared::{ClientEvent, PlayerPatch, ServerEvent, Terrain};
use std::time::{Duration as StdDuration, SystemTime, UNIX_EPOCH};
use tokio::time::{interval, Duration};
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::editor::{self, FileStore, MapEditor};
use crate::input::{InputFrame, InputManager};
use crate::mirror::ClientMirror;
use crate::movement::{self, PositionSync};
use crate::rendering::Renderer;

const MIN_SPEED: f32 = 1.0;
const MAX_SPEED: f32 = 20.0;

pub struct Client {
    mirror: ClientMirror,
    editor: MapEditor,
    renderer: Renderer,
    store: FileStore,
    sync: Option<PositionSync>,
}

impl Client {
    pub fn new(store_dir: &str) -> Self {
        Client {
            mirror: ClientMirror::new(),
            editor: MapEditor::new(),
            renderer: Renderer::new(),
            store: FileStore::new(store_dir),
            sync: None,
        }
    }

    pub async fn run(&mut self, url: &str) -> Result<(), Box<dyn std::error::Error>> {
        info!("Connecting to {}", url);
        let (ws_stream, _) = connect_async(url).await?;
        let (mut ws_sender, mut ws_receiver) = ws_stream.split();

        let mut input = InputManager::new();
        let mut tick_interval = interval(Duration::from_millis(16));
        let mut render_interval = interval(Duration::from_millis(16));

        'main: loop {
            tokio::select! {
                message = ws_receiver.next() => {
                    match message {
                        Some(Ok(Message::Text(text))) => {
                            match serde_json::from_str::<ServerEvent>(&text) {
                                Ok(event) => self.mirror.apply(event),
                                Err(e) => debug!("Undecodable frame: {}", e),
                            }
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            info!("Server closed the channel");
                            break;
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            error!("Channel error: {}", e);
                            break;
                        }
                    }
                },

                _ = tick_interval.tick() => {
                    let frame = input.sample();
                    let quit = frame.quit;

                    for event in self.tick(now_ms(), frame) {
                        let text = serde_json::to_string(&event)?;
                        if ws_sender.send(Message::Text(text)).await.is_err() {
                            error!("Channel closed while sending");
                            break 'main;
                        }
                    }

                    if quit {
                        let _ = ws_sender.send(Message::Close(None)).await;
                        break;
                    }
                },

                _ = render_interval.tick() => {
                    self.renderer.render(&self.mirror, &self.editor);
                },
            }
        }

        Ok(())
    }

    /// One local tick: react to input, advance the avatar optimistically
    /// against the local map, and return whatever must go out this tick.
    fn tick(&mut self, now_ms: u64, frame: InputFrame) -> Vec<ClientEvent> {
        let mut outbound = Vec::new();

        if frame.toggle_editor {
            self.editor.toggle();
        }
        if let Some(code) = frame.palette_code {
            if let Some(terrain) = Terrain::from_code(code) {
                self.editor.select(terrain);
            }
        }

        if frame.save_map {
            self.editor.save_map(&mut self.store, self.mirror.map());
        }
        if frame.load_map {
            if let Some(stored) = self.editor.load_map(&self.store) {
                // Repaint through the normal edit protocol; the mirror only
                // changes when the server echoes each cell back.
                outbound.extend(editor::diff_edits(self.mirror.map(), &stored));
            }
        }

        if let Some((x, y)) = frame.click {
            if let Some(edit) = self.editor.edit_at(x, y) {
                outbound.push(edit);
            }
        }

        if frame.speed_delta != 0.0 {
            if let Some(own) = self.mirror.own() {
                let speed = (own.speed + frame.speed_delta).clamp(MIN_SPEED, MAX_SPEED);
                if speed != own.speed {
                    self.mirror.set_own_speed(speed);
                    outbound.push(ClientEvent::Update(PlayerPatch { speed: Some(speed) }));
                }
            }
        }

        // Movement keys belong to the editor overlay while it is open.
        if !self.editor.enabled && !frame.intent.is_idle() {
            if let Some(own) = self.mirror.own() {
                let (x, y) =
                    movement::step(self.mirror.map(), own.x, own.y, own.speed, frame.intent);
                self.mirror.set_own_position(x, y);
            }
        }

        if let Some(own) = self.mirror.own() {
            let (x, y) = (own.x, own.y);
            let sync = self
                .sync
                .get_or_insert_with(|| PositionSync::new(now_ms, x, y));
            if let Some((x, y)) = sync.poll(now_ms, x, y) {
                outbound.push(ClientEvent::Move { x, y });
            }
        }

        outbound
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(StdDuration::from_secs(0))
        .as_millis() as u64
}
