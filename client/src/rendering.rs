use macroquad::prelude::*;
use shared::{PlayerRecord, Terrain, MAP_COLS, MAP_ROWS, TILE_SIZE};

use crate::editor::MapEditor;
use crate::mirror::ClientMirror;

/// Draws the tile grid, every avatar, and the HUD from mirror state. A pure
/// consumer: it reads the mirror once per display tick and never mutates it.
pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Renderer
    }

    pub fn render(&self, mirror: &ClientMirror, editor: &MapEditor) {
        clear_background(Color::from_rgba(26, 26, 26, 255));

        self.draw_map(mirror);

        for remote in mirror.remotes().values() {
            self.draw_player(remote, false);
        }
        if let Some(own) = mirror.own() {
            self.draw_player(own, true);
        }

        self.draw_hud(mirror, editor);
    }

    fn draw_map(&self, mirror: &ClientMirror) {
        for row in 0..MAP_ROWS {
            for col in 0..MAP_COLS {
                if let Some(terrain) = mirror.map().get(row, col) {
                    draw_rectangle(
                        col as f32 * TILE_SIZE,
                        row as f32 * TILE_SIZE,
                        TILE_SIZE,
                        TILE_SIZE,
                        terrain_color(terrain),
                    );
                }
            }
        }
    }

    fn draw_player(&self, player: &PlayerRecord, is_own: bool) {
        draw_rectangle(
            player.x,
            player.y,
            player.width,
            player.height,
            record_color(player),
        );
        if is_own {
            draw_rectangle_lines(player.x, player.y, player.width, player.height, 2.0, WHITE);
        }
    }

    fn draw_hud(&self, mirror: &ClientMirror, editor: &MapEditor) {
        let session = match mirror.session_id() {
            Some(id) => format!("session {}", id),
            None => "connecting...".to_string(),
        };
        draw_text(&session, 10.0, 16.0, 16.0, WHITE);

        let players = format!("{} other players", mirror.remotes().len());
        draw_text(&players, 10.0, 32.0, 16.0, WHITE);

        if editor.enabled {
            let palette = format!("editor: painting terrain {}", editor.selected.code());
            draw_text(&palette, 10.0, 48.0, 16.0, YELLOW);
        }
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

fn terrain_color(terrain: Terrain) -> Color {
    match terrain {
        Terrain::Grass => Color::from_rgba(106, 190, 48, 255),
        Terrain::Water => Color::from_rgba(91, 110, 225, 255),
        Terrain::Tree => Color::from_rgba(75, 105, 47, 255),
        Terrain::Sand => Color::from_rgba(217, 196, 145, 255),
        Terrain::Mountain => Color::from_rgba(138, 111, 48, 255),
    }
}

/// Record colors arrive as `hsl(H, 100%, 50%)` strings; unparseable colors
/// fall back to gray rather than failing the draw.
fn record_color(player: &PlayerRecord) -> Color {
    parse_hsl(&player.color)
        .map(|(h, s, l)| hsl_to_color(h, s, l))
        .unwrap_or(GRAY)
}

fn parse_hsl(color: &str) -> Option<(f32, f32, f32)> {
    let inner = color.strip_prefix("hsl(")?.strip_suffix(')')?;
    let mut parts = inner.split(',').map(str::trim);

    let h = parts.next()?.parse::<f32>().ok()?;
    let s = parts.next()?.strip_suffix('%')?.parse::<f32>().ok()? / 100.0;
    let l = parts.next()?.strip_suffix('%')?.parse::<f32>().ok()? / 100.0;
    Some((h, s, l))
}

fn hsl_to_color(h: f32, s: f32, l: f32) -> Color {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = (h.rem_euclid(360.0)) / 60.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let m = l - c / 2.0;

    let (r, g, b) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    Color::new(r + m, g + m, b + m, 1.0)
}
