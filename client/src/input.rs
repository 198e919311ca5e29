//! Input sampling: movement keys, speed adjustment, and editor controls.

use macroquad::prelude::*;

use crate::movement::MoveIntent;

/// Everything one tick of input produced.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputFrame {
    pub intent: MoveIntent,
    /// Edge-triggered: E toggles the map editor.
    pub toggle_editor: bool,
    /// Edge-triggered: +/- adjust movement speed by one step.
    pub speed_delta: f32,
    /// Edge-triggered: terrain palette selection, keys 1-5 as codes 0-4.
    pub palette_code: Option<u8>,
    /// Edge-triggered: F5 persists the current map, F9 restores it.
    pub save_map: bool,
    pub load_map: bool,
    /// World position of a fresh left click.
    pub click: Option<(f32, f32)>,
    pub quit: bool,
}

/// Samples macroquad input once per tick, turning key edges into events.
pub struct InputManager {
    prev_editor: bool,
    prev_speed_up: bool,
    prev_speed_down: bool,
    prev_save: bool,
    prev_load: bool,
    prev_mouse: bool,
    prev_palette: [bool; 5],
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            prev_editor: false,
            prev_speed_up: false,
            prev_speed_down: false,
            prev_save: false,
            prev_load: false,
            prev_mouse: false,
            prev_palette: [false; 5],
        }
    }

    pub fn sample(&mut self) -> InputFrame {
        let intent = MoveIntent {
            up: is_key_down(KeyCode::W) || is_key_down(KeyCode::Up),
            down: is_key_down(KeyCode::S) || is_key_down(KeyCode::Down),
            left: is_key_down(KeyCode::A) || is_key_down(KeyCode::Left),
            right: is_key_down(KeyCode::D) || is_key_down(KeyCode::Right),
        };

        let editor = is_key_down(KeyCode::E);
        let speed_up = is_key_down(KeyCode::Equal);
        let speed_down = is_key_down(KeyCode::Minus);
        let save = is_key_down(KeyCode::F5);
        let load = is_key_down(KeyCode::F9);
        let mouse = is_mouse_button_down(MouseButton::Left);

        let mut frame = InputFrame {
            intent,
            toggle_editor: editor && !self.prev_editor,
            save_map: save && !self.prev_save,
            load_map: load && !self.prev_load,
            quit: is_key_down(KeyCode::Escape),
            ..Default::default()
        };

        if speed_up && !self.prev_speed_up {
            frame.speed_delta += 1.0;
        }
        if speed_down && !self.prev_speed_down {
            frame.speed_delta -= 1.0;
        }

        let palette_keys = [
            KeyCode::Key1,
            KeyCode::Key2,
            KeyCode::Key3,
            KeyCode::Key4,
            KeyCode::Key5,
        ];
        for (code, key) in palette_keys.iter().enumerate() {
            let down = is_key_down(*key);
            if down && !self.prev_palette[code] {
                frame.palette_code = Some(code as u8);
            }
            self.prev_palette[code] = down;
        }

        if mouse && !self.prev_mouse {
            frame.click = Some(mouse_position());
        }

        self.prev_editor = editor;
        self.prev_speed_up = speed_up;
        self.prev_speed_down = speed_down;
        self.prev_save = save;
        self.prev_load = load;
        self.prev_mouse = mouse;

        frame
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}
