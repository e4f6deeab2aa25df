use macroquad::prelude::*;

use crate::app::{RELOAD_COMMAND, RESPAWN_COMMAND};

/// World units per second
const WALK_SPEED: f32 = 30.0;
const RUN_SPEED: f32 = 90.0;

const PICK_KEYS: [KeyCode; 9] = [
    KeyCode::Key1,
    KeyCode::Key2,
    KeyCode::Key3,
    KeyCode::Key4,
    KeyCode::Key5,
    KeyCode::Key6,
    KeyCode::Key7,
    KeyCode::Key8,
    KeyCode::Key9,
];

/// Input commands for the sandbox host
#[derive(Debug, Clone, PartialEq)]
pub enum InputCommand {
    Move { dx: f32, dy: f32 },
    Interact,
    MenuMove(i32),
    MenuConfirm,
    /// Zero based index among the selectable entries
    MenuPick(usize),
    MenuClose,
    Command(&'static str),
}

pub struct InputHandler;

impl InputHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn process(&mut self, menu_open: bool, dt: f32) -> Vec<InputCommand> {
        let mut commands = Vec::new();

        if is_key_pressed(KeyCode::F5) {
            commands.push(InputCommand::Command(RELOAD_COMMAND));
        }
        if is_key_pressed(KeyCode::F6) {
            commands.push(InputCommand::Command(RESPAWN_COMMAND));
        }

        if menu_open {
            if is_key_pressed(KeyCode::Up) || is_key_pressed(KeyCode::W) {
                commands.push(InputCommand::MenuMove(-1));
            }
            if is_key_pressed(KeyCode::Down) || is_key_pressed(KeyCode::S) {
                commands.push(InputCommand::MenuMove(1));
            }
            if is_key_pressed(KeyCode::Enter) {
                commands.push(InputCommand::MenuConfirm);
            }
            if is_key_pressed(KeyCode::Escape) {
                commands.push(InputCommand::MenuClose);
            }
            for (n, key) in PICK_KEYS.iter().enumerate() {
                if is_key_pressed(*key) {
                    commands.push(InputCommand::MenuPick(n));
                }
            }
            return commands;
        }

        let mut dx: f32 = 0.0;
        let mut dy: f32 = 0.0;
        if is_key_down(KeyCode::W) || is_key_down(KeyCode::Up) {
            dy += 1.0;
        }
        if is_key_down(KeyCode::S) || is_key_down(KeyCode::Down) {
            dy -= 1.0;
        }
        if is_key_down(KeyCode::A) || is_key_down(KeyCode::Left) {
            dx -= 1.0;
        }
        if is_key_down(KeyCode::D) || is_key_down(KeyCode::Right) {
            dx += 1.0;
        }
        if dx != 0.0 || dy != 0.0 {
            let speed = if is_key_down(KeyCode::LeftShift) { RUN_SPEED } else { WALK_SPEED };
            let len = (dx * dx + dy * dy).sqrt();
            commands.push(InputCommand::Move {
                dx: dx / len * speed * dt,
                dy: dy / len * speed * dt,
            });
        }

        if is_key_pressed(KeyCode::E) {
            commands.push(InputCommand::Interact);
        }

        commands
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}
