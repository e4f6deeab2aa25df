//! Colors shared by the sandbox views

use macroquad::prelude::Color;

pub const WORLD_BG: Color = Color::new(0.118, 0.118, 0.157, 1.0);           // rgba(30, 30, 40, 255)
pub const GRID_LINE: Color = Color::new(0.18, 0.18, 0.23, 1.0);
pub const PLAYER: Color = Color::new(0.345, 0.549, 0.824, 1.0);             // rgba(88, 140, 210, 255)
pub const PED: Color = Color::new(0.424, 0.345, 0.580, 1.0);                // rgba(108, 88, 148, 255)
pub const OBJECT: Color = Color::new(1.0, 0.824, 0.314, 1.0);               // rgba(255, 210, 80, 255)
pub const BLIP: Color = Color::new(0.855, 0.698, 0.424, 1.0);               // rgba(218, 178, 108, 255)
pub const ROUTE: Color = Color::new(0.855, 0.698, 0.424, 0.35);

pub const PANEL_BG_DARK: Color = Color::new(0.071, 0.071, 0.094, 0.961);    // rgba(18, 18, 24, 245)
pub const FRAME_MID: Color = Color::new(0.557, 0.424, 0.267, 1.0);          // rgba(142, 108, 68, 255)
pub const HEADER_BG: Color = Color::new(0.141, 0.125, 0.165, 1.0);          // rgba(36, 32, 42, 255)
pub const ROW_SELECTED: Color = Color::new(0.188, 0.188, 0.282, 1.0);       // rgba(48, 48, 72, 255)

pub const TEXT_TITLE: Color = Color::new(0.855, 0.737, 0.502, 1.0);         // rgba(218, 188, 128, 255)
pub const TEXT_NORMAL: Color = Color::new(0.824, 0.824, 0.855, 1.0);        // rgba(210, 210, 218, 255)
pub const TEXT_DIM: Color = Color::new(0.502, 0.502, 0.541, 1.0);           // rgba(128, 128, 138, 255)

pub const NOTIFY_SUCCESS: Color = Color::new(0.25, 0.6, 0.3, 0.95);
pub const NOTIFY_ERROR: Color = Color::new(0.7, 0.22, 0.22, 0.95);
pub const NOTIFY_PRIMARY: Color = Color::new(0.22, 0.36, 0.62, 0.95);
pub const NOTIFY_WARNING: Color = Color::new(0.75, 0.55, 0.15, 0.95);
