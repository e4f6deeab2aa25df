//! Mr Crime mission client
//!
//! The mission logic is host-agnostic: it talks to the game world through
//! [`engine::Engine`] and to the player through [`ui::Presentation`]. The
//! bundled binary hosts it in a macroquad sandbox.

pub mod app;
pub mod config;
pub mod engine;
pub mod events;
pub mod game;
pub mod input;
pub mod network;
pub mod render;
pub mod ui;

pub use app::CrimeClient;
pub use config::ClientConfig;
