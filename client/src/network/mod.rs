pub mod messages;
pub mod protocol;

#[cfg(not(target_arch = "wasm32"))]
mod client;

#[cfg(not(target_arch = "wasm32"))]
pub use client::{ConnectionState, NetworkClient};
pub use protocol::{ClientError, ServerEvent};
