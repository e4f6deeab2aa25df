use std::collections::VecDeque;

use ewebsock::{WsEvent, WsMessage, WsReceiver, WsSender};

use super::messages::ClientMessage;
use super::protocol::{self, ServerEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

const MAX_RECONNECT_ATTEMPTS: u32 = 3;
/// Seconds between connection attempts
const RECONNECT_INTERVAL: f32 = 2.0;
/// Frames buffered while the socket is still opening
const MAX_PENDING: usize = 32;

struct Socket {
    sender: WsSender,
    receiver: WsReceiver,
}

/// Frame-polled connection to the mission server
pub struct NetworkClient {
    socket: Option<Socket>,
    url: String,
    state: ConnectionState,
    pending: VecDeque<Vec<u8>>,
    reconnect_timer: f32,
    reconnect_attempts: u32,
    was_connected: bool,
    reconnection_failed: bool,
}

impl NetworkClient {
    pub fn new(server_url: &str, player_name: &str) -> Self {
        let mut client = Self {
            socket: None,
            url: connect_url(server_url, player_name),
            state: ConnectionState::Disconnected,
            pending: VecDeque::new(),
            reconnect_timer: 0.0,
            reconnect_attempts: 0,
            was_connected: false,
            reconnection_failed: false,
        };
        client.open();
        client
    }

    fn open(&mut self) {
        log::info!("Connecting to mission server at {}", self.url);
        self.state = ConnectionState::Connecting;

        match ewebsock::connect(&self.url, ewebsock::Options::default()) {
            Ok((sender, receiver)) => self.socket = Some(Socket { sender, receiver }),
            Err(e) => {
                log::error!("Mission server connection failed: {}", e);
                self.state = ConnectionState::Disconnected;
            }
        }
    }

    /// Pump the socket; returns the server events received since the last call
    pub fn poll(&mut self, dt: f32) -> Vec<ServerEvent> {
        let Some(socket) = &self.socket else {
            self.state = ConnectionState::Disconnected;
            self.tick_reconnect(dt);
            return Vec::new();
        };

        let mut raw = Vec::new();
        while let Some(event) = socket.receiver.try_recv() {
            raw.push(event);
        }

        let mut received = Vec::new();
        for event in raw {
            match event {
                WsEvent::Opened => self.on_opened(),
                WsEvent::Message(WsMessage::Binary(bytes)) => {
                    match protocol::decode_message(&bytes).and_then(ServerEvent::from_decoded) {
                        Ok(event) => received.push(event),
                        Err(e) => log::warn!("Dropping server frame: {}", e),
                    }
                }
                WsEvent::Message(WsMessage::Text(text)) => {
                    log::debug!("Ignoring text frame: {}", text);
                }
                WsEvent::Closed => {
                    log::info!("Mission server closed the connection");
                    self.drop_socket();
                }
                WsEvent::Error(err) => {
                    log::error!("Mission server socket error: {}", err);
                    self.drop_socket();
                }
                _ => {}
            }
        }

        received
    }

    fn on_opened(&mut self) {
        log::info!("Connected to mission server");
        self.state = ConnectionState::Connected;
        self.reconnect_attempts = 0;
        self.was_connected = true;

        if let Some(socket) = &mut self.socket {
            if !self.pending.is_empty() {
                log::debug!("Flushing {} buffered frame(s)", self.pending.len());
            }
            for bytes in self.pending.drain(..) {
                socket.sender.send(WsMessage::Binary(bytes));
            }
        }
    }

    fn drop_socket(&mut self) {
        self.socket = None;
        self.state = ConnectionState::Disconnected;
    }

    fn tick_reconnect(&mut self, dt: f32) {
        if self.reconnection_failed {
            return;
        }

        self.reconnect_timer += dt;
        if self.reconnect_timer <= RECONNECT_INTERVAL {
            return;
        }
        self.reconnect_timer = 0.0;

        // The first connect may retry forever; a lost session gets a bounded number
        if self.was_connected {
            if self.reconnect_attempts >= MAX_RECONNECT_ATTEMPTS {
                log::error!("Giving up after {} reconnection attempts", MAX_RECONNECT_ATTEMPTS);
                self.reconnection_failed = true;
                self.pending.clear();
                return;
            }
            self.reconnect_attempts += 1;
            log::info!("Reconnection attempt {}/{}", self.reconnect_attempts, MAX_RECONNECT_ATTEMPTS);
        }
        self.open();
    }

    /// Send a mission message, buffering it while the socket is still opening
    pub fn send(&mut self, msg: &ClientMessage) {
        let (msg_type, data) = msg.to_protocol();
        let bytes = match protocol::encode_message(msg_type, &data) {
            Ok(bytes) => bytes,
            Err(e) => {
                log::error!("Failed to encode {}: {}", msg_type, e);
                return;
            }
        };

        match (&mut self.socket, self.state) {
            (Some(socket), ConnectionState::Connected) => {
                socket.sender.send(WsMessage::Binary(bytes));
            }
            _ if self.reconnection_failed => {
                log::warn!("Offline, dropping {}", msg_type);
            }
            _ => {
                if self.pending.len() >= MAX_PENDING {
                    self.pending.pop_front();
                }
                log::debug!("Not connected yet, buffering {}", msg_type);
                self.pending.push_back(bytes);
            }
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    pub fn reconnection_failed(&self) -> bool {
        self.reconnection_failed
    }

    pub fn disconnect(&mut self) {
        self.drop_socket();
        self.pending.clear();
        log::info!("Disconnected from mission server");
    }
}

/// Server url with the player name as query parameter
fn connect_url(server_url: &str, player_name: &str) -> String {
    let mut name = String::with_capacity(player_name.len());
    for byte in player_name.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => name.push(byte as char),
            _ => name.push_str(&format!("%{:02X}", byte)),
        }
    }
    let separator = if server_url.contains('?') { '&' } else { '?' };
    format!("{}{}name={}", server_url, separator, name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_url_escapes_name() {
        assert_eq!(
            connect_url("ws://localhost:2567/ws", "Mr Crime"),
            "ws://localhost:2567/ws?name=Mr%20Crime"
        );
        assert_eq!(connect_url("ws://host/ws?room=1", "Jö"), "ws://host/ws?room=1&name=J%C3%B6");
    }
}
