//! Connected WebSocket sessions
//!
//! Every connection registers an outbound channel here; notifications and
//! catalog broadcasts are encoded once and pushed with `try_send`.

use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::framework::{Notification, Notifier};
use crate::protocol::{self, ServerMessage};

#[derive(Default)]
pub struct SessionRegistry {
    senders: DashMap<String, mpsc::Sender<Vec<u8>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, player_id: &str, tx: mpsc::Sender<Vec<u8>>) {
        self.senders.insert(player_id.to_string(), tx);
    }

    pub fn unregister(&self, player_id: &str) {
        self.senders.remove(player_id);
    }

    pub fn len(&self) -> usize {
        self.senders.len()
    }

    /// Send a message to a single player
    pub fn send_to_player(&self, player_id: &str, msg: &ServerMessage) {
        let Some(tx) = self.senders.get(player_id) else {
            debug!("No session for player {}, dropping {}", player_id, msg.msg_type());
            return;
        };
        match protocol::encode_server_message(msg) {
            Ok(bytes) => {
                if let Err(e) = tx.try_send(bytes) {
                    warn!("Failed to send {} to {}: {}", msg.msg_type(), player_id, e);
                }
            }
            Err(e) => warn!("Failed to encode {}: {}", msg.msg_type(), e),
        }
    }

    /// Send a message to every connected player
    pub fn broadcast(&self, msg: &ServerMessage) {
        let bytes = match protocol::encode_server_message(msg) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Failed to encode {}: {}", msg.msg_type(), e);
                return;
            }
        };
        for entry in self.senders.iter() {
            if let Err(e) = entry.value().try_send(bytes.clone()) {
                warn!("Failed to broadcast {} to {}: {}", msg.msg_type(), entry.key(), e);
            }
        }
    }
}

impl Notifier for SessionRegistry {
    fn notify(&self, player_id: &str, notification: Notification) {
        self.send_to_player(player_id, &ServerMessage::Notify(notification));
    }
}
