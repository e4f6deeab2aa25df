pub mod definition;
pub mod mission;
pub mod npc;

pub use definition::{decode_catalog, MissionDefinition, MissionType};
pub use mission::{MissionManager, MissionStep, ObjectSlot};
pub use npc::{NpcManager, NpcState};

use crate::events::LocalEvent;
use crate::network::messages::ClientMessage;
use crate::ui::Notification;

/// Side effect queued by the mission logic for the host to carry out
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Send to the mission server
    Server(ClientMessage),
    /// Dispatch on the local event bus
    Local(LocalEvent),
    /// Show on the HUD
    Notify(Notification),
}
