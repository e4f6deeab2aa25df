use thiserror::Error;

/// Reasons a mission operation was refused
#[derive(Debug, Error, PartialEq)]
pub enum MissionError {
    #[error("unknown mission '{0}'")]
    UnknownMission(String),
    #[error("player '{0}' is not connected")]
    PlayerNotFound(String),
    #[error("mission '{mission_id}' is not active for player '{player_id}'")]
    NotActive { player_id: String, mission_id: String },
    #[error("inventory of player '{0}' is full")]
    InventoryFull(String),
    #[error("player '{player_id}' no longer holds '{item}'")]
    MissingItem { player_id: String, item: String },
    #[error("failed to remove '{item}' from player '{player_id}'")]
    RemoveFailed { player_id: String, item: String },
}
