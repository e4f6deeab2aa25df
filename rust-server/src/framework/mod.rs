//! Collaborator contracts used by the mission service
//!
//! The mission logic only talks to the player framework through these traits.
//! `local` provides the in-memory implementation the server runs with.

pub mod inventory;
pub mod local;

use std::future::Future;

use serde::Serialize;

use crate::mission::Location;

pub use local::LocalFramework;

/// Money accounts a reward can be paid into; missions only pay cash
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MoneyAccount {
    Cash,
}

/// Snapshot of a connected player
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerHandle {
    pub id: String,
    pub name: String,
    pub position: Location,
}

pub trait Inventory: Send + Sync {
    /// Grant `amount` units; false when they don't fit
    fn add_item(&self, player_id: &str, item: &str, amount: i32) -> impl Future<Output = bool> + Send;

    fn remove_item(&self, player_id: &str, item: &str, amount: i32) -> impl Future<Output = bool> + Send;

    fn has_item(&self, player_id: &str, item: &str, amount: i32) -> impl Future<Output = bool> + Send;

    /// Drop items into the world at `coords`
    fn create_world_drop(
        &self,
        player_id: &str,
        item: &str,
        amount: i32,
        coords: Location,
    ) -> impl Future<Output = ()> + Send;
}

pub trait Economy: Send + Sync {
    fn get_player(&self, player_id: &str) -> impl Future<Output = Option<PlayerHandle>> + Send;

    fn add_money(
        &self,
        player_id: &str,
        account: MoneyAccount,
        amount: i32,
    ) -> impl Future<Output = bool> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifyKind {
    Success,
    Error,
    Primary,
    Warning,
}

impl NotifyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotifyKind::Success => "success",
            NotifyKind::Error => "error",
            NotifyKind::Primary => "primary",
            NotifyKind::Warning => "warning",
        }
    }
}

/// Default on-screen time of a notification
pub const DEFAULT_NOTIFY_LENGTH_MS: u64 = 5000;

/// Transient player-facing message
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub text: String,
    pub kind: NotifyKind,
    pub length_ms: u64,
}

impl Notification {
    pub fn new(text: impl Into<String>, kind: NotifyKind) -> Self {
        Self {
            text: text.into(),
            kind,
            length_ms: DEFAULT_NOTIFY_LENGTH_MS,
        }
    }

    pub fn with_length(mut self, length_ms: u64) -> Self {
        self.length_ms = length_ms;
        self
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, player_id: &str, notification: Notification);
}
