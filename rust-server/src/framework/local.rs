//! In-memory player framework
//!
//! Tracks connected players with their slot inventory, money and last known
//! position. Everything is dropped when the player disconnects.

use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::inventory::{SlotInventory, WorldDrop};
use super::{Economy, Inventory, MoneyAccount, PlayerHandle};
use crate::data::ItemRegistry;
use crate::mission::Location;

/// Seconds an overflowed reward stays on the ground
pub const DROP_LIFETIME_SECS: i64 = 600;

#[derive(Debug, Clone)]
pub struct PlayerRecord {
    pub name: String,
    pub position: Location,
    pub cash: i64,
    pub inventory: SlotInventory,
}

/// Money summary for the HTTP API
#[derive(Debug, Clone, Serialize)]
pub struct PlayerSummary {
    pub id: String,
    pub name: String,
    pub cash: i64,
    pub position: Location,
}

pub struct LocalFramework {
    players: DashMap<String, PlayerRecord>,
    drops: RwLock<Vec<WorldDrop>>,
    items: Arc<ItemRegistry>,
    inventory_slots: usize,
}

impl LocalFramework {
    pub fn new(items: Arc<ItemRegistry>, inventory_slots: usize) -> Self {
        Self {
            players: DashMap::new(),
            drops: RwLock::new(Vec::new()),
            items,
            inventory_slots,
        }
    }

    pub fn register_player(&self, player_id: &str, name: &str) {
        info!("Player {} ({}) joined the framework", name, player_id);
        self.players.insert(player_id.to_string(), PlayerRecord {
            name: name.to_string(),
            position: Location::default(),
            cash: 0,
            inventory: SlotInventory::new(self.inventory_slots),
        });
    }

    pub fn remove_player(&self, player_id: &str) {
        if self.players.remove(player_id).is_some() {
            debug!("Player {} removed from the framework", player_id);
        }
    }

    pub fn set_position(&self, player_id: &str, position: Location) {
        if let Some(mut player) = self.players.get_mut(player_id) {
            player.position = position;
        }
    }

    #[cfg(test)]
    pub fn cash(&self, player_id: &str) -> Option<i64> {
        self.players.get(player_id).map(|p| p.cash)
    }

    pub fn item_count(&self, player_id: &str, item: &str) -> i32 {
        self.players.get(player_id).map_or(0, |p| p.inventory.count(item))
    }

    /// Drops still lying in the world; expired ones are removed
    pub async fn world_drops(&self) -> Vec<WorldDrop> {
        let mut drops = self.drops.write().await;
        prune_expired(&mut drops);
        drops.clone()
    }

    pub fn players(&self) -> Vec<PlayerSummary> {
        let mut players: Vec<PlayerSummary> = self.players.iter().map(|entry| PlayerSummary {
            id: entry.key().clone(),
            name: entry.name.clone(),
            cash: entry.cash,
            position: entry.position,
        }).collect();
        players.sort_by(|a, b| a.id.cmp(&b.id));
        players
    }
}

impl Inventory for LocalFramework {
    async fn add_item(&self, player_id: &str, item: &str, amount: i32) -> bool {
        match self.players.get_mut(player_id) {
            Some(mut player) => player.inventory.try_add(item, amount, &self.items),
            None => false,
        }
    }

    async fn remove_item(&self, player_id: &str, item: &str, amount: i32) -> bool {
        match self.players.get_mut(player_id) {
            Some(mut player) => player.inventory.remove(item, amount),
            None => false,
        }
    }

    async fn has_item(&self, player_id: &str, item: &str, amount: i32) -> bool {
        self.item_count(player_id, item) >= amount
    }

    async fn create_world_drop(&self, player_id: &str, item: &str, amount: i32, coords: Location) {
        info!(
            "Dropping {}x {} for {} at ({:.1}, {:.1}, {:.1})",
            amount, item, player_id, coords.x, coords.y, coords.z
        );
        let drop = WorldDrop::new(item, amount, coords, player_id);
        let mut drops = self.drops.write().await;
        prune_expired(&mut drops);
        drops.push(drop);
    }
}

fn prune_expired(drops: &mut Vec<WorldDrop>) {
    let now = chrono::Utc::now();
    let before = drops.len();
    drops.retain(|world_drop| !world_drop.is_expired(now, DROP_LIFETIME_SECS));
    if drops.len() < before {
        debug!("Removed {} expired world drop(s)", before - drops.len());
    }
}

impl Economy for LocalFramework {
    async fn get_player(&self, player_id: &str) -> Option<PlayerHandle> {
        self.players.get(player_id).map(|p| PlayerHandle {
            id: player_id.to_string(),
            name: p.name.clone(),
            position: p.position,
        })
    }

    async fn add_money(&self, player_id: &str, account: MoneyAccount, amount: i32) -> bool {
        let Some(mut player) = self.players.get_mut(player_id) else {
            return false;
        };
        match account {
            MoneyAccount::Cash => player.cash += i64::from(amount),
        }
        true
    }
}
