//! Mission Service
//!
//! The authoritative side of the mission lifecycle: records which mission a
//! player accepted, authorizes item pickup and pays out rewards.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use super::catalog::MissionCatalog;
use super::error::MissionError;
use super::ledger::MissionLedger;
use crate::data::ItemRegistry;
use crate::framework::{Economy, Inventory, MoneyAccount, Notification, Notifier, NotifyKind};

/// On-screen time of the completion message
const COMPLETION_NOTIFY_MS: u64 = 7000;

pub struct MissionService<F, N> {
    catalog: Arc<MissionCatalog>,
    ledger: MissionLedger,
    framework: Arc<F>,
    notifier: Arc<N>,
    items: Arc<ItemRegistry>,
    /// Serializes ledger read-modify-write per player
    locks: DashMap<String, Arc<Mutex<()>>>,
    notify_length_ms: u64,
}

impl<F, N> MissionService<F, N>
where
    F: Inventory + Economy,
    N: Notifier,
{
    pub fn new(
        catalog: Arc<MissionCatalog>,
        framework: Arc<F>,
        notifier: Arc<N>,
        items: Arc<ItemRegistry>,
    ) -> Self {
        Self {
            catalog,
            ledger: MissionLedger::new(),
            framework,
            notifier,
            items,
            locks: DashMap::new(),
            notify_length_ms: crate::framework::DEFAULT_NOTIFY_LENGTH_MS,
        }
    }

    pub fn with_notify_length(mut self, length_ms: u64) -> Self {
        self.notify_length_ms = length_ms;
        self
    }

    pub fn catalog(&self) -> &Arc<MissionCatalog> {
        &self.catalog
    }

    pub fn ledger(&self) -> &MissionLedger {
        &self.ledger
    }

    fn player_lock(&self, player_id: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(player_id.to_string())
            .or_default()
            .value()
            .clone()
    }

    fn notify(&self, player_id: &str, text: impl Into<String>, kind: NotifyKind) {
        let notification = Notification::new(text, kind).with_length(self.notify_length_ms);
        self.notifier.notify(player_id, notification);
    }

    /// Player accepted a mission from the NPC
    pub async fn start_mission(&self, player_id: &str, mission_id: &str) -> bool {
        let lock = self.player_lock(player_id);
        let _guard = lock.lock().await;

        let result = self.try_start(player_id, mission_id).await;
        self.finish(player_id, "start", result)
    }

    async fn try_start(&self, player_id: &str, mission_id: &str) -> Result<(), MissionError> {
        if self.catalog.get(mission_id).await.is_none() {
            return Err(MissionError::UnknownMission(mission_id.to_string()));
        }

        if let Some(previous) = self.ledger.insert(player_id, mission_id) {
            warn!(
                "Player {} started {} while {} was active, replacing it",
                player_id, mission_id, previous.mission_id
            );
        }

        info!("Player {} started mission {}", player_id, mission_id);
        self.notify(player_id, "Mission gestartet! Folge den Anweisungen.", NotifyKind::Success);
        Ok(())
    }

    /// Player picked up the mission object
    pub async fn collect_item(&self, player_id: &str, mission_id: &str, item_name: &str) -> bool {
        let lock = self.player_lock(player_id);
        let _guard = lock.lock().await;

        let result = self.try_collect(player_id, mission_id, item_name).await;
        self.finish(player_id, "collect", result)
    }

    async fn try_collect(
        &self,
        player_id: &str,
        mission_id: &str,
        item_name: &str,
    ) -> Result<(), MissionError> {
        self.require_active(player_id, mission_id)?;

        if !self.framework.add_item(player_id, item_name, 1).await {
            return Err(MissionError::InventoryFull(player_id.to_string()));
        }

        info!("Player {} collected {} for {}", player_id, item_name, mission_id);
        let label = self.items.label(item_name);
        self.notify(player_id, format!("Du hast 1x {} erhalten.", label), NotifyKind::Success);
        Ok(())
    }

    /// Player turned the mission in at the NPC
    pub async fn complete_mission(&self, player_id: &str, mission_id: &str) -> bool {
        let lock = self.player_lock(player_id);
        let _guard = lock.lock().await;

        let result = self.try_complete(player_id, mission_id).await;
        self.finish(player_id, "complete", result)
    }

    async fn try_complete(&self, player_id: &str, mission_id: &str) -> Result<(), MissionError> {
        self.require_active(player_id, mission_id)?;

        let mission = self.catalog.get(mission_id).await
            .ok_or_else(|| MissionError::UnknownMission(mission_id.to_string()))?;
        let player = self.framework.get_player(player_id).await
            .ok_or_else(|| MissionError::PlayerNotFound(player_id.to_string()))?;

        if let Some(item) = mission.data.required_item() {
            if !self.framework.has_item(player_id, item, 1).await {
                return Err(MissionError::MissingItem {
                    player_id: player_id.to_string(),
                    item: item.to_string(),
                });
            }
            if !self.framework.remove_item(player_id, item, 1).await {
                return Err(MissionError::RemoveFailed {
                    player_id: player_id.to_string(),
                    item: item.to_string(),
                });
            }
        }

        let reward = &mission.reward;
        if reward.money > 0 && !self.framework.add_money(player_id, MoneyAccount::Cash, reward.money).await {
            warn!("Failed to pay {} to player {}", reward.money, player_id);
        }

        for item in &reward.items {
            if !self.framework.add_item(player_id, &item.name, item.amount).await {
                self.framework
                    .create_world_drop(player_id, &item.name, item.amount, player.position)
                    .await;
                self.notify(
                    player_id,
                    "Dein Inventar ist voll! Item wurde auf den Boden fallen gelassen.",
                    NotifyKind::Warning,
                );
            }
        }

        self.ledger.remove(player_id);
        info!(
            "Player {} completed mission {} ({}$, {} xp)",
            player_id, mission_id, reward.money, reward.xp
        );
        self.notifier.notify(
            player_id,
            Notification::new(
                format!("Mission erfolgreich abgeschlossen! Belohnung: ${}", reward.money),
                NotifyKind::Success,
            )
            .with_length(COMPLETION_NOTIFY_MS),
        );
        Ok(())
    }

    /// Drop the player's mission; the id is informational only
    pub async fn cancel_mission(&self, player_id: &str, mission_id: &str) {
        let lock = self.player_lock(player_id);
        let _guard = lock.lock().await;

        if let Some(active) = self.ledger.remove(player_id) {
            info!(
                "Player {} cancelled mission {} after {}s (requested {})",
                player_id, active.mission_id, active.elapsed_secs(), mission_id
            );
        }
    }

    /// Forget everything about a disconnected player
    pub async fn cleanup_player_missions(&self, player_id: &str) {
        {
            let lock = self.player_lock(player_id);
            let _guard = lock.lock().await;

            if let Some(active) = self.ledger.remove(player_id) {
                info!(
                    "Dropped mission {} of disconnected player {}",
                    active.mission_id, player_id
                );
            }
        }
        self.locks.remove(player_id);
    }

    fn require_active(&self, player_id: &str, mission_id: &str) -> Result<(), MissionError> {
        if self.ledger.is_active(player_id, mission_id) {
            Ok(())
        } else {
            Err(MissionError::NotActive {
                player_id: player_id.to_string(),
                mission_id: mission_id.to_string(),
            })
        }
    }

    /// Log (and possibly notify) a failed operation, mapping it to the bool contract
    fn finish(&self, player_id: &str, operation: &str, result: Result<(), MissionError>) -> bool {
        let err = match result {
            Ok(()) => return true,
            Err(err) => err,
        };

        match &err {
            MissionError::NotActive { .. } => debug!("Refused {}: {}", operation, err),
            MissionError::UnknownMission(_) | MissionError::PlayerNotFound(_) => {
                error!("Failed to {} mission: {}", operation, err);
            }
            MissionError::InventoryFull(_) => {
                warn!("Failed to {} mission: {}", operation, err);
                self.notify(player_id, "Dein Inventar ist voll!", NotifyKind::Error);
            }
            MissionError::MissingItem { .. } => {
                warn!("Failed to {} mission: {}", operation, err);
                self.notify(player_id, "Du hast das benötigte Item nicht mehr bei dir!", NotifyKind::Error);
            }
            MissionError::RemoveFailed { .. } => {
                error!("Failed to {} mission: {}", operation, err);
                self.notify(player_id, "Du hast das benötigte Item nicht mehr bei dir!", NotifyKind::Error);
            }
        }
        false
    }
}
