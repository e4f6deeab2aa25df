//! Server Mission Ledger
//!
//! Authoritative map of connected player id to their single active mission.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;

/// A player's active mission
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveMission {
    pub mission_id: String,
    pub started_at: DateTime<Utc>,
}

impl ActiveMission {
    pub fn new(mission_id: &str) -> Self {
        Self {
            mission_id: mission_id.to_string(),
            started_at: Utc::now(),
        }
    }

    /// Seconds since the mission was accepted
    pub fn elapsed_secs(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}

/// Ledger entry as exposed over the HTTP API
#[derive(Debug, Clone, Serialize)]
pub struct LedgerEntry {
    pub player_id: String,
    #[serde(flatten)]
    pub mission: ActiveMission,
}

#[derive(Debug, Default)]
pub struct MissionLedger {
    entries: DashMap<String, ActiveMission>,
}

impl MissionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `mission_id` for the player, returning the mission it replaced
    pub fn insert(&self, player_id: &str, mission_id: &str) -> Option<ActiveMission> {
        self.entries.insert(player_id.to_string(), ActiveMission::new(mission_id))
    }

    #[cfg(test)]
    pub fn get(&self, player_id: &str) -> Option<ActiveMission> {
        self.entries.get(player_id).map(|entry| entry.value().clone())
    }

    /// True when the player's active mission is exactly `mission_id`
    pub fn is_active(&self, player_id: &str, mission_id: &str) -> bool {
        self.entries
            .get(player_id)
            .map_or(false, |entry| entry.mission_id == mission_id)
    }

    pub fn remove(&self, player_id: &str) -> Option<ActiveMission> {
        self.entries.remove(player_id).map(|(_, mission)| mission)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn snapshot(&self) -> Vec<LedgerEntry> {
        let mut entries: Vec<LedgerEntry> = self.entries
            .iter()
            .map(|entry| LedgerEntry {
                player_id: entry.key().clone(),
                mission: entry.value().clone(),
            })
            .collect();
        entries.sort_by(|a, b| a.player_id.cmp(&b.player_id));
        entries
    }
}
