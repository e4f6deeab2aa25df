//! Mission Definition Structures
//!
//! Raw structures are deserialized per entry from the catalog TOML, then
//! validated into immutable [`MissionDefinition`]s.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{error, info};

/// Raw mission data as it appears in TOML
///
/// The required fields are optional here so that a single incomplete entry
/// can be rejected without failing the whole catalog.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMission {
    pub id: Option<String>,
    pub title: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub hint: String,
    #[serde(default)]
    pub required_level: i32,
    pub mission_type: Option<String>,
    #[serde(default)]
    pub reward: RawReward,
    #[serde(default)]
    pub data: MissionData,
    #[serde(default)]
    pub location: Location,
}

/// Raw reward as it appears in TOML
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawReward {
    #[serde(default)]
    pub money: i32,
    #[serde(default)]
    pub xp: i32,
    #[serde(default)]
    pub items: Vec<RawItemReward>,
}

/// Item reward entry
#[derive(Debug, Clone, Deserialize)]
pub struct RawItemReward {
    pub name: String,
    #[serde(default = "default_amount")]
    pub amount: i32,
}

fn default_amount() -> i32 {
    1
}

// ============================================================================
// Resolved Mission Structures
// ============================================================================

/// Mission types offered by the NPC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionType {
    StealItem,
    StealMoney,
    StealWeapon,
    StealVehicle,
    Robbery,
}

impl MissionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MissionType::StealItem => "steal_item",
            MissionType::StealMoney => "steal_money",
            MissionType::StealWeapon => "steal_weapon",
            MissionType::StealVehicle => "steal_vehicle",
            MissionType::Robbery => "robbery",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "steal_item" => Some(MissionType::StealItem),
            "steal_money" => Some(MissionType::StealMoney),
            "steal_weapon" => Some(MissionType::StealWeapon),
            "steal_vehicle" => Some(MissionType::StealVehicle),
            "robbery" => Some(MissionType::Robbery),
            _ => None,
        }
    }
}

/// World coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Location {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Item reward entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemReward {
    pub name: String,
    pub amount: i32,
}

/// Mission rewards
#[derive(Debug, Clone, Default, Serialize)]
pub struct Reward {
    pub money: i32,
    pub xp: i32,
    pub items: Vec<ItemReward>,
}

impl Reward {
    /// Item rewards need a name and a positive amount
    pub fn from_raw(raw: &RawReward) -> Result<Self, String> {
        let items = raw.items.iter().map(|i| {
            if i.name.trim().is_empty() {
                return Err("reward item without a name".to_string());
            }
            if i.amount <= 0 {
                return Err(format!("reward item '{}' has amount {}", i.name, i.amount));
            }
            Ok(ItemReward { name: i.name.clone(), amount: i.amount })
        }).collect::<Result<Vec<_>, String>>()?;

        Ok(Self { money: raw.money, xp: raw.xp, items })
    }
}

/// Type-specific mission data
///
/// Known keys are typed; anything else is kept in `extra` and forwarded to
/// the client untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MissionData {
    pub item_name: Option<String>,
    pub item_label: Option<String>,
    pub item_description: Option<String>,
    pub item_image: Option<String>,
    pub item_model: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl MissionData {
    /// Item the player must hand in, if this mission carries one
    pub fn required_item(&self) -> Option<&str> {
        self.item_name.as_deref().filter(|name| !name.is_empty())
    }
}

/// A fully resolved mission definition
#[derive(Debug, Clone, Serialize)]
pub struct MissionDefinition {
    pub id: String,
    pub title: String,
    pub description: String,
    pub hint: String,
    pub required_level: i32,
    pub mission_type: MissionType,
    pub reward: Reward,
    pub data: MissionData,
    pub location: Location,
}

impl MissionDefinition {
    /// Resolve a raw entry, describing why it was rejected on failure
    pub fn from_raw(raw: &RawMission) -> Result<Self, String> {
        let id = non_empty(raw.id.as_deref()).ok_or("missing id")?;
        let title = non_empty(raw.title.as_deref())
            .ok_or_else(|| format!("mission '{}' is missing a title", id))?;
        let type_name = non_empty(raw.mission_type.as_deref())
            .ok_or_else(|| format!("mission '{}' is missing a mission_type", id))?;
        let mission_type = MissionType::from_str(type_name)
            .ok_or_else(|| format!("mission '{}' has unknown mission_type '{}'", id, type_name))?;
        let reward = Reward::from_raw(&raw.reward)
            .map_err(|reason| format!("mission '{}': {}", id, reason))?;

        Ok(Self {
            id: id.to_string(),
            title: title.to_string(),
            description: raw.description.clone(),
            hint: raw.hint.clone(),
            required_level: raw.required_level,
            mission_type,
            reward,
            data: raw.data.clone(),
            location: raw.location,
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Outcome of a validation pass over a catalog
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub accepted: Vec<MissionDefinition>,
    pub rejected: Vec<String>,
}

impl ValidationReport {
    pub fn total(&self) -> usize {
        self.accepted.len() + self.rejected.len()
    }

    /// Record an entry that could not even be decoded
    pub fn reject(&mut self, reason: String) {
        error!("Invalid mission rejected: {}", reason);
        self.rejected.push(reason);
    }
}

/// Filter out invalid entries, keeping catalog order
///
/// A partial catalog is always returned; rejections are logged one by one.
#[cfg(test)]
pub fn validate_missions(raw: &[RawMission]) -> ValidationReport {
    let mut report = ValidationReport::default();
    extend_validated(&mut report, raw);
    report
}

/// Validate `raw` into an existing report (used when some entries already
/// failed to decode)
pub fn extend_validated(report: &mut ValidationReport, raw: &[RawMission]) {
    let mut seen: HashSet<String> = report.accepted.iter().map(|m| m.id.clone()).collect();

    for entry in raw {
        match MissionDefinition::from_raw(entry) {
            Ok(mission) if seen.contains(&mission.id) => {
                report.reject(format!("duplicate mission id '{}'", mission.id));
            }
            Ok(mission) => {
                seen.insert(mission.id.clone());
                report.accepted.push(mission);
            }
            Err(reason) => report.reject(reason),
        }
    }

    info!("{} of {} missions are valid", report.accepted.len(), report.total());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(id: Option<&str>, title: Option<&str>, mission_type: Option<&str>) -> RawMission {
        RawMission {
            id: id.map(String::from),
            title: title.map(String::from),
            mission_type: mission_type.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn test_mission_type_parsing() {
        assert_eq!(MissionType::from_str("steal_item"), Some(MissionType::StealItem));
        assert_eq!(MissionType::from_str("steal_money"), Some(MissionType::StealMoney));
        assert_eq!(MissionType::from_str("steal_vehicle"), Some(MissionType::StealVehicle));
        assert_eq!(MissionType::from_str("robbery"), Some(MissionType::Robbery));
        assert_eq!(MissionType::from_str("arson"), None);
        assert_eq!(MissionType::StealWeapon.as_str(), "steal_weapon");
    }

    #[test]
    fn test_validation_filters_incomplete_entries() {
        let entries = vec![
            raw(Some("Mission_1"), Some("Statue"), Some("steal_item")),
            raw(None, Some("No id"), Some("steal_item")),
            raw(Some("Mission_3"), Some(""), Some("robbery")),
            raw(Some("Mission_4"), Some("No type"), None),
            raw(Some("Mission_5"), Some("Bad type"), Some("arson")),
            raw(Some("Mission_1"), Some("Duplicate"), Some("robbery")),
            raw(Some("Mission_7"), Some("Car"), Some("steal_vehicle")),
        ];

        let report = validate_missions(&entries);

        let ids: Vec<&str> = report.accepted.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["Mission_1", "Mission_7"]);
        assert_eq!(report.rejected.len(), 5);
        assert_eq!(report.total(), entries.len());
        assert!(report.accepted.iter().all(|m| !m.id.is_empty() && !m.title.is_empty()));
    }

    #[test]
    fn test_non_positive_reward_amount_is_rejected() {
        let mut entry = raw(Some("Mission_1"), Some("Statue"), Some("steal_item"));
        entry.reward.items = vec![RawItemReward { name: "statue".to_string(), amount: -1 }];
        assert!(MissionDefinition::from_raw(&entry).unwrap_err().contains("amount -1"));

        entry.reward.items[0].amount = 0;
        assert!(MissionDefinition::from_raw(&entry).is_err());

        entry.reward.items[0].amount = 2;
        assert_eq!(MissionDefinition::from_raw(&entry).unwrap().reward.items[0].amount, 2);

        let report = validate_missions(&[entry.clone(), {
            let mut bad = entry;
            bad.id = Some("Mission_2".to_string());
            bad.reward.items[0].amount = -5;
            bad
        }]);
        assert_eq!(report.accepted.len(), 1);
        assert_eq!(report.rejected.len(), 1);
    }

    #[test]
    fn test_empty_catalog_is_valid() {
        let report = validate_missions(&[]);
        assert!(report.accepted.is_empty());
        assert_eq!(report.total(), 0);
    }

    #[test]
    fn test_required_item_ignores_blank_names() {
        let mut data = MissionData::default();
        assert_eq!(data.required_item(), None);
        data.item_name = Some(String::new());
        assert_eq!(data.required_item(), None);
        data.item_name = Some("statue".to_string());
        assert_eq!(data.required_item(), Some("statue"));
    }
}
