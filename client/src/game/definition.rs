//! Mission definitions as received from the server catalog

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};

use crate::engine::Coords;

/// Model used when a mission names no (or an unknown) pickup model
pub const FALLBACK_ITEM_MODEL: &str = "prop_cs_package_01";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissionType {
    StealItem,
    StealMoney,
    StealWeapon,
    StealVehicle,
    Robbery,
}

impl MissionType {
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

/// The catalog sends the type as its snake_case name
impl<'de> Deserialize<'de> for MissionType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        MissionType::from_str(&name)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown mission type '{}'", name)))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ItemReward {
    pub name: String,
    #[serde(default = "default_amount")]
    pub amount: i32,
}

fn default_amount() -> i32 {
    1
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Reward {
    #[serde(default)]
    pub money: i32,
    #[serde(default)]
    pub xp: i32,
    #[serde(default)]
    pub items: Vec<ItemReward>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct MissionData {
    #[serde(default)]
    pub item_name: Option<String>,
    #[serde(default)]
    pub item_label: Option<String>,
    #[serde(default)]
    pub item_description: Option<String>,
    #[serde(default)]
    pub item_image: Option<String>,
    #[serde(default)]
    pub item_model: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, rmpv::Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MissionDefinition {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub hint: String,
    #[serde(default)]
    pub required_level: i32,
    pub mission_type: MissionType,
    #[serde(default)]
    pub reward: Reward,
    #[serde(default)]
    pub data: MissionData,
    pub location: Coords,
}

impl MissionDefinition {
    /// Label of the item, if the mission names one
    pub fn item_label(&self) -> Option<&str> {
        self.data.item_label.as_deref().filter(|l| !l.is_empty())
    }

    pub fn item_name(&self) -> Option<&str> {
        self.data.item_name.as_deref().filter(|n| !n.is_empty())
    }

    /// Pickup model, without validity checks
    pub fn item_model(&self) -> &str {
        self.data
            .item_model
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or(FALLBACK_ITEM_MODEL)
    }
}

/// Decode a catalog snapshot, skipping entries that do not decode
pub fn decode_catalog(value: &rmpv::Value) -> Vec<MissionDefinition> {
    let Some(entries) = value.as_array() else {
        log::warn!("Mission catalog is not an array");
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| match rmpv::ext::from_value::<MissionDefinition>(entry.clone()) {
            Ok(mission) => Some(mission),
            Err(e) => {
                log::warn!("Skipping undecodable mission: {}", e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn statue_mission() -> MissionDefinition {
        MissionDefinition {
            id: "Mission_1".to_string(),
            title: "Hol mir meine Statue zurück".to_string(),
            description: "Der Kollege hat meine Statue gestohlen, hol die mir sofort zurück".to_string(),
            hint: "Ich glaube der Typ hat die am Stadtpark versteckt".to_string(),
            required_level: 0,
            mission_type: MissionType::StealItem,
            reward: Reward {
                money: 150,
                xp: 2,
                items: vec![ItemReward { name: "statue".to_string(), amount: 1 }],
            },
            data: MissionData {
                item_name: Some("statue".to_string()),
                item_label: Some("Statue".to_string()),
                item_model: Some("prop_idol_01".to_string()),
                ..MissionData::default()
            },
            location: Coords::new(-260.0, -964.0, 31.2),
        }
    }

    pub fn money_mission() -> MissionDefinition {
        MissionDefinition {
            id: "Mission_2".to_string(),
            title: "Hol das Geld".to_string(),
            description: "Da liegt noch Geld am Hafen".to_string(),
            hint: String::new(),
            required_level: 0,
            mission_type: MissionType::StealMoney,
            reward: Reward { money: 300, xp: 5, items: Vec::new() },
            data: MissionData::default(),
            location: Coords::new(500.0, 500.0, 10.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmpv::Value;

    fn entry(pairs: Vec<(&str, Value)>) -> Value {
        Value::Map(pairs.into_iter().map(|(k, v)| (Value::from(k), v)).collect())
    }

    fn location() -> Value {
        entry(vec![("x", Value::F64(-260.0)), ("y", Value::F64(-964.0)), ("z", Value::F64(31.2))])
    }

    #[test]
    fn test_decode_catalog_skips_broken_entries() {
        let catalog = Value::Array(vec![
            entry(vec![
                ("id", Value::from("Mission_1")),
                ("title", Value::from("Hol mir meine Statue zurück")),
                ("mission_type", Value::from("steal_item")),
                ("reward", entry(vec![("money", Value::from(150)), ("xp", Value::from(2))])),
                ("data", entry(vec![
                    ("item_name", Value::from("statue")),
                    ("item_label", Value::from("Statue")),
                    ("item_model", Value::Nil),
                    ("glow", Value::Boolean(true)),
                ])),
                ("location", location()),
            ]),
            entry(vec![
                ("id", Value::from("Mission_9")),
                ("title", Value::from("Teleport")),
                ("mission_type", Value::from("teleport")),
                ("location", location()),
            ]),
        ]);

        let missions = decode_catalog(&catalog);
        assert_eq!(missions.len(), 1);

        let statue = &missions[0];
        assert_eq!(statue.mission_type, MissionType::StealItem);
        assert_eq!(statue.reward.money, 150);
        assert_eq!(statue.item_label(), Some("Statue"));
        assert_eq!(statue.item_model(), FALLBACK_ITEM_MODEL);
        assert_eq!(statue.data.extra.get("glow"), Some(&Value::Boolean(true)));
    }

    #[test]
    fn test_positional_type_is_rejected() {
        let catalog = Value::Array(vec![entry(vec![
            ("id", Value::from("Mission_1")),
            ("title", Value::from("Statue")),
            ("mission_type", Value::Array(vec![Value::from(0), Value::Array(Vec::new())])),
            ("location", location()),
        ])]);
        assert!(decode_catalog(&catalog).is_empty());
    }

    #[test]
    fn test_non_array_catalog_is_empty() {
        assert!(decode_catalog(&Value::from("nope")).is_empty());
    }

    #[test]
    fn test_empty_label_counts_as_missing() {
        let mut mission = fixtures::statue_mission();
        mission.data.item_label = Some(String::new());
        assert_eq!(mission.item_label(), None);
    }
}
