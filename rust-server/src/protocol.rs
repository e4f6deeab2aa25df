use std::sync::Arc;

use crate::framework::Notification;
use crate::mission::{Location, MissionDefinition};

// ============================================================================
// Client -> Server Messages
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum ClientMessage {
    StartMission { mission_id: String },
    CollectItem { mission_id: String, item_name: String },
    CompleteMission { mission_id: String },
    CancelMission { mission_id: String },
    /// Ask for a fresh catalog (reloaded from disk first)
    RequestMissions,
    /// Last known position, used for reward drops
    Position(Location),
}

// ============================================================================
// Server -> Client Messages
// ============================================================================

#[derive(Debug, Clone)]
pub enum ServerMessage {
    Welcome { player_id: String },
    MissionCatalog { missions: Vec<Arc<MissionDefinition>> },
    Notify(Notification),
}

impl ServerMessage {
    pub fn msg_type(&self) -> &'static str {
        match self {
            ServerMessage::Welcome { .. } => "welcome",
            ServerMessage::MissionCatalog { .. } => "missionCatalog",
            ServerMessage::Notify(_) => "QBCore:Notify",
        }
    }
}

// ============================================================================
// Encoding/Decoding
// ============================================================================

/// Protocol code of a room data frame
pub const ROOM_DATA: u8 = 13;

/// Encode a server message to MessagePack format
/// Format: [13, "msg_type", {data}]
pub fn encode_server_message(msg: &ServerMessage) -> Result<Vec<u8>, String> {
    use rmpv::Value;

    let msg_type = msg.msg_type();

    let data = match msg {
        ServerMessage::Welcome { player_id } => {
            let mut map = Vec::new();
            map.push((
                Value::String("player_id".into()),
                Value::String(player_id.clone().into()),
            ));
            Value::Map(map)
        }
        ServerMessage::MissionCatalog { missions } => {
            let missions = missions
                .iter()
                .map(|m| mission_value(m))
                .collect::<Result<Vec<_>, String>>()?;
            Value::Map(vec![(Value::String("missions".into()), Value::Array(missions))])
        }
        ServerMessage::Notify(notification) => {
            let mut map = Vec::new();
            map.push((
                Value::String("text".into()),
                Value::String(notification.text.clone().into()),
            ));
            map.push((
                Value::String("type".into()),
                Value::String(notification.kind.as_str().into()),
            ));
            map.push((
                Value::String("length".into()),
                Value::Integer(notification.length_ms.into()),
            ));
            Value::Map(map)
        }
    };

    let array = Value::Array(vec![
        Value::Integer(ROOM_DATA.into()),
        Value::String(msg_type.into()),
        data,
    ]);

    let mut buf = Vec::new();
    rmpv::encode::write_value(&mut buf, &array)
        .map_err(|e| format!("Failed to encode message: {}", e))?;

    Ok(buf)
}

/// Decode a client message from MessagePack format
/// Expected format: [13, "msg_type", {data}]
pub fn decode_client_message(data: &[u8]) -> Result<ClientMessage, String> {
    use rmpv::Value;
    use std::io::Cursor;

    let mut cursor = Cursor::new(data);
    let value = rmpv::decode::read_value(&mut cursor)
        .map_err(|e| format!("Failed to decode MessagePack: {}", e))?;

    let array = value
        .as_array()
        .ok_or("Expected array")?;

    if array.len() < 2 {
        return Err("Array too short".to_string());
    }

    let protocol = array[0]
        .as_u64()
        .and_then(|code| u8::try_from(code).ok())
        .ok_or("Protocol code must be a small integer")?;

    if protocol != ROOM_DATA {
        return Err(format!("Unexpected protocol code: {}", protocol));
    }

    let msg_type = array[1]
        .as_str()
        .ok_or("Message type must be string")?;

    let msg_data = if array.len() > 2 {
        &array[2]
    } else {
        &Value::Nil
    };

    match msg_type {
        "crime:server:startMission" => Ok(ClientMessage::StartMission {
            mission_id: require_string(msg_data, "missionId")?,
        }),
        "crime:server:collectItem" => Ok(ClientMessage::CollectItem {
            mission_id: require_string(msg_data, "missionId")?,
            item_name: require_string(msg_data, "itemName")?,
        }),
        "crime:server:completeMission" => Ok(ClientMessage::CompleteMission {
            mission_id: require_string(msg_data, "missionId")?,
        }),
        "crime:server:cancelMission" => Ok(ClientMessage::CancelMission {
            mission_id: extract_string(msg_data, "missionId").unwrap_or_default(),
        }),
        "crime:server:requestMissions" => Ok(ClientMessage::RequestMissions),
        "crime:server:position" => {
            let x = extract_f32(msg_data, "x").unwrap_or(0.0);
            let y = extract_f32(msg_data, "y").unwrap_or(0.0);
            let z = extract_f32(msg_data, "z").unwrap_or(0.0);
            Ok(ClientMessage::Position(Location::new(x, y, z)))
        }
        _ => Err(format!("Unknown message type: {}", msg_type)),
    }
}

/// One catalog entry as a map keyed by field name
fn mission_value(mission: &MissionDefinition) -> Result<rmpv::Value, String> {
    use rmpv::Value;

    let location = Value::Map(vec![
        (Value::from("x"), Value::F32(mission.location.x)),
        (Value::from("y"), Value::F32(mission.location.y)),
        (Value::from("z"), Value::F32(mission.location.z)),
    ]);

    let items = mission.reward.items.iter().map(|item| Value::Map(vec![
        (Value::from("name"), Value::from(item.name.as_str())),
        (Value::from("amount"), Value::from(item.amount)),
    ])).collect();
    let reward = Value::Map(vec![
        (Value::from("money"), Value::from(mission.reward.money)),
        (Value::from("xp"), Value::from(mission.reward.xp)),
        (Value::from("items"), Value::Array(items)),
    ]);

    let known = [
        ("item_name", &mission.data.item_name),
        ("item_label", &mission.data.item_label),
        ("item_description", &mission.data.item_description),
        ("item_image", &mission.data.item_image),
        ("item_model", &mission.data.item_model),
    ];
    let mut data: Vec<(Value, Value)> = known
        .into_iter()
        .filter_map(|(key, value)| value.as_deref().map(|v| (Value::from(key), Value::from(v))))
        .collect();
    for (key, value) in &mission.data.extra {
        let value = rmpv::ext::to_value(value)
            .map_err(|e| format!("Failed to encode data.{} of {}: {}", key, mission.id, e))?;
        data.push((Value::from(key.as_str()), value));
    }

    Ok(Value::Map(vec![
        (Value::from("id"), Value::from(mission.id.as_str())),
        (Value::from("title"), Value::from(mission.title.as_str())),
        (Value::from("description"), Value::from(mission.description.as_str())),
        (Value::from("hint"), Value::from(mission.hint.as_str())),
        (Value::from("required_level"), Value::from(mission.required_level)),
        (Value::from("mission_type"), Value::from(mission.mission_type.as_str())),
        (Value::from("reward"), reward),
        (Value::from("data"), Value::Map(data)),
        (Value::from("location"), location),
    ]))
}

// ============================================================================
// Helper Functions
// ============================================================================

fn extract_string(value: &rmpv::Value, key: &str) -> Option<String> {
    value.as_map().and_then(|map| {
        map.iter()
            .find(|(k, _)| k.as_str() == Some(key))
            .and_then(|(_, v)| v.as_str().map(|s| s.to_string()))
    })
}

fn require_string(value: &rmpv::Value, key: &str) -> Result<String, String> {
    extract_string(value, key).ok_or_else(|| format!("Missing field '{}'", key))
}

fn extract_f32(value: &rmpv::Value, key: &str) -> Option<f32> {
    value.as_map().and_then(|map| {
        map.iter()
            .find(|(k, _)| k.as_str() == Some(key))
            .and_then(|(_, v)| {
                v.as_f64()
                    .map(|f| f as f32)
                    .or_else(|| v.as_i64().map(|i| i as f32))
                    .or_else(|| v.as_u64().map(|u| u as f32))
            })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::NotifyKind;
    use rmpv::Value;

    fn frame(msg_type: &str, data: Vec<(&str, Value)>) -> Vec<u8> {
        let map = data.into_iter().map(|(k, v)| (Value::String(k.into()), v)).collect();
        let array = Value::Array(vec![
            Value::Integer(13.into()),
            Value::String(msg_type.into()),
            Value::Map(map),
        ]);
        let mut buf = Vec::new();
        rmpv::encode::write_value(&mut buf, &array).unwrap();
        buf
    }

    #[test]
    fn test_decode_collect_item() {
        let bytes = frame("crime:server:collectItem", vec![
            ("missionId", Value::String("Mission_1".into())),
            ("itemName", Value::String("statue".into())),
        ]);
        assert_eq!(
            decode_client_message(&bytes).unwrap(),
            ClientMessage::CollectItem {
                mission_id: "Mission_1".to_string(),
                item_name: "statue".to_string(),
            }
        );
    }

    #[test]
    fn test_decode_position_accepts_integers() {
        let bytes = frame("crime:server:position", vec![
            ("x", Value::F64(-260.5)),
            ("y", Value::Integer((-964).into())),
            ("z", Value::F32(31.2)),
        ]);
        assert_eq!(
            decode_client_message(&bytes).unwrap(),
            ClientMessage::Position(Location::new(-260.5, -964.0, 31.2))
        );
    }

    #[test]
    fn test_decode_serde_encoded_frame() {
        #[derive(serde::Serialize)]
        struct Start<'a> {
            #[serde(rename = "missionId")]
            mission_id: &'a str,
        }

        // Clients encode frames with rmp-serde as a (code, type, struct) tuple
        let bytes = rmp_serde::to_vec_named(&(13u8, "crime:server:startMission", Start { mission_id: "Mission_2" }))
            .unwrap();
        assert_eq!(
            decode_client_message(&bytes).unwrap(),
            ClientMessage::StartMission { mission_id: "Mission_2".to_string() }
        );
    }

    #[test]
    fn test_decode_rejects_missing_mission_id() {
        let bytes = frame("crime:server:startMission", vec![]);
        assert!(decode_client_message(&bytes).is_err());
        let bytes = frame("crime:server:teleport", vec![]);
        assert!(decode_client_message(&bytes).is_err());
    }

    fn field<'a>(value: &'a Value, key: &str) -> &'a Value {
        value
            .as_map()
            .and_then(|map| map.iter().find(|(k, _)| k.as_str() == Some(key)))
            .map(|(_, v)| v)
            .unwrap_or_else(|| panic!("missing key {}", key))
    }

    #[test]
    fn test_catalog_entries_use_named_fields() {
        let report = crate::mission::catalog::parse_catalog(r#"
[[missions]]
id = "Mission_1"
title = "Hol mir meine Statue zurück"
mission_type = "steal_item"
location = { x = -260.0, y = -964.0, z = 31.2 }
reward = { money = 150, xp = 2, items = [{ name = "statue", amount = 1 }] }
data = { item_name = "statue", item_label = "Statue", item_model = "prop_idol_01", glow = true }
"#).unwrap();
        let msg = ServerMessage::MissionCatalog {
            missions: report.accepted.into_iter().map(Arc::new).collect(),
        };

        let bytes = encode_server_message(&msg).unwrap();
        let value = rmpv::decode::read_value(&mut std::io::Cursor::new(bytes)).unwrap();
        let array = value.as_array().unwrap();
        assert_eq!(array[1].as_str(), Some("missionCatalog"));

        let missions = field(&array[2], "missions").as_array().unwrap();
        let statue = &missions[0];
        assert!(statue.is_map());
        assert_eq!(field(statue, "id").as_str(), Some("Mission_1"));
        assert_eq!(field(statue, "mission_type").as_str(), Some("steal_item"));

        let reward = field(statue, "reward");
        assert_eq!(field(reward, "money").as_i64(), Some(150));
        let items = field(reward, "items").as_array().unwrap();
        assert_eq!(field(&items[0], "name").as_str(), Some("statue"));
        assert_eq!(field(&items[0], "amount").as_i64(), Some(1));

        let data = field(statue, "data");
        assert_eq!(field(data, "item_model").as_str(), Some("prop_idol_01"));
        assert_eq!(field(data, "glow").as_bool(), Some(true));
        assert!(data.as_map().unwrap().iter().all(|(k, _)| k.as_str() != Some("item_image")));

        let location = field(statue, "location");
        assert_eq!(field(location, "x").as_f64(), Some(-260.0));
    }

    #[test]
    fn test_decode_rejects_out_of_range_protocol_code() {
        let array = Value::Array(vec![
            Value::Integer(269.into()),
            Value::String("crime:server:requestMissions".into()),
            Value::Map(Vec::new()),
        ]);
        let mut bytes = Vec::new();
        rmpv::encode::write_value(&mut bytes, &array).unwrap();
        assert!(decode_client_message(&bytes).is_err());
    }

    #[test]
    fn test_encode_notify_frame() {
        let msg = ServerMessage::Notify(Notification::new("Hallo", NotifyKind::Warning));
        let bytes = encode_server_message(&msg).unwrap();
        let value = rmpv::decode::read_value(&mut std::io::Cursor::new(bytes)).unwrap();
        let array = value.as_array().unwrap();
        assert_eq!(array[0].as_u64(), Some(13));
        assert_eq!(array[1].as_str(), Some("QBCore:Notify"));
        assert_eq!(extract_string(&array[2], "type").as_deref(), Some("warning"));
        assert_eq!(extract_string(&array[2], "text").as_deref(), Some("Hallo"));
    }
}
