use serde::Serialize;
use std::io::Cursor;
use thiserror::Error;

use crate::events::LocalEvent;
use crate::game::{decode_catalog, MissionDefinition};
use crate::ui::{Notification, NotifyKind, DEFAULT_NOTIFY_LENGTH_MS};

/// Protocol code of a room data frame
pub const ROOM_DATA: u8 = 13;

/// Encode a message in MessagePack format
/// Format: [13, message_type, message_data]
pub fn encode_message<T: Serialize>(message_type: &str, data: &T) -> Result<Vec<u8>, rmp_serde::encode::Error> {
    let message: (u8, &str, &T) = (ROOM_DATA, message_type, data);
    rmp_serde::to_vec(&message)
}

/// Decode a frame into its type and optional payload
pub fn decode_message(data: &[u8]) -> Result<DecodedMessage, ClientError> {
    let mut cursor = Cursor::new(data);
    let value = rmpv::decode::read_value(&mut cursor)
        .map_err(|e| ClientError::Msgpack(e.to_string()))?;

    let array = value.as_array()
        .ok_or(ClientError::InvalidFormat("Expected array".into()))?;

    if array.len() < 2 {
        return Err(ClientError::InvalidFormat("Frame missing type".into()));
    }

    let protocol = array[0].as_u64()
        .and_then(|code| u8::try_from(code).ok())
        .ok_or(ClientError::InvalidFormat("Protocol code must be a small integer".into()))?;
    if protocol != ROOM_DATA {
        return Err(ClientError::InvalidFormat(format!("Unexpected protocol code {}", protocol)));
    }

    let msg_type = array[1].as_str()
        .ok_or(ClientError::InvalidFormat("Message type must be string".into()))?
        .to_string();

    let msg_data = array.get(2).cloned();

    Ok(DecodedMessage { msg_type, data: msg_data })
}

#[derive(Debug)]
pub struct DecodedMessage {
    pub msg_type: String,
    pub data: Option<rmpv::Value>,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("MessagePack error: {0}")]
    Msgpack(String),
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
    #[error("Unknown message type: {0}")]
    UnknownMessage(String),
}

/// Server messages the client reacts to
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    Welcome { player_id: String },
    MissionCatalog(Vec<MissionDefinition>),
    Notify(Notification),
    /// Server-triggered local event such as opening the menu
    Local(LocalEvent),
}

impl ServerEvent {
    pub fn from_decoded(message: DecodedMessage) -> Result<Self, ClientError> {
        let DecodedMessage { msg_type, data } = message;
        let data = data.unwrap_or(rmpv::Value::Nil);

        match msg_type.as_str() {
            "welcome" => Ok(ServerEvent::Welcome {
                player_id: extract_string(&data, "player_id").unwrap_or_default(),
            }),
            "missionCatalog" => {
                let missions = extract_value(&data, "missions")
                    .map(decode_catalog)
                    .unwrap_or_default();
                Ok(ServerEvent::MissionCatalog(missions))
            }
            "QBCore:Notify" => {
                let text = extract_string(&data, "text").unwrap_or_default();
                let kind = extract_string(&data, "type")
                    .map(|t| NotifyKind::parse(&t))
                    .unwrap_or(NotifyKind::Primary);
                let length = extract_u64(&data, "length")
                    .map(|l| l as u32)
                    .unwrap_or(DEFAULT_NOTIFY_LENGTH_MS);
                Ok(ServerEvent::Notify(Notification::new(text, kind).with_length(length)))
            }
            other => LocalEvent::from_wire(other, Some(&data))
                .map(ServerEvent::Local)
                .ok_or_else(|| ClientError::UnknownMessage(other.to_string())),
        }
    }
}

/// Helper to extract typed data from a rmpv::Value
pub fn extract_value<'a>(value: &'a rmpv::Value, key: &str) -> Option<&'a rmpv::Value> {
    value.as_map()
        .and_then(|map| {
            map.iter()
                .find(|(k, _)| k.as_str() == Some(key))
                .map(|(_, v)| v)
        })
}

pub fn extract_string(value: &rmpv::Value, key: &str) -> Option<String> {
    extract_value(value, key).and_then(|v| v.as_str().map(|s| s.to_string()))
}

pub fn extract_u64(value: &rmpv::Value, key: &str) -> Option<u64> {
    extract_value(value, key).and_then(|v| v.as_u64().or_else(|| v.as_i64().map(|i| i as u64)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmpv::Value;

    fn frame(msg_type: &str, data: Vec<(&str, Value)>) -> Vec<u8> {
        let map = data.into_iter().map(|(k, v)| (Value::from(k), v)).collect();
        let array = Value::Array(vec![Value::from(13), Value::from(msg_type), Value::Map(map)]);
        let mut buf = Vec::new();
        rmpv::encode::write_value(&mut buf, &array).unwrap();
        buf
    }

    fn decode(bytes: &[u8]) -> Result<ServerEvent, ClientError> {
        ServerEvent::from_decoded(decode_message(bytes)?)
    }

    #[test]
    fn test_encode_frame_layout() {
        let (msg_type, data) = crate::network::messages::ClientMessage::StartMission {
            mission_id: "Mission_1".to_string(),
        }
        .to_protocol();
        let bytes = encode_message(msg_type, &data).unwrap();

        let value = rmpv::decode::read_value(&mut Cursor::new(bytes)).unwrap();
        let array = value.as_array().unwrap();
        assert_eq!(array[0].as_u64(), Some(13));
        assert_eq!(array[1].as_str(), Some("crime:server:startMission"));
        assert_eq!(extract_string(&array[2], "missionId").as_deref(), Some("Mission_1"));
    }

    #[test]
    fn test_decode_notify() {
        let bytes = frame("QBCore:Notify", vec![
            ("text", Value::from("Dein Inventar ist voll!")),
            ("type", Value::from("error")),
            ("length", Value::from(5000)),
        ]);
        assert_eq!(
            decode(&bytes).unwrap(),
            ServerEvent::Notify(Notification::new("Dein Inventar ist voll!", NotifyKind::Error))
        );
    }

    #[test]
    fn test_decode_welcome_and_local_events() {
        let bytes = frame("welcome", vec![("player_id", Value::from("p-1"))]);
        assert_eq!(decode(&bytes).unwrap(), ServerEvent::Welcome { player_id: "p-1".to_string() });

        let bytes = frame("crime-npc:openMenu", vec![]);
        assert_eq!(decode(&bytes).unwrap(), ServerEvent::Local(LocalEvent::OpenMenu));
    }

    #[test]
    fn test_decode_empty_catalog() {
        let bytes = frame("missionCatalog", vec![("missions", Value::Array(Vec::new()))]);
        assert_eq!(decode(&bytes).unwrap(), ServerEvent::MissionCatalog(Vec::new()));
    }

    #[test]
    fn test_decode_catalog_frame_in_server_layout() {
        let location = Value::Map(vec![
            (Value::from("x"), Value::F32(-260.0)),
            (Value::from("y"), Value::F32(-964.0)),
            (Value::from("z"), Value::F32(31.2)),
        ]);
        let reward = Value::Map(vec![
            (Value::from("money"), Value::from(150)),
            (Value::from("xp"), Value::from(2)),
            (Value::from("items"), Value::Array(vec![Value::Map(vec![
                (Value::from("name"), Value::from("statue")),
                (Value::from("amount"), Value::from(1)),
            ])])),
        ]);
        let data = Value::Map(vec![
            (Value::from("item_name"), Value::from("statue")),
            (Value::from("item_label"), Value::from("Statue")),
            (Value::from("item_model"), Value::from("prop_idol_01")),
            (Value::from("glow"), Value::Boolean(true)),
        ]);
        let mission = Value::Map(vec![
            (Value::from("id"), Value::from("Mission_1")),
            (Value::from("title"), Value::from("Hol mir meine Statue zurück")),
            (Value::from("description"), Value::from("")),
            (Value::from("hint"), Value::from("")),
            (Value::from("required_level"), Value::from(0)),
            (Value::from("mission_type"), Value::from("steal_item")),
            (Value::from("reward"), reward),
            (Value::from("data"), data),
            (Value::from("location"), location),
        ]);
        let bytes = frame("missionCatalog", vec![("missions", Value::Array(vec![mission]))]);

        let ServerEvent::MissionCatalog(missions) = decode(&bytes).unwrap() else {
            panic!("expected a catalog");
        };
        assert_eq!(missions.len(), 1);
        let statue = &missions[0];
        assert_eq!(statue.id, "Mission_1");
        assert_eq!(statue.mission_type, crate::game::definition::MissionType::StealItem);
        assert_eq!(statue.reward.items[0].name, "statue");
        assert_eq!(statue.item_model(), "prop_idol_01");
        assert_eq!(statue.location.x, -260.0);
    }

    #[test]
    fn test_decode_rejects_out_of_range_protocol_code() {
        let mut buf = Vec::new();
        let array = Value::Array(vec![Value::from(269), Value::from("welcome"), Value::Map(Vec::new())]);
        rmpv::encode::write_value(&mut buf, &array).unwrap();
        assert!(matches!(decode(&buf), Err(ClientError::InvalidFormat(_))));
    }

    #[test]
    fn test_decode_errors() {
        assert!(matches!(decode(&[]), Err(ClientError::Msgpack(_))));
        assert!(matches!(
            decode(&frame("crime:server:teleport", vec![])),
            Err(ClientError::UnknownMessage(_))
        ));

        let mut buf = Vec::new();
        rmpv::encode::write_value(&mut buf, &Value::Array(vec![Value::from(11), Value::from("x")])).unwrap();
        assert!(matches!(decode(&buf), Err(ClientError::InvalidFormat(_))));
    }
}
