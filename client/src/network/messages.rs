use std::collections::HashMap;

use crate::engine::Coords;

// === Client -> Server Messages ===

#[derive(Debug, Clone, PartialEq)]
pub enum ClientMessage {
    StartMission { mission_id: String },
    CollectItem { mission_id: String, item_name: String },
    CompleteMission { mission_id: String },
    CancelMission { mission_id: String },
    RequestMissions,
    Position(Coords),
}

impl ClientMessage {
    /// Convert to the wire type name and payload map
    pub fn to_protocol(&self) -> (&'static str, HashMap<String, rmpv::Value>) {
        use rmpv::Value;

        let mut data = HashMap::new();

        let msg_type = match self {
            ClientMessage::StartMission { mission_id } => {
                data.insert("missionId".into(), Value::String(mission_id.clone().into()));
                "crime:server:startMission"
            }
            ClientMessage::CollectItem { mission_id, item_name } => {
                data.insert("missionId".into(), Value::String(mission_id.clone().into()));
                data.insert("itemName".into(), Value::String(item_name.clone().into()));
                "crime:server:collectItem"
            }
            ClientMessage::CompleteMission { mission_id } => {
                data.insert("missionId".into(), Value::String(mission_id.clone().into()));
                "crime:server:completeMission"
            }
            ClientMessage::CancelMission { mission_id } => {
                data.insert("missionId".into(), Value::String(mission_id.clone().into()));
                "crime:server:cancelMission"
            }
            ClientMessage::RequestMissions => "crime:server:requestMissions",
            ClientMessage::Position(coords) => {
                data.insert("x".into(), Value::F64(coords.x as f64));
                data.insert("y".into(), Value::F64(coords.y as f64));
                data.insert("z".into(), Value::F64(coords.z as f64));
                "crime:server:position"
            }
        };

        (msg_type, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_item_payload() {
        let (msg_type, data) = ClientMessage::CollectItem {
            mission_id: "Mission_1".to_string(),
            item_name: "statue".to_string(),
        }
        .to_protocol();
        assert_eq!(msg_type, "crime:server:collectItem");
        assert_eq!(data.get("missionId").and_then(|v| v.as_str()), Some("Mission_1"));
        assert_eq!(data.get("itemName").and_then(|v| v.as_str()), Some("statue"));
    }

    #[test]
    fn test_request_missions_has_empty_payload() {
        let (msg_type, data) = ClientMessage::RequestMissions.to_protocol();
        assert_eq!(msg_type, "crime:server:requestMissions");
        assert!(data.is_empty());
    }
}
