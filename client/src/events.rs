//! Local event bus vocabulary
//!
//! Menus, interactions and the server all talk to the client through these
//! events. The wire names are shared with the server protocol.

use rmpv::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalEvent {
    OpenMenu,
    ShowMissions,
    StartMission { mission_id: String },
    CollectMissionItem,
    CancelMission,
    Conversation { dialog_id: String },
    ShowTurnInDialog { mission_id: String },
    TurnInMission { mission_id: String },
    ReloadMissions,
    CloseMenu,
}

impl LocalEvent {
    pub fn name(&self) -> &'static str {
        match self {
            LocalEvent::OpenMenu => "crime-npc:openMenu",
            LocalEvent::ShowMissions => "crime-npc:showMissions",
            LocalEvent::StartMission { .. } => "crime-npc:startMission",
            LocalEvent::CollectMissionItem => "crime-npc:collectMissionItem",
            LocalEvent::CancelMission => "crime-npc:cancelMission",
            LocalEvent::Conversation { .. } => "crime-npc:conversation",
            LocalEvent::ShowTurnInDialog { .. } => "crime-npc:showTurnInDialog",
            LocalEvent::TurnInMission { .. } => "crime-npc:turnInMission",
            LocalEvent::ReloadMissions => "crime-npc:reloadMissions",
            LocalEvent::CloseMenu => "qb-menu:client:closeMenu",
        }
    }

    /// Parse an event by wire name; `data` carries its arguments
    pub fn from_wire(name: &str, data: Option<&Value>) -> Option<Self> {
        let arg = |key: &str| {
            data.and_then(|value| match value {
                Value::String(s) => s.as_str().map(str::to_string),
                Value::Map(map) => map
                    .iter()
                    .find(|(k, _)| k.as_str() == Some(key))
                    .and_then(|(_, v)| v.as_str().map(str::to_string)),
                _ => None,
            })
        };

        let event = match name {
            "crime-npc:openMenu" => LocalEvent::OpenMenu,
            "crime-npc:showMissions" => LocalEvent::ShowMissions,
            "crime-npc:startMission" => LocalEvent::StartMission { mission_id: arg("missionId")? },
            "crime-npc:collectMissionItem" => LocalEvent::CollectMissionItem,
            "crime-npc:cancelMission" => LocalEvent::CancelMission,
            "crime-npc:conversation" => LocalEvent::Conversation { dialog_id: arg("dialogId")? },
            "crime-npc:showTurnInDialog" => LocalEvent::ShowTurnInDialog { mission_id: arg("missionId")? },
            "crime-npc:turnInMission" => LocalEvent::TurnInMission { mission_id: arg("missionId")? },
            "crime-npc:reloadMissions" => LocalEvent::ReloadMissions,
            "qb-menu:client:closeMenu" => LocalEvent::CloseMenu,
            _ => return None,
        };
        Some(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names_parse_back() {
        let events = [
            LocalEvent::OpenMenu,
            LocalEvent::ShowMissions,
            LocalEvent::CollectMissionItem,
            LocalEvent::CancelMission,
            LocalEvent::ReloadMissions,
            LocalEvent::CloseMenu,
        ];
        for event in events {
            assert_eq!(LocalEvent::from_wire(event.name(), None), Some(event));
        }
    }

    #[test]
    fn test_arguments_from_map_or_bare_string() {
        let map = Value::Map(vec![(Value::from("missionId"), Value::from("Mission_1"))]);
        assert_eq!(
            LocalEvent::from_wire("crime-npc:startMission", Some(&map)),
            Some(LocalEvent::StartMission { mission_id: "Mission_1".to_string() })
        );

        // The turn-in prompt passes the id on its own
        let bare = Value::from("Mission_2");
        assert_eq!(
            LocalEvent::from_wire("crime-npc:showTurnInDialog", Some(&bare)),
            Some(LocalEvent::ShowTurnInDialog { mission_id: "Mission_2".to_string() })
        );
    }

    #[test]
    fn test_missing_argument_or_unknown_name() {
        assert_eq!(LocalEvent::from_wire("crime-npc:startMission", None), None);
        assert_eq!(LocalEvent::from_wire("crime-npc:teleport", None), None);
    }
}
