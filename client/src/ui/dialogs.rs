//! Mr Crime's menus

use super::menu::MenuItem;
use crate::events::LocalEvent;
use crate::game::{MissionDefinition, MissionType};

pub const NO_MISSIONS_TEXT: &str =
    "Momentan sind keine Missionen verfügbar. Bitte versuche es später erneut.";
pub const UNKNOWN_MISSION_TEXT: &str = "Es ist ein Fehler aufgetreten.";

const ABOUT_TEXT: &str = "Ich halte die Augen offen und die Ohren gespitzt. Du weißt schon, hier und da ein kleines Geschäft, nichts Großes.";

fn back_item() -> MenuItem {
    MenuItem::entry("Zurück", "Zurück zum Hauptmenü", LocalEvent::OpenMenu).with_icon("fas fa-arrow-left")
}

fn close_item() -> MenuItem {
    MenuItem::entry("Ich bin weg...", "Gespräch beenden", LocalEvent::CloseMenu).with_icon("fas fa-times")
}

/// Root menu; offers cancelling when a mission is running
pub fn main_menu(active: Option<&MissionDefinition>) -> Vec<MenuItem> {
    let mut items = vec![
        MenuItem::title("Mr Crime", "Der mysteriöse Fremde wartet auf dich...").with_icon("fas fa-user-secret"),
        MenuItem::entry(
            "Erzähl mir mehr über dich",
            "Erfahre mehr über Mr Crime",
            LocalEvent::Conversation { dialog_id: "about".to_string() },
        )
        .with_icon("fas fa-comments"),
        MenuItem::entry("Hast du Arbeit für mich?", "Zeige mir deine Aufträge", LocalEvent::ShowMissions)
            .with_icon("fas fa-briefcase"),
    ];

    if let Some(mission) = active {
        items.push(
            MenuItem::entry(
                "Aktuellen Auftrag abbrechen",
                format!("Mission \"{}\" abbrechen", mission.title),
                LocalEvent::CancelMission,
            )
            .with_icon("fas fa-ban"),
        );
    }

    items.push(close_item());
    items
}

/// Available missions, or `None` when there is nothing to offer
pub fn mission_list(missions: &[MissionDefinition]) -> Option<Vec<MenuItem>> {
    if missions.is_empty() {
        return None;
    }

    let mut items = vec![
        back_item(),
        MenuItem::title("Verfügbare Aufträge", "Wähle einen Auftrag aus").with_icon("fas fa-list"),
    ];
    items.extend(missions.iter().map(|mission| {
        MenuItem::entry(
            mission.title.clone(),
            format!("{} | Belohnung: ${}", mission.description, mission.reward.money),
            LocalEvent::StartMission { mission_id: mission.id.clone() },
        )
        .with_icon("fas fa-tasks")
    }));
    items.push(close_item());
    Some(items)
}

pub fn conversation(dialog_id: &str) -> Vec<MenuItem> {
    match dialog_id {
        "about" => vec![
            back_item(),
            MenuItem::title("Mr Crime", ABOUT_TEXT).with_icon("fas fa-user-secret"),
            MenuItem::entry("Wie kann ich dir helfen?", "Frage nach konkreten Aufgaben", LocalEvent::ShowMissions)
                .with_icon("fas fa-question"),
            close_item(),
        ],
        _ => vec![back_item(), close_item()],
    }
}

/// What the player says when handing in
pub fn turn_in_text(mission: &MissionDefinition) -> String {
    match mission.mission_type {
        MissionType::StealItem => match mission.item_label() {
            Some(label) => format!("Hier ist {} das du wolltest.", label),
            None => "Hier ist das, was du wolltest.".to_string(),
        },
        MissionType::StealMoney => "Hier ist das Geld, das du haben wolltest.".to_string(),
        MissionType::StealVehicle => "Ich habe das Fahrzeug besorgt, wie du wolltest.".to_string(),
        MissionType::StealWeapon | MissionType::Robbery => "Hier ist das, was du wolltest.".to_string(),
    }
}

pub fn turn_in_dialog(mission: &MissionDefinition) -> Vec<MenuItem> {
    vec![
        MenuItem::entry(
            turn_in_text(mission),
            format!("Auftrag \"{}\" abschließen", mission.title),
            LocalEvent::TurnInMission { mission_id: mission.id.clone() },
        )
        .with_icon("fas fa-check"),
        MenuItem::entry("Ich bin noch nicht fertig", "Zurück zur Mission gehen", LocalEvent::CloseMenu)
            .with_icon("fas fa-times"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::definition::fixtures::{money_mission, statue_mission};

    fn headers(items: &[MenuItem]) -> Vec<&str> {
        items.iter().map(|i| i.header.as_str()).collect()
    }

    #[test]
    fn test_main_menu_without_mission() {
        let items = main_menu(None);
        assert_eq!(
            headers(&items),
            vec!["Mr Crime", "Erzähl mir mehr über dich", "Hast du Arbeit für mich?", "Ich bin weg..."]
        );
        assert!(!items[0].is_selectable());
        assert_eq!(items[3].event, Some(LocalEvent::CloseMenu));
    }

    #[test]
    fn test_main_menu_offers_cancel_of_active_mission() {
        let mission = statue_mission();
        let items = main_menu(Some(&mission));
        let cancel = &items[3];
        assert_eq!(cancel.header, "Aktuellen Auftrag abbrechen");
        assert_eq!(cancel.txt.as_deref(), Some("Mission \"Hol mir meine Statue zurück\" abbrechen"));
        assert_eq!(cancel.event, Some(LocalEvent::CancelMission));
    }

    #[test]
    fn test_mission_list() {
        assert!(mission_list(&[]).is_none());

        let items = mission_list(&[statue_mission(), money_mission()]).unwrap();
        assert_eq!(items.len(), 5);
        assert_eq!(items[0].header, "Zurück");
        assert_eq!(items[2].header, "Hol mir meine Statue zurück");
        assert_eq!(
            items[2].txt.as_deref(),
            Some("Der Kollege hat meine Statue gestohlen, hol die mir sofort zurück | Belohnung: $150")
        );
        assert_eq!(
            items[3].event,
            Some(LocalEvent::StartMission { mission_id: "Mission_2".to_string() })
        );
    }

    #[test]
    fn test_conversations() {
        let about = conversation("about");
        assert_eq!(about[1].txt.as_deref(), Some(ABOUT_TEXT));
        assert_eq!(about[2].event, Some(LocalEvent::ShowMissions));

        assert_eq!(headers(&conversation("weather")), vec!["Zurück", "Ich bin weg..."]);
    }

    #[test]
    fn test_turn_in_texts() {
        let mut statue = statue_mission();
        assert_eq!(turn_in_text(&statue), "Hier ist Statue das du wolltest.");
        statue.data.item_label = None;
        assert_eq!(turn_in_text(&statue), "Hier ist das, was du wolltest.");
        assert_eq!(turn_in_text(&money_mission()), "Hier ist das Geld, das du haben wolltest.");

        let dialog = turn_in_dialog(&money_mission());
        assert_eq!(dialog[0].txt.as_deref(), Some("Auftrag \"Hol das Geld\" abschließen"));
        assert_eq!(
            dialog[0].event,
            Some(LocalEvent::TurnInMission { mission_id: "Mission_2".to_string() })
        );
        assert_eq!(dialog[1].event, Some(LocalEvent::CloseMenu));
    }
}
