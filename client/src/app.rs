//! Client root
//!
//! `CrimeClient` owns the engine, the presenter and both managers, and routes
//! local events, server events and debug commands between them.

use std::collections::VecDeque;

use crate::config::ClientConfig;
use crate::engine::Engine;
use crate::events::LocalEvent;
use crate::game::{Effect, MissionManager, NpcManager, NpcState};
use crate::network::messages::ClientMessage;
use crate::network::ServerEvent;
use crate::ui::dialogs::{self, NO_MISSIONS_TEXT, UNKNOWN_MISSION_TEXT};
use crate::ui::{MenuOptions, Notification, NotifyKind, Presentation};

pub const RELOAD_COMMAND: &str = "mrcrime_reload";
pub const RESPAWN_COMMAND: &str = "mrcrime_respawn_npc";

const MENU_OPTIONS: MenuOptions = MenuOptions { hide_footer: true };

pub struct CrimeClient<E: Engine, P: Presentation> {
    engine: E,
    presenter: P,
    missions: MissionManager,
    npc: NpcManager,
    player_id: Option<String>,
    outgoing: Vec<ClientMessage>,
    pending_events: VecDeque<LocalEvent>,
    reload_pending: bool,
    respawn_pending: bool,
    position_interval: f32,
    position_timer: f32,
}

impl<E: Engine, P: Presentation> CrimeClient<E, P> {
    pub fn new(engine: E, presenter: P, config: &ClientConfig) -> Self {
        let npc = NpcManager::new(config.npc.clone(), config.model_load_attempts);
        let missions = MissionManager::new(npc.coords()).with_model_load_attempts(config.model_load_attempts);
        Self {
            engine,
            presenter,
            missions,
            npc,
            player_id: None,
            outgoing: Vec::new(),
            pending_events: VecDeque::new(),
            reload_pending: false,
            respawn_pending: false,
            position_interval: config.position_interval_secs,
            position_timer: 0.0,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    pub fn missions(&self) -> &MissionManager {
        &self.missions
    }

    pub fn npc(&self) -> &NpcManager {
        &self.npc
    }

    pub fn player_id(&self) -> Option<&str> {
        self.player_id.as_deref()
    }

    /// Messages waiting to be sent to the server
    pub fn take_outgoing(&mut self) -> Vec<ClientMessage> {
        std::mem::take(&mut self.outgoing)
    }

    /// Per-frame update: NPC spawning, mission tick, position reports
    pub fn update(&mut self, dt: f32) {
        self.npc.update(&mut self.engine, dt);
        if self.respawn_pending {
            self.finish_respawn();
        }

        self.missions.tick(&mut self.engine);
        self.process_events();

        self.position_timer += dt;
        if self.position_timer >= self.position_interval {
            self.position_timer = 0.0;
            self.outgoing.push(ClientMessage::Position(self.engine.player_position()));
        }
    }

    /// Raise an event on the local bus
    pub fn dispatch(&mut self, event: LocalEvent) {
        self.pending_events.push_back(event);
        self.process_events();
    }

    pub fn handle_server_event(&mut self, event: ServerEvent) {
        match event {
            ServerEvent::Welcome { player_id } => {
                log::info!("Joined as {}", player_id);
                self.player_id = Some(player_id);
            }
            ServerEvent::MissionCatalog(missions) => {
                self.missions.set_missions(missions);
                if self.reload_pending {
                    self.reload_pending = false;
                    self.notify("Missionen neu geladen!", NotifyKind::Success);
                }
            }
            ServerEvent::Notify(notification) => self.presenter.notify(notification),
            ServerEvent::Local(event) => self.dispatch(event),
        }
    }

    /// Run a debug console command; false when the name is unknown
    pub fn run_command(&mut self, command: &str) -> bool {
        match command {
            RELOAD_COMMAND => {
                self.notify("Lade Missionen neu...", NotifyKind::Primary);
                self.reload_pending = true;
                self.outgoing.push(ClientMessage::RequestMissions);
                true
            }
            RESPAWN_COMMAND => {
                self.notify("Spawne NPC neu...", NotifyKind::Primary);
                self.npc.respawn(&mut self.engine);
                self.respawn_pending = true;
                true
            }
            _ => {
                log::warn!("Unknown command: {}", command);
                false
            }
        }
    }

    /// Remove everything spawned into the world
    pub fn shutdown(&mut self) {
        self.missions.cleanup(&mut self.engine);
        self.npc.cleanup(&mut self.engine);
    }

    fn notify(&mut self, text: &str, kind: NotifyKind) {
        self.presenter.notify(Notification::new(text, kind));
    }

    fn finish_respawn(&mut self) {
        match self.npc.state() {
            NpcState::Spawned(_) => {
                self.respawn_pending = false;
                self.missions.set_npc_coords(self.npc.coords());
                self.notify("NPC neu gespawnt!", NotifyKind::Success);
            }
            NpcState::Failed => {
                self.respawn_pending = false;
                log::error!("NPC respawn failed");
            }
            _ => {}
        }
    }

    fn process_events(&mut self) {
        self.flush_effects();
        while let Some(event) = self.pending_events.pop_front() {
            log::debug!("Event {}", event.name());
            self.handle_event(event);
            self.flush_effects();
        }
    }

    fn flush_effects(&mut self) {
        for effect in self.missions.drain_effects() {
            match effect {
                Effect::Server(msg) => self.outgoing.push(msg),
                Effect::Local(event) => self.pending_events.push_back(event),
                Effect::Notify(notification) => self.presenter.notify(notification),
            }
        }
    }

    fn handle_event(&mut self, event: LocalEvent) {
        match event {
            LocalEvent::OpenMenu => {
                let items = dialogs::main_menu(self.missions.active_mission());
                self.presenter.open_menu(items, MENU_OPTIONS);
            }
            LocalEvent::ShowMissions => match dialogs::mission_list(self.missions.missions()) {
                Some(items) => self.presenter.open_menu(items, MENU_OPTIONS),
                None => {
                    self.pending_events.push_back(LocalEvent::ReloadMissions);
                    self.notify(NO_MISSIONS_TEXT, NotifyKind::Error);
                }
            },
            LocalEvent::StartMission { mission_id } => {
                self.missions.start_mission(&mut self.engine, &mission_id);
            }
            LocalEvent::CollectMissionItem => self.missions.collect_mission_item(&mut self.engine),
            LocalEvent::CancelMission => self.missions.cancel_mission(&mut self.engine),
            LocalEvent::Conversation { dialog_id } => {
                self.presenter.open_menu(dialogs::conversation(&dialog_id), MENU_OPTIONS);
            }
            LocalEvent::ShowTurnInDialog { mission_id } => {
                let mission = self
                    .missions
                    .mission(&mission_id)
                    .or_else(|| self.missions.active_mission().filter(|m| m.id == mission_id));
                match mission {
                    Some(mission) => {
                        let items = dialogs::turn_in_dialog(mission);
                        self.presenter.open_menu(items, MENU_OPTIONS);
                    }
                    None => {
                        log::error!("Turn-in dialog for unknown mission {}", mission_id);
                        self.presenter.notify(Notification::new(UNKNOWN_MISSION_TEXT, NotifyKind::Error));
                    }
                }
            }
            LocalEvent::TurnInMission { mission_id } => {
                self.presenter.close_menu();
                self.missions.turn_in_mission(&mut self.engine, &mission_id);
            }
            LocalEvent::ReloadMissions => self.outgoing.push(ClientMessage::RequestMissions),
            LocalEvent::CloseMenu => self.presenter.close_menu(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::sandbox::Terrain;
    use crate::engine::{Coords, SandboxEngine};
    use crate::game::definition::fixtures::{money_mission, statue_mission};
    use crate::game::MissionStep;
    use crate::ui::MenuItem;

    #[derive(Default)]
    struct RecordingPresenter {
        menus: Vec<Vec<MenuItem>>,
        open: bool,
        notifications: Vec<Notification>,
    }

    impl RecordingPresenter {
        fn last_headers(&self) -> Vec<String> {
            self.menus
                .last()
                .map(|items| items.iter().map(|i| i.header.clone()).collect())
                .unwrap_or_default()
        }

        fn texts(&self) -> Vec<&str> {
            self.notifications.iter().map(|n| n.text.as_str()).collect()
        }
    }

    impl Presentation for RecordingPresenter {
        fn open_menu(&mut self, items: Vec<MenuItem>, options: MenuOptions) {
            assert!(options.hide_footer);
            self.menus.push(items);
            self.open = true;
        }

        fn close_menu(&mut self) {
            self.open = false;
        }

        fn notify(&mut self, notification: Notification) {
            self.notifications.push(notification);
        }
    }

    fn client() -> CrimeClient<SandboxEngine, RecordingPresenter> {
        let mut engine = SandboxEngine::new();
        engine.set_terrain(Terrain::Flat(29.0));
        let mut config = ClientConfig::default();
        config.npc.spawn_delay_secs = 0.0;
        config.position_interval_secs = 1.0;

        let mut client = CrimeClient::new(engine, RecordingPresenter::default(), &config);
        client.engine_mut().player = Coords::new(125.0, -1082.22, 29.0);
        client.update(0.016);
        client.update(0.016);
        client.take_outgoing();
        client
    }

    #[test]
    fn test_talking_to_npc_opens_main_menu() {
        let mut client = client();
        assert!(client.npc().is_spawned());

        let event = client.engine().interact().unwrap();
        client.dispatch(event);
        assert!(client.presenter().open);
        assert_eq!(client.presenter().last_headers()[0], "Mr Crime");
    }

    #[test]
    fn test_empty_mission_list_requests_reload() {
        let mut client = client();
        client.dispatch(LocalEvent::ShowMissions);

        assert!(client.presenter().menus.is_empty());
        assert_eq!(client.presenter().texts(), vec![NO_MISSIONS_TEXT]);
        assert_eq!(client.take_outgoing(), vec![ClientMessage::RequestMissions]);
    }

    #[test]
    fn test_statue_mission_end_to_end() {
        let mut client = client();
        client.handle_server_event(ServerEvent::MissionCatalog(vec![statue_mission(), money_mission()]));

        client.dispatch(LocalEvent::ShowMissions);
        let pick = client.presenter().menus.last().unwrap()[2].event.clone().unwrap();
        client.dispatch(pick);

        assert_eq!(client.missions().step(), MissionStep::GotoLocation);
        assert_eq!(
            client.take_outgoing(),
            vec![ClientMessage::StartMission { mission_id: "Mission_1".to_string() }]
        );
        // Main menu came back with the cancel option
        assert!(client.presenter().last_headers().contains(&"Aktuellen Auftrag abbrechen".to_string()));
        client.dispatch(LocalEvent::CloseMenu);

        client.engine_mut().player = Coords::new(-259.0, -963.0, 29.0);
        client.update(0.016);
        client.update(0.016);
        let event = client.engine().interact().unwrap();
        assert_eq!(event, LocalEvent::CollectMissionItem);
        client.dispatch(event);
        assert_eq!(client.missions().step(), MissionStep::ReturnToNpc);

        client.engine_mut().player = Coords::new(125.0, -1082.22, 29.19);
        client.update(0.016);
        assert_eq!(
            client.presenter().last_headers(),
            vec!["Hier ist Statue das du wolltest.", "Ich bin noch nicht fertig"]
        );

        let turn_in = client.presenter().menus.last().unwrap()[0].event.clone().unwrap();
        client.dispatch(turn_in);
        assert!(!client.presenter().open);
        assert_eq!(client.missions().step(), MissionStep::None);

        let outgoing: Vec<_> = client
            .take_outgoing()
            .into_iter()
            .filter(|m| !matches!(m, ClientMessage::Position(_)))
            .collect();
        assert_eq!(
            outgoing,
            vec![
                ClientMessage::CollectItem {
                    mission_id: "Mission_1".to_string(),
                    item_name: "statue".to_string(),
                },
                ClientMessage::CompleteMission { mission_id: "Mission_1".to_string() },
            ]
        );
    }

    #[test]
    fn test_turn_in_dialog_for_unknown_mission() {
        let mut client = client();
        client.dispatch(LocalEvent::ShowTurnInDialog { mission_id: "Mission_404".to_string() });
        assert_eq!(client.presenter().texts(), vec![UNKNOWN_MISSION_TEXT]);
    }

    #[test]
    fn test_reload_command() {
        let mut client = client();
        assert!(client.run_command(RELOAD_COMMAND));
        assert_eq!(client.take_outgoing(), vec![ClientMessage::RequestMissions]);

        client.handle_server_event(ServerEvent::MissionCatalog(vec![statue_mission()]));
        assert_eq!(client.presenter().texts(), vec!["Lade Missionen neu...", "Missionen neu geladen!"]);
        assert_eq!(client.missions().missions().len(), 1);

        // A plain catalog push is silent
        client.handle_server_event(ServerEvent::MissionCatalog(Vec::new()));
        assert_eq!(client.presenter().notifications.len(), 2);
    }

    #[test]
    fn test_respawn_command() {
        let mut client = client();
        let first = client.npc().handle();

        assert!(client.run_command(RESPAWN_COMMAND));
        assert!(!client.npc().is_spawned());
        for _ in 0..40 {
            client.update(0.016);
        }
        assert!(client.npc().is_spawned());
        assert_ne!(client.npc().handle(), first);
        assert_eq!(client.presenter().texts(), vec!["Spawne NPC neu...", "NPC neu gespawnt!"]);
        assert!(!client.run_command("mrcrime_teleport"));
    }

    #[test]
    fn test_server_can_open_menu_and_notify() {
        let mut client = client();
        client.handle_server_event(ServerEvent::Welcome { player_id: "p-7".to_string() });
        client.handle_server_event(ServerEvent::Local(LocalEvent::OpenMenu));
        client.handle_server_event(ServerEvent::Notify(Notification::new(
            "Du hast 1x Statue erhalten.",
            NotifyKind::Success,
        )));

        assert_eq!(client.player_id(), Some("p-7"));
        assert!(client.presenter().open);
        assert_eq!(client.presenter().texts(), vec!["Du hast 1x Statue erhalten."]);
    }

    #[test]
    fn test_position_reports() {
        let mut client = client();
        client.update(0.5);
        assert!(client.take_outgoing().is_empty());
        client.update(0.6);
        assert_eq!(
            client.take_outgoing(),
            vec![ClientMessage::Position(Coords::new(125.0, -1082.22, 29.0))]
        );
    }
}
