//! Client mission state machine
//!
//! Holds at most one active mission. Step changes happen either through the
//! explicit operations (start, collect, cancel, complete) or through the
//! per-frame [`MissionManager::tick`], which watches the player's distance to
//! the mission location and to the quest giver.

use super::definition::{FALLBACK_ITEM_MODEL, MissionDefinition, MissionType};
use super::Effect;
use crate::engine::ground::{object_chain, resolve_ground};
use crate::engine::{
    BlipHandle, Coords, Engine, EntityHandle, Interaction, ModelLoad, ModelRequest,
    DEFAULT_MODEL_LOAD_ATTEMPTS,
};
use crate::events::LocalEvent;
use crate::network::messages::ClientMessage;
use crate::ui::{Notification, NotifyKind};

/// Distance at which the mission location counts as reached
pub const ARRIVAL_RADIUS: f32 = 20.0;
/// Entering this range of the quest giver opens the turn-in prompt
pub const NPC_ENTER_RADIUS: f32 = 3.0;
/// Leaving this range re-arms the turn-in prompt
pub const NPC_EXIT_RADIUS: f32 = 5.0;
/// Interaction range of the pickup object
pub const PICKUP_DISTANCE: f32 = 2.5;
/// Completion message stays up longer than the default
pub const COMPLETION_NOTIFY_MS: u32 = 7000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissionStep {
    #[default]
    None,
    GotoLocation,
    CollectItem,
    RobStore,
    StealVehicle,
    ReturnToNpc,
}

impl MissionStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            MissionStep::None => "none",
            MissionStep::GotoLocation => "goto_location",
            MissionStep::CollectItem => "collect_item",
            MissionStep::RobStore => "rob_store",
            MissionStep::StealVehicle => "steal_vehicle",
            MissionStep::ReturnToNpc => "return_to_npc",
        }
    }
}

/// Pickup object of a steal_item mission
#[derive(Debug, Default)]
pub enum ObjectSlot {
    #[default]
    None,
    Loading { request: ModelRequest, fallback: bool },
    Spawned(EntityHandle),
    Failed,
}

/// Token of the running per-frame tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickHandle(u64);

#[derive(Debug)]
struct MissionSession {
    mission: MissionDefinition,
    step: MissionStep,
    object: ObjectSlot,
    blip: Option<BlipHandle>,
    near_npc: bool,
}

pub struct MissionManager {
    missions: Vec<MissionDefinition>,
    session: Option<MissionSession>,
    npc_coords: Coords,
    tick: Option<TickHandle>,
    next_tick: u64,
    model_load_attempts: u32,
    effects: Vec<Effect>,
}

impl MissionManager {
    pub fn new(npc_coords: Coords) -> Self {
        Self {
            missions: Vec::new(),
            session: None,
            npc_coords,
            tick: None,
            next_tick: 1,
            model_load_attempts: DEFAULT_MODEL_LOAD_ATTEMPTS,
            effects: Vec::new(),
        }
    }

    pub fn with_model_load_attempts(mut self, attempts: u32) -> Self {
        self.model_load_attempts = attempts;
        self
    }

    /// Replace the known catalog; a running session keeps its own copy
    pub fn set_missions(&mut self, missions: Vec<MissionDefinition>) {
        log::info!("Mission catalog updated: {} missions", missions.len());
        self.missions = missions;
    }

    pub fn missions(&self) -> &[MissionDefinition] {
        &self.missions
    }

    pub fn mission(&self, mission_id: &str) -> Option<&MissionDefinition> {
        self.missions.iter().find(|m| m.id == mission_id)
    }

    pub fn set_npc_coords(&mut self, coords: Coords) {
        self.npc_coords = coords;
    }

    pub fn npc_coords(&self) -> Coords {
        self.npc_coords
    }

    pub fn active_mission(&self) -> Option<&MissionDefinition> {
        self.session.as_ref().map(|s| &s.mission)
    }

    pub fn step(&self) -> MissionStep {
        self.session.as_ref().map_or(MissionStep::None, |s| s.step)
    }

    pub fn object(&self) -> Option<&ObjectSlot> {
        self.session.as_ref().map(|s| &s.object)
    }

    pub fn blip(&self) -> Option<BlipHandle> {
        self.session.as_ref().and_then(|s| s.blip)
    }

    pub fn tick_handle(&self) -> Option<TickHandle> {
        self.tick
    }

    /// Take everything queued for the server, the event bus and the HUD
    pub fn drain_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    fn notify(&mut self, text: impl Into<String>, kind: NotifyKind) {
        self.effects.push(Effect::Notify(Notification::new(text, kind)));
    }

    pub fn start_mission<E: Engine>(&mut self, engine: &mut E, mission_id: &str) -> bool {
        let Some(mission) = self.mission(mission_id).cloned() else {
            log::error!("Mission {} not found", mission_id);
            self.notify("Diese Mission ist nicht verfügbar.", NotifyKind::Error);
            return false;
        };

        if self.session.is_some() {
            self.cleanup(engine);
        }

        log::info!("Starting mission {} ({})", mission.id, mission.title);
        let blip = engine.add_blip(mission.location, "Missionsort");
        self.effects.push(Effect::Server(ClientMessage::StartMission {
            mission_id: mission.id.clone(),
        }));
        self.notify(
            format!("Mission \"{}\" gestartet! Begib dich zum markierten Ort.", mission.title),
            NotifyKind::Success,
        );

        self.session = Some(MissionSession {
            mission,
            step: MissionStep::GotoLocation,
            object: ObjectSlot::None,
            blip: Some(blip),
            near_npc: false,
        });
        self.start_tick();
        self.effects.push(Effect::Local(LocalEvent::OpenMenu));
        true
    }

    pub fn cancel_mission<E: Engine>(&mut self, engine: &mut E) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let (mission_id, title) = (session.mission.id.clone(), session.mission.title.clone());

        log::info!("Cancelling mission {}", mission_id);
        self.notify(format!("Mission \"{}\" abgebrochen.", title), NotifyKind::Error);
        self.effects.push(Effect::Server(ClientMessage::CancelMission { mission_id }));
        self.cleanup(engine);
        self.effects.push(Effect::Local(LocalEvent::OpenMenu));
    }

    pub fn collect_mission_item<E: Engine>(&mut self, engine: &mut E) {
        let Some(session) = self.session.as_mut() else {
            log::debug!("No active mission, nothing to collect");
            return;
        };
        if session.step != MissionStep::CollectItem {
            log::debug!("Cannot collect item in step {}", session.step.as_str());
            return;
        }

        despawn_object(engine, &mut session.object);
        session.step = MissionStep::ReturnToNpc;
        if let Some(blip) = session.blip.take() {
            engine.remove_blip(blip);
        }
        session.blip = Some(engine.add_blip(self.npc_coords, "Gehe zurück zu Mr Crime"));

        let mission = session.mission.clone();
        let label = mission.item_label().unwrap_or("den Gegenstand");
        self.notify(
            format!("Du hast {} gefunden. Bring ihn zurück zu Mr Crime.", label),
            NotifyKind::Success,
        );
        self.announce_step(&mission, MissionStep::ReturnToNpc);

        match mission.item_name() {
            Some(item_name) => self.effects.push(Effect::Server(ClientMessage::CollectItem {
                mission_id: mission.id.clone(),
                item_name: item_name.to_string(),
            })),
            None => log::warn!("Mission {} has no item to collect", mission.id),
        }
    }

    /// Hand the mission in; the server decides about the payout
    pub fn complete_mission<E: Engine>(&mut self, engine: &mut E) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let mission = session.mission.clone();

        log::info!("Completing mission {}", mission.id);
        self.effects.push(Effect::Notify(
            Notification::new(
                format!(
                    "Mission \"{}\" abgeschlossen! Du erhältst ${} und {} XP.",
                    mission.title, mission.reward.money, mission.reward.xp
                ),
                NotifyKind::Success,
            )
            .with_length(COMPLETION_NOTIFY_MS),
        ));
        self.effects.push(Effect::Server(ClientMessage::CompleteMission {
            mission_id: mission.id,
        }));
        self.cleanup(engine);
    }

    pub fn turn_in_mission<E: Engine>(&mut self, engine: &mut E, mission_id: &str) {
        match self.active_mission() {
            Some(active) if active.id != mission_id => {
                log::warn!("Turn-in for {} while {} is active", mission_id, active.id);
            }
            Some(_) => {}
            None => {
                log::debug!("Turn-in for {} without an active mission", mission_id);
                return;
            }
        }
        self.complete_mission(engine);
    }

    /// Release waypoint, pickup object and tick. Safe to call repeatedly.
    pub fn cleanup<E: Engine>(&mut self, engine: &mut E) {
        if let Some(handle) = self.tick.take() {
            log::debug!("Stopped mission tick {:?}", handle);
        }
        let Some(mut session) = self.session.take() else {
            return;
        };
        if let Some(blip) = session.blip.take() {
            engine.remove_blip(blip);
        }
        despawn_object(engine, &mut session.object);
    }

    fn start_tick(&mut self) {
        if let Some(stale) = self.tick.take() {
            log::debug!("Replacing stale mission tick {:?}", stale);
        }
        let handle = TickHandle(self.next_tick);
        self.next_tick += 1;
        self.tick = Some(handle);
    }

    /// Per-frame update
    pub fn tick<E: Engine>(&mut self, engine: &mut E) {
        if self.tick.is_none() {
            return;
        }
        let Some(step) = self.session.as_ref().map(|s| s.step) else {
            return;
        };

        self.advance_object(engine);

        let position = engine.player_position();
        match step {
            MissionStep::GotoLocation => self.check_arrival(engine, position),
            MissionStep::ReturnToNpc => self.check_npc_proximity(position),
            _ => {}
        }
    }

    fn check_arrival<E: Engine>(&mut self, engine: &mut E, position: Coords) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if position.distance(&session.mission.location) >= ARRIVAL_RADIUS {
            return;
        }

        log::info!("Arrived at the location of {}", session.mission.id);
        session.step = MissionStep::CollectItem;
        if let Some(blip) = session.blip.take() {
            engine.remove_blip(blip);
        }

        let mission = session.mission.clone();
        self.announce_step(&mission, MissionStep::CollectItem);
        if mission.mission_type == MissionType::StealItem {
            self.begin_object_spawn(engine, &mission);
        }
    }

    fn check_npc_proximity(&mut self, position: Coords) {
        let npc = self.npc_coords;
        let Some(session) = self.session.as_mut() else {
            return;
        };

        let distance = position.distance(&npc);
        if distance < NPC_ENTER_RADIUS && !session.near_npc {
            session.near_npc = true;
            let mission_id = session.mission.id.clone();
            self.effects.push(Effect::Local(LocalEvent::ShowTurnInDialog { mission_id }));
            self.notify("Sprich mit Mr Crime, um den Auftrag abzuschließen.", NotifyKind::Primary);
        } else if distance > NPC_EXIT_RADIUS && session.near_npc {
            session.near_npc = false;
        }
    }

    /// Step notifications that depend on the mission type
    fn announce_step(&mut self, mission: &MissionDefinition, step: MissionStep) {
        let text = match (step, mission.mission_type) {
            (MissionStep::CollectItem, MissionType::StealItem) => format!(
                "Du hast den Missionsort erreicht. Finde {}.",
                mission.item_label().unwrap_or("den Gegenstand")
            ),
            (MissionStep::CollectItem, MissionType::StealMoney) => {
                "Du bist am Ort angekommen. Finde das Geld.".to_string()
            }
            (MissionStep::CollectItem, MissionType::StealVehicle) => {
                "Du bist am Ort angekommen. Finde das Fahrzeug.".to_string()
            }
            (MissionStep::CollectItem, MissionType::StealWeapon) => {
                "Du bist am Ort angekommen. Finde die Waffe.".to_string()
            }
            (MissionStep::CollectItem, MissionType::Robbery) => {
                "Du bist am Zielort. Beginne den Raub.".to_string()
            }
            (MissionStep::ReturnToNpc, MissionType::StealItem) => format!(
                "Bringe {} zurück zu Mr Crime.",
                mission.item_label().unwrap_or("den Gegenstand")
            ),
            _ => return,
        };
        self.notify(text, NotifyKind::Primary);
    }

    fn begin_object_spawn<E: Engine>(&mut self, engine: &mut E, mission: &MissionDefinition) {
        let mut model = mission.item_model();
        if !engine.is_model_valid(model) {
            log::error!("Invalid model {} for {}, using {}", model, mission.id, FALLBACK_ITEM_MODEL);
            model = FALLBACK_ITEM_MODEL;
        }

        let request = ModelRequest::start(engine, model, self.model_load_attempts);
        if let Some(session) = self.session.as_mut() {
            session.object = ObjectSlot::Loading {
                request,
                fallback: model == FALLBACK_ITEM_MODEL,
            };
        }
    }

    /// Poll a loading pickup model and spawn the object once it is ready
    fn advance_object<E: Engine>(&mut self, engine: &mut E) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let ObjectSlot::Loading { request, fallback } = &mut session.object else {
            return;
        };

        match request.poll(engine) {
            ModelLoad::Pending => {}
            ModelLoad::Ready => {
                let model = request.model().to_string();
                let mission = &session.mission;
                let at = mission.location;
                let z = resolve_ground(engine, at, &object_chain(), None)
                    .found()
                    .unwrap_or(at.z);

                session.object = match engine.spawn_object(&model, at.with_z(z)) {
                    Some(object) => {
                        let label = mission.item_label().unwrap_or("Gegenstand");
                        engine.add_interaction(object, Interaction {
                            label: format!("{} aufheben", label),
                            event: LocalEvent::CollectMissionItem,
                            distance: PICKUP_DISTANCE,
                        });
                        log::info!("Spawned {} for {} at z {:.2}", model, mission.id, z);
                        ObjectSlot::Spawned(object)
                    }
                    None => {
                        log::error!("Failed to spawn {} for {}", model, mission.id);
                        ObjectSlot::Failed
                    }
                };
                engine.release_model(&model);
            }
            ModelLoad::Failed(e) => {
                log::error!("Pickup object for {}: {}", session.mission.id, e);
                let retry_with_fallback = !*fallback;
                engine.release_model(request.model());
                if retry_with_fallback {
                    let request = ModelRequest::start(engine, FALLBACK_ITEM_MODEL, self.model_load_attempts);
                    session.object = ObjectSlot::Loading { request, fallback: true };
                } else {
                    session.object = ObjectSlot::Failed;
                    self.notify("Der Gegenstand konnte nicht geladen werden.", NotifyKind::Error);
                }
            }
        }
    }
}

fn despawn_object<E: Engine>(engine: &mut E, slot: &mut ObjectSlot) {
    match std::mem::take(slot) {
        ObjectSlot::Spawned(object) => {
            engine.remove_interaction(object);
            if engine.entity_exists(object) {
                engine.delete_entity(object);
            }
        }
        ObjectSlot::Loading { request, .. } => request.release(engine),
        ObjectSlot::None | ObjectSlot::Failed => {}
    }
}
