//! Mr Crime, the quest giver ped
//!
//! Spawning takes several frames: an initial delay, then a bounded model
//! load, then placement on the ground.

use crate::config::{NpcConfig, DEFAULT_NPC_COORDS};
use crate::engine::ground::{npc_chain, resolve_ground};
use crate::engine::{Coords, Engine, EntityHandle, Interaction, ModelLoad, ModelRequest};
use crate::events::LocalEvent;

pub const NPC_SCENARIO: &str = "WORLD_HUMAN_SMOKING";
/// An existing ped this close to the spawn point is taken over
pub const REUSE_RADIUS: f32 = 1.0;
/// Peds are dropped in above their spot and then snapped down
pub const SPAWN_HEIGHT: f32 = 2.0;
pub const TALK_DISTANCE: f32 = 2.5;
pub const RESPAWN_DELAY_SECS: f32 = 0.5;

#[derive(Debug)]
pub enum NpcState {
    Waiting { remaining: f32 },
    Loading(ModelRequest),
    Spawned(EntityHandle),
    Failed,
    Removed,
}

pub struct NpcManager {
    config: NpcConfig,
    state: NpcState,
    model_load_attempts: u32,
}

impl NpcManager {
    pub fn new(config: NpcConfig, model_load_attempts: u32) -> Self {
        let remaining = config.spawn_delay_secs;
        Self {
            config,
            state: NpcState::Waiting { remaining },
            model_load_attempts,
        }
    }

    pub fn state(&self) -> &NpcState {
        &self.state
    }

    pub fn handle(&self) -> Option<EntityHandle> {
        match self.state {
            NpcState::Spawned(ped) => Some(ped),
            _ => None,
        }
    }

    pub fn is_spawned(&self) -> bool {
        self.handle().is_some()
    }

    /// Configured standing spot
    pub fn coords(&self) -> Coords {
        self.config.coords
    }

    pub fn update<E: Engine>(&mut self, engine: &mut E, dt: f32) {
        match &mut self.state {
            NpcState::Waiting { remaining } => {
                *remaining -= dt;
                if *remaining <= 0.0 {
                    self.state = self.begin_spawn(engine);
                }
            }
            NpcState::Loading(request) => match request.poll(engine) {
                ModelLoad::Pending => {}
                ModelLoad::Ready => {
                    let model = request.model().to_string();
                    self.state = self.spawn(engine);
                    engine.release_model(&model);
                }
                ModelLoad::Failed(e) => {
                    log::error!("Failed to load NPC model: {}", e);
                    engine.release_model(request.model());
                    self.state = NpcState::Failed;
                }
            },
            NpcState::Spawned(_) | NpcState::Failed | NpcState::Removed => {}
        }
    }

    fn begin_spawn<E: Engine>(&self, engine: &mut E) -> NpcState {
        let coords = self.config.coords;

        if let Some(ped) = engine.find_ped_near(coords, REUSE_RADIUS) {
            log::info!("Reusing existing ped at ({:.2}, {:.2}, {:.2})", coords.x, coords.y, coords.z);
            self.attach_interaction(engine, ped);
            return NpcState::Spawned(ped);
        }

        let model = &self.config.model;
        if !engine.is_model_in_cdimage(model) {
            log::error!("NPC model {} does not exist", model);
            return NpcState::Failed;
        }

        log::debug!("Loading NPC model {}", model);
        NpcState::Loading(ModelRequest::start(engine, model, self.model_load_attempts))
    }

    fn spawn<E: Engine>(&self, engine: &mut E) -> NpcState {
        let coords = self.config.coords;
        let drop_at = coords.with_z(coords.z + SPAWN_HEIGHT);

        let Some(ped) = engine.spawn_ped(&self.config.model, drop_at, self.config.heading) else {
            log::error!("Failed to create NPC ped");
            return NpcState::Failed;
        };

        let position = engine.entity_position(ped).unwrap_or(drop_at);
        match resolve_ground(engine, position, &npc_chain(DEFAULT_NPC_COORDS), Some(ped)).found() {
            Some(z) => engine.set_entity_position(ped, position.with_z(z)),
            None => log::warn!("No ground below the NPC, leaving it at z {:.2}", position.z),
        }

        engine.configure_ped(ped, NPC_SCENARIO);
        self.attach_interaction(engine, ped);
        log::info!("Mr Crime spawned at ({:.2}, {:.2})", coords.x, coords.y);
        NpcState::Spawned(ped)
    }

    fn attach_interaction<E: Engine>(&self, engine: &mut E, ped: EntityHandle) {
        engine.add_interaction(ped, Interaction {
            label: "Quatschen..".to_string(),
            event: LocalEvent::OpenMenu,
            distance: TALK_DISTANCE,
        });
    }

    /// Remove the ped and its interaction
    pub fn cleanup<E: Engine>(&mut self, engine: &mut E) {
        match std::mem::replace(&mut self.state, NpcState::Removed) {
            NpcState::Spawned(ped) => {
                engine.remove_interaction(ped);
                if engine.entity_exists(ped) {
                    engine.delete_entity(ped);
                }
                log::info!("Mr Crime removed");
            }
            NpcState::Loading(request) => request.release(engine),
            _ => {}
        }
    }

    /// Clean up and spawn again after a short delay
    pub fn respawn<E: Engine>(&mut self, engine: &mut E) {
        self.cleanup(engine);
        self.state = NpcState::Waiting { remaining: RESPAWN_DELAY_SECS };
    }
}
