//! Host engine seam
//!
//! Everything the mission and NPC logic needs from the game world goes
//! through [`Engine`]. The sandbox host implements it for the macroquad demo,
//! tests implement it with recording fakes.

pub mod ground;
pub mod model;
pub mod sandbox;

pub use ground::{GroundSample, GroundStrategy};
pub use model::{ModelLoad, ModelLoadError, ModelRequest, DEFAULT_MODEL_LOAD_ATTEMPTS};
pub use sandbox::SandboxEngine;

use serde::{Deserialize, Serialize};

use crate::events::LocalEvent;

/// World position in engine units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coords {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Coords {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Euclidean 3D distance
    pub fn distance(&self, other: &Coords) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    pub fn with_z(self, z: f32) -> Self {
        Self { z, ..self }
    }
}

/// Map marker handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlipHandle(pub u32);

/// Spawned object or ped handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityHandle(pub u32);

/// Prompt attached to an entity; using it emits `event` locally
#[derive(Debug, Clone, PartialEq)]
pub struct Interaction {
    pub label: String,
    pub event: LocalEvent,
    pub distance: f32,
}

pub trait Engine {
    fn player_position(&self) -> Coords;

    /// Add a waypoint blip with a route to it
    fn add_blip(&mut self, coords: Coords, label: &str) -> BlipHandle;
    fn remove_blip(&mut self, blip: BlipHandle);

    /// Model name is known to the engine at all
    fn is_model_valid(&self, model: &str) -> bool;
    /// Model is shipped with the game assets (stricter than `is_model_valid`)
    fn is_model_in_cdimage(&self, model: &str) -> bool;
    fn request_model(&mut self, model: &str);
    fn has_model_loaded(&self, model: &str) -> bool;
    fn release_model(&mut self, model: &str);

    /// Cast a ray from `from` to `to`, returning the z of the first hit
    fn raycast_ground(&self, from: Coords, to: Coords, ignore: Option<EntityHandle>) -> Option<f32>;
    /// Ground height below (x, y), probing downwards from `from_z`
    fn ground_z(&self, x: f32, y: f32, from_z: f32) -> Option<f32>;

    fn spawn_object(&mut self, model: &str, coords: Coords) -> Option<EntityHandle>;
    fn spawn_ped(&mut self, model: &str, coords: Coords, heading: f32) -> Option<EntityHandle>;
    /// Closest ped within `radius` of `coords`
    fn find_ped_near(&self, coords: Coords, radius: f32) -> Option<EntityHandle>;
    /// Freeze the ped in place, make it invincible and start its idle scenario
    fn configure_ped(&mut self, ped: EntityHandle, scenario: &str);
    fn entity_position(&self, entity: EntityHandle) -> Option<Coords>;
    fn set_entity_position(&mut self, entity: EntityHandle, coords: Coords);
    fn entity_exists(&self, entity: EntityHandle) -> bool;
    fn delete_entity(&mut self, entity: EntityHandle);

    fn add_interaction(&mut self, entity: EntityHandle, interaction: Interaction);
    fn remove_interaction(&mut self, entity: EntityHandle);
}
