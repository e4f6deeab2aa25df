//! In-process game world
//!
//! A small world model implementing [`Engine`] without a real game behind it.
//! The macroquad host draws it; tests drive it directly.

use std::collections::{BTreeMap, HashMap, HashSet};

use super::{BlipHandle, Coords, Engine, EntityHandle, Interaction};
use crate::events::LocalEvent;

/// Models the sandbox knows about
pub const SANDBOX_MODELS: &[&str] = &[
    "s_m_y_dealer_01",
    "prop_cs_package_01",
    "prop_idol_01",
    "prop_drug_package_01",
    "prop_money_bag_01",
];

/// Ground shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Terrain {
    Flat(f32),
    /// Gentle hills around `base`
    Rolling { base: f32, amplitude: f32, wavelength: f32 },
    /// No ground anywhere
    Void,
}

impl Terrain {
    pub fn height_at(&self, x: f32, y: f32) -> Option<f32> {
        match *self {
            Terrain::Flat(z) => Some(z),
            Terrain::Rolling { base, amplitude, wavelength } => {
                Some(base + amplitude * (x / wavelength).sin() * (y / wavelength).cos())
            }
            Terrain::Void => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Object,
    Ped,
}

#[derive(Debug, Clone)]
pub struct SandboxEntity {
    pub kind: EntityKind,
    pub model: String,
    pub position: Coords,
    pub heading: f32,
    pub frozen: bool,
    pub invincible: bool,
    pub scenario: Option<String>,
    pub interaction: Option<Interaction>,
}

#[derive(Debug, Clone)]
pub struct Blip {
    pub coords: Coords,
    pub label: String,
}

pub struct SandboxEngine {
    pub player: Coords,
    terrain: Terrain,
    raycast_enabled: bool,
    height_query_enabled: bool,
    valid_models: HashSet<String>,
    image_models: HashSet<String>,
    stream_frames: u32,
    streaming: HashMap<String, u32>,
    loaded: HashSet<String>,
    blips: BTreeMap<u32, Blip>,
    entities: BTreeMap<u32, SandboxEntity>,
    next_handle: u32,
}

impl SandboxEngine {
    pub fn new() -> Self {
        let models: HashSet<String> = SANDBOX_MODELS.iter().map(|m| m.to_string()).collect();
        Self {
            player: Coords::default(),
            terrain: Terrain::Flat(0.0),
            raycast_enabled: true,
            height_query_enabled: true,
            image_models: models.clone(),
            valid_models: models,
            stream_frames: 0,
            streaming: HashMap::new(),
            loaded: HashSet::new(),
            blips: BTreeMap::new(),
            entities: BTreeMap::new(),
            next_handle: 1,
        }
    }

    pub fn set_terrain(&mut self, terrain: Terrain) {
        self.terrain = terrain;
    }

    pub fn terrain(&self) -> Terrain {
        self.terrain
    }

    pub fn set_raycast_enabled(&mut self, enabled: bool) {
        self.raycast_enabled = enabled;
    }

    pub fn set_height_query_enabled(&mut self, enabled: bool) {
        self.height_query_enabled = enabled;
    }

    /// Frames a requested model takes to stream in
    pub fn set_stream_frames(&mut self, frames: u32) {
        self.stream_frames = frames;
    }

    /// Forget a model entirely
    pub fn remove_model(&mut self, model: &str) {
        self.valid_models.remove(model);
        self.image_models.remove(model);
    }

    /// Keep a model valid but drop it from the game assets
    pub fn remove_from_image(&mut self, model: &str) {
        self.image_models.remove(model);
    }

    /// One frame of model streaming
    pub fn advance_streaming(&mut self) {
        let mut finished = Vec::new();
        for (model, remaining) in self.streaming.iter_mut() {
            *remaining = remaining.saturating_sub(1);
            if *remaining == 0 {
                finished.push(model.clone());
            }
        }
        for model in finished {
            self.streaming.remove(&model);
            self.loaded.insert(model);
        }
    }

    /// Move the player on the ground plane, keeping them on the terrain
    pub fn move_player(&mut self, dx: f32, dy: f32) {
        self.player.x += dx;
        self.player.y += dy;
        if let Some(z) = self.terrain.height_at(self.player.x, self.player.y) {
            self.player.z = z;
        }
    }

    pub fn blips(&self) -> impl Iterator<Item = &Blip> {
        self.blips.values()
    }

    pub fn entities(&self) -> impl Iterator<Item = (EntityHandle, &SandboxEntity)> {
        self.entities.iter().map(|(id, e)| (EntityHandle(*id), e))
    }

    pub fn entity(&self, entity: EntityHandle) -> Option<&SandboxEntity> {
        self.entities.get(&entity.0)
    }

    /// Closest interaction the player is in range of
    pub fn nearest_interaction(&self) -> Option<(EntityHandle, &Interaction)> {
        self.entities
            .iter()
            .filter_map(|(id, e)| {
                let interaction = e.interaction.as_ref()?;
                let distance = e.position.distance(&self.player);
                (distance <= interaction.distance).then_some((distance, EntityHandle(*id), interaction))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, handle, interaction)| (handle, interaction))
    }

    /// Use the closest interaction, returning the event it emits
    pub fn interact(&self) -> Option<LocalEvent> {
        self.nearest_interaction().map(|(_, interaction)| interaction.event.clone())
    }

    fn allocate(&mut self) -> u32 {
        let id = self.next_handle;
        self.next_handle += 1;
        id
    }

    fn spawn(&mut self, kind: EntityKind, model: &str, coords: Coords, heading: f32) -> Option<EntityHandle> {
        if !self.loaded.contains(model) {
            log::warn!("Cannot spawn {}: model is not loaded", model);
            return None;
        }
        let id = self.allocate();
        self.entities.insert(id, SandboxEntity {
            kind,
            model: model.to_string(),
            position: coords,
            heading,
            frozen: kind == EntityKind::Object,
            invincible: false,
            scenario: None,
            interaction: None,
        });
        Some(EntityHandle(id))
    }
}

impl Default for SandboxEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for SandboxEngine {
    fn player_position(&self) -> Coords {
        self.player
    }

    fn add_blip(&mut self, coords: Coords, label: &str) -> BlipHandle {
        let id = self.allocate();
        self.blips.insert(id, Blip { coords, label: label.to_string() });
        BlipHandle(id)
    }

    fn remove_blip(&mut self, blip: BlipHandle) {
        self.blips.remove(&blip.0);
    }

    fn is_model_valid(&self, model: &str) -> bool {
        self.valid_models.contains(model)
    }

    fn is_model_in_cdimage(&self, model: &str) -> bool {
        self.image_models.contains(model)
    }

    fn request_model(&mut self, model: &str) {
        if !self.valid_models.contains(model) || self.loaded.contains(model) {
            return;
        }
        if self.stream_frames == 0 {
            self.loaded.insert(model.to_string());
        } else {
            self.streaming.entry(model.to_string()).or_insert(self.stream_frames);
        }
    }

    fn has_model_loaded(&self, model: &str) -> bool {
        self.loaded.contains(model)
    }

    fn release_model(&mut self, model: &str) {
        self.loaded.remove(model);
        self.streaming.remove(model);
    }

    // Entities do not block rays, so `ignore` has nothing to skip
    fn raycast_ground(&self, from: Coords, to: Coords, _ignore: Option<EntityHandle>) -> Option<f32> {
        if !self.raycast_enabled {
            return None;
        }
        let z = self.terrain.height_at(from.x, from.y)?;
        let (low, high) = if from.z < to.z { (from.z, to.z) } else { (to.z, from.z) };
        (low..=high).contains(&z).then_some(z)
    }

    fn ground_z(&self, x: f32, y: f32, from_z: f32) -> Option<f32> {
        if !self.height_query_enabled {
            return None;
        }
        self.terrain.height_at(x, y).filter(|z| *z <= from_z)
    }

    fn spawn_object(&mut self, model: &str, coords: Coords) -> Option<EntityHandle> {
        self.spawn(EntityKind::Object, model, coords, 0.0)
    }

    fn spawn_ped(&mut self, model: &str, coords: Coords, heading: f32) -> Option<EntityHandle> {
        self.spawn(EntityKind::Ped, model, coords, heading)
    }

    fn find_ped_near(&self, coords: Coords, radius: f32) -> Option<EntityHandle> {
        self.entities
            .iter()
            .filter(|(_, e)| e.kind == EntityKind::Ped)
            .map(|(id, e)| (e.position.distance(&coords), *id))
            .filter(|(distance, _)| *distance <= radius)
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, id)| EntityHandle(id))
    }

    fn configure_ped(&mut self, ped: EntityHandle, scenario: &str) {
        if let Some(entity) = self.entities.get_mut(&ped.0) {
            entity.frozen = true;
            entity.invincible = true;
            entity.scenario = Some(scenario.to_string());
        }
    }

    fn entity_position(&self, entity: EntityHandle) -> Option<Coords> {
        self.entities.get(&entity.0).map(|e| e.position)
    }

    fn set_entity_position(&mut self, entity: EntityHandle, coords: Coords) {
        if let Some(e) = self.entities.get_mut(&entity.0) {
            e.position = coords;
        }
    }

    fn entity_exists(&self, entity: EntityHandle) -> bool {
        self.entities.contains_key(&entity.0)
    }

    fn delete_entity(&mut self, entity: EntityHandle) {
        self.entities.remove(&entity.0);
    }

    fn add_interaction(&mut self, entity: EntityHandle, interaction: Interaction) {
        if let Some(e) = self.entities.get_mut(&entity.0) {
            e.interaction = Some(interaction);
        }
    }

    fn remove_interaction(&mut self, entity: EntityHandle) {
        if let Some(e) = self.entities.get_mut(&entity.0) {
            e.interaction = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_requires_loaded_model() {
        let mut engine = SandboxEngine::new();
        assert!(engine.spawn_object("prop_idol_01", Coords::default()).is_none());

        engine.request_model("prop_idol_01");
        let handle = engine.spawn_object("prop_idol_01", Coords::default()).unwrap();
        assert!(engine.entity(handle).unwrap().frozen);
    }

    #[test]
    fn test_interaction_range() {
        let mut engine = SandboxEngine::new();
        engine.request_model("prop_idol_01");
        let handle = engine.spawn_object("prop_idol_01", Coords::new(10.0, 0.0, 0.0)).unwrap();
        engine.add_interaction(handle, Interaction {
            label: "Statue aufheben".to_string(),
            event: LocalEvent::CollectMissionItem,
            distance: 2.5,
        });

        engine.player = Coords::new(7.0, 0.0, 0.0);
        assert_eq!(engine.interact(), None);
        engine.player = Coords::new(8.0, 0.0, 0.0);
        assert_eq!(engine.interact(), Some(LocalEvent::CollectMissionItem));
    }

    #[test]
    fn test_find_ped_near_ignores_objects() {
        let mut engine = SandboxEngine::new();
        engine.request_model("s_m_y_dealer_01");
        engine.request_model("prop_idol_01");
        engine.spawn_object("prop_idol_01", Coords::new(0.5, 0.0, 0.0)).unwrap();
        assert_eq!(engine.find_ped_near(Coords::default(), 1.0), None);

        let ped = engine.spawn_ped("s_m_y_dealer_01", Coords::new(0.0, 0.8, 0.0), 90.0).unwrap();
        assert_eq!(engine.find_ped_near(Coords::default(), 1.0), Some(ped));
    }

    #[test]
    fn test_move_player_follows_terrain() {
        let mut engine = SandboxEngine::new();
        engine.set_terrain(Terrain::Flat(29.0));
        engine.move_player(3.0, -4.0);
        assert_eq!(engine.player, Coords::new(3.0, -4.0, 29.0));
    }
}
