//! Ground placement
//!
//! Spawned props and peds are snapped to the ground by trying an ordered list
//! of samples. The first sample that finds ground wins; if none does the
//! caller keeps its original height.

use super::{Coords, Engine, EntityHandle};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GroundSample {
    Found(f32),
    NotFound,
}

impl GroundSample {
    pub fn found(self) -> Option<f32> {
        match self {
            GroundSample::Found(z) => Some(z),
            GroundSample::NotFound => None,
        }
    }
}

/// Where a height query starts probing downwards from
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleStart {
    /// Fixed world height
    Absolute(f32),
    /// Offset above the position being placed
    Above(f32),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GroundStrategy {
    /// Ray from `above` units over the position down to `below` units under it
    Raycast { above: f32, below: f32, offset: f32 },
    /// Engine ground height query
    HeightQuery { start: SampleStart, offset: f32 },
    /// Known height for one spot on the map
    Fixed { x: f32, y: f32, tolerance: f32, z: f32 },
}

impl GroundStrategy {
    pub fn sample<E: Engine + ?Sized>(&self, engine: &E, at: Coords, ignore: Option<EntityHandle>) -> GroundSample {
        let hit = match *self {
            GroundStrategy::Raycast { above, below, offset } => engine
                .raycast_ground(at.with_z(at.z + above), at.with_z(at.z - below), ignore)
                .map(|z| z + offset),
            GroundStrategy::HeightQuery { start, offset } => {
                let from_z = match start {
                    SampleStart::Absolute(z) => z,
                    SampleStart::Above(dz) => at.z + dz,
                };
                engine.ground_z(at.x, at.y, from_z).map(|z| z + offset)
            }
            GroundStrategy::Fixed { x, y, tolerance, z } => {
                ((at.x - x).abs() < tolerance && (at.y - y).abs() < tolerance).then_some(z)
            }
        };

        match hit {
            Some(z) => GroundSample::Found(z),
            None => GroundSample::NotFound,
        }
    }
}

/// Try each strategy in order
pub fn resolve_ground<E: Engine + ?Sized>(
    engine: &E,
    at: Coords,
    chain: &[GroundStrategy],
    ignore: Option<EntityHandle>,
) -> GroundSample {
    for strategy in chain {
        if let GroundSample::Found(z) = strategy.sample(engine, at, ignore) {
            log::debug!("Ground at ({:.2}, {:.2}) found by {:?}: {:.2}", at.x, at.y, strategy, z);
            return GroundSample::Found(z);
        }
    }
    log::debug!("No ground found at ({:.2}, {:.2}, {:.2})", at.x, at.y, at.z);
    GroundSample::NotFound
}

/// Placement chain for mission pickup objects
pub fn object_chain() -> Vec<GroundStrategy> {
    vec![
        GroundStrategy::Raycast { above: 50.0, below: 50.0, offset: 0.2 },
        GroundStrategy::HeightQuery { start: SampleStart::Absolute(100.0), offset: 0.2 },
    ]
}

/// Placement chain for the quest giver at `default` (its configured spot)
pub fn npc_chain(default: Coords) -> Vec<GroundStrategy> {
    vec![
        GroundStrategy::Raycast { above: 20.0, below: 50.0, offset: 0.05 },
        GroundStrategy::HeightQuery { start: SampleStart::Above(10.0), offset: 0.05 },
        GroundStrategy::Fixed { x: default.x, y: default.y, tolerance: 1.0, z: 29.0 },
    ]
}
