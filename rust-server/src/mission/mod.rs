pub mod catalog;
pub mod definition;
pub mod error;
pub mod ledger;
pub mod service;

pub use catalog::{HotReloadEvent, MissionCatalog};
pub use definition::{Location, MissionDefinition};
pub use service::MissionService;
