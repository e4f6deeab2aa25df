//! Mission Catalog
//!
//! Loads and caches mission definitions from `missions.toml`.
//! Supports hot-reloading during development.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use super::definition::{MissionDefinition, RawMission, ValidationReport, extend_validated};

/// File name of the catalog inside the data directory
pub const CATALOG_FILE: &str = "missions.toml";

/// Validated mission definitions in declaration order
pub struct MissionCatalog {
    missions: RwLock<Vec<Arc<MissionDefinition>>>,
    path: PathBuf,
}

impl MissionCatalog {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            missions: RwLock::new(Vec::new()),
            path: data_dir.join(CATALOG_FILE),
        }
    }

    /// Build a catalog from already validated definitions
    #[cfg(test)]
    pub fn from_definitions(missions: Vec<MissionDefinition>) -> Self {
        Self {
            missions: RwLock::new(missions.into_iter().map(Arc::new).collect()),
            path: PathBuf::new(),
        }
    }

    /// (Re)load the catalog from disk, replacing the current contents
    ///
    /// Invalid entries are dropped; only an unreadable or unparsable file is
    /// an error, in which case the current contents are kept.
    pub async fn load_all(&self) -> Result<ValidationReport, String> {
        info!("Loading missions from {:?}", self.path);

        let report = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => parse_catalog(&content)
                .map_err(|e| format!("Failed to parse {:?}: {}", self.path, e))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Mission catalog does not exist: {:?}", self.path);
                ValidationReport::default()
            }
            Err(e) => return Err(format!("Failed to read {:?}: {}", self.path, e)),
        };

        let mut missions = self.missions.write().await;
        *missions = report.accepted.iter().cloned().map(Arc::new).collect();
        info!("Loaded {} mission definitions", missions.len());

        Ok(report)
    }

    /// Get a mission by ID
    pub async fn get(&self, mission_id: &str) -> Option<Arc<MissionDefinition>> {
        let missions = self.missions.read().await;
        missions.iter().find(|m| m.id == mission_id).cloned()
    }

    /// Snapshot of all missions in catalog order
    pub async fn all(&self) -> Vec<Arc<MissionDefinition>> {
        self.missions.read().await.clone()
    }

    /// Get count of loaded missions
    pub async fn count(&self) -> usize {
        self.missions.read().await.len()
    }

    /// Start file watcher for hot-reload
    /// Returns a channel receiver that signals when reloads occur
    pub fn start_file_watcher(
        self: &Arc<Self>,
    ) -> Result<tokio::sync::mpsc::Receiver<HotReloadEvent>, String> {
        use notify::{Config, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
        use std::time::Duration;

        let watch_dir = self.path.parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| format!("Catalog path {:?} has no parent directory", self.path))?;
        if !watch_dir.exists() {
            return Err(format!("Data directory does not exist: {:?}", watch_dir));
        }

        let (tx, rx) = tokio::sync::mpsc::channel(32);
        let catalog = Arc::clone(self);
        let catalog_path = self.path.clone();
        let rt = tokio::runtime::Handle::current();

        // notify is sync, so the watcher lives on its own thread
        std::thread::spawn(move || {
            let (notify_tx, notify_rx) = std::sync::mpsc::channel();

            let mut watcher = match RecommendedWatcher::new(
                move |res: Result<notify::Event, notify::Error>| {
                    if let Ok(event) = res {
                        let _ = notify_tx.send(event);
                    }
                },
                Config::default().with_poll_interval(Duration::from_secs(1)),
            ) {
                Ok(w) => w,
                Err(e) => {
                    tracing::error!("Failed to create file watcher: {}", e);
                    return;
                }
            };

            if let Err(e) = watcher.watch(&watch_dir, RecursiveMode::NonRecursive) {
                tracing::error!("Failed to watch data directory: {}", e);
                return;
            }

            info!("Mission hot-reload watcher started for {:?}", catalog_path);

            while let Ok(event) = notify_rx.recv() {
                if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                    continue;
                }
                if !event.paths.iter().any(|p| p.file_name() == catalog_path.file_name()) {
                    continue;
                }

                info!("Detected change in {:?}, triggering reload", catalog_path);

                let catalog = Arc::clone(&catalog);
                let tx = tx.clone();
                rt.spawn(async move {
                    match catalog.load_all().await {
                        Ok(report) => {
                            info!("Hot-reload completed successfully");
                            let _ = tx.send(HotReloadEvent::Reloaded(report.accepted.len())).await;
                        }
                        Err(e) => {
                            tracing::error!("Hot-reload failed: {}", e);
                            let _ = tx.send(HotReloadEvent::Error(e)).await;
                        }
                    }
                });
            }
        });

        Ok(rx)
    }
}

/// Parse catalog text, validating each `[[missions]]` entry on its own
pub fn parse_catalog(content: &str) -> Result<ValidationReport, toml::de::Error> {
    let table: toml::Table = content.parse()?;
    let mut report = ValidationReport::default();

    let entries = match table.get("missions") {
        Some(toml::Value::Array(entries)) => entries.clone(),
        Some(_) => {
            report.reject("'missions' must be an array of tables".to_string());
            return Ok(report);
        }
        None => Vec::new(),
    };

    let mut decoded = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        match entry.try_into::<RawMission>() {
            Ok(raw) => decoded.push(raw),
            Err(e) => report.reject(format!("entry #{} could not be decoded: {}", index + 1, e)),
        }
    }

    extend_validated(&mut report, &decoded);
    Ok(report)
}

/// Events from the hot-reload watcher
#[derive(Debug, Clone)]
pub enum HotReloadEvent {
    /// The catalog was reloaded with this many missions
    Reloaded(usize),
    /// An error occurred during reload
    Error(String),
}
