//! Reward item table
//!
//! Mission rewards and collected mission items name items by id. The table
//! supplies their display labels (used in notifications) and stack limits
//! (used by the slot inventory). Ids missing from the table still work and
//! fall back to the raw id and the default stack size.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use super::item_def::{DEFAULT_MAX_STACK, ItemDefinition, RawItemDefinition};

/// Directory below the data dir holding `*.toml` item tables
pub const ITEMS_DIR: &str = "items";

#[derive(Debug, Error)]
pub enum ItemLoadError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Default)]
pub struct ItemRegistry {
    items: HashMap<String, ItemDefinition>,
}

impl ItemRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every item table found in `<data_dir>/items`
    ///
    /// Files are read in name order so a duplicate id always resolves to the
    /// same definition. Returns the number of files read.
    pub fn load_from_directory(&mut self, data_dir: &Path) -> Result<usize, ItemLoadError> {
        let items_dir = data_dir.join(ITEMS_DIR);
        if !items_dir.is_dir() {
            warn!("No item tables at {:?}, reward labels fall back to item ids", items_dir);
            return Ok(0);
        }

        let mut files: Vec<PathBuf> = std::fs::read_dir(&items_dir)
            .map_err(|source| ItemLoadError::Io { path: items_dir.clone(), source })?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "toml"))
            .collect();
        files.sort();

        for path in &files {
            let table = read_table(path)?;
            debug!("{} item definitions in {:?}", table.len(), path);
            for (id, raw) in table {
                let item = ItemDefinition::from_raw(&id, &raw);
                if self.items.insert(id.clone(), item).is_some() {
                    warn!("Item '{}' redefined in {:?}", id, path);
                }
            }
        }

        info!("Loaded {} reward items from {} file(s)", self.items.len(), files.len());
        Ok(files.len())
    }

    pub fn get(&self, id: &str) -> Option<&ItemDefinition> {
        self.items.get(id)
    }

    /// Display label for an item, falling back to its id
    pub fn label<'a>(&'a self, id: &'a str) -> &'a str {
        self.get(id).map_or(id, |i| i.display_name.as_str())
    }

    pub fn max_stack(&self, id: &str) -> i32 {
        self.get(id).map_or(DEFAULT_MAX_STACK, |i| i.max_stack)
    }

    #[cfg(test)]
    pub fn insert(&mut self, id: &str, item: ItemDefinition) {
        self.items.insert(id.to_string(), item);
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

fn read_table(path: &Path) -> Result<HashMap<String, RawItemDefinition>, ItemLoadError> {
    let content = std::fs::read_to_string(path)
        .map_err(|source| ItemLoadError::Io { path: path.to_path_buf(), source })?;
    toml::from_str(&content).map_err(|source| ItemLoadError::Parse { path: path.to_path_buf(), source })
}
