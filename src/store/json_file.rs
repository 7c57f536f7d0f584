use crate::error::{Error, Result};
use crate::store::CacheStore;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File-backed store: each key maps to `<dir>/<key>.json`.
///
/// Writes go through a sibling temp file and a rename, so a payload is either
/// fully on disk or the previous file is untouched. Reads that hit a missing
/// file create it empty, matching how the cache files have always behaved.
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl CacheStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<Value> {
        let path = self.path_for(key);
        if !path.exists() {
            debug!("No cache file at {}, creating it", path.display());
            if let Err(e) = create_empty(&path) {
                warn!("Could not create cache file {}: {e}", path.display());
            }
            return None;
        }

        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!("Could not read cache file {}: {e}", path.display());
                return None;
            }
        };

        match serde_json::from_str(&contents) {
            Ok(value) => {
                debug!("Cache file HIT: {}", path.display());
                Some(value)
            }
            Err(e) => {
                debug!("Cache file {} is not valid JSON: {e}", path.display());
                None
            }
        }
    }

    fn put(&self, key: &str, payload: &Value) -> Result<()> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| Error::Store {
                path: path.clone(),
                source,
            })?;
        }

        let tmp = path.with_extension("json.tmp");
        let bytes = serde_json::to_vec(payload).map_err(Error::Encode)?;
        fs::write(&tmp, bytes).map_err(|source| Error::Store {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| Error::Store {
            path: path.clone(),
            source,
        })?;
        debug!("Cache file PUT: {}", path.display());
        Ok(())
    }
}

fn create_empty(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, "")
}
