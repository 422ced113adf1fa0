//! Persisted user preferences.
//!
//! Loaded once by merging the stored JSON blob over hard defaults (stored values win per
//! key) and re-serialized in full after every mutation. There is no schema version: keys this
//! build does not know are carried along untouched.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use tokio::sync::watch;

use crate::error::{ClientError, ClientResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Items per page; 0 shows everything on one page.
    pub page_size: u32,
    /// Card grid instead of the detail list.
    pub card_layout: bool,
    pub filter_accordion_open: bool,
    pub server_info_accordion_open: bool,
    /// Target of the last "move to library" action.
    pub last_move_subfolder: String,
    pub show_video_preview: bool,
    /// Minimum score (percent) for the similar-videos lookup.
    pub similar_threshold: u8,
    /// Keys written by other builds; kept so that saving does not drop them.
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// Page sizes offered by the filter panel.
pub const PAGE_SIZE_CHOICES: [u32; 5] = [4, 8, 12, 24, 0];

impl Default for Settings {
    fn default() -> Self {
        Self {
            page_size: 12,
            card_layout: true,
            filter_accordion_open: false,
            server_info_accordion_open: false,
            last_move_subfolder: String::new(),
            show_video_preview: true,
            similar_threshold: 80,
            extra: Map::new(),
        }
    }
}

impl Settings {
    /// Merges `stored` over the defaults key by key. A stored value of the wrong type is
    /// skipped (the default stays) instead of discarding the whole blob.
    pub fn merged_over_defaults(stored: &JsonValue) -> Self {
        let defaults = Settings::default();
        let Some(stored) = stored.as_object() else {
            return defaults;
        };
        let mut merged = match serde_json::to_value(&defaults) {
            Ok(JsonValue::Object(map)) => map,
            _ => return defaults,
        };
        let mut current = defaults;
        for (key, value) in stored {
            let mut candidate = merged.clone();
            candidate.insert(key.clone(), value.clone());
            match serde_json::from_value::<Settings>(JsonValue::Object(candidate.clone())) {
                Ok(settings) => {
                    merged = candidate;
                    current = settings;
                }
                Err(e) => {
                    tracing::warn!(key = %key, "ignoring stored setting: {}", e);
                }
            }
        }
        current.similar_threshold = current.similar_threshold.min(100);
        current
    }
}

/// Minimal string key/value persistence, the equivalent of browser local storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> ClientResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> ClientResult<()>;
}

/// One `<key>.json` file per key below a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> ClientResult<PathBuf> {
        let valid = !key.is_empty()
            && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(ClientError::validation("key", format!("invalid storage key: {:?}", key)));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> ClientResult<Option<String>> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> ClientResult<()> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir)?;
        // Write to a temp file first, rename on success to avoid half-written blobs.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> ClientResult<Option<String>> {
        Ok(self.entries.lock().unwrap_or_else(|e| e.into_inner()).get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> ClientResult<()> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Reactive settings bag bound to its persistent key.
pub struct SettingsStore {
    tx: watch::Sender<Settings>,
    storage: Arc<dyn KeyValueStore>,
    key: String,
}

impl SettingsStore {
    /// Reads the stored blob once. Missing or unreadable data falls back to the defaults.
    pub fn load(storage: Arc<dyn KeyValueStore>, key: &str) -> Self {
        let settings = match storage.get(key) {
            Ok(Some(raw)) => match serde_json::from_str::<JsonValue>(&raw) {
                Ok(value) => Settings::merged_over_defaults(&value),
                Err(e) => {
                    tracing::warn!(key, "stored settings are not valid JSON, using defaults: {}", e);
                    Settings::default()
                }
            },
            Ok(None) => Settings::default(),
            Err(e) => {
                tracing::warn!(key, "failed to read settings, using defaults: {}", e);
                Settings::default()
            }
        };
        let (tx, _rx) = watch::channel(settings);
        Self { tx, storage, key: key.to_string() }
    }

    pub fn get(&self) -> Settings {
        self.tx.borrow().clone()
    }

    pub fn page_size(&self) -> u32 {
        self.tx.borrow().page_size
    }

    pub fn subscribe(&self) -> watch::Receiver<Settings> {
        self.tx.subscribe()
    }

    /// Applies `f` and writes the whole bag back. The in-memory value changes even when the
    /// write fails; the error is returned for logging.
    pub fn update<F>(&self, f: F) -> ClientResult<()>
    where
        F: FnOnce(&mut Settings),
    {
        self.tx.send_modify(|s| {
            f(s);
            s.similar_threshold = s.similar_threshold.min(100);
        });
        self.persist()
    }

    pub fn persist(&self) -> ClientResult<()> {
        let raw = serde_json::to_string(&*self.tx.borrow())?;
        self.storage.set(&self.key, &raw)
    }
}
