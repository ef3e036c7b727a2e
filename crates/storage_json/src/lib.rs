use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use core_types::KeyValueStore;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

mod memory;

pub use memory::MemoryStore;

const SCHEMA_VERSION: u32 = 1;

#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    schema_version: u32,
    #[serde(default)]
    values: BTreeMap<String, String>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join("store.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_values(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let text = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        let doc: StoreFile = serde_json::from_str(&text)
            .with_context(|| format!("failed to parse {}", self.path.display()))?;
        if doc.schema_version > SCHEMA_VERSION {
            bail!(
                "store file {} has schema version {}, newest supported is {}",
                self.path.display(),
                doc.schema_version,
                SCHEMA_VERSION
            );
        }
        Ok(doc.values)
    }

    fn save_values(&self, values: BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let doc = StoreFile {
            schema_version: SCHEMA_VERSION,
            values,
        };
        let text = serde_json::to_string_pretty(&doc).context("failed to serialize store")?;

        let tmp_path = self.temp_path();
        fs::write(&tmp_path, text)
            .with_context(|| format!("failed to write {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &self.path).with_context(|| {
            format!(
                "failed to move {} over {}",
                tmp_path.display(),
                self.path.display()
            )
        })?;
        debug!(path = %self.path.display(), "store file persisted");
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| "store.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self.load_values()?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.write_lock.lock();
        let mut values = self.load_values()?;
        values.insert(key.to_owned(), value.to_owned());
        self.save_values(values)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.write_lock.lock();
        let mut values = self.load_values()?;
        if values.remove(key).is_none() {
            return Ok(());
        }
        self.save_values(values)
    }
}

pub fn default_store_dir_from(base_dir: &Path) -> PathBuf {
    base_dir.join("store")
}
