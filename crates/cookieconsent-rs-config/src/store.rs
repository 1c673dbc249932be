//! Key-value settings storage for persisted override trees.
//!
//! Each site owns one record per option name. Only the override tree is
//! persisted; defaults are never written.

use crate::ConfigError;
use crate::value::ConfigTree;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the persisted override record.
pub const OPTION_NAME: &str = "wp_cookieconsent_options";

/// Identifier of one site in a multi-site deployment.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SiteId(String);

impl SiteId {
    /// Validate a site id; it doubles as a directory name on disk.
    pub fn new(id: impl Into<String>) -> Result<Self, ConfigError> {
        let id = id.into();
        let invalid = |message: &str| ConfigError::InvalidField {
            path: "site".to_string(),
            message: format!("{message}: {id:?}"),
        };
        if id.is_empty() {
            return Err(invalid("site id must not be empty"));
        }
        if id == "." || id == ".." || id.contains(['/', '\\']) {
            return Err(invalid("site id must not contain path components"));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SiteId {
    fn default() -> Self {
        Self("1".to_string())
    }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for SiteId {
    type Error = ConfigError;

    fn try_from(id: String) -> Result<Self, Self::Error> {
        Self::new(id)
    }
}

impl From<SiteId> for String {
    fn from(id: SiteId) -> Self {
        id.0
    }
}

/// Persistence for named option records, per site.
pub trait SettingsStore: Send + Sync {
    /// Load a record; `None` when it was never written.
    fn get_option(&self, site: &SiteId, name: &str) -> Result<Option<ConfigTree>, ConfigError>;

    /// Replace a record.
    fn update_option(
        &mut self,
        site: &SiteId,
        name: &str,
        value: &ConfigTree,
    ) -> Result<(), ConfigError>;

    /// Delete a record, returning whether it existed.
    fn delete_option(&mut self, site: &SiteId, name: &str) -> Result<bool, ConfigError>;

    /// Every site known to the store.
    fn sites(&self) -> Result<Vec<SiteId>, ConfigError>;
}

/// In-process store, used for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemorySettingsStore {
    sites: BTreeSet<SiteId>,
    records: BTreeMap<(SiteId, String), ConfigTree>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a site even before it has records.
    pub fn add_site(&mut self, site: SiteId) {
        self.sites.insert(site);
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get_option(&self, site: &SiteId, name: &str) -> Result<Option<ConfigTree>, ConfigError> {
        Ok(self.records.get(&(site.clone(), name.to_string())).cloned())
    }

    fn update_option(
        &mut self,
        site: &SiteId,
        name: &str,
        value: &ConfigTree,
    ) -> Result<(), ConfigError> {
        self.sites.insert(site.clone());
        self.records
            .insert((site.clone(), name.to_string()), value.clone());
        Ok(())
    }

    fn delete_option(&mut self, site: &SiteId, name: &str) -> Result<bool, ConfigError> {
        Ok(self
            .records
            .remove(&(site.clone(), name.to_string()))
            .is_some())
    }

    fn sites(&self) -> Result<Vec<SiteId>, ConfigError> {
        Ok(self.sites.iter().cloned().collect())
    }
}

/// One JSON file per site and option: `<root>/<site>/<name>.json`.
///
/// Reads accept JSON5 so hand-edited records load; writes are pretty JSON.
#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    root: PathBuf,
}

impl FileSettingsStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, site: &SiteId, name: &str) -> PathBuf {
        self.root.join(site.as_str()).join(format!("{name}.json"))
    }
}

impl SettingsStore for FileSettingsStore {
    fn get_option(&self, site: &SiteId, name: &str) -> Result<Option<ConfigTree>, ConfigError> {
        let path = self.record_path(site, name);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!("no stored record (site={site}, path={})", path.display());
                return Ok(None);
            }
            Err(err) => return Err(ConfigError::ReadFailed(err)),
        };
        let tree: ConfigTree = json5::from_str(&contents)?;
        debug!(
            "loaded stored record (site={site}, path={}, keys={})",
            path.display(),
            tree.len()
        );
        Ok(Some(tree))
    }

    fn update_option(
        &mut self,
        site: &SiteId,
        name: &str,
        value: &ConfigTree,
    ) -> Result<(), ConfigError> {
        let path = self.record_path(site, name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let serialized = serde_json::to_string_pretty(value)?;
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, serialized)?;
        fs::rename(&staging, &path)?;
        info!("stored record (site={site}, path={})", path.display());
        Ok(())
    }

    fn delete_option(&mut self, site: &SiteId, name: &str) -> Result<bool, ConfigError> {
        let path = self.record_path(site, name);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(ConfigError::ReadFailed(err)),
        }
    }

    fn sites(&self) -> Result<Vec<SiteId>, ConfigError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(ConfigError::ReadFailed(err)),
        };
        let mut sites = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            match SiteId::new(name) {
                Ok(site) => sites.push(site),
                Err(err) => debug!("skipping store entry: {err}"),
            }
        }
        sites.sort();
        Ok(sites)
    }
}

/// Delete the option record of every site. Returns how many existed.
pub fn uninstall(store: &mut dyn SettingsStore) -> Result<usize, ConfigError> {
    let mut removed = 0;
    for site in store.sites()? {
        if store.delete_option(&site, OPTION_NAME)? {
            info!("deleted {OPTION_NAME} (site={site})");
            removed += 1;
        }
    }
    info!("uninstall complete (removed={removed})");
    Ok(removed)
}
