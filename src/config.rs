use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    str::FromStr,
};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use tracing::{debug, warn};

use crate::{decision::ImportAction, read_json, ImportError};

pub const LOAD_BEHAVIOUR_KEY: &str = "user_project_load_behaviour";
pub const IMPORT_ACTION_KEY: &str = "import_project_action";
const CONFIG_FILE_NAME: &str = "app_config.json";

/// Configured reaction to opening a project archive.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
pub enum LoadBehaviour {
    #[strum(to_string = "load_geometry", serialize = "load geometry only")]
    LoadGeometry,
    #[strum(to_string = "always_ask", serialize = "always ask")]
    AlwaysAsk,
    #[default]
    #[strum(to_string = "open_project", serialize = "open as project")]
    OpenProject,
}

impl LoadBehaviour {
    /// Missing or unrecognized settings fall back to opening as a project.
    pub fn from_setting(value: Option<&str>) -> Self {
        match value.map(str::trim).filter(|value| !value.is_empty()) {
            None => LoadBehaviour::OpenProject,
            Some(value) => LoadBehaviour::from_str(value).unwrap_or_else(|_| {
                warn!(value, "Unrecognized project load behaviour, opening as project");
                LoadBehaviour::OpenProject
            }),
        }
    }
}

pub trait ConfigStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);

    fn load_behaviour(&self) -> LoadBehaviour {
        LoadBehaviour::from_setting(self.get(LOAD_BEHAVIOUR_KEY).as_deref())
    }

    /// The action picked the last time the import prompt was confirmed.
    fn remembered_action(&self) -> ImportAction {
        self.get(IMPORT_ACTION_KEY)
            .and_then(|value| value.trim().parse::<u8>().ok())
            .and_then(ImportAction::from_code)
            .unwrap_or_default()
    }

    fn remember_action(&mut self, action: ImportAction) {
        debug!(action = action.label(), "Remembering import action");
        self.set(IMPORT_ACTION_KEY, action.code().to_string());
    }
}

/// In-memory settings, optionally seeded from a JSON object of strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryConfig {
    values: BTreeMap<String, String>,
}

impl MemoryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.values.insert(key.to_string(), value.into());
        self
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ImportError> {
        read_json(path)
    }

    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "project-import")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }
}

impl ConfigStore for MemoryConfig {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.values.insert(key.to_string(), value);
    }
}
