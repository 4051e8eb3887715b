//! Load-strategy resolution for project archives that bundle printer and
//! filament settings.
//!
//! The crate classifies the presets the application knows about, maps
//! dropdown selections back to preset names, and decides how a project
//! archive should be opened before the loader runs.

pub mod config;
pub mod decision;
pub mod error;
pub mod metadata;
pub mod ordering;
pub mod pending;
pub mod preset;
pub mod prompt;
pub mod resolver;
pub mod selection;

use std::{fs, path::Path};

use serde::de::DeserializeOwned;

pub use config::{ConfigStore, LoadBehaviour, MemoryConfig};
pub use decision::{ImportAction, ImportDecision, LoadType};
pub use error::ImportError;
pub use metadata::{PreparsedProject, ProjectMetadata, ProjectPreparser};
pub use ordering::{classify_and_order, OrderedPresentationList, PresentationEntry};
pub use pending::PendingDecisionSlot;
pub use preset::{PresetBundle, PresetDescriptor, PresetOrigin, PresetRecord};
pub use prompt::{ImportDialogState, ImportPrompt, PromptContext, UserChoice};
pub use resolver::{resolve_load_type, resolve_project_load, Resolution};
pub use selection::{first_selectable, resolve_selection, SelectionIndex};

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ImportError> {
    let content = fs::read_to_string(path).map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ImportError::Json {
        path: path.to_path_buf(),
        source,
    })
}
