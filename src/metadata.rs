use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{read_json, ImportError};

/// What the archive pre-parse reports about a project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectMetadata {
    pub filament_count: u32,
    pub filament_colors: Vec<String>,
    pub printer_preset_name: Option<String>,
    pub filament_preset_names: Vec<String>,
    pub has_printer_settings: bool,
    pub has_filament_settings: bool,
}

pub trait ProjectPreparser {
    fn preparse(&self, path: &Path) -> Result<ProjectMetadata, ImportError>;
}

/// Reads the metadata a separate archive parser left next to the project,
/// at `<archive>.json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSidecar;

impl JsonSidecar {
    pub fn sidecar_path(archive: &Path) -> PathBuf {
        let mut path = OsString::from(archive.as_os_str());
        path.push(".json");
        PathBuf::from(path)
    }
}

impl ProjectPreparser for JsonSidecar {
    fn preparse(&self, path: &Path) -> Result<ProjectMetadata, ImportError> {
        let sidecar = Self::sidecar_path(path);
        if !sidecar.is_file() {
            return Err(ImportError::MetadataUnavailable(path.to_path_buf()));
        }
        read_json(&sidecar)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreparsedProject {
    pub file_name: String,
    pub metadata: ProjectMetadata,
    /// False when the pre-parse failed and `metadata` holds defaults.
    pub pre_parsed: bool,
}

impl PreparsedProject {
    pub fn load(path: &Path, preparser: &dyn ProjectPreparser) -> Self {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        match preparser.preparse(path) {
            Ok(metadata) => {
                debug!(
                    file = %file_name,
                    filaments = metadata.filament_count,
                    printer_settings = metadata.has_printer_settings,
                    filament_settings = metadata.has_filament_settings,
                    "Pre-parsed project"
                );
                Self {
                    file_name,
                    metadata,
                    pre_parsed: true,
                }
            }
            Err(e) => {
                warn!(file = %file_name, "Project pre-parse failed, using defaults: {e}");
                Self {
                    file_name,
                    metadata: ProjectMetadata::default(),
                    pre_parsed: false,
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const NEUTRAL: Rgb = Rgb {
        r: 128,
        g: 128,
        b: 128,
    };

    /// Parses `#RRGGBB`, with or without `#`. A trailing alpha pair is ignored;
    /// anything unreadable is shown as neutral grey.
    pub fn from_hex(hex: &str) -> Self {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        let Some(rgb) = digits
            .get(..6)
            .filter(|rgb| rgb.chars().all(|c| c.is_ascii_hexdigit()))
        else {
            return Self::NEUTRAL;
        };
        match u32::from_str_radix(rgb, 16) {
            Ok(value) => Self {
                r: (value >> 16) as u8,
                g: (value >> 8) as u8,
                b: value as u8,
            },
            Err(_) => Self::NEUTRAL,
        }
    }
}
