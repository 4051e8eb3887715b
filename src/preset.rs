use std::{collections::BTreeMap, path::Path};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{read_json, ImportError};

pub const VENDOR_KEY: &str = "filament_vendor";
pub const CATEGORY_KEY: &str = "filament_type";
const FALLBACK_VENDOR: &str = "Other";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresetOrigin {
    User,
    System,
}

/// Immutable snapshot of one selectable preset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetDescriptor {
    pub name: String,
    pub label: String,
    pub vendor: String,
    pub category: String,
    pub origin: PresetOrigin,
}

impl PresetDescriptor {
    pub fn from_record(record: &PresetRecord) -> Self {
        Self {
            name: record.name.clone(),
            label: record.label().to_string(),
            vendor: normalize_vendor(record.first_value(VENDOR_KEY)),
            category: record.first_value(CATEGORY_KEY).unwrap_or_default().to_string(),
            origin: record.origin(),
        }
    }
}

/// "Bambu Lab" collapses to "Bambu"; a missing or empty vendor becomes "Other".
pub fn normalize_vendor(raw: Option<&str>) -> String {
    match raw {
        Some("Bambu Lab") => "Bambu".to_string(),
        Some(vendor) if !vendor.is_empty() => vendor.to_string(),
        _ => FALLBACK_VENDOR.to_string(),
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresetRecord {
    pub name: String,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub is_system: bool,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default = "default_true")]
    pub is_visible: bool,
    #[serde(default = "default_true")]
    pub is_compatible: bool,
    #[serde(default)]
    pub config: BTreeMap<String, Vec<String>>,
}

impl PresetRecord {
    pub fn new(name: impl Into<String>, origin: PresetOrigin) -> Self {
        Self {
            name: name.into(),
            alias: None,
            is_system: origin == PresetOrigin::System,
            is_default: false,
            is_visible: true,
            is_compatible: true,
            config: BTreeMap::new(),
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.insert(key.into(), vec![value.into()]);
        self
    }

    pub fn label(&self) -> &str {
        match self.alias.as_deref() {
            Some(alias) if !alias.is_empty() => alias,
            _ => &self.name,
        }
    }

    pub fn first_value(&self, key: &str) -> Option<&str> {
        self.config
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    pub fn origin(&self) -> PresetOrigin {
        if self.is_system {
            PresetOrigin::System
        } else {
            PresetOrigin::User
        }
    }

    fn is_offered(&self) -> bool {
        !self.is_default && self.is_visible && self.is_compatible
    }
}

/// Snapshot of the application's preset collections, taken when the import
/// prompt is prepared.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PresetBundle {
    #[serde(default)]
    pub filaments: Vec<PresetRecord>,
    #[serde(default)]
    pub printers: Vec<PresetRecord>,
    #[serde(default)]
    pub selected_filament: Option<String>,
    #[serde(default)]
    pub selected_printer: Option<String>,
}

impl PresetBundle {
    pub fn from_json_file(path: &Path) -> Result<Self, ImportError> {
        read_json(path)
    }

    pub fn find_filament(&self, name: &str) -> Option<&PresetRecord> {
        self.filaments.iter().find(|preset| preset.name == name)
    }

    pub fn find_printer(&self, name: &str) -> Option<&PresetRecord> {
        self.printers.iter().find(|preset| preset.name == name)
    }

    pub fn printer_known(&self, name: &str) -> bool {
        self.find_printer(name).is_some()
    }

    /// Filament names offered for slot mapping, in bundle order.
    pub fn available_filaments(&self) -> Vec<String> {
        let available: Vec<String> = self
            .filaments
            .iter()
            .filter(|preset| preset.is_offered())
            .map(|preset| preset.name.clone())
            .collect();
        if !available.is_empty() {
            return available;
        }

        self.selected_filament
            .as_deref()
            .and_then(|name| self.find_filament(name))
            .filter(|preset| !preset.is_default)
            .map(|preset| vec![preset.name.clone()])
            .unwrap_or_default()
    }

    pub fn describe_filaments(&self, names: &[String]) -> Vec<PresetDescriptor> {
        names
            .iter()
            .filter_map(|name| {
                let record = self.find_filament(name);
                if record.is_none() {
                    debug!(preset = %name, "Dropping filament without a preset record");
                }
                record.map(PresetDescriptor::from_record)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filament(name: &str, origin: PresetOrigin) -> PresetRecord {
        PresetRecord::new(name, origin)
    }

    #[test]
    fn descriptor_normalizes_vendor_and_uses_alias() {
        let record = filament("Bambu PLA Basic @BBL X1C", PresetOrigin::System)
            .with_alias("Bambu PLA Basic")
            .with_value(VENDOR_KEY, "Bambu Lab")
            .with_value(CATEGORY_KEY, "PLA");

        let descriptor = PresetDescriptor::from_record(&record);

        assert_eq!(descriptor.name, "Bambu PLA Basic @BBL X1C");
        assert_eq!(descriptor.label, "Bambu PLA Basic");
        assert_eq!(descriptor.vendor, "Bambu");
        assert_eq!(descriptor.category, "PLA");
        assert_eq!(descriptor.origin, PresetOrigin::System);
    }

    #[test]
    fn missing_or_empty_vendor_becomes_other() {
        assert_eq!(normalize_vendor(None), "Other");
        assert_eq!(normalize_vendor(Some("")), "Other");
        assert_eq!(normalize_vendor(Some("Polymaker")), "Polymaker");
    }

    #[test]
    fn empty_alias_falls_back_to_name() {
        let record = filament("My PETG", PresetOrigin::User).with_alias("");
        assert_eq!(record.label(), "My PETG");
    }

    #[test]
    fn available_filaments_skip_hidden_incompatible_and_default() {
        let mut hidden = filament("Hidden", PresetOrigin::System);
        hidden.is_visible = false;
        let mut incompatible = filament("Incompatible", PresetOrigin::System);
        incompatible.is_compatible = false;
        let mut default = filament("Default", PresetOrigin::System);
        default.is_default = true;

        let bundle = PresetBundle {
            filaments: vec![
                hidden,
                filament("Generic PLA", PresetOrigin::System),
                incompatible,
                default,
                filament("My PLA", PresetOrigin::User),
            ],
            ..PresetBundle::default()
        };

        assert_eq!(bundle.available_filaments(), vec!["Generic PLA", "My PLA"]);
    }

    #[test]
    fn available_filaments_fall_back_to_selected() {
        let mut selected = filament("Generic PLA", PresetOrigin::System);
        selected.is_compatible = false;
        let bundle = PresetBundle {
            filaments: vec![selected],
            selected_filament: Some("Generic PLA".to_string()),
            ..PresetBundle::default()
        };

        assert_eq!(bundle.available_filaments(), vec!["Generic PLA"]);
    }

    #[test]
    fn selected_default_filament_is_not_offered() {
        let mut selected = filament("Default Filament", PresetOrigin::System);
        selected.is_default = true;
        let bundle = PresetBundle {
            filaments: vec![selected],
            selected_filament: Some("Default Filament".to_string()),
            ..PresetBundle::default()
        };

        assert!(bundle.available_filaments().is_empty());
    }

    #[test]
    fn unknown_names_are_dropped_silently() {
        let bundle = PresetBundle {
            filaments: vec![filament("Generic PLA", PresetOrigin::System)],
            ..PresetBundle::default()
        };

        let described =
            bundle.describe_filaments(&["Missing".to_string(), "Generic PLA".to_string()]);

        assert_eq!(described.len(), 1);
        assert_eq!(described[0].name, "Generic PLA");
    }

    #[test]
    fn bundle_record_defaults_from_json() {
        let bundle: PresetBundle = serde_json::from_str(
            r#"{"filaments": [{"name": "Generic PLA", "is_system": true,
                "config": {"filament_vendor": ["Generic"], "filament_type": ["PLA"]}}]}"#,
        )
        .unwrap();

        let record = &bundle.filaments[0];
        assert!(record.is_visible);
        assert!(record.is_compatible);
        assert!(!record.is_default);
        assert_eq!(record.first_value(VENDOR_KEY), Some("Generic"));
    }
}
