use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::metadata::ProjectMetadata;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display)]
#[repr(u8)]
pub enum LoadType {
    /// Load aborted.
    #[default]
    Unknown = 0,
    OpenProject = 1,
    LoadGeometry = 2,
    /// Settings-only load. Requested by the loader, never produced here.
    LoadConfig = 3,
}

/// The two actions offered by the import prompt. Codes match [`LoadType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumIter)]
pub enum ImportAction {
    #[default]
    OpenProject,
    LoadGeometry,
}

impl ImportAction {
    pub fn code(self) -> u8 {
        self.load_type() as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(ImportAction::OpenProject),
            2 => Some(ImportAction::LoadGeometry),
            _ => None,
        }
    }

    pub fn load_type(self) -> LoadType {
        match self {
            ImportAction::OpenProject => LoadType::OpenProject,
            ImportAction::LoadGeometry => LoadType::LoadGeometry,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ImportAction::OpenProject => "Open as project",
            ImportAction::LoadGeometry => "Import geometry only",
        }
    }
}

/// One-shot record handed from the resolver to the loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportDecision {
    pub import_printer_settings: bool,
    pub import_filament_settings: bool,
    /// Only meaningful when printer settings are not imported.
    pub reassign_printer: Option<String>,
    /// 1-based project slot to filament preset name. Only meaningful when
    /// filament settings are not imported.
    pub filament_color_remapping: BTreeMap<u32, String>,

    pub project_filament_count: u32,
    pub project_filament_colors: Vec<String>,
    pub project_printer_name: Option<String>,
    pub project_filament_preset_names: Vec<String>,
    pub project_has_printer_settings: bool,
    pub project_has_filament_settings: bool,
    /// False when slot count and colors come from default metadata.
    pub pre_parsed: bool,
}

impl Default for ImportDecision {
    fn default() -> Self {
        Self {
            import_printer_settings: true,
            import_filament_settings: true,
            reassign_printer: None,
            filament_color_remapping: BTreeMap::new(),
            project_filament_count: 0,
            project_filament_colors: vec![],
            project_printer_name: None,
            project_filament_preset_names: vec![],
            project_has_printer_settings: false,
            project_has_filament_settings: false,
            pre_parsed: true,
        }
    }
}

impl ImportDecision {
    /// Import everything the project carries.
    pub fn open_project(metadata: &ProjectMetadata, pre_parsed: bool) -> Self {
        let mut decision = Self {
            pre_parsed,
            ..Self::default()
        };
        decision.copy_project_info(metadata);
        decision
    }

    /// No preset import; slot count and colors still travel so the loader can
    /// expand color placeholders.
    pub fn geometry_only(metadata: &ProjectMetadata, pre_parsed: bool) -> Self {
        Self {
            import_printer_settings: false,
            import_filament_settings: false,
            project_filament_count: metadata.filament_count,
            project_filament_colors: metadata.filament_colors.clone(),
            pre_parsed,
            ..Self::default()
        }
    }

    pub fn copy_project_info(&mut self, metadata: &ProjectMetadata) {
        self.project_filament_count = metadata.filament_count;
        self.project_filament_colors = metadata.filament_colors.clone();
        self.project_printer_name = metadata.printer_preset_name.clone();
        self.project_filament_preset_names = metadata.filament_preset_names.clone();
        self.project_has_printer_settings = metadata.has_printer_settings;
        self.project_has_filament_settings = metadata.has_filament_settings;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn action_codes_round_trip_and_match_load_type() {
        for action in ImportAction::iter() {
            assert_eq!(ImportAction::from_code(action.code()), Some(action));
            assert_eq!(action.code(), action.load_type() as u8);
        }
        assert_eq!(ImportAction::from_code(0), None);
        assert_eq!(ImportAction::from_code(3), None);
    }

    #[test]
    fn geometry_only_keeps_slots_but_imports_nothing() {
        let metadata = ProjectMetadata {
            filament_count: 2,
            filament_colors: vec!["#FF0000".to_string(), "#00FF00".to_string()],
            printer_preset_name: Some("Voron 2.4".to_string()),
            has_printer_settings: true,
            has_filament_settings: true,
            ..ProjectMetadata::default()
        };

        let decision = ImportDecision::geometry_only(&metadata, true);

        assert!(!decision.import_printer_settings);
        assert!(!decision.import_filament_settings);
        assert_eq!(decision.project_filament_count, 2);
        assert_eq!(decision.project_filament_colors, metadata.filament_colors);
        assert_eq!(decision.project_printer_name, None);
        assert!(decision.filament_color_remapping.is_empty());
    }

    #[test]
    fn open_project_copies_all_metadata() {
        let metadata = ProjectMetadata {
            filament_count: 1,
            filament_colors: vec!["#FFFFFF".to_string()],
            printer_preset_name: Some("Voron 2.4".to_string()),
            filament_preset_names: vec!["Generic PLA".to_string()],
            has_printer_settings: true,
            has_filament_settings: false,
        };

        let decision = ImportDecision::open_project(&metadata, false);

        assert!(decision.import_printer_settings);
        assert!(decision.import_filament_settings);
        assert_eq!(decision.project_printer_name.as_deref(), Some("Voron 2.4"));
        assert_eq!(decision.project_filament_preset_names, vec!["Generic PLA"]);
        assert!(decision.project_has_printer_settings);
        assert!(!decision.project_has_filament_settings);
        assert!(!decision.pre_parsed);
    }
}
