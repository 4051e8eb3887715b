use std::collections::BTreeMap;

use tracing::debug;

use crate::{
    decision::ImportAction,
    metadata::{PreparsedProject, Rgb},
    ordering::{classify_and_order, order_printers, OrderedPresentationList, PrinterList},
    preset::PresetBundle,
    selection::{first_selectable, resolve_selection, SelectionIndex},
};

/// One mapping row: the project's color for a slot and the dropdown of
/// filament presets it can be reassigned to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilamentRow {
    /// 1-based project slot.
    pub slot: u32,
    pub color: String,
    pub swatch: Rgb,
    pub choices: OrderedPresentationList,
    pub default_selection: SelectionIndex,
}

/// Everything the interactive prompt needs, prepared before it is shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptContext {
    pub file_name: String,
    pub default_action: ImportAction,
    pub has_printer_settings: bool,
    pub has_filament_settings: bool,
    pub printer_warning: Option<String>,
    pub printers: PrinterList,
    pub filament_rows: Vec<FilamentRow>,
}

impl PromptContext {
    pub fn build(
        project: &PreparsedProject,
        bundle: &PresetBundle,
        default_action: ImportAction,
    ) -> Self {
        let metadata = &project.metadata;

        let printer_warning = metadata
            .printer_preset_name
            .as_deref()
            .filter(|name| !name.is_empty() && !bundle.printer_known(name))
            .map(|name| format!("Project printer '{name}' not found"));

        let choices = classify_and_order(&bundle.describe_filaments(&bundle.available_filaments()));
        let default_selection = first_selectable(&choices);
        let filament_rows = metadata
            .filament_colors
            .iter()
            .zip(1u32..)
            .map(|(color, slot)| FilamentRow {
                slot,
                color: color.clone(),
                swatch: Rgb::from_hex(color),
                choices: choices.clone(),
                default_selection,
            })
            .collect::<Vec<_>>();

        debug!(
            file = %project.file_name,
            rows = filament_rows.len(),
            choices = choices.names().len(),
            "Prepared import prompt"
        );

        Self {
            file_name: project.file_name.clone(),
            default_action,
            has_printer_settings: metadata.has_printer_settings,
            has_filament_settings: metadata.has_filament_settings,
            printer_warning,
            printers: order_printers(bundle),
            filament_rows,
        }
    }

    pub fn row(&self, slot: u32) -> Option<&FilamentRow> {
        self.filament_rows.iter().find(|row| row.slot == slot)
    }
}

/// What the user confirmed. Built once, never re-read from live state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChoice {
    pub action: ImportAction,
    pub import_printer_settings: bool,
    pub import_filament_settings: bool,
    pub reassign_printer: Option<String>,
    pub filament_assignments: BTreeMap<u32, String>,
}

pub trait ImportPrompt {
    /// Blocks until the user confirms (`Some`) or cancels (`None`).
    fn ask(&mut self, context: &PromptContext) -> Option<UserChoice>;
}

impl<F> ImportPrompt for F
where
    F: FnMut(&PromptContext) -> Option<UserChoice>,
{
    fn ask(&mut self, context: &PromptContext) -> Option<UserChoice> {
        self(context)
    }
}

/// Editable state behind the import prompt.
#[derive(Debug, Clone)]
pub struct ImportDialogState<'a> {
    context: &'a PromptContext,
    action: ImportAction,
    import_printer_settings: bool,
    import_filament_settings: bool,
    printer_selection: SelectionIndex,
    slot_selections: Vec<SelectionIndex>,
}

impl<'a> ImportDialogState<'a> {
    pub fn new(context: &'a PromptContext) -> Self {
        Self {
            context,
            action: context.default_action,
            import_printer_settings: true,
            import_filament_settings: true,
            printer_selection: context.printers.default_selection(),
            slot_selections: context
                .filament_rows
                .iter()
                .map(|row| row.default_selection)
                .collect(),
        }
    }

    pub fn action(&self) -> ImportAction {
        self.action
    }

    pub fn set_action(&mut self, action: ImportAction) {
        self.action = action;
    }

    pub fn set_import_printer_settings(&mut self, import: bool) {
        self.import_printer_settings = import;
    }

    pub fn set_import_filament_settings(&mut self, import: bool) {
        self.import_filament_settings = import;
    }

    pub fn select_printer(&mut self, selection: SelectionIndex) {
        self.printer_selection = selection;
    }

    /// Returns false when the project has no such slot.
    pub fn select_slot(&mut self, slot: u32, selection: SelectionIndex) -> bool {
        let Some(index) = self
            .context
            .filament_rows
            .iter()
            .position(|row| row.slot == slot)
        else {
            return false;
        };
        self.slot_selections[index] = selection;
        true
    }

    pub fn shows_project_settings(&self) -> bool {
        self.action == ImportAction::OpenProject
    }

    pub fn shows_printer_reassign(&self) -> bool {
        self.shows_project_settings() && !self.import_printer_settings
    }

    pub fn shows_filament_mapping(&self) -> bool {
        self.shows_project_settings() && !self.import_filament_settings
    }

    pub fn printer_warning(&self) -> Option<&str> {
        if self.import_printer_settings {
            return None;
        }
        self.context.printer_warning.as_deref()
    }

    /// Freeze the current state. Reassignments are read only for the
    /// settings that are not imported; unresolved slots are left out.
    pub fn confirm(&self) -> UserChoice {
        let reassign_printer = if self.import_printer_settings {
            None
        } else {
            self.context
                .printers
                .name_at(self.printer_selection)
                .map(str::to_string)
        };

        let filament_assignments = if self.import_filament_settings {
            BTreeMap::new()
        } else {
            self.context
                .filament_rows
                .iter()
                .zip(&self.slot_selections)
                .filter_map(|(row, &selection)| {
                    resolve_selection(&row.choices, selection)
                        .map(|name| (row.slot, name.to_string()))
                })
                .collect()
        };

        UserChoice {
            action: self.action,
            import_printer_settings: self.import_printer_settings,
            import_filament_settings: self.import_filament_settings,
            reassign_printer,
            filament_assignments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        metadata::ProjectMetadata,
        preset::{PresetOrigin, PresetRecord, CATEGORY_KEY, VENDOR_KEY},
    };

    fn bundle() -> PresetBundle {
        PresetBundle {
            filaments: vec![
                PresetRecord::new("Generic PLA", PresetOrigin::System)
                    .with_value(VENDOR_KEY, "Generic")
                    .with_value(CATEGORY_KEY, "PLA"),
                PresetRecord::new("My PETG", PresetOrigin::User),
            ],
            printers: vec![
                PresetRecord::new("Voron 2.4", PresetOrigin::System),
                PresetRecord::new("My Ender", PresetOrigin::User),
            ],
            selected_printer: Some("Voron 2.4".to_string()),
            ..PresetBundle::default()
        }
    }

    fn project(colors: &[&str], printer: Option<&str>) -> PreparsedProject {
        PreparsedProject {
            file_name: "benchy.3mf".to_string(),
            metadata: ProjectMetadata {
                filament_count: colors.len() as u32,
                filament_colors: colors.iter().map(|c| c.to_string()).collect(),
                printer_preset_name: printer.map(str::to_string),
                has_printer_settings: true,
                has_filament_settings: true,
                ..ProjectMetadata::default()
            },
            pre_parsed: true,
        }
    }

    #[test]
    fn context_has_one_row_per_color() {
        let context = PromptContext::build(
            &project(&["#FF0000", "#00FF00"], None),
            &bundle(),
            ImportAction::OpenProject,
        );

        assert_eq!(context.filament_rows.len(), 2);
        assert_eq!(context.filament_rows[1].slot, 2);
        assert_eq!(context.filament_rows[1].swatch, Rgb { r: 0, g: 255, b: 0 });
        let row = context.row(1).unwrap();
        assert_eq!(
            resolve_selection(&row.choices, row.default_selection),
            Some("My PETG")
        );
    }

    #[test]
    fn unknown_project_printer_produces_warning() {
        let known = PromptContext::build(
            &project(&[], Some("Voron 2.4")),
            &bundle(),
            ImportAction::OpenProject,
        );
        let unknown = PromptContext::build(
            &project(&[], Some("Prusa MK4")),
            &bundle(),
            ImportAction::OpenProject,
        );

        assert_eq!(known.printer_warning, None);
        assert_eq!(
            unknown.printer_warning.as_deref(),
            Some("Project printer 'Prusa MK4' not found")
        );
    }

    #[test]
    fn untouched_dialog_imports_everything() {
        let context =
            PromptContext::build(&project(&["#FF0000"], None), &bundle(), ImportAction::OpenProject);

        let choice = ImportDialogState::new(&context).confirm();

        assert_eq!(choice.action, ImportAction::OpenProject);
        assert!(choice.import_printer_settings);
        assert!(choice.import_filament_settings);
        assert_eq!(choice.reassign_printer, None);
        assert!(choice.filament_assignments.is_empty());
    }

    #[test]
    fn unchecked_settings_read_back_reassignments() {
        let context = PromptContext::build(
            &project(&["#FF0000", "#00FF00", "#0000FF", "#FFFF00"], None),
            &bundle(),
            ImportAction::OpenProject,
        );
        let mut state = ImportDialogState::new(&context);
        state.set_import_printer_settings(false);
        state.set_import_filament_settings(false);
        state.select_printer(SelectionIndex::at(0));
        // [User presets] My PETG, [System presets] Generic PLA
        assert!(state.select_slot(1, SelectionIndex::at(3)));
        assert!(state.select_slot(2, SelectionIndex::NONE));
        assert!(state.select_slot(4, SelectionIndex::at(2)));
        assert!(!state.select_slot(5, SelectionIndex::at(1)));

        let choice = state.confirm();

        assert_eq!(choice.reassign_printer.as_deref(), Some("My Ender"));
        assert_eq!(
            choice.filament_assignments,
            BTreeMap::from([
                (1, "Generic PLA".to_string()),
                (3, "My PETG".to_string()),
            ])
        );
    }

    #[test]
    fn visibility_follows_action_and_checkboxes() {
        let context = PromptContext::build(
            &project(&["#FF0000"], Some("Prusa MK4")),
            &bundle(),
            ImportAction::LoadGeometry,
        );
        let mut state = ImportDialogState::new(&context);
        assert!(!state.shows_project_settings());

        state.set_action(ImportAction::OpenProject);
        assert!(!state.shows_printer_reassign());
        assert_eq!(state.printer_warning(), None);

        state.set_import_printer_settings(false);
        assert!(state.shows_printer_reassign());
        assert!(!state.shows_filament_mapping());
        assert!(state.printer_warning().is_some());
    }

    #[test]
    fn closures_act_as_prompts() {
        let context = PromptContext::build(&project(&[], None), &bundle(), ImportAction::OpenProject);
        let mut cancel = |_: &PromptContext| -> Option<UserChoice> { None };

        assert_eq!(cancel.ask(&context), None);
    }
}
