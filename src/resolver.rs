use std::path::Path;

use tracing::{debug, info};

use crate::{
    config::{ConfigStore, LoadBehaviour},
    decision::{ImportDecision, LoadType},
    metadata::{PreparsedProject, ProjectPreparser},
    pending::PendingDecisionSlot,
    preset::PresetBundle,
    prompt::{ImportPrompt, PromptContext, UserChoice},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub load_type: LoadType,
    /// Absent only when the user cancelled.
    pub decision: Option<ImportDecision>,
}

impl Resolution {
    fn cancelled() -> Self {
        Self {
            load_type: LoadType::Unknown,
            decision: None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.load_type == LoadType::Unknown
    }
}

pub fn resolve_load_type(
    mode: LoadBehaviour,
    project: &PreparsedProject,
    bundle: &PresetBundle,
    prompt: &mut dyn ImportPrompt,
    config: &mut dyn ConfigStore,
) -> Resolution {
    match mode {
        LoadBehaviour::LoadGeometry => Resolution {
            load_type: LoadType::LoadGeometry,
            decision: Some(ImportDecision::geometry_only(
                &project.metadata,
                project.pre_parsed,
            )),
        },
        LoadBehaviour::OpenProject => Resolution {
            load_type: LoadType::OpenProject,
            decision: Some(ImportDecision::open_project(
                &project.metadata,
                project.pre_parsed,
            )),
        },
        LoadBehaviour::AlwaysAsk => ask_user(project, bundle, prompt, config),
    }
}

fn ask_user(
    project: &PreparsedProject,
    bundle: &PresetBundle,
    prompt: &mut dyn ImportPrompt,
    config: &mut dyn ConfigStore,
) -> Resolution {
    let context = PromptContext::build(project, bundle, config.remembered_action());
    let Some(choice) = prompt.ask(&context) else {
        info!(file = %project.file_name, "Project import cancelled");
        return Resolution::cancelled();
    };

    config.remember_action(choice.action);
    Resolution {
        load_type: choice.action.load_type(),
        decision: Some(decision_from_choice(choice, project)),
    }
}

/// Metadata is copied whatever the import flags say; the loader needs slot
/// colors for placeholder expansion either way.
pub fn decision_from_choice(choice: UserChoice, project: &PreparsedProject) -> ImportDecision {
    let mut decision = ImportDecision {
        import_printer_settings: choice.import_printer_settings,
        import_filament_settings: choice.import_filament_settings,
        pre_parsed: project.pre_parsed,
        ..ImportDecision::default()
    };

    if !choice.import_printer_settings {
        decision.reassign_printer = choice.reassign_printer.filter(|name| !name.is_empty());
    }
    if !choice.import_filament_settings {
        decision.filament_color_remapping = choice
            .filament_assignments
            .into_iter()
            .filter(|(_, name)| !name.is_empty())
            .collect();
    }

    decision.copy_project_info(&project.metadata);
    decision
}

/// Full decision step for opening `path`: reads the configured behaviour
/// unless `override_setting` names one, pre-parses the archive, resolves, and
/// leaves the outcome in `slot` for the loader. A cancelled prompt clears
/// the slot.
pub fn resolve_project_load(
    path: &Path,
    override_setting: Option<&str>,
    preparser: &dyn ProjectPreparser,
    bundle: &PresetBundle,
    prompt: &mut dyn ImportPrompt,
    config: &mut dyn ConfigStore,
    slot: &PendingDecisionSlot,
) -> Resolution {
    let mode = match override_setting.filter(|setting| !setting.trim().is_empty()) {
        Some(setting) => LoadBehaviour::from_setting(Some(setting)),
        None => config.load_behaviour(),
    };
    debug!(path = %path.display(), %mode, "Resolving project load");

    let project = PreparsedProject::load(path, preparser);
    let resolution = resolve_load_type(mode, &project, bundle, prompt, config);

    match &resolution.decision {
        Some(decision) => slot.publish(decision.clone()),
        None => slot.clear(),
    }

    info!(
        file = %project.file_name,
        load_type = %resolution.load_type,
        pre_parsed = project.pre_parsed,
        "Resolved project load"
    );
    resolution
}
