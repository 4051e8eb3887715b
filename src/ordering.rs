use itertools::Itertools;
use strum::Display;

use crate::{
    preset::{PresetBundle, PresetDescriptor, PresetOrigin},
    selection::SelectionIndex,
};

pub const VENDOR_PRIORITY: &[&str] = &["Bambu", "Generic"];
pub const CATEGORY_PRIORITY: &[&str] = &["PLA", "PETG", "ABS", "TPU"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum GroupCaption {
    #[strum(to_string = "User presets")]
    UserPresets,
    #[strum(to_string = "System presets")]
    SystemPresets,
}

// Unranked values share the slot after the last ranked one.
fn rank(table: &[&str], value: &str) -> usize {
    table
        .iter()
        .position(|ranked| *ranked == value)
        .unwrap_or(table.len())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresentationEntry {
    Header {
        caption: GroupCaption,
    },
    Selectable {
        name: String,
        label: String,
        group: Option<String>,
    },
}

impl PresentationEntry {
    pub fn is_header(&self) -> bool {
        matches!(self, PresentationEntry::Header { .. })
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            PresentationEntry::Header { .. } => None,
            PresentationEntry::Selectable { name, .. } => Some(name),
        }
    }
}

/// Display order of a dropdown, headers included.
///
/// `names` keeps the selectable entries in the same relative order as
/// `entries`, and `header_positions` records where each header sits so raw
/// toolkit indices can be translated back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderedPresentationList {
    entries: Vec<PresentationEntry>,
    header_positions: Vec<usize>,
    names: Vec<String>,
}

impl OrderedPresentationList {
    fn push_header(&mut self, caption: GroupCaption) {
        self.header_positions.push(self.entries.len());
        self.entries.push(PresentationEntry::Header { caption });
    }

    fn push_selectable(&mut self, preset: &PresetDescriptor, group: Option<String>) {
        self.names.push(preset.name.clone());
        self.entries.push(PresentationEntry::Selectable {
            name: preset.name.clone(),
            label: preset.label.clone(),
            group,
        });
    }

    pub fn entries(&self) -> &[PresentationEntry] {
        &self.entries
    }

    pub fn header_positions(&self) -> &[usize] {
        &self.header_positions
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_header_at(&self, raw: usize) -> bool {
        self.header_positions.contains(&raw)
    }

    /// Name of the `k`-th selectable entry, headers not counted.
    pub fn name_at(&self, k: usize) -> Option<&str> {
        self.names.get(k).map(String::as_str)
    }
}

pub fn classify_and_order(presets: &[PresetDescriptor]) -> OrderedPresentationList {
    let (user, system): (Vec<&PresetDescriptor>, Vec<&PresetDescriptor>) = presets
        .iter()
        .partition(|preset| preset.origin == PresetOrigin::User);

    let mut list = OrderedPresentationList::default();

    if !user.is_empty() {
        list.push_header(GroupCaption::UserPresets);
        for preset in user.into_iter().sorted_by(|a, b| a.label.cmp(&b.label)) {
            list.push_selectable(preset, None);
        }
    }

    if !system.is_empty() {
        list.push_header(GroupCaption::SystemPresets);
        let system = system.into_iter().sorted_by(|a, b| {
            rank(VENDOR_PRIORITY, &a.vendor)
                .cmp(&rank(VENDOR_PRIORITY, &b.vendor))
                .then_with(|| {
                    rank(CATEGORY_PRIORITY, &a.category)
                        .cmp(&rank(CATEGORY_PRIORITY, &b.category))
                })
                .then_with(|| a.label.cmp(&b.label))
        });
        for preset in system {
            list.push_selectable(preset, Some(preset.vendor.clone()));
        }
    }

    list
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrinterEntry {
    pub name: String,
    pub group: GroupCaption,
}

/// Printer reassignment choices: user printers, then system printers, each
/// alphabetical. Groups are native to the dropdown, so no header entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrinterList {
    entries: Vec<PrinterEntry>,
    default_selection: SelectionIndex,
}

impl PrinterList {
    pub fn entries(&self) -> &[PrinterEntry] {
        &self.entries
    }

    pub fn default_selection(&self) -> SelectionIndex {
        self.default_selection
    }

    pub fn name_at(&self, selection: SelectionIndex) -> Option<&str> {
        selection
            .get()
            .and_then(|raw| self.entries.get(raw))
            .map(|entry| entry.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub fn order_printers(bundle: &PresetBundle) -> PrinterList {
    let (system, user): (Vec<&str>, Vec<&str>) = bundle
        .printers
        .iter()
        .filter(|preset| preset.is_visible && !preset.is_default)
        .partition_map(|preset| {
            if preset.is_system {
                itertools::Either::Left(preset.name.as_str())
            } else {
                itertools::Either::Right(preset.name.as_str())
            }
        });

    let entries: Vec<PrinterEntry> = user
        .into_iter()
        .sorted()
        .map(|name| (name, GroupCaption::UserPresets))
        .chain(
            system
                .into_iter()
                .sorted()
                .map(|name| (name, GroupCaption::SystemPresets)),
        )
        .map(|(name, group)| PrinterEntry {
            name: name.to_string(),
            group,
        })
        .collect();

    let selected = bundle
        .selected_printer
        .as_deref()
        .and_then(|selected| entries.iter().position(|entry| entry.name == selected));
    let default_selection = match selected {
        Some(raw) => SelectionIndex::at(raw),
        None if !entries.is_empty() => SelectionIndex::at(0),
        None => SelectionIndex::NONE,
    };

    PrinterList {
        entries,
        default_selection,
    }
}
