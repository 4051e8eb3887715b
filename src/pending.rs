use std::{
    collections::BTreeMap,
    sync::{Mutex, MutexGuard, PoisonError},
};

use once_cell::sync::Lazy;

use crate::decision::ImportDecision;

#[derive(Debug, Default)]
struct SlotState {
    decision: ImportDecision,
    valid: bool,
}

/// Single-slot hand-off between the resolver and a loader that runs after
/// control has returned to the caller.
#[derive(Debug, Default)]
pub struct PendingDecisionSlot {
    state: Mutex<SlotState>,
}

static GLOBAL_SLOT: Lazy<PendingDecisionSlot> = Lazy::new(PendingDecisionSlot::new);

/// Process-wide slot, for loaders that cannot receive the decision directly.
pub fn global() -> &'static PendingDecisionSlot {
    &GLOBAL_SLOT
}

impl PendingDecisionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SlotState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn publish(&self, decision: ImportDecision) {
        let mut state = self.lock();
        state.decision = decision;
        state.valid = true;
    }

    pub fn has_pending(&self) -> bool {
        self.lock().valid
    }

    /// Copy of the slot contents. An invalid slot yields default values.
    pub fn take(&self) -> ImportDecision {
        self.lock().decision.clone()
    }

    /// Check, read, and clear in one step.
    pub fn take_pending(&self) -> Option<ImportDecision> {
        let mut state = self.lock();
        if !state.valid {
            return None;
        }
        let decision = std::mem::take(&mut state.decision);
        state.valid = false;
        Some(decision)
    }

    pub fn clear(&self) {
        *self.lock() = SlotState::default();
    }
}

/// Slot-to-extruder remapping for geometry. Always `None`: slot presets are
/// reassigned after loading and original extruder ids are kept.
#[deprecated(note = "slots keep their extruder ids; use ImportDecision::filament_color_remapping")]
pub fn pending_filament_remap() -> Option<&'static BTreeMap<u32, u32>> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decision_with_printer(name: &str) -> ImportDecision {
        ImportDecision {
            import_printer_settings: false,
            reassign_printer: Some(name.to_string()),
            ..ImportDecision::default()
        }
    }

    #[test]
    fn publish_then_take() {
        let slot = PendingDecisionSlot::new();
        assert!(!slot.has_pending());

        slot.publish(decision_with_printer("Voron 2.4"));

        assert!(slot.has_pending());
        assert_eq!(slot.take().reassign_printer.as_deref(), Some("Voron 2.4"));
        assert!(slot.has_pending());
    }

    #[test]
    fn clear_resets_contents_and_validity() {
        let slot = PendingDecisionSlot::new();
        slot.publish(decision_with_printer("Voron 2.4"));

        slot.clear();

        assert!(!slot.has_pending());
        assert_eq!(slot.take(), ImportDecision::default());
    }

    #[test]
    fn publish_overwrites_previous_decision() {
        let slot = PendingDecisionSlot::new();
        slot.publish(decision_with_printer("First"));
        slot.publish(decision_with_printer("Second"));

        assert_eq!(slot.take().reassign_printer.as_deref(), Some("Second"));
    }

    #[test]
    fn take_pending_yields_once() {
        let slot = PendingDecisionSlot::new();
        slot.publish(decision_with_printer("Voron 2.4"));

        assert!(slot.take_pending().is_some());
        assert!(slot.take_pending().is_none());
        assert!(!slot.has_pending());
    }

    #[test]
    #[allow(deprecated)]
    fn legacy_remap_accessor_is_empty() {
        assert!(pending_filament_remap().is_none());
    }
}
