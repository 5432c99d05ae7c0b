#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure build-controller system that translates player intent into build,
//! upgrade, and sell commands.
//!
//! The controller holds a single pending selection: either a tower kind
//! waiting for a slot, or an occupied slot waiting for an upgrade or sale,
//! never both. It refuses only what its own state machine can see; the world
//! remains the validator of funds and occupancy.

use tower_defence_core::{Command, Event, SlotId, SlotView, TowerKind};

/// The controller's single pending selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum Selection {
    #[default]
    None,
    Kind(TowerKind),
    Slot(SlotId),
}

/// Build-controller system owning the pending-selection state machine.
#[derive(Clone, Debug, Default)]
pub struct BuildController {
    selection: Selection,
}

impl BuildController {
    /// Creates a new controller with nothing selected.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            selection: Selection::None,
        }
    }

    /// Tower kind currently pending placement, if any.
    #[must_use]
    pub const fn pending_kind(&self) -> Option<TowerKind> {
        match self.selection {
            Selection::Kind(kind) => Some(kind),
            _ => None,
        }
    }

    /// Occupied slot currently selected, if any.
    #[must_use]
    pub const fn selected_slot(&self) -> Option<SlotId> {
        match self.selection {
            Selection::Slot(slot) => Some(slot),
            _ => None,
        }
    }

    /// Consumes world events to keep the selection coherent.
    ///
    /// A sold tower clears the selection that pointed at its slot; a world
    /// reset clears everything.
    pub fn handle(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::TowerSold { slot, .. } => {
                    if self.selection == Selection::Slot(*slot) {
                        self.selection = Selection::None;
                    }
                }
                Event::WorldReset => self.selection = Selection::None,
                _ => {}
            }
        }
    }

    /// Marks the provided kind as pending placement, dropping any slot
    /// selection.
    pub fn select_tower_kind(&mut self, kind: TowerKind) {
        self.selection = Selection::Kind(kind);
    }

    /// Reacts to the player picking a slot.
    ///
    /// An occupied slot toggles selection. An empty slot with a kind pending
    /// requests a build on it; an empty slot with nothing pending clears the
    /// selection.
    pub fn select_slot(&mut self, slot: SlotId, slots: &SlotView, out: &mut Vec<Command>) {
        let Some(snapshot) = slots.get(slot) else {
            return;
        };
        if snapshot.occupant.is_some() {
            self.selection = if self.selection == Selection::Slot(slot) {
                Selection::None
            } else {
                Selection::Slot(slot)
            };
            return;
        }
        if self.request_build(slot, out) {
            return;
        }
        self.selection = Selection::None;
    }

    /// Emits a build command for the pending kind on the provided slot.
    ///
    /// Returns `false` without emitting when no kind is pending.
    pub fn request_build(&mut self, slot: SlotId, out: &mut Vec<Command>) -> bool {
        let Some(kind) = self.pending_kind() else {
            return false;
        };
        out.push(Command::BuildTower { slot, kind });
        true
    }

    /// Emits a sell command for the selected slot.
    ///
    /// Returns `false` without emitting when no slot is selected. The
    /// selection survives until the world confirms the sale.
    pub fn request_sell(&mut self, out: &mut Vec<Command>) -> bool {
        let Some(slot) = self.selected_slot() else {
            return false;
        };
        out.push(Command::SellTower { slot });
        true
    }

    /// Emits an upgrade command for the selected slot.
    ///
    /// Returns `false` without emitting when no slot is selected.
    pub fn request_upgrade(&mut self, out: &mut Vec<Command>) -> bool {
        let Some(slot) = self.selected_slot() else {
            return false;
        };
        out.push(Command::UpgradeTower { slot });
        true
    }
}
