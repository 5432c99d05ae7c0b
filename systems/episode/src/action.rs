//! Fixed-layout discrete action space shared with the learning side.

use tower_defence_core::{SlotId, TowerKind};

/// A decoded agent action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Do nothing this step.
    Noop,
    /// Mark a tower kind as pending placement.
    SelectKind(TowerKind),
    /// Build the pending kind on the slot.
    Build(SlotId),
    /// Upgrade the tower on the slot.
    Upgrade(SlotId),
    /// Sell the tower on the slot.
    Sell(SlotId),
    /// Index outside the action space.
    Invalid,
}

/// Fixed action layout over `T` tower kinds and `N` slots.
///
/// Index 0 is no-op, `1..=T` selects a kind, then three consecutive blocks
/// of `N` indices build, upgrade, and sell on slot `i`. The total size is
/// `1 + T + 3N`; indices at or beyond it decode to [`Action::Invalid`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActionSpace {
    slots: usize,
}

impl ActionSpace {
    /// Creates the action space for a playfield with `slots` placement slots.
    #[must_use]
    pub const fn new(slots: usize) -> Self {
        Self { slots }
    }

    /// Number of discrete actions.
    #[must_use]
    pub const fn size(&self) -> usize {
        1 + TowerKind::COUNT + 3 * self.slots
    }

    /// Decodes a raw action index.
    #[must_use]
    pub fn decode(&self, index: usize) -> Action {
        if index == 0 {
            return Action::Noop;
        }
        let mut index = index - 1;
        if index < TowerKind::COUNT {
            return match TowerKind::from_index(index) {
                Some(kind) => Action::SelectKind(kind),
                None => Action::Invalid,
            };
        }
        index -= TowerKind::COUNT;
        for constructor in [
            Action::Build as fn(SlotId) -> Action,
            Action::Upgrade,
            Action::Sell,
        ] {
            if index < self.slots {
                return constructor(SlotId::new(index as u32));
            }
            index -= self.slots;
        }
        Action::Invalid
    }
}
