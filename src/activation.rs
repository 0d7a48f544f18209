//! Tracking which fonts are displayed.

use indexmap::IndexSet;

use crate::FontId;

/// Selection policy for the activation set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SelectionMode {
    /// At most one font is active; activating replaces it
    SingleSelect,
    /// Any number of fonts, but never fewer than one once populated
    MultiSelectMinOne,
    /// Any number of fonts, including none
    #[default]
    MultiSelectAllowEmpty,
}

/// Result of an activation request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Activation {
    /// The font was added; `displaced` lists fonts removed to make room
    Added { displaced: Vec<FontId> },
    /// The font was already active
    AlreadyActive,
}

/// Result of a deactivation request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Deactivation {
    /// The font was removed
    Removed,
    /// The font was not active
    NotActive,
    /// Removing it would empty the set under [`SelectionMode::MultiSelectMinOne`]
    Refused,
}

/// Result of a toggle request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Toggled {
    Activated(Activation),
    Deactivated(Deactivation),
}

/// Ordered set of active fonts, in activation order.
#[derive(Clone, Debug, Default)]
pub struct ActivationSet {
    mode: SelectionMode,
    members: IndexSet<FontId>,
}

impl ActivationSet {
    /// Create an empty set with the given policy.
    pub fn new(mode: SelectionMode) -> Self {
        Self {
            mode,
            members: IndexSet::new(),
        }
    }

    /// The selection policy.
    #[inline]
    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Activate a font.
    pub fn activate(&mut self, font: FontId) -> Activation {
        if self.members.contains(&font) {
            return Activation::AlreadyActive;
        }
        let displaced = match self.mode {
            SelectionMode::SingleSelect => self.members.drain(..).collect(),
            _ => Vec::new(),
        };
        self.members.insert(font);
        Activation::Added { displaced }
    }

    /// Deactivate a font, honoring the selection policy.
    pub fn deactivate(&mut self, font: FontId) -> Deactivation {
        if !self.members.contains(&font) {
            return Deactivation::NotActive;
        }
        if self.mode == SelectionMode::MultiSelectMinOne && self.members.len() == 1 {
            return Deactivation::Refused;
        }
        self.members.shift_remove(&font);
        Deactivation::Removed
    }

    /// Deactivate `font` if active, otherwise activate it.
    pub fn toggle(&mut self, font: FontId) -> Toggled {
        if self.contains(font) {
            Toggled::Deactivated(self.deactivate(font))
        } else {
            Toggled::Activated(self.activate(font))
        }
    }

    /// Returns `true` if `font` is active.
    #[inline]
    pub fn contains(&self, font: FontId) -> bool {
        self.members.contains(&font)
    }

    /// Active fonts in activation order.
    pub fn iter(&self) -> impl Iterator<Item = FontId> + '_ {
        self.members.iter().copied()
    }

    /// Number of active fonts.
    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns `true` when nothing is displayed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multi_select_allow_empty() {
        let mut set = ActivationSet::new(SelectionMode::MultiSelectAllowEmpty);
        assert_eq!(set.activate(FontId(0)), Activation::Added { displaced: vec![] });
        assert_eq!(set.activate(FontId(1)), Activation::Added { displaced: vec![] });
        assert_eq!(set.activate(FontId(1)), Activation::AlreadyActive);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![FontId(0), FontId(1)]);

        assert_eq!(set.deactivate(FontId(0)), Deactivation::Removed);
        assert_eq!(set.deactivate(FontId(1)), Deactivation::Removed);
        assert!(set.is_empty());
        assert_eq!(set.deactivate(FontId(1)), Deactivation::NotActive);
    }

    #[test]
    fn test_multi_select_min_one() {
        let mut set = ActivationSet::new(SelectionMode::MultiSelectMinOne);
        set.activate(FontId(0));
        set.activate(FontId(1));
        assert_eq!(set.deactivate(FontId(0)), Deactivation::Removed);
        assert_eq!(set.deactivate(FontId(1)), Deactivation::Refused);
        assert!(set.contains(FontId(1)));
    }

    #[test]
    fn test_toggle() {
        let mut set = ActivationSet::new(SelectionMode::MultiSelectMinOne);
        assert_eq!(set.toggle(FontId(4)), Toggled::Activated(Activation::Added { displaced: vec![] }));
        assert_eq!(set.toggle(FontId(4)), Toggled::Deactivated(Deactivation::Refused));
        set.toggle(FontId(5));
        assert_eq!(set.toggle(FontId(4)), Toggled::Deactivated(Deactivation::Removed));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![FontId(5)]);
    }

    #[test]
    fn test_single_select_replaces() {
        let mut set = ActivationSet::new(SelectionMode::SingleSelect);
        set.activate(FontId(0));
        assert_eq!(set.activate(FontId(2)), Activation::Added { displaced: vec![FontId(0)] });
        assert_eq!(set.len(), 1);
        assert!(set.contains(FontId(2)));
        // Single select may still be emptied explicitly
        assert_eq!(set.deactivate(FontId(2)), Deactivation::Removed);
    }
}
