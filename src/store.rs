//! The single source of truth for current axis values.

use std::fmt;

use indexmap::IndexMap;

use crate::reconcile::ReconciledAxis;
use crate::{AxisDescriptor, AxisTag, FontId};

/// How axis values are keyed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ValueScope {
    /// One value per tag, shared by every active font exposing it
    Shared,
    /// One value per font and tag; each card has its own controls
    #[default]
    PerFont,
}

/// Key of one value in the store (and of its control and oscillator).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ValueKey {
    /// Owning font in [`ValueScope::PerFont`], `None` when shared
    pub font: Option<FontId>,
    pub tag: AxisTag,
}

impl ValueKey {
    /// Key for a tag shared across fonts.
    #[inline]
    pub fn shared(tag: AxisTag) -> Self {
        Self { font: None, tag }
    }

    /// Key for one font's own axis.
    #[inline]
    pub fn font(font: FontId, tag: AxisTag) -> Self {
        Self { font: Some(font), tag }
    }

    /// Key under which `font`'s `tag` lives for the given scope.
    #[inline]
    pub fn for_scope(scope: ValueScope, font: FontId, tag: AxisTag) -> Self {
        match scope {
            ValueScope::Shared => Self::shared(tag),
            ValueScope::PerFont => Self::font(font, tag),
        }
    }

    /// Element id of this key's slider, e.g. `axis-shared-wght` or `axis-2-opsz`.
    pub fn element_id(&self) -> String {
        let tag = self.tag.to_string().trim_end().replace(' ', "_");
        match self.font {
            Some(font) => format!("axis-{font}-{tag}"),
            None => format!("axis-shared-{tag}"),
        }
    }
}

impl fmt::Display for ValueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.font {
            Some(font) => write!(f, "font {font} axis '{}'", self.tag),
            None => write!(f, "axis '{}'", self.tag),
        }
    }
}

/// A slider the user (or the animator) can drive.
#[derive(Clone, Debug, PartialEq)]
pub struct Control {
    pub key: ValueKey,
    pub name: String,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub default: f64,
}

impl Control {
    /// Control for a tag merged across fonts.
    pub fn from_reconciled(axis: &ReconciledAxis) -> Self {
        Self {
            key: ValueKey::shared(axis.tag),
            name: axis.name.clone(),
            min: axis.min,
            max: axis.max,
            step: axis.step,
            default: axis.default,
        }
    }

    /// Control for one font's own axis.
    pub fn from_font_axis(font: FontId, axis: &AxisDescriptor) -> Self {
        Self {
            key: ValueKey::font(font, axis.tag),
            name: axis.name.clone(),
            min: axis.min,
            max: axis.max,
            step: axis.step,
            default: axis.default,
        }
    }

    /// Tag driven by this control.
    #[inline]
    pub fn tag(&self) -> AxisTag {
        self.key.tag
    }

    /// Display label for a value, using this control's step.
    pub fn label(&self, value: f64) -> String {
        format_value(value, self.step)
    }
}

/// Format a value for display: rounded for integer steps, two decimals
/// otherwise.
///
/// ```rust
/// use vfaxis_core_view::format_value;
///
/// assert_eq!(format_value(412.4, 1.0), "412");
/// assert_eq!(format_value(0.35, 0.1), "0.35");
/// ```
pub fn format_value(value: f64, step: f64) -> String {
    if step.fract() == 0.0 {
        // Adding zero turns -0 into 0
        format!("{}", value.round() + 0.0)
    } else {
        let text = format!("{value:.2}");
        match text.as_str() {
            "-0.00" => "0.00".to_string(),
            _ => text,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Slot {
    value: f64,
    min: f64,
    max: f64,
    default: f64,
    /// Set by input or animation since it was seeded
    touched: bool,
}

/// Mapping from [`ValueKey`] to current value, with per-key bounds.
///
/// Every stored value lies within its control's `[min, max]`.
#[derive(Clone, Debug, Default)]
pub struct ValueStore {
    slots: IndexMap<ValueKey, Slot>,
}

impl ValueStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Align the store with the current control set.
    ///
    /// Values set by input or animation are kept and clamped into the
    /// (possibly changed) range. Every other key follows its control's
    /// current default, so a value nobody touched always equals what a reset
    /// would restore. Keys without a control are dropped.
    pub fn sync(&mut self, controls: &[Control]) {
        let mut next = IndexMap::with_capacity(controls.len());
        for control in controls {
            let (value, touched) = match self.slots.get(&control.key) {
                Some(slot) if slot.touched => (slot.value.clamp(control.min, control.max), true),
                _ => (control.default.clamp(control.min, control.max), false),
            };
            next.insert(
                control.key,
                Slot {
                    value,
                    min: control.min,
                    max: control.max,
                    default: control.default,
                    touched,
                },
            );
        }
        self.slots = next;
    }

    /// Set a value, clamped into range.
    ///
    /// Returns the stored value, or `None` if no control has this key or
    /// `value` is not finite.
    pub fn set_value(&mut self, key: ValueKey, value: f64) -> Option<f64> {
        if !value.is_finite() {
            return None;
        }
        let slot = self.slots.get_mut(&key)?;
        slot.value = value.clamp(slot.min, slot.max);
        slot.touched = true;
        Some(slot.value)
    }

    /// Current value for a key.
    #[inline]
    pub fn get(&self, key: ValueKey) -> Option<f64> {
        self.slots.get(&key).map(|s| s.value)
    }

    /// Current value for `font`'s `tag` under the given scope.
    #[inline]
    pub fn value_for(&self, scope: ValueScope, font: FontId, tag: AxisTag) -> Option<f64> {
        self.get(ValueKey::for_scope(scope, font, tag))
    }

    /// `(min, max)` bounds for a key.
    #[inline]
    pub fn bounds(&self, key: ValueKey) -> Option<(f64, f64)> {
        self.slots.get(&key).map(|s| (s.min, s.max))
    }

    /// Restore every value to its default.
    pub fn reset_to_defaults(&mut self) {
        for slot in self.slots.values_mut() {
            slot.value = slot.default;
            slot.touched = false;
        }
    }

    /// Returns `true` if the key has a value.
    #[inline]
    pub fn contains(&self, key: ValueKey) -> bool {
        self.slots.contains_key(&key)
    }

    /// Keys in control order.
    pub fn keys(&self) -> impl Iterator<Item = ValueKey> + '_ {
        self.slots.keys().copied()
    }

    /// Number of stored values.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if nothing is stored.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
