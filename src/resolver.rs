//! Axis descriptor resolution: naming and step policy on top of a parser.

use indexmap::IndexMap;
use log::warn;

use crate::parser::{FontParser, RawAxis};
use crate::{AxisDescriptor, AxisTag};

/// Ranges wider than this get an integer step.
const INTEGER_STEP_THRESHOLD: f64 = 50.0;

/// Slider step for an axis range: `1` for wide ranges, `0.1` otherwise.
///
/// ```rust
/// use vfaxis_core_view::step_for_range;
///
/// assert_eq!(step_for_range(100.0, 900.0), 1.0);
/// assert_eq!(step_for_range(-12.0, 0.0), 0.1);
/// ```
#[inline]
pub fn step_for_range(min: f64, max: f64) -> f64 {
    if max - min > INTEGER_STEP_THRESHOLD {
        1.0
    } else {
        0.1
    }
}

/// Fallback display names for the registered axes.
pub fn builtin_axis_name(tag: AxisTag) -> Option<&'static str> {
    match tag {
        AxisTag::WEIGHT       => Some("Weight"),
        AxisTag::WIDTH        => Some("Width"),
        AxisTag::SLANT        => Some("Slant"),
        AxisTag::OPTICAL_SIZE => Some("Optical Size"),
        AxisTag::ITALIC       => Some("Italic"),
        _                     => None,
    }
}

/// Turns font binaries into [`AxisDescriptor`]s.
#[derive(Clone, Debug)]
pub struct AxisResolver<P> {
    parser: P,
    languages: Vec<String>,
}

impl<P: FontParser> AxisResolver<P> {
    /// Create a resolver with preferred name-table languages.
    pub fn new(parser: P, languages: Vec<String>) -> Self {
        Self { parser, languages }
    }

    /// Parse `data` and apply naming/step policy. Never fails.
    pub fn resolve_bytes(&self, data: &[u8]) -> Vec<AxisDescriptor> {
        match self.parser.parse_axes(data, &self.languages) {
            Ok(raw) => descriptors(raw),
            Err(e) => {
                warn!("Treating font as static: {e}");
                Vec::new()
            }
        }
    }
}

/// Apply naming and step policy to raw axis records.
///
/// Records with an empty range are dropped, a repeated tag keeps its first
/// record, and defaults are clamped into range.
pub fn descriptors(raw: Vec<RawAxis>) -> Vec<AxisDescriptor> {
    let mut axes: IndexMap<AxisTag, AxisDescriptor> = IndexMap::with_capacity(raw.len());
    for axis in raw {
        if !(axis.min < axis.max) {
            warn!("Skipping axis {} with empty range {}..{}", axis.tag, axis.min, axis.max);
            continue;
        }
        if axes.contains_key(&axis.tag) {
            warn!("Skipping duplicate axis {}", axis.tag);
            continue;
        }
        let name = axis
            .name
            .or_else(|| builtin_axis_name(axis.tag).map(str::to_string))
            .unwrap_or_else(|| axis.tag.to_string());
        axes.insert(
            axis.tag,
            AxisDescriptor {
                tag: axis.tag,
                name,
                min: axis.min,
                max: axis.max,
                default: axis.default.clamp(axis.min, axis.max),
                step: step_for_range(axis.min, axis.max),
            },
        );
    }
    axes.into_values().collect()
}
