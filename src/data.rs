//! Core data structures for fonts and their variation axes.

use std::fmt;
use std::sync::Arc;

/// A four-byte OpenType axis tag such as `wght` or `opsz`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct AxisTag([u8; 4]);

impl AxisTag {
    /// Weight axis.
    pub const WEIGHT: AxisTag = AxisTag(*b"wght");
    /// Width axis.
    pub const WIDTH: AxisTag = AxisTag(*b"wdth");
    /// Slant axis.
    pub const SLANT: AxisTag = AxisTag(*b"slnt");
    /// Optical size axis.
    pub const OPTICAL_SIZE: AxisTag = AxisTag(*b"opsz");
    /// Italic axis.
    pub const ITALIC: AxisTag = AxisTag(*b"ital");

    /// Create a tag from raw bytes.
    pub const fn new(bytes: &[u8; 4]) -> Self {
        Self(*bytes)
    }

    /// Create a tag from a string, padding short tags with spaces.
    ///
    /// Returns `None` for empty strings, strings longer than four bytes,
    /// or non-ASCII input.
    ///
    /// ```rust
    /// use vfaxis_core_view::AxisTag;
    ///
    /// assert_eq!(AxisTag::parse("wght"), Some(AxisTag::WEIGHT));
    /// assert_eq!(AxisTag::parse("ab").unwrap().to_string(), "ab  ");
    /// assert_eq!(AxisTag::parse("toolong"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        if s.is_empty() || s.len() > 4 || !s.is_ascii() {
            return None;
        }
        let mut bytes = [b' '; 4];
        for (dst, src) in bytes.iter_mut().zip(s.as_bytes()) {
            *dst = *src;
        }
        Some(Self(bytes))
    }

    /// Raw tag bytes.
    #[inline]
    pub fn bytes(&self) -> [u8; 4] {
        self.0
    }
}

impl fmt::Display for AxisTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0 {
            write!(f, "{}", b as char)?;
        }
        Ok(())
    }
}

impl fmt::Debug for AxisTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AxisTag({self})")
    }
}

impl TryFrom<String> for AxisTag {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        AxisTag::parse(&value).ok_or_else(|| format!("invalid axis tag '{value}'"))
    }
}

impl From<AxisTag> for String {
    fn from(tag: AxisTag) -> Self {
        tag.to_string()
    }
}

/// Catalog index of a font. Stable for the whole session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FontId(pub usize);

impl fmt::Display for FontId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A resolved variation axis of one font.
///
/// Immutable once resolved. `min <= default <= max` and `min < max`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AxisDescriptor {
    pub tag: AxisTag,
    /// Human readable name
    pub name: String,
    pub min: f64,
    pub max: f64,
    pub default: f64,
    /// Slider granularity (1 or 0.1)
    pub step: f64,
}

impl AxisDescriptor {
    /// Clamp a value into this axis' range.
    #[inline]
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

/// Bytes of a user supplied font, scoped to the session.
#[derive(Clone, Debug)]
pub struct LocalFont {
    /// Original file name (e.g., "MyFont-VF.ttf")
    pub file_name: String,
    /// Raw font data
    pub data: Arc<[u8]>,
}

/// Where a font's binary comes from.
#[derive(Clone, Debug)]
pub enum FontSource {
    /// Preset font fetched over the network
    Remote { url: String },
    /// Uploaded font held in memory
    Local(LocalFont),
}

impl FontSource {
    /// Returns `true` for uploaded fonts.
    #[inline]
    pub fn is_local(&self) -> bool {
        matches!(self, FontSource::Local(_))
    }
}

/// A font known to the session.
#[derive(Clone, Debug)]
pub struct FontEntry {
    pub id: FontId,
    pub display_name: String,
    pub source: FontSource,
    pub badge_label: Option<String>,
    pub download_url: Option<String>,
    /// `None` until resolved; `Some(vec![])` for static fonts.
    pub axes: Option<Vec<AxisDescriptor>>,
}

impl FontEntry {
    /// Returns `true` once the axis set has been resolved.
    #[inline]
    pub fn is_resolved(&self) -> bool {
        self.axes.is_some()
    }

    /// Returns `true` if the font is resolved and exposes at least one axis.
    #[inline]
    pub fn is_variable(&self) -> bool {
        self.axes.as_ref().is_some_and(|a| !a.is_empty())
    }

    /// Resolved axes, or an empty slice while unresolved.
    #[inline]
    pub fn resolved_axes(&self) -> &[AxisDescriptor] {
        self.axes.as_deref().unwrap_or(&[])
    }

    /// Look up one of this font's axes by tag.
    pub fn axis(&self, tag: AxisTag) -> Option<&AxisDescriptor> {
        self.resolved_axes().iter().find(|a| a.tag == tag)
    }
}

/// Session-wide list of fonts. Entries are never removed.
#[derive(Clone, Debug, Default)]
pub struct FontCatalog {
    entries: Vec<FontEntry>,
}

impl FontCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a font and return its id.
    pub fn push(
        &mut self,
        display_name: String,
        source: FontSource,
        badge_label: Option<String>,
        download_url: Option<String>,
        axes: Option<Vec<AxisDescriptor>>,
    ) -> FontId {
        let id = FontId(self.entries.len());
        self.entries.push(FontEntry {
            id,
            display_name,
            source,
            badge_label,
            download_url,
            axes,
        });
        id
    }

    /// Get a font by id.
    #[inline]
    pub fn get(&self, id: FontId) -> Option<&FontEntry> {
        self.entries.get(id.0)
    }

    /// Record resolved axes for a font.
    ///
    /// Axes are written at most once; returns `false` if the entry was
    /// already resolved or does not exist.
    pub fn set_axes(&mut self, id: FontId, axes: Vec<AxisDescriptor>) -> bool {
        match self.entries.get_mut(id.0) {
            Some(entry) if entry.axes.is_none() => {
                entry.axes = Some(axes);
                true
            }
            _ => false,
        }
    }

    /// Number of fonts in the catalog.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the catalog has no fonts.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate fonts in catalog order.
    pub fn iter(&self) -> std::slice::Iter<'_, FontEntry> {
        self.entries.iter()
    }
}
