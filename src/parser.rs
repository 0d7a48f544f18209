//! Font binary parsing for variation axis tables.

use skrifa::{FontRef, MetadataProvider};

use crate::AxisTag;

/// Error type for parsing operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// No bytes were supplied
    #[error("Font data is empty")]
    Empty,
    /// The data is not a readable OpenType font
    #[error("Failed to parse font: {0}")]
    Malformed(String),
}

/// An axis record as stored in the font, before naming and step policy.
#[derive(Clone, Debug, PartialEq)]
pub struct RawAxis {
    pub tag: AxisTag,
    pub min: f64,
    pub max: f64,
    pub default: f64,
    /// Best localized name from the font's name table, if any
    pub name: Option<String>,
}

/// Font parsing collaborator.
///
/// Implementations read the axis table (and the name entries it refers to)
/// out of a font binary. A font without an axis table yields an empty list.
pub trait FontParser {
    /// Parse the variation axes of `data`.
    ///
    /// `languages` lists preferred name-table languages in priority order
    /// (BCP-47 prefixes such as `"zh"` or `"en"`).
    fn parse_axes(&self, data: &[u8], languages: &[String]) -> Result<Vec<RawAxis>, ParseError>;
}

/// [`FontParser`] backed by `skrifa`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SkrifaParser;

impl FontParser for SkrifaParser {
    fn parse_axes(&self, data: &[u8], languages: &[String]) -> Result<Vec<RawAxis>, ParseError> {
        if data.is_empty() {
            return Err(ParseError::Empty);
        }
        let font = FontRef::new(data).map_err(|e| ParseError::Malformed(e.to_string()))?;

        let axes = font
            .axes()
            .iter()
            .map(|axis| RawAxis {
                tag: AxisTag::new(&axis.tag().to_be_bytes()),
                min: f64::from(axis.min_value()),
                max: f64::from(axis.max_value()),
                default: f64::from(axis.default_value()),
                name: localized_name(&font, axis.name_id(), languages),
            })
            .collect();
        Ok(axes)
    }
}

/// Pick a name-table string, preferring `languages` in order, then English,
/// then whatever comes first.
fn localized_name(font: &FontRef, id: skrifa::string::StringId, languages: &[String]) -> Option<String> {
    for wanted in languages {
        let found = font.localized_strings(id).find(|s| {
            s.language()
                .is_some_and(|lang| lang.to_ascii_lowercase().starts_with(&wanted.to_ascii_lowercase()))
        });
        if let Some(s) = found {
            return non_empty(s.to_string());
        }
    }
    font.localized_strings(id)
        .english_or_first()
        .and_then(|s| non_empty(s.to_string()))
}

fn non_empty(s: String) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_data() {
        assert_eq!(SkrifaParser.parse_axes(&[], &[]), Err(ParseError::Empty));
    }

    #[test]
    fn test_garbage_data() {
        let result = SkrifaParser.parse_axes(b"definitely not a font", &[]);
        assert!(matches!(result, Err(ParseError::Malformed(_))));
    }

    #[test]
    fn test_static_font_has_no_axes() {
        let axes = SkrifaParser
            .parse_axes(font_test_data::CMAP12_FONT1, &[])
            .unwrap();
        assert!(axes.is_empty());
    }

    #[test]
    fn test_variable_font_axes() {
        let axes = SkrifaParser
            .parse_axes(font_test_data::VAZIRMATN_VAR, &["en".to_string()])
            .unwrap();
        let wght = axes.iter().find(|a| a.tag == AxisTag::WEIGHT).unwrap();
        assert!(wght.min < wght.max);
        assert!(wght.min <= wght.default && wght.default <= wght.max);
    }
}
