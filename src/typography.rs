//! Session-wide typography settings shared by every card.

use crate::format_value;
use crate::render::{RenderBinder, StyleTarget, StyleWrite};

/// One of the global, non-variation typography parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TypographyParam {
    /// Font size in pixels
    Size,
    /// Letter spacing in em
    LetterSpacing,
    /// Unitless line height
    LineHeight,
}

impl TypographyParam {
    /// All parameters in panel order.
    pub const ALL: [TypographyParam; 3] = [
        TypographyParam::Size,
        TypographyParam::LetterSpacing,
        TypographyParam::LineHeight,
    ];

    /// `(min, max, step)` for this parameter.
    pub fn range(self) -> (f64, f64, f64) {
        match self {
            TypographyParam::Size          => (12.0, 200.0, 1.0),
            TypographyParam::LetterSpacing => (-0.1, 0.5, 0.01),
            TypographyParam::LineHeight    => (0.8, 2.5, 0.05),
        }
    }

    /// Container custom property receiving this parameter.
    pub fn property(self) -> &'static str {
        match self {
            TypographyParam::Size          => "--vf-size",
            TypographyParam::LetterSpacing => "--vf-spacing",
            TypographyParam::LineHeight    => "--vf-height",
        }
    }

    /// CSS unit suffix.
    pub fn unit(self) -> &'static str {
        match self {
            TypographyParam::Size          => "px",
            TypographyParam::LetterSpacing => "em",
            TypographyParam::LineHeight    => "",
        }
    }
}

/// Current global typography values.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Typography {
    /// Font size in pixels
    pub size: f64,
    /// Letter spacing in em
    pub letter_spacing: f64,
    /// Unitless line height
    pub line_height: f64,
}

impl Default for Typography {
    fn default() -> Self {
        Self {
            size: 72.0,
            letter_spacing: 0.0,
            line_height: 1.1,
        }
    }
}

impl Typography {
    /// Read a parameter.
    pub fn get(&self, param: TypographyParam) -> f64 {
        match param {
            TypographyParam::Size          => self.size,
            TypographyParam::LetterSpacing => self.letter_spacing,
            TypographyParam::LineHeight    => self.line_height,
        }
    }

    /// Set a parameter, clamped into its range. Returns the stored value.
    ///
    /// Non-finite input is ignored.
    pub fn set(&mut self, param: TypographyParam, value: f64) -> f64 {
        if !value.is_finite() {
            return self.get(param);
        }
        let (min, max, _) = param.range();
        let value = value.clamp(min, max);
        match param {
            TypographyParam::Size          => self.size = value,
            TypographyParam::LetterSpacing => self.letter_spacing = value,
            TypographyParam::LineHeight    => self.line_height = value,
        }
        value
    }

    /// Display label, e.g. `"72px"` or `"0.05em"`.
    pub fn label(&self, param: TypographyParam) -> String {
        let (_, _, step) = param.range();
        format!("{}{}", format_value(self.get(param), step), param.unit())
    }

    /// CSS value for a parameter, e.g. `"72px"`.
    pub fn css_value(&self, param: TypographyParam) -> String {
        format!("{}{}", self.get(param), param.unit())
    }

    /// Queue container writes for every changed parameter.
    pub fn bind(&self, binder: &mut RenderBinder, out: &mut Vec<StyleWrite>) {
        for param in TypographyParam::ALL {
            binder.write(StyleTarget::Container, param.property(), self.css_value(param), out);
        }
    }
}
