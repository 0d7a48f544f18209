use crate::render::DEFAULT_AXES_PROPERTY;
use crate::{BindingStrategy, Error, Result, SelectionMode, Typography, ValueScope, DEFAULT_TRAVERSAL_FRAMES};

/// A font offered by the catalog at startup.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PresetFont {
    pub name: String,
    pub url: String,
    pub badge: Option<String>,
    pub download_url: Option<String>,
}

/// Session configuration for a [`PreviewController`](crate::PreviewController).
///
/// Every field has a default, so partial configurations (e.g. from a TOML
/// snippet bundled with the page) are accepted.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PreviewConfig {
    pub selection_mode: SelectionMode,
    pub value_scope: ValueScope,
    pub binding: BindingStrategy,
    pub presets: Vec<PresetFont>,
    /// Indices into `presets` active at startup
    pub initially_active: Vec<usize>,
    pub sample_text: String,
    /// Preferred name-table languages for axis names, in order
    pub name_languages: Vec<String>,
    /// Badge shown on uploaded fonts
    pub local_badge: String,
    /// Uploaded font names are cut to this many characters
    pub max_local_name_len: usize,
    /// Frames for one end-to-end oscillation
    pub traversal_frames: u32,
    /// Container property carrying the shared declaration
    pub axes_property: String,
    /// Generic family used while loading or after a failed load
    pub fallback_family: String,
    pub typography: Typography,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            selection_mode: SelectionMode::default(),
            value_scope: ValueScope::default(),
            binding: BindingStrategy::default(),
            presets: Vec::new(),
            initially_active: Vec::new(),
            sample_text: "Variable fonts".to_string(),
            name_languages: vec!["en".to_string()],
            local_badge: "Local".to_string(),
            max_local_name_len: 24,
            traversal_frames: DEFAULT_TRAVERSAL_FRAMES,
            axes_property: DEFAULT_AXES_PROPERTY.to_string(),
            fallback_family: "sans-serif".to_string(),
            typography: Typography::default(),
        }
    }
}

impl PreviewConfig {
    /// Parse a TOML string into a `PreviewConfig`.
    #[cfg(feature = "toml")]
    pub fn from_toml_str(s: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Check that the options can work together.
    pub fn validate(&self) -> Result<()> {
        if self.value_scope == ValueScope::PerFont && self.binding == BindingStrategy::SharedDeclaration {
            return Err(Error::InvalidConfig(
                "a shared declaration cannot carry per-font values".into(),
            ));
        }
        if self.traversal_frames == 0 {
            return Err(Error::InvalidConfig("traversal_frames must be positive".into()));
        }
        if let Some(bad) = self.initially_active.iter().find(|&&i| i >= self.presets.len()) {
            return Err(Error::InvalidConfig(format!(
                "initially_active index {bad} is out of range ({} presets)",
                self.presets.len()
            )));
        }
        if self.selection_mode == SelectionMode::SingleSelect && self.initially_active.len() > 1 {
            return Err(Error::InvalidConfig(
                "single select allows at most one initially active font".into(),
            ));
        }
        Ok(())
    }
}
