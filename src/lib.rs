//! # vfaxis-core-view
//!
//! Core axis-control synchronization library for variable-font previewers.
//!
//! This crate provides platform-agnostic data structures and logic for:
//! - Reading variation axes from font binaries (via `skrifa`)
//! - Merging the axes of several displayed fonts into one control set
//! - Keeping axis values, animation and style output consistent
//! - Binding values to render surfaces (with optional web support)
//!
//! ## Features
//!
//! - `serde` - Enable serialization/deserialization for configuration types
//! - `toml` - Load [`PreviewConfig`] from TOML
//! - `web` - Enable DOM style binding, browser font loading and the frame loop
//!
//! ## Example
//!
//! ```rust,ignore
//! use vfaxis_core_view::{load_font, PreviewConfig, PreviewController, ValueKey, AxisTag};
//!
//! let mut controller = PreviewController::new(PreviewConfig::default())?;
//!
//! // Uploads are parsed right away; registration is left to the platform
//! let (font, request) = controller.add_local_font("Inter.ttf", bytes)?;
//! if let Some(request) = request {
//!     let loaded = load_font(&provider, controller.resolver(), request).await;
//!     controller.complete_load(loaded);
//! }
//!
//! controller.set_value(ValueKey::font(font, AxisTag::WEIGHT), 650.0)?;
//! controller.toggle_animation(ValueKey::font(font, AxisTag::WIDTH))?;
//!
//! // Once per display frame
//! while let Some(frame) = controller.tick() {
//!     apply(&frame.writes);
//! }
//! ```

mod activation;
mod animation;
mod config;
mod controller;
mod data;
mod error;
mod loader;
mod parser;
mod reconcile;
pub mod render;
mod resolver;
mod store;
mod typography;

pub use activation::{Activation, ActivationSet, Deactivation, SelectionMode, Toggled};
pub use animation::{
    AnimationScheduler, Direction, FrameStep, Oscillator, Schedule, SchedulerState, DEFAULT_TRAVERSAL_FRAMES,
};
pub use config::{PresetFont, PreviewConfig};
pub use controller::{
    local_display_name, AnimationToggle, AxisStatus, CanvasView, CardView, ControlRefresh, ControlView, FrameOutput,
    LibraryItem, PreviewController,
};
pub use data::{AxisDescriptor, AxisTag, FontCatalog, FontEntry, FontId, FontSource, LocalFont};
pub use error::{Error, Result};
pub use loader::{
    family_name, load_font, FontDataProvider, LoadError, LoadRequest, LoadResult, LoadTracker, LoadedFont,
    RenderFamily,
};
pub use parser::{FontParser, ParseError, RawAxis, SkrifaParser};
pub use reconcile::{reconcile, ReconciledAxis};
pub use render::{
    bind_surface, BindingStrategy, RenderBinder, StyleTarget, StyleWrite, SurfaceId, SurfaceRegistry,
    FONT_VARIATION_SETTINGS,
};
pub use resolver::{builtin_axis_name, descriptors, step_for_range, AxisResolver};
pub use store::{format_value, Control, ValueKey, ValueScope, ValueStore};
pub use typography::{Typography, TypographyParam};

#[cfg(feature = "web")]
pub use controller::web::WebPreview;
#[cfg(feature = "web")]
pub use loader::web::BrowserFontProvider;
#[cfg(feature = "web")]
pub use render::web::apply_writes;
