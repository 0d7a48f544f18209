//! The preview controller: owner of all session state.

use log::{debug, info};

use crate::activation::{Activation, ActivationSet, Deactivation, Toggled};
use crate::animation::{AnimationScheduler, Schedule};
use crate::loader::{LoadRequest, LoadTracker, LoadedFont, RenderFamily};
use crate::parser::{FontParser, SkrifaParser};
use crate::reconcile::reconcile;
use crate::render::{RenderBinder, StyleTarget, StyleWrite, SurfaceId, SurfaceRegistry};
use crate::resolver::AxisResolver;
use crate::{
    AxisTag, Control, Error, FontCatalog, FontEntry, FontId, FontSource, LocalFont, PreviewConfig, Result,
    Typography, TypographyParam, ValueKey, ValueScope, ValueStore,
};

/// CSS property carrying a surface's font family.
const FONT_FAMILY: &str = "font-family";

/// Outcome of toggling a control's animation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AnimationToggle {
    /// The control now animates; follow `schedule`
    Started(Schedule),
    /// The control stopped at `value`
    Stopped { value: f64 },
}

/// New slider position and label for one control.
#[derive(Clone, Debug, PartialEq)]
pub struct ControlRefresh {
    pub key: ValueKey,
    pub value: f64,
    pub label: String,
}

/// Everything one animation frame produced.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameOutput {
    /// Style writes from a single binder pass
    pub writes: Vec<StyleWrite>,
    /// One refresh per animated control
    pub refreshes: Vec<ControlRefresh>,
    pub schedule: Schedule,
}

/// A control as shown to the user.
#[derive(Clone, Debug, PartialEq)]
pub struct ControlView {
    pub key: ValueKey,
    pub tag: AxisTag,
    pub name: String,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub value: f64,
    pub label: String,
    pub animating: bool,
}

/// Axis section of a card.
#[derive(Clone, Debug, PartialEq)]
pub enum AxisStatus {
    /// Axes are still being resolved
    Loading,
    /// Resolved without variation axes; nothing to animate
    Static,
    /// Controls for the font's axes
    Variable(Vec<ControlView>),
}

/// One displayed font.
#[derive(Clone, Debug, PartialEq)]
pub struct CardView {
    pub font: FontId,
    pub surface: SurfaceId,
    pub name: String,
    pub badge: Option<String>,
    pub download_url: Option<String>,
    /// CSS `font-family` value
    pub family: String,
    pub text: String,
    pub axes: AxisStatus,
}

/// The display area.
#[derive(Clone, Debug, PartialEq)]
pub enum CanvasView {
    /// No active fonts; show the placeholder
    Empty,
    /// Cards in activation order
    Cards(Vec<CardView>),
}

/// One row of the font library list.
#[derive(Clone, Debug, PartialEq)]
pub struct LibraryItem {
    pub font: FontId,
    pub name: String,
    pub active: bool,
}

/// Single owner of the catalog, activation set, value store, animation
/// scheduler and render binder.
///
/// All mutation goes through `&mut self` methods. Font loading is handed
/// out as [`LoadRequest`]s and fed back through
/// [`complete_load`](Self::complete_load), so no state is borrowed across
/// an await point.
///
/// ## Example
///
/// ```rust
/// use vfaxis_core_view::{CanvasView, PreviewConfig, PreviewController};
///
/// let mut controller = PreviewController::new(PreviewConfig::default()).unwrap();
/// assert_eq!(controller.canvas(), CanvasView::Empty);
///
/// let err = controller.add_local_font("empty.ttf", Vec::new());
/// assert!(err.is_err());
/// assert!(controller.catalog().is_empty());
/// ```
#[derive(Debug)]
pub struct PreviewController<P = SkrifaParser> {
    config: PreviewConfig,
    catalog: FontCatalog,
    active: ActivationSet,
    controls: Vec<Control>,
    store: ValueStore,
    scheduler: AnimationScheduler,
    binder: RenderBinder,
    registry: SurfaceRegistry,
    loads: LoadTracker,
    resolver: AxisResolver<P>,
    typography: Typography,
    sample_text: String,
}

impl PreviewController<SkrifaParser> {
    /// Create a controller parsing fonts with `skrifa`.
    pub fn new(config: PreviewConfig) -> Result<Self> {
        Self::with_parser(config, SkrifaParser)
    }
}

impl<P: FontParser> PreviewController<P> {
    /// Create a controller with a custom font parser.
    ///
    /// Presets are added to the catalog and the initially active ones are
    /// activated; call [`pending_loads`](Self::pending_loads) to start
    /// loading them.
    pub fn with_parser(config: PreviewConfig, parser: P) -> Result<Self> {
        config.validate()?;

        let mut catalog = FontCatalog::new();
        for preset in &config.presets {
            catalog.push(
                preset.name.clone(),
                FontSource::Remote { url: preset.url.clone() },
                preset.badge.clone(),
                preset.download_url.clone(),
                None,
            );
        }

        let mut controller = Self {
            catalog,
            active: ActivationSet::new(config.selection_mode),
            controls: Vec::new(),
            store: ValueStore::new(),
            scheduler: AnimationScheduler::new(config.traversal_frames),
            binder: RenderBinder::new(config.binding, config.axes_property.clone()),
            registry: SurfaceRegistry::new(),
            loads: LoadTracker::new(),
            resolver: AxisResolver::new(parser, config.name_languages.clone()),
            typography: config.typography,
            sample_text: config.sample_text.clone(),
            config,
        };
        let initial: Vec<FontId> = controller.config.initially_active.iter().map(|&i| FontId(i)).collect();
        for font in initial {
            controller.active.activate(font);
        }
        controller.refresh_controls();
        Ok(controller)
    }

    /// The configuration in use.
    #[inline]
    pub fn config(&self) -> &PreviewConfig {
        &self.config
    }

    /// All fonts known to the session.
    #[inline]
    pub fn catalog(&self) -> &FontCatalog {
        &self.catalog
    }

    /// The resolver, for running [`load_font`](crate::load_font).
    #[inline]
    pub fn resolver(&self) -> &AxisResolver<P> {
        &self.resolver
    }

    /// Active fonts in activation order.
    pub fn active_fonts(&self) -> impl Iterator<Item = FontId> + '_ {
        self.active.iter()
    }

    /// Returns `true` if `font` is displayed.
    #[inline]
    pub fn is_active(&self, font: FontId) -> bool {
        self.active.contains(font)
    }

    /// Current control set.
    #[inline]
    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    /// Current value for a control.
    #[inline]
    pub fn value(&self, key: ValueKey) -> Option<f64> {
        self.store.get(key)
    }

    /// Returns `true` if the control animates.
    #[inline]
    pub fn is_animating(&self, key: ValueKey) -> bool {
        self.scheduler.is_animating(key)
    }

    /// The animation scheduler.
    #[inline]
    pub fn scheduler(&self) -> &AnimationScheduler {
        &self.scheduler
    }

    /// Render family of a font.
    #[inline]
    pub fn family(&self, font: FontId) -> &RenderFamily {
        self.loads.family(font)
    }

    /// Global typography values.
    #[inline]
    pub fn typography(&self) -> &Typography {
        &self.typography
    }

    /// Sample text shown on every card.
    #[inline]
    pub fn sample_text(&self) -> &str {
        &self.sample_text
    }

    fn entry(&self, font: FontId) -> Result<&FontEntry> {
        self.catalog.get(font).ok_or(Error::UnknownFont(font))
    }

    /// Activate a font.
    ///
    /// Returns a load request if the font still needs axes or registration
    /// and no load is already in flight.
    pub fn activate(&mut self, font: FontId) -> Result<Option<LoadRequest>> {
        self.entry(font)?;
        let outcome = self.active.activate(font);
        self.activated(font, outcome)
    }

    /// Deactivate a font according to the selection policy.
    pub fn deactivate(&mut self, font: FontId) -> Result<Deactivation> {
        self.entry(font)?;
        let outcome = self.active.deactivate(font);
        self.deactivated(font, outcome);
        Ok(outcome)
    }

    /// Flip a font's activation. Returns a load request when activating.
    pub fn toggle(&mut self, font: FontId) -> Result<Option<LoadRequest>> {
        self.entry(font)?;
        match self.active.toggle(font) {
            Toggled::Activated(outcome) => self.activated(font, outcome),
            Toggled::Deactivated(outcome) => {
                self.deactivated(font, outcome);
                Ok(None)
            }
        }
    }

    fn activated(&mut self, font: FontId, outcome: Activation) -> Result<Option<LoadRequest>> {
        if let Activation::Added { displaced } = outcome {
            info!("Activated font {font}");
            for other in displaced {
                debug!("Font {other} displaced by single selection");
                self.detach_surface(other);
            }
            self.refresh_controls();
        }
        let entry = self.catalog.get(font).ok_or(Error::UnknownFont(font))?;
        Ok(self.loads.request(entry))
    }

    fn deactivated(&mut self, font: FontId, outcome: Deactivation) {
        match outcome {
            Deactivation::Removed => {
                info!("Deactivated font {font}");
                self.detach_surface(font);
                self.refresh_controls();
            }
            Deactivation::Refused => debug!("Keeping font {font}: last active font"),
            Deactivation::NotActive => {}
        }
    }

    /// Load requests for every active font that still needs one.
    pub fn pending_loads(&mut self) -> Vec<LoadRequest> {
        let Self { active, catalog, loads, .. } = self;
        active
            .iter()
            .filter_map(|id| catalog.get(id))
            .filter_map(|entry| loads.request(entry))
            .collect()
    }

    /// Apply a finished load.
    ///
    /// Axes are recorded in the catalog even if the font was deactivated
    /// meanwhile. Returns `true` if the font is still active and the view
    /// should be repainted; `false` for stale completions.
    pub fn complete_load(&mut self, loaded: LoadedFont) -> bool {
        self.loads.complete(&loaded);
        let resolved = match loaded.axes {
            Some(axes) => self.catalog.set_axes(loaded.font, axes),
            None => false,
        };
        if !self.active.contains(loaded.font) {
            debug!("Ignoring load of inactive font {}", loaded.font);
            return false;
        }
        if resolved {
            self.refresh_controls();
        }
        true
    }

    /// Add an uploaded font to the catalog and activate it.
    ///
    /// The display name is the file stem, shortened to the configured
    /// length. Under single selection the upload replaces the active font.
    /// Empty files are rejected and leave the catalog unchanged.
    pub fn add_local_font(&mut self, file_name: &str, data: Vec<u8>) -> Result<(FontId, Option<LoadRequest>)> {
        if data.is_empty() {
            return Err(Error::UnreadableUpload {
                file_name: file_name.to_string(),
                reason: "file is empty".into(),
            });
        }
        let axes = self.resolver.resolve_bytes(&data);
        let name = local_display_name(file_name, self.config.max_local_name_len);
        let font = self.catalog.push(
            name,
            FontSource::Local(LocalFont {
                file_name: file_name.to_string(),
                data: data.into(),
            }),
            Some(self.config.local_badge.clone()),
            None,
            Some(axes),
        );
        info!("Added local font {font} from '{file_name}'");
        let request = self.activate(font)?;
        Ok((font, request))
    }

    /// Set a control's value from user input. Returns the clamped value.
    ///
    /// NaN and infinities are rejected and leave the value unchanged.
    pub fn set_value(&mut self, key: ValueKey, value: f64) -> Result<f64> {
        if !value.is_finite() {
            return Err(Error::InvalidValue { key, value });
        }
        let value = self.store.set_value(key, value).ok_or(Error::UnknownControl(key))?;
        self.scheduler.set_value(key, value);
        Ok(value)
    }

    /// Start or stop animating a control.
    pub fn toggle_animation(&mut self, key: ValueKey) -> Result<AnimationToggle> {
        if self.scheduler.is_animating(key) {
            self.scheduler.stop(key);
            let value = self.store.get(key).ok_or(Error::UnknownControl(key))?;
            return Ok(AnimationToggle::Stopped { value });
        }
        let control = self
            .controls
            .iter()
            .find(|c| c.key == key)
            .ok_or(Error::UnknownControl(key))?;
        let value = self.store.get(key).unwrap_or(control.default);
        let schedule = self.scheduler.start(key, control.min, control.max, value);
        Ok(AnimationToggle::Started(schedule))
    }

    /// Drop the pending frame after the host failed to schedule it, so the
    /// next animation start requests a new one.
    pub fn abandon_frame(&mut self) {
        self.scheduler.abandon_frame();
    }

    /// Run one animation frame.
    ///
    /// Returns `None` when nothing animates; the frame chain ends there.
    pub fn tick(&mut self) -> Option<FrameOutput> {
        let step = self.scheduler.tick()?;
        let mut refreshes = Vec::with_capacity(step.values.len());
        for (key, value) in step.values {
            let Some(value) = self.store.set_value(key, value) else {
                continue;
            };
            if let Some(control) = self.controls.iter().find(|c| c.key == key) {
                refreshes.push(ControlRefresh {
                    key,
                    value,
                    label: control.label(value),
                });
            }
        }
        Some(FrameOutput {
            writes: self.render_pass(),
            refreshes,
            schedule: step.schedule,
        })
    }

    /// Stop all animation and restore every control to its default.
    pub fn reset_axes(&mut self) -> Vec<ControlRefresh> {
        self.scheduler.stop_all();
        self.store.reset_to_defaults();
        self.controls
            .iter()
            .filter_map(|c| {
                let value = self.store.get(c.key)?;
                Some(ControlRefresh {
                    key: c.key,
                    value,
                    label: c.label(value),
                })
            })
            .collect()
    }

    /// Set a global typography parameter. Returns the clamped value.
    pub fn set_typography(&mut self, param: TypographyParam, value: f64) -> f64 {
        self.typography.set(param, value)
    }

    /// Restore global typography defaults.
    pub fn reset_typography(&mut self) {
        self.typography = self.config.typography;
    }

    /// Replace the sample text.
    pub fn set_sample_text(&mut self, text: impl Into<String>) {
        self.sample_text = text.into();
    }

    /// Attach a render surface to an active font.
    pub fn register_surface(&mut self, font: FontId, surface: SurfaceId) -> Result<()> {
        self.entry(font)?;
        if let Some(old) = self.registry.register(font, surface.clone()) {
            self.binder.forget_surface(&old);
        }
        self.binder.forget_surface(&surface);
        Ok(())
    }

    /// Detach a font's render surface.
    pub fn unregister_surface(&mut self, font: FontId) {
        self.detach_surface(font);
    }

    /// Surface attached to a font.
    #[inline]
    pub fn surface_for(&self, font: FontId) -> Option<&SurfaceId> {
        self.registry.surface_for(font)
    }

    /// Compute the style writes needed to bring every surface up to date.
    pub fn render_pass(&mut self) -> Vec<StyleWrite> {
        let fonts: Vec<&FontEntry> = self.active.iter().filter_map(|id| self.catalog.get(id)).collect();
        let mut writes = self.binder.render_pass(
            &fonts,
            &self.controls,
            &self.store,
            self.config.value_scope,
            &self.registry,
        );
        for font in &fonts {
            if let Some(surface) = self.registry.surface_for(font.id) {
                let family = self.loads.family(font.id).css(&self.config.fallback_family);
                self.binder
                    .write(StyleTarget::Surface(surface.clone()), FONT_FAMILY, family, &mut writes);
            }
        }
        self.typography.bind(&mut self.binder, &mut writes);
        writes
    }

    /// The whole control panel.
    pub fn panel(&self) -> Vec<ControlView> {
        self.controls.iter().map(|c| self.control_view(c)).collect()
    }

    /// Library rows in catalog order.
    pub fn library(&self) -> Vec<LibraryItem> {
        self.catalog
            .iter()
            .map(|f| LibraryItem {
                font: f.id,
                name: f.display_name.clone(),
                active: self.active.contains(f.id),
            })
            .collect()
    }

    /// View model of the display area.
    pub fn canvas(&self) -> CanvasView {
        if self.active.is_empty() {
            return CanvasView::Empty;
        }
        let cards = self
            .active
            .iter()
            .filter_map(|id| self.catalog.get(id))
            .map(|font| self.card_view(font))
            .collect();
        CanvasView::Cards(cards)
    }

    fn card_view(&self, font: &FontEntry) -> CardView {
        let axes = match &font.axes {
            None => AxisStatus::Loading,
            Some(axes) if axes.is_empty() => AxisStatus::Static,
            Some(axes) => AxisStatus::Variable(
                axes.iter()
                    .filter_map(|axis| {
                        let key = ValueKey::for_scope(self.config.value_scope, font.id, axis.tag);
                        self.controls.iter().find(|c| c.key == key)
                    })
                    .map(|c| self.control_view(c))
                    .collect(),
            ),
        };
        CardView {
            font: font.id,
            surface: self
                .registry
                .surface_for(font.id)
                .cloned()
                .unwrap_or_else(|| SurfaceId::for_font(font.id)),
            name: font.display_name.clone(),
            badge: font.badge_label.clone(),
            download_url: font.download_url.clone(),
            family: self.loads.family(font.id).css(&self.config.fallback_family),
            text: self.sample_text.clone(),
            axes,
        }
    }

    fn control_view(&self, control: &Control) -> ControlView {
        let value = self.store.get(control.key).unwrap_or(control.default);
        ControlView {
            key: control.key,
            tag: control.tag(),
            name: control.name.clone(),
            min: control.min,
            max: control.max,
            step: control.step,
            value,
            label: control.label(value),
            animating: self.scheduler.is_animating(control.key),
        }
    }

    fn detach_surface(&mut self, font: FontId) {
        if let Some(surface) = self.registry.unregister(font) {
            self.binder.forget_surface(&surface);
        }
    }

    /// Rebuild controls from the active fonts and align store and
    /// oscillators with them.
    fn refresh_controls(&mut self) {
        let fonts: Vec<&FontEntry> = self.active.iter().filter_map(|id| self.catalog.get(id)).collect();
        self.controls = match self.config.value_scope {
            ValueScope::Shared => reconcile(fonts.iter().copied())
                .iter()
                .map(Control::from_reconciled)
                .collect(),
            ValueScope::PerFont => fonts
                .iter()
                .flat_map(|f| f.resolved_axes().iter().map(move |a| Control::from_font_axis(f.id, a)))
                .collect(),
        };
        self.store.sync(&self.controls);

        let controls = &self.controls;
        self.scheduler.retain(|osc| controls.iter().any(|c| c.key == osc.key));
        for control in controls {
            self.scheduler.set_bounds(control.key, control.min, control.max);
        }
        debug!("Rebuilt {} controls for {} active fonts", self.controls.len(), self.active.len());
    }
}

/// Display name for an uploaded file: extension stripped, shortened to
/// `max_len` characters.
pub fn local_display_name(file_name: &str, max_len: usize) -> String {
    let stem = match file_name.rfind('.') {
        Some(dot) if dot > 0 => &file_name[..dot],
        _ => file_name,
    };
    stem.chars().take(max_len).collect()
}

/// Browser glue: DOM style application, async loads and the frame loop.
#[cfg(feature = "web")]
pub mod web {
    use std::cell::{Ref, RefCell};
    use std::rc::Rc;

    use log::warn;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen::JsCast;
    use web_sys::{Document, HtmlElement, HtmlInputElement};

    use super::*;
    use crate::loader::load_font;
    use crate::loader::web::BrowserFontProvider;
    use crate::render::web::apply_writes;

    /// A controller wired to a document.
    ///
    /// Slider inputs are looked up by [`ValueKey::element_id`] and their
    /// labels by the same id with a `-value` suffix.
    pub struct WebPreview {
        controller: RefCell<PreviewController>,
        document: Document,
        container: HtmlElement,
    }

    impl WebPreview {
        /// Create a preview bound to `container`.
        pub fn new(config: PreviewConfig, document: Document, container: HtmlElement) -> Result<Rc<Self>> {
            Ok(Rc::new(Self {
                controller: RefCell::new(PreviewController::new(config)?),
                document,
                container,
            }))
        }

        /// Read access to the controller.
        pub fn controller(&self) -> Ref<'_, PreviewController> {
            self.controller.borrow()
        }

        /// Start loading initially active fonts and paint.
        pub fn start(self: &Rc<Self>) -> std::result::Result<(), String> {
            let requests = self.controller.borrow_mut().pending_loads();
            for request in requests {
                self.spawn_load(request);
            }
            self.repaint()
        }

        /// Register surfaces for active fonts and apply pending style writes.
        pub fn repaint(&self) -> std::result::Result<(), String> {
            let writes = {
                let mut controller = self.controller.borrow_mut();
                let missing: Vec<FontId> = controller
                    .active_fonts()
                    .filter(|&f| controller.surface_for(f).is_none())
                    .collect();
                for font in missing {
                    controller
                        .register_surface(font, SurfaceId::for_font(font))
                        .map_err(|e| e.to_string())?;
                }
                controller.render_pass()
            };
            apply_writes(&self.document, &self.container, &writes)
        }

        /// Toggle a font in the library.
        pub fn toggle_font(self: &Rc<Self>, font: FontId) -> std::result::Result<(), String> {
            let request = self.controller.borrow_mut().toggle(font).map_err(|e| e.to_string())?;
            if let Some(request) = request {
                self.spawn_load(request);
            }
            self.repaint()
        }

        /// Add an uploaded font.
        pub fn upload(self: &Rc<Self>, file_name: &str, data: Vec<u8>) -> std::result::Result<FontId, String> {
            let (font, request) = self
                .controller
                .borrow_mut()
                .add_local_font(file_name, data)
                .map_err(|e| e.to_string())?;
            if let Some(request) = request {
                self.spawn_load(request);
            }
            self.repaint()?;
            Ok(font)
        }

        /// Handle slider input.
        pub fn set_value(&self, key: ValueKey, value: f64) -> std::result::Result<(), String> {
            let refresh = {
                let mut controller = self.controller.borrow_mut();
                let value = controller.set_value(key, value).map_err(|e| e.to_string())?;
                let label = controller
                    .controls()
                    .iter()
                    .find(|c| c.key == key)
                    .map(|c| c.label(value))
                    .unwrap_or_default();
                ControlRefresh { key, value, label }
            };
            self.apply_refreshes(&[refresh]);
            self.repaint()
        }

        /// Handle a play/pause button.
        pub fn toggle_animation(self: &Rc<Self>, key: ValueKey) -> std::result::Result<(), String> {
            let toggle = self
                .controller
                .borrow_mut()
                .toggle_animation(key)
                .map_err(|e| e.to_string())?;
            if toggle == AnimationToggle::Started(Schedule::RequestFrame) {
                self.request_frame()?;
            }
            Ok(())
        }

        fn spawn_load(self: &Rc<Self>, request: LoadRequest) {
            let this = Rc::clone(self);
            let resolver = self.controller.borrow().resolver().clone();
            wasm_bindgen_futures::spawn_local(async move {
                let loaded = load_font(&BrowserFontProvider, &resolver, request).await;
                let applied = this.controller.borrow_mut().complete_load(loaded);
                if applied {
                    if let Err(e) = this.repaint() {
                        warn!("Repaint after load failed: {e}");
                    }
                }
            });
        }

        fn request_frame(self: &Rc<Self>) -> std::result::Result<(), String> {
            let requested = web_sys::window().ok_or("No window available").and_then(|window| {
                let this = Rc::clone(self);
                let callback = Closure::once_into_js(move |_timestamp: f64| this.on_frame());
                window
                    .request_animation_frame(callback.unchecked_ref())
                    .map(|_| ())
                    .map_err(|_| "Failed to request animation frame")
            });
            if let Err(e) = requested {
                self.controller.borrow_mut().abandon_frame();
                return Err(e.to_string());
            }
            Ok(())
        }

        fn on_frame(self: &Rc<Self>) {
            let Some(frame) = self.controller.borrow_mut().tick() else {
                return;
            };
            if let Err(e) = apply_writes(&self.document, &self.container, &frame.writes) {
                warn!("Frame style update failed: {e}");
            }
            self.apply_refreshes(&frame.refreshes);
            if frame.schedule == Schedule::RequestFrame {
                if let Err(e) = self.request_frame() {
                    warn!("Animation loop interrupted: {e}");
                }
            }
        }

        fn apply_refreshes(&self, refreshes: &[ControlRefresh]) {
            for refresh in refreshes {
                let id = refresh.key.element_id();
                if let Some(input) = self
                    .document
                    .get_element_by_id(&id)
                    .and_then(|e| e.dyn_into::<HtmlInputElement>().ok())
                {
                    input.set_value(&refresh.value.to_string());
                }
                if let Some(label) = self.document.get_element_by_id(&format!("{id}-value")) {
                    label.set_text_content(Some(&refresh.label));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{ParseError, RawAxis};
    use crate::{Deactivation, PresetFont, SchedulerState, SelectionMode};

    /// Parser returning axes encoded in the "font" bytes as `tag:min:max:default;...`.
    struct TextParser;

    impl FontParser for TextParser {
        fn parse_axes(&self, data: &[u8], _languages: &[String]) -> std::result::Result<Vec<RawAxis>, ParseError> {
            let text = std::str::from_utf8(data).map_err(|e| ParseError::Malformed(e.to_string()))?;
            if text == "static" {
                return Ok(vec![]);
            }
            text.split(';')
                .map(|record| {
                    let parts: Vec<&str> = record.split(':').collect();
                    let num = |i: usize| parts.get(i).and_then(|p| p.parse::<f64>().ok());
                    match (AxisTag::parse(parts[0]), num(1), num(2), num(3)) {
                        (Some(tag), Some(min), Some(max), Some(default)) => Ok(RawAxis {
                            tag,
                            min,
                            max,
                            default,
                            name: None,
                        }),
                        _ => Err(ParseError::Malformed(record.to_string())),
                    }
                })
                .collect()
        }
    }

    fn loaded(font: FontId, axes: Vec<crate::AxisDescriptor>) -> LoadedFont {
        LoadedFont {
            font,
            axes: Some(axes),
            family: Some(RenderFamily::Loaded(crate::loader::family_name(font))),
        }
    }

    fn controller(scope: ValueScope, mode: SelectionMode) -> PreviewController<TextParser> {
        let config = PreviewConfig {
            value_scope: scope,
            selection_mode: mode,
            ..Default::default()
        };
        PreviewController::with_parser(config, TextParser).unwrap()
    }

    #[test]
    fn test_local_display_name() {
        assert_eq!(local_display_name("Roboto-Flex.ttf", 24), "Roboto-Flex");
        assert_eq!(local_display_name(".hidden", 24), ".hidden");
        assert_eq!(local_display_name("noext", 24), "noext");
        assert_eq!(local_display_name("ABCDEFGHIJKLMNOPQRSTUVWXYZ.otf", 24), "ABCDEFGHIJKLMNOPQRSTUVWX");
    }

    #[test]
    fn test_upload_resolves_and_activates() {
        let mut c = controller(ValueScope::Shared, SelectionMode::MultiSelectAllowEmpty);
        let (font, request) = c.add_local_font("A.ttf", b"wght:100:700:300".to_vec()).unwrap();

        assert!(c.is_active(font));
        // Axes came from the upload; only registration remains
        let request = request.unwrap();
        assert!(!request.resolve_axes && request.register);
        assert_eq!(c.catalog().get(font).unwrap().badge_label.as_deref(), Some("Local"));
        assert_eq!(c.value(ValueKey::shared(AxisTag::WEIGHT)), Some(300.0));
    }

    #[test]
    fn test_unparseable_upload_is_static() {
        let mut c = controller(ValueScope::Shared, SelectionMode::MultiSelectAllowEmpty);
        let (font, _) = c.add_local_font("junk.ttf", b"garbage".to_vec()).unwrap();
        let CanvasView::Cards(cards) = c.canvas() else {
            panic!("expected cards");
        };
        assert_eq!(cards[0].font, font);
        assert_eq!(cards[0].axes, AxisStatus::Static);
        assert!(c.controls().is_empty());
    }

    #[test]
    fn test_single_select_upload_replaces() {
        let mut c = controller(ValueScope::PerFont, SelectionMode::SingleSelect);
        let (a, _) = c.add_local_font("A.ttf", b"wght:100:900:400".to_vec()).unwrap();
        let (b, _) = c.add_local_font("B.ttf", b"wdth:75:125:100".to_vec()).unwrap();

        assert!(!c.is_active(a));
        assert!(c.is_active(b));
        assert_eq!(c.controls().len(), 1);
        assert_eq!(c.controls()[0].key, ValueKey::font(b, AxisTag::WIDTH));
    }

    #[test]
    fn test_min_one_refuses_last() {
        let mut c = controller(ValueScope::Shared, SelectionMode::MultiSelectMinOne);
        let (a, _) = c.add_local_font("A.ttf", b"wght:100:900:400".to_vec()).unwrap();
        assert_eq!(c.deactivate(a).unwrap(), Deactivation::Refused);
        assert!(c.is_active(a));
    }

    #[test]
    fn test_unknown_font() {
        let mut c = controller(ValueScope::Shared, SelectionMode::MultiSelectAllowEmpty);
        assert!(matches!(c.activate(FontId(9)), Err(Error::UnknownFont(FontId(9)))));
    }

    #[test]
    fn test_stale_load_is_noop() {
        let config = PreviewConfig {
            presets: vec![PresetFont {
                name: "Remote".into(),
                url: "r.ttf".into(),
                badge: None,
                download_url: None,
            }],
            value_scope: ValueScope::Shared,
            ..Default::default()
        };
        let mut c = PreviewController::with_parser(config, TextParser).unwrap();
        let font = FontId(0);
        let request = c.activate(font).unwrap().unwrap();
        assert!(request.resolve_axes);
        c.deactivate(font).unwrap();

        let axes = c.resolver().resolve_bytes(b"wght:100:900:400");
        assert!(!c.complete_load(loaded(font, axes)));
        assert!(c.controls().is_empty());
        // Axes are memoized, so reactivating needs no fetch
        assert!(c.catalog().get(font).unwrap().is_resolved());
        assert!(c.activate(font).unwrap().is_none());
        assert_eq!(c.controls().len(), 1);
    }

    #[test]
    fn test_animation_requires_control() {
        let mut c = controller(ValueScope::Shared, SelectionMode::MultiSelectAllowEmpty);
        c.add_local_font("S.ttf", b"static".to_vec()).unwrap();
        let key = ValueKey::shared(AxisTag::WEIGHT);
        assert!(matches!(c.toggle_animation(key), Err(Error::UnknownControl(_))));
        assert!(c.tick().is_none());
    }

    #[test]
    fn test_tick_batches_one_pass() {
        let mut c = controller(ValueScope::Shared, SelectionMode::MultiSelectAllowEmpty);
        let (font, _) = c.add_local_font("A.ttf", b"wght:100:700:300;wdth:75:125:100".to_vec()).unwrap();
        c.register_surface(font, SurfaceId::for_font(font)).unwrap();
        c.render_pass();

        let wght = ValueKey::shared(AxisTag::WEIGHT);
        let wdth = ValueKey::shared(AxisTag::WIDTH);
        assert_eq!(c.toggle_animation(wght).unwrap(), AnimationToggle::Started(Schedule::RequestFrame));
        assert_eq!(c.toggle_animation(wdth).unwrap(), AnimationToggle::Started(Schedule::Idle));

        let frame = c.tick().unwrap();
        assert_eq!(frame.refreshes.len(), 2);
        assert_eq!(frame.schedule, Schedule::RequestFrame);
        let variation: Vec<_> = frame
            .writes
            .iter()
            .filter(|w| w.property == crate::FONT_VARIATION_SETTINGS)
            .collect();
        assert_eq!(variation.len(), 1);
        assert!(variation[0].value.starts_with("'wght' 302.5, 'wdth' 100.208"));
    }

    #[test]
    fn test_toggle_off_keeps_value() {
        let mut c = controller(ValueScope::Shared, SelectionMode::MultiSelectAllowEmpty);
        c.add_local_font("A.ttf", b"wght:100:700:300".to_vec()).unwrap();
        let key = ValueKey::shared(AxisTag::WEIGHT);

        c.toggle_animation(key).unwrap();
        for _ in 0..10 {
            c.tick();
        }
        let at_stop = c.value(key).unwrap();
        assert_eq!(c.toggle_animation(key).unwrap(), AnimationToggle::Stopped { value: at_stop });

        assert!(c.tick().is_none());
        assert_eq!(c.value(key), Some(at_stop));
        assert_eq!(c.scheduler().state(), SchedulerState::Stopped);
    }

    #[test]
    fn test_deactivate_drops_oscillators() {
        let mut c = controller(ValueScope::PerFont, SelectionMode::MultiSelectAllowEmpty);
        let (font, _) = c.add_local_font("A.ttf", b"wght:100:700:300".to_vec()).unwrap();
        let key = ValueKey::font(font, AxisTag::WEIGHT);
        c.toggle_animation(key).unwrap();
        c.deactivate(font).unwrap();

        assert!(!c.is_animating(key));
        assert!(c.tick().is_none());
        assert_eq!(c.canvas(), CanvasView::Empty);
    }

    #[test]
    fn test_non_finite_input_rejected() {
        let mut c = controller(ValueScope::Shared, SelectionMode::MultiSelectAllowEmpty);
        let (font, _) = c.add_local_font("A.ttf", b"wght:100:700:300".to_vec()).unwrap();
        c.register_surface(font, SurfaceId::for_font(font)).unwrap();
        c.render_pass();
        let key = ValueKey::shared(AxisTag::WEIGHT);
        c.toggle_animation(key).unwrap();

        assert!(matches!(c.set_value(key, f64::NAN), Err(Error::InvalidValue { .. })));
        assert!(c.set_value(key, f64::INFINITY).is_err());
        assert_eq!(c.value(key), Some(300.0));

        for _ in 0..500 {
            let frame = c.tick().unwrap();
            assert!(frame.writes.iter().all(|w| !w.value.contains("NaN")));
        }
        let value = c.value(key).unwrap();
        assert!((100.0..=700.0).contains(&value));
    }

    #[test]
    fn test_abandoned_frame_restarts_animation() {
        let mut c = controller(ValueScope::Shared, SelectionMode::MultiSelectAllowEmpty);
        c.add_local_font("A.ttf", b"wght:100:700:300".to_vec()).unwrap();
        let key = ValueKey::shared(AxisTag::WEIGHT);

        assert_eq!(c.toggle_animation(key).unwrap(), AnimationToggle::Started(Schedule::RequestFrame));
        c.abandon_frame();
        assert_eq!(c.toggle_animation(key).unwrap(), AnimationToggle::Stopped { value: 300.0 });
        assert_eq!(c.toggle_animation(key).unwrap(), AnimationToggle::Started(Schedule::RequestFrame));
    }

    #[test]
    fn test_reset_axes() {
        let mut c = controller(ValueScope::Shared, SelectionMode::MultiSelectAllowEmpty);
        c.add_local_font("A.ttf", b"wght:100:700:300".to_vec()).unwrap();
        let key = ValueKey::shared(AxisTag::WEIGHT);
        c.set_value(key, 650.0).unwrap();
        c.toggle_animation(key).unwrap();

        let refreshes = c.reset_axes();
        assert_eq!(refreshes.len(), 1);
        assert_eq!(refreshes[0].label, "300");
        assert!(!c.is_animating(key));
        assert_eq!(c.value(key), Some(300.0));
    }

    #[test]
    fn test_set_value_clamps_and_rejects_unknown() {
        let mut c = controller(ValueScope::Shared, SelectionMode::MultiSelectAllowEmpty);
        c.add_local_font("A.ttf", b"wght:100:700:300".to_vec()).unwrap();
        assert_eq!(c.set_value(ValueKey::shared(AxisTag::WEIGHT), 9000.0).unwrap(), 700.0);
        assert!(c.set_value(ValueKey::shared(AxisTag::SLANT), 1.0).is_err());
    }

    #[test]
    fn test_typography_and_text() {
        let mut c = controller(ValueScope::Shared, SelectionMode::MultiSelectAllowEmpty);
        // No surfaces yet, so only typography is written
        assert_eq!(c.render_pass().len(), 3);
        assert_eq!(c.set_typography(TypographyParam::Size, 5.0), 12.0);
        let writes = c.render_pass();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].value, "12px");

        c.reset_typography();
        assert_eq!(c.typography().size, 72.0);

        c.set_sample_text("Hello");
        c.add_local_font("A.ttf", b"wght:100:700:300".to_vec()).unwrap();
        let CanvasView::Cards(cards) = c.canvas() else {
            panic!("expected cards");
        };
        assert_eq!(cards[0].text, "Hello");
    }
}
