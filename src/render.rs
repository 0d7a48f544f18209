//! Projecting axis values into font-variation style declarations.

use std::collections::HashMap;
use std::fmt::Write as _;

use indexmap::IndexMap;

use crate::{AxisTag, Control, FontEntry, FontId, ValueScope, ValueStore};

/// CSS property carrying per-surface variation settings.
pub const FONT_VARIATION_SETTINGS: &str = "font-variation-settings";

/// Default container custom property for the shared declaration.
pub const DEFAULT_AXES_PROPERTY: &str = "--vf-axes";

/// How values reach the render surfaces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BindingStrategy {
    /// One expression on the container, inherited by every surface
    SharedDeclaration,
    /// One expression per surface, built from that font's own axes
    #[default]
    PerSurface,
}

/// Identifier of a render surface in the presentation layer.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub String);

impl SurfaceId {
    /// Conventional surface id for a font card.
    pub fn for_font(font: FontId) -> Self {
        Self(format!("font-card-{font}"))
    }
}

/// Element a style write goes to.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum StyleTarget {
    /// The element containing every card
    Container,
    /// One card's text surface
    Surface(SurfaceId),
}

/// A single style property assignment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StyleWrite {
    pub target: StyleTarget,
    pub property: String,
    pub value: String,
}

/// Format `(tag, value)` pairs as a variation expression.
///
/// ```rust
/// use vfaxis_core_view::{AxisTag, render::variation_expression};
///
/// let expr = variation_expression([(AxisTag::WEIGHT, 400.0), (AxisTag::WIDTH, 87.5)]);
/// assert_eq!(expr, "'wght' 400, 'wdth' 87.5");
/// ```
pub fn variation_expression<I>(pairs: I) -> String
where
    I: IntoIterator<Item = (AxisTag, f64)>,
{
    let mut out = String::new();
    for (i, (tag, value)) in pairs.into_iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        let _ = write!(out, "'{tag}' {value}");
    }
    out
}

/// Variation expression for one font's surface.
///
/// Reads every tag the font declares, in declared order. Returns `None`
/// for unresolved and static fonts.
pub fn bind_surface(font: &FontEntry, store: &ValueStore, scope: ValueScope) -> Option<String> {
    if !font.is_variable() {
        return None;
    }
    let pairs = font.resolved_axes().iter().map(|axis| {
        let value = store
            .value_for(scope, font.id, axis.tag)
            .unwrap_or(axis.default);
        (axis.tag, value)
    });
    Some(variation_expression(pairs))
}

/// Maps fonts to the surfaces that display them.
///
/// Surfaces are looked up by key at update time; nothing holds on to a
/// presentation handle.
#[derive(Clone, Debug, Default)]
pub struct SurfaceRegistry {
    surfaces: IndexMap<FontId, SurfaceId>,
}

impl SurfaceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a surface to a font, replacing any previous one.
    pub fn register(&mut self, font: FontId, surface: SurfaceId) -> Option<SurfaceId> {
        self.surfaces.insert(font, surface)
    }

    /// Detach a font's surface.
    pub fn unregister(&mut self, font: FontId) -> Option<SurfaceId> {
        self.surfaces.shift_remove(&font)
    }

    /// Surface displaying `font`.
    #[inline]
    pub fn surface_for(&self, font: FontId) -> Option<&SurfaceId> {
        self.surfaces.get(&font)
    }

    /// Font displayed by `surface`.
    pub fn font_for(&self, surface: &SurfaceId) -> Option<FontId> {
        self.surfaces
            .iter()
            .find_map(|(font, s)| (s == surface).then_some(*font))
    }

    /// Iterate registrations.
    pub fn iter(&self) -> impl Iterator<Item = (FontId, &SurfaceId)> {
        self.surfaces.iter().map(|(f, s)| (*f, s))
    }
}

/// Produces the minimal set of style writes for the current values.
///
/// The binder remembers what it last wrote to each target/property and
/// only emits writes whose value changed.
#[derive(Clone, Debug)]
pub struct RenderBinder {
    strategy: BindingStrategy,
    axes_property: String,
    written: HashMap<(StyleTarget, String), String>,
}

impl RenderBinder {
    /// Create a binder writing the shared declaration to `axes_property`.
    pub fn new(strategy: BindingStrategy, axes_property: impl Into<String>) -> Self {
        Self {
            strategy,
            axes_property: axes_property.into(),
            written: HashMap::new(),
        }
    }

    /// The configured strategy.
    #[inline]
    pub fn strategy(&self) -> BindingStrategy {
        self.strategy
    }

    /// Queue a write unless the target already has this value.
    pub fn write(&mut self, target: StyleTarget, property: &str, value: String, out: &mut Vec<StyleWrite>) {
        let slot = (target, property.to_string());
        if self.written.get(&slot) == Some(&value) {
            return;
        }
        out.push(StyleWrite {
            target: slot.0.clone(),
            property: slot.1.clone(),
            value: value.clone(),
        });
        self.written.insert(slot, value);
    }

    /// Forget everything written to a surface, e.g. after it was rebuilt.
    pub fn forget_surface(&mut self, surface: &SurfaceId) {
        self.written
            .retain(|(target, _), _| !matches!(target, StyleTarget::Surface(s) if s == surface));
    }

    /// Forget all writes so the next pass repaints everything.
    pub fn invalidate(&mut self) {
        self.written.clear();
    }

    /// One binding pass over the active fonts.
    ///
    /// `fonts` are the active fonts in display order and `controls` the
    /// current control set. Surfaces without a registration are skipped.
    pub fn render_pass(
        &mut self,
        fonts: &[&FontEntry],
        controls: &[Control],
        store: &ValueStore,
        scope: ValueScope,
        registry: &SurfaceRegistry,
    ) -> Vec<StyleWrite> {
        let mut out = Vec::new();
        match self.strategy {
            BindingStrategy::SharedDeclaration => {
                let expr = if controls.is_empty() {
                    "normal".to_string()
                } else {
                    variation_expression(controls.iter().map(|c| {
                        (c.tag(), store.get(c.key).unwrap_or(c.default))
                    }))
                };
                let property = self.axes_property.clone();
                self.write(StyleTarget::Container, &property, expr, &mut out);

                let inherit = format!("var({property})");
                for font in fonts.iter().filter(|f| f.is_variable()) {
                    if let Some(surface) = registry.surface_for(font.id) {
                        let target = StyleTarget::Surface(surface.clone());
                        self.write(target, FONT_VARIATION_SETTINGS, inherit.clone(), &mut out);
                    }
                }
            }
            BindingStrategy::PerSurface => {
                for font in fonts {
                    let Some(surface) = registry.surface_for(font.id) else {
                        continue;
                    };
                    if let Some(expr) = bind_surface(font, store, scope) {
                        let target = StyleTarget::Surface(surface.clone());
                        self.write(target, FONT_VARIATION_SETTINGS, expr, &mut out);
                    }
                }
            }
        }
        out
    }
}

impl Default for RenderBinder {
    fn default() -> Self {
        Self::new(BindingStrategy::default(), DEFAULT_AXES_PROPERTY)
    }
}

/// Web-specific style application.
#[cfg(feature = "web")]
pub mod web {
    use super::*;
    use wasm_bindgen::JsCast;
    use web_sys::{Document, HtmlElement};

    /// Apply style writes to the DOM.
    ///
    /// Surface targets are looked up by element id. Missing surfaces are
    /// skipped; they are painted when they are registered again.
    ///
    /// ## Example
    ///
    /// ```rust,ignore
    /// let writes = controller.render_pass();
    /// apply_writes(&document, &canvas_area, &writes)?;
    /// ```
    pub fn apply_writes(document: &Document, container: &HtmlElement, writes: &[StyleWrite]) -> Result<(), String> {
        for write in writes {
            let element = match &write.target {
                StyleTarget::Container => container.clone(),
                StyleTarget::Surface(SurfaceId(id)) => {
                    let Some(element) = document.get_element_by_id(id) else {
                        log::debug!("Surface '{id}' not in document, skipping");
                        continue;
                    };
                    element
                        .dyn_into::<HtmlElement>()
                        .map_err(|_| format!("Surface '{id}' is not an HtmlElement"))?
                }
            };
            element
                .style()
                .set_property(&write.property, &write.value)
                .map_err(|_| format!("Failed to set {} on {:?}", write.property, write.target))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::reconcile;
    use crate::{AxisDescriptor, FontCatalog, FontSource, ValueKey};

    fn axis(tag: AxisTag, min: f64, max: f64, default: f64) -> AxisDescriptor {
        AxisDescriptor {
            tag,
            name: tag.to_string(),
            min,
            max,
            default,
            step: 1.0,
        }
    }

    fn catalog() -> FontCatalog {
        let mut catalog = FontCatalog::new();
        catalog.push(
            "A".into(),
            FontSource::Remote { url: "a.ttf".into() },
            None,
            None,
            Some(vec![
                axis(AxisTag::WEIGHT, 100.0, 700.0, 300.0),
                axis(AxisTag::WIDTH, 75.0, 125.0, 100.0),
            ]),
        );
        catalog.push("B".into(), FontSource::Remote { url: "b.ttf".into() }, None, None, Some(vec![]));
        catalog.push("C".into(), FontSource::Remote { url: "c.ttf".into() }, None, None, None);
        catalog
    }

    fn registry(catalog: &FontCatalog) -> SurfaceRegistry {
        let mut registry = SurfaceRegistry::new();
        for font in catalog.iter() {
            registry.register(font.id, SurfaceId::for_font(font.id));
        }
        registry
    }

    fn per_font_controls(catalog: &FontCatalog) -> Vec<Control> {
        catalog
            .iter()
            .flat_map(|f| f.resolved_axes().iter().map(move |a| Control::from_font_axis(f.id, a)))
            .collect()
    }

    #[test]
    fn test_bind_surface_declared_order() {
        let catalog = catalog();
        let mut store = ValueStore::new();
        store.sync(&per_font_controls(&catalog));
        store.set_value(ValueKey::font(FontId(0), AxisTag::WIDTH), 87.5);

        let a = catalog.get(FontId(0)).unwrap();
        assert_eq!(
            bind_surface(a, &store, ValueScope::PerFont).as_deref(),
            Some("'wght' 300, 'wdth' 87.5")
        );
    }

    #[test]
    fn test_static_and_unresolved_produce_nothing() {
        let catalog = catalog();
        let store = ValueStore::new();
        assert!(bind_surface(catalog.get(FontId(1)).unwrap(), &store, ValueScope::Shared).is_none());
        assert!(bind_surface(catalog.get(FontId(2)).unwrap(), &store, ValueScope::Shared).is_none());
    }

    #[test]
    fn test_per_surface_minimal_writes() {
        let catalog = catalog();
        let registry = registry(&catalog);
        let controls = per_font_controls(&catalog);
        let mut store = ValueStore::new();
        store.sync(&controls);
        let fonts: Vec<&FontEntry> = catalog.iter().collect();
        let mut binder = RenderBinder::new(BindingStrategy::PerSurface, DEFAULT_AXES_PROPERTY);

        let first = binder.render_pass(&fonts, &controls, &store, ValueScope::PerFont, &registry);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].target, StyleTarget::Surface(SurfaceId::for_font(FontId(0))));
        assert_eq!(first[0].property, FONT_VARIATION_SETTINGS);

        let unchanged = binder.render_pass(&fonts, &controls, &store, ValueScope::PerFont, &registry);
        assert!(unchanged.is_empty());

        store.set_value(ValueKey::font(FontId(0), AxisTag::WEIGHT), 500.0);
        let changed = binder.render_pass(&fonts, &controls, &store, ValueScope::PerFont, &registry);
        assert_eq!(changed.len(), 1);
        assert_eq!(changed[0].value, "'wght' 500, 'wdth' 100");
    }

    #[test]
    fn test_shared_declaration_single_write() {
        let catalog = catalog();
        let registry = registry(&catalog);
        let controls: Vec<Control> = reconcile(catalog.iter()).iter().map(Control::from_reconciled).collect();
        let mut store = ValueStore::new();
        store.sync(&controls);
        let fonts: Vec<&FontEntry> = catalog.iter().collect();
        let mut binder = RenderBinder::new(BindingStrategy::SharedDeclaration, "--axes");

        let first = binder.render_pass(&fonts, &controls, &store, ValueScope::Shared, &registry);
        // Container expression plus one inherit declaration for the variable font
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].target, StyleTarget::Container);
        assert_eq!(first[0].property, "--axes");
        assert_eq!(first[0].value, "'wght' 300, 'wdth' 100");
        assert_eq!(first[1].value, "var(--axes)");

        store.set_value(ValueKey::shared(AxisTag::WEIGHT), 650.0);
        let next = binder.render_pass(&fonts, &controls, &store, ValueScope::Shared, &registry);
        assert_eq!(next.len(), 1);
        assert_eq!(next[0].target, StyleTarget::Container);
    }

    #[test]
    fn test_unregistered_surface_skipped() {
        let catalog = catalog();
        let controls = per_font_controls(&catalog);
        let mut store = ValueStore::new();
        store.sync(&controls);
        let fonts: Vec<&FontEntry> = catalog.iter().collect();
        let mut binder = RenderBinder::default();

        let writes = binder.render_pass(&fonts, &controls, &store, ValueScope::PerFont, &SurfaceRegistry::new());
        assert!(writes.is_empty());
    }

    #[test]
    fn test_forget_surface_repaints() {
        let catalog = catalog();
        let registry = registry(&catalog);
        let controls = per_font_controls(&catalog);
        let mut store = ValueStore::new();
        store.sync(&controls);
        let fonts: Vec<&FontEntry> = catalog.iter().collect();
        let mut binder = RenderBinder::default();

        binder.render_pass(&fonts, &controls, &store, ValueScope::PerFont, &registry);
        binder.forget_surface(&SurfaceId::for_font(FontId(0)));
        let writes = binder.render_pass(&fonts, &controls, &store, ValueScope::PerFont, &registry);
        assert_eq!(writes.len(), 1);
    }

    #[test]
    fn test_registry_lookup() {
        let mut registry = SurfaceRegistry::new();
        registry.register(FontId(3), SurfaceId("card".into()));
        assert_eq!(registry.font_for(&SurfaceId("card".into())), Some(FontId(3)));
        assert_eq!(registry.unregister(FontId(3)), Some(SurfaceId("card".into())));
        assert!(registry.surface_for(FontId(3)).is_none());
    }
}
