//! Merging per-font axes into one control per tag.

use indexmap::IndexMap;

use crate::{AxisDescriptor, AxisTag, FontEntry};

/// One control covering every active font that exposes `tag`.
#[derive(Clone, Debug, PartialEq)]
pub struct ReconciledAxis {
    pub tag: AxisTag,
    /// Name of the first font exposing the tag
    pub name: String,
    /// Smallest `min` across fonts
    pub min: f64,
    /// Largest `max` across fonts
    pub max: f64,
    /// Step of the first font exposing the tag
    pub step: f64,
    /// Default of the first font exposing the tag
    pub default: f64,
}

impl ReconciledAxis {
    fn seed(axis: &AxisDescriptor) -> Self {
        Self {
            tag: axis.tag,
            name: axis.name.clone(),
            min: axis.min,
            max: axis.max,
            step: axis.step,
            default: axis.default,
        }
    }

    fn widen(&mut self, axis: &AxisDescriptor) {
        self.min = self.min.min(axis.min);
        self.max = self.max.max(axis.max);
    }
}

/// Merge the resolved axes of `fonts` into one control per tag.
///
/// Controls are ordered by first appearance, walking fonts in the given
/// order. Unresolved fonts contribute nothing. Fonts are never modified.
///
/// ```rust
/// use vfaxis_core_view::{reconcile, AxisDescriptor, AxisTag, FontCatalog, FontSource};
///
/// let wght = |min: f64, max: f64| AxisDescriptor {
///     tag: AxisTag::WEIGHT, name: "Weight".into(), min, max, default: 400.0, step: 1.0,
/// };
/// let mut catalog = FontCatalog::new();
/// let a = catalog.push("A".into(), FontSource::Remote { url: "a".into() }, None, None, Some(vec![wght(100.0, 700.0)]));
/// let b = catalog.push("B".into(), FontSource::Remote { url: "b".into() }, None, None, Some(vec![wght(200.0, 900.0)]));
///
/// let controls = reconcile([catalog.get(a).unwrap(), catalog.get(b).unwrap()]);
/// assert_eq!(controls.len(), 1);
/// assert_eq!((controls[0].min, controls[0].max), (100.0, 900.0));
/// ```
pub fn reconcile<'a, I>(fonts: I) -> Vec<ReconciledAxis>
where
    I: IntoIterator<Item = &'a FontEntry>,
{
    let mut merged: IndexMap<AxisTag, ReconciledAxis> = IndexMap::new();
    for font in fonts {
        for axis in font.resolved_axes() {
            merged
                .entry(axis.tag)
                .and_modify(|control| control.widen(axis))
                .or_insert_with(|| ReconciledAxis::seed(axis));
        }
    }
    merged.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FontCatalog, FontSource};

    fn axis(tag: &[u8; 4], name: &str, min: f64, max: f64, default: f64, step: f64) -> AxisDescriptor {
        AxisDescriptor {
            tag: AxisTag::new(tag),
            name: name.into(),
            min,
            max,
            default,
            step,
        }
    }

    fn catalog(fonts: Vec<Option<Vec<AxisDescriptor>>>) -> FontCatalog {
        let mut catalog = FontCatalog::new();
        for (i, axes) in fonts.into_iter().enumerate() {
            catalog.push(
                format!("Font {i}"),
                FontSource::Remote { url: format!("{i}.ttf") },
                None,
                None,
                axes,
            );
        }
        catalog
    }

    #[test]
    fn test_union_of_ranges() {
        let catalog = catalog(vec![
            Some(vec![
                axis(b"wght", "Weight", 100.0, 700.0, 300.0, 1.0),
                axis(b"wdth", "Width", 75.0, 125.0, 100.0, 0.1),
            ]),
            Some(vec![axis(b"wght", "Graisse", 200.0, 900.0, 400.0, 1.0)]),
        ]);
        let controls = reconcile(catalog.iter());

        assert_eq!(controls.len(), 2);
        assert_eq!(controls[0].tag, AxisTag::WEIGHT);
        assert_eq!((controls[0].min, controls[0].max), (100.0, 900.0));
        // First occurrence wins for name, step and default
        assert_eq!(controls[0].name, "Weight");
        assert_eq!(controls[0].default, 300.0);
        assert_eq!(controls[1].tag, AxisTag::WIDTH);
    }

    #[test]
    fn test_order_follows_fonts() {
        let catalog = catalog(vec![
            Some(vec![axis(b"opsz", "Optical", 8.0, 144.0, 14.0, 1.0)]),
            Some(vec![
                axis(b"wght", "Weight", 100.0, 900.0, 400.0, 1.0),
                axis(b"opsz", "Optical", 6.0, 72.0, 12.0, 1.0),
            ]),
        ]);
        let forward: Vec<_> = reconcile(catalog.iter()).into_iter().map(|c| c.tag).collect();
        assert_eq!(forward, vec![AxisTag::OPTICAL_SIZE, AxisTag::WEIGHT]);

        let reversed: Vec<_> = reconcile(catalog.iter().rev()).into_iter().map(|c| c.tag).collect();
        assert_eq!(reversed, vec![AxisTag::WEIGHT, AxisTag::OPTICAL_SIZE]);
    }

    #[test]
    fn test_unresolved_and_static_contribute_nothing() {
        let catalog = catalog(vec![None, Some(vec![])]);
        assert!(reconcile(catalog.iter()).is_empty());
    }

    #[test]
    fn test_fonts_not_mutated() {
        let catalog = catalog(vec![
            Some(vec![axis(b"wght", "Weight", 100.0, 700.0, 300.0, 1.0)]),
            Some(vec![axis(b"wght", "Weight", 100.0, 900.0, 400.0, 1.0)]),
        ]);
        let _ = reconcile(catalog.iter());
        let first = catalog.iter().next().unwrap();
        assert_eq!(first.resolved_axes()[0].max, 700.0);
    }
}
