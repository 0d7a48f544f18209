//! Font loading: axis resolution and render registration.
//!
//! Loading is split so that no controller state is borrowed across an
//! await point:
//! 1. The controller hands out a [`LoadRequest`] (at most one in flight per font)
//! 2. [`load_font`] fetches, parses and registers, never failing
//! 3. The controller applies the [`LoadedFont`]

use std::collections::HashMap;

use log::{debug, warn};

use crate::parser::FontParser;
use crate::resolver::AxisResolver;
use crate::{AxisDescriptor, FontEntry, FontId, FontSource};

/// Error type for provider operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    /// The font binary could not be fetched
    #[error("Failed to fetch '{url}': {reason}")]
    Fetch { url: String, reason: String },
    /// The renderer rejected the font
    #[error("Failed to register font family '{family}': {reason}")]
    Register { family: String, reason: String },
}

/// Result type for provider operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Trait for async font I/O.
///
/// Implement this trait to connect the engine to your platform (fetch API
/// and `FontFace` in a browser, files and a font database natively).
///
/// No `Send` bounds, so it works in both native and WASM (single-threaded) contexts.
pub trait FontDataProvider {
    /// Fetch the binary behind a remote font URL.
    fn fetch_font(&self, url: &str) -> impl std::future::Future<Output = LoadResult<Vec<u8>>>;

    /// Make `source` renderable under the logical name `family`.
    fn register_font(&self, family: &str, source: &FontSource) -> impl std::future::Future<Output = LoadResult<()>>;
}

/// Font family a card renders with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderFamily {
    /// Registration not finished yet
    Pending,
    /// Registered under this logical name
    Loaded(String),
    /// Registration failed; the generic fallback is used
    Fallback,
}

impl RenderFamily {
    /// CSS `font-family` value, with `fallback` as the generic family.
    ///
    /// ```rust
    /// use vfaxis_core_view::RenderFamily;
    ///
    /// assert_eq!(RenderFamily::Loaded("VF_0".into()).css("sans-serif"), "'VF_0', sans-serif");
    /// assert_eq!(RenderFamily::Fallback.css("sans-serif"), "sans-serif");
    /// ```
    pub fn css(&self, fallback: &str) -> String {
        match self {
            RenderFamily::Loaded(family) => format!("'{family}', {fallback}"),
            RenderFamily::Pending | RenderFamily::Fallback => fallback.to_string(),
        }
    }

    /// Returns `true` once registration has settled either way.
    #[inline]
    pub fn is_settled(&self) -> bool {
        !matches!(self, RenderFamily::Pending)
    }
}

/// Work needed to bring one font up.
#[derive(Clone, Debug)]
pub struct LoadRequest {
    pub font: FontId,
    /// Logical family name to register under
    pub family: String,
    pub source: FontSource,
    /// Axes are still unresolved
    pub resolve_axes: bool,
    /// The font is not registered yet
    pub register: bool,
}

/// Outcome of a [`LoadRequest`]. Failures are already degraded.
#[derive(Clone, Debug)]
pub struct LoadedFont {
    pub font: FontId,
    /// Resolved axes, if resolution was requested
    pub axes: Option<Vec<AxisDescriptor>>,
    /// Registration outcome, if registration was requested
    pub family: Option<RenderFamily>,
}

/// Logical family name for a font.
pub fn family_name(font: FontId) -> String {
    format!("VF_{font}")
}

/// Run a load request to completion.
///
/// Touches no controller state, so several loads can be in flight at once.
/// A fetch or parse failure yields an empty axis list; a registration
/// failure yields [`RenderFamily::Fallback`].
pub async fn load_font<P, R>(provider: &P, resolver: &AxisResolver<R>, request: LoadRequest) -> LoadedFont
where
    P: FontDataProvider,
    R: FontParser,
{
    let axes = if request.resolve_axes {
        let axes = match &request.source {
            FontSource::Local(local) => resolver.resolve_bytes(&local.data),
            FontSource::Remote { url } => match provider.fetch_font(url).await {
                Ok(bytes) => resolver.resolve_bytes(&bytes),
                Err(e) => {
                    warn!("{e}; treating font {} as static", request.font);
                    Vec::new()
                }
            },
        };
        Some(axes)
    } else {
        None
    };

    let family = if request.register {
        match provider.register_font(&request.family, &request.source).await {
            Ok(()) => {
                debug!("Registered font {} as '{}'", request.font, request.family);
                Some(RenderFamily::Loaded(request.family.clone()))
            }
            Err(e) => {
                warn!("{e}; using fallback family");
                Some(RenderFamily::Fallback)
            }
        }
    } else {
        None
    };

    LoadedFont {
        font: request.font,
        axes,
        family,
    }
}

#[derive(Clone, Debug)]
struct FontLoadState {
    family: RenderFamily,
    in_flight: bool,
}

/// Per-font load bookkeeping: registration outcome and in-flight flag.
#[derive(Clone, Debug, Default)]
pub struct LoadTracker {
    states: HashMap<FontId, FontLoadState>,
}

impl LoadTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a request for whatever `entry` still lacks.
    ///
    /// Axes are only requested while `entry.axes` is `None`, so a font is
    /// parsed at most once per session; a failed parse is recorded as `[]`
    /// and never retried. Returns `None` when the font is fully loaded or a
    /// load is already in flight.
    pub fn request(&mut self, entry: &FontEntry) -> Option<LoadRequest> {
        let state = self.states.entry(entry.id).or_insert(FontLoadState {
            family: RenderFamily::Pending,
            in_flight: false,
        });
        if state.in_flight {
            return None;
        }
        let resolve_axes = !entry.is_resolved();
        let register = !state.family.is_settled();
        if !resolve_axes && !register {
            return None;
        }
        state.in_flight = true;
        Some(LoadRequest {
            font: entry.id,
            family: family_name(entry.id),
            source: entry.source.clone(),
            resolve_axes,
            register,
        })
    }

    /// Record a finished load.
    pub fn complete(&mut self, loaded: &LoadedFont) {
        let state = self.states.entry(loaded.font).or_insert(FontLoadState {
            family: RenderFamily::Pending,
            in_flight: false,
        });
        state.in_flight = false;
        if let Some(family) = &loaded.family {
            state.family = family.clone();
        }
    }

    /// Current family for a font.
    pub fn family(&self, font: FontId) -> &RenderFamily {
        self.states
            .get(&font)
            .map(|s| &s.family)
            .unwrap_or(&RenderFamily::Pending)
    }

    /// Returns `true` while a load for `font` is outstanding.
    pub fn is_in_flight(&self, font: FontId) -> bool {
        self.states.get(&font).is_some_and(|s| s.in_flight)
    }
}

/// Browser font provider using `fetch` and the CSS Font Loading API.
#[cfg(feature = "web")]
pub mod web {
    use super::*;
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{FontFace, Response};

    /// [`FontDataProvider`] for the browser.
    #[derive(Clone, Copy, Debug, Default)]
    pub struct BrowserFontProvider;

    impl FontDataProvider for BrowserFontProvider {
        async fn fetch_font(&self, url: &str) -> LoadResult<Vec<u8>> {
            let fetch_err = |reason: String| LoadError::Fetch {
                url: url.to_string(),
                reason,
            };
            let window = web_sys::window().ok_or_else(|| fetch_err("No window available".into()))?;
            let response = JsFuture::from(window.fetch_with_str(url))
                .await
                .map_err(|e| fetch_err(format!("{e:?}")))?
                .dyn_into::<Response>()
                .map_err(|_| fetch_err("Not a Response".into()))?;
            if !response.ok() {
                return Err(fetch_err(format!("HTTP {}", response.status())));
            }
            let promise = response
                .array_buffer()
                .map_err(|e| fetch_err(format!("{e:?}")))?;
            let buffer = JsFuture::from(promise)
                .await
                .map_err(|e| fetch_err(format!("{e:?}")))?;
            Ok(js_sys::Uint8Array::new(&buffer).to_vec())
        }

        async fn register_font(&self, family: &str, source: &FontSource) -> LoadResult<()> {
            let register_err = |reason: String| LoadError::Register {
                family: family.to_string(),
                reason,
            };
            let face = match source {
                FontSource::Remote { url } => FontFace::new_with_str(family, &format!("url({url})")),
                FontSource::Local(local) => {
                    let buffer = js_sys::Uint8Array::from(&local.data[..]).buffer();
                    FontFace::new_with_array_buffer(family, &buffer)
                }
            }
            .map_err(|e| register_err(format!("{e:?}")))?;

            let promise = face.load().map_err(|e| register_err(format!("{e:?}")))?;
            JsFuture::from(promise)
                .await
                .map_err(|e| register_err(format!("{e:?}")))?;

            let document = web_sys::window()
                .and_then(|w| w.document())
                .ok_or_else(|| register_err("No document available".into()))?;
            document
                .fonts()
                .add(&face)
                .map_err(|e| register_err(format!("{e:?}")))?;
            Ok(())
        }
    }
}
