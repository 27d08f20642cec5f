//! The rendering-surface theme marker
//!
//! The resolver publishes the effective theme as a marker on the root
//! rendering surface so styling rules can select against it. When the
//! request is `auto` the marker is removed entirely, letting
//! environment-driven styling apply natively.

use parking_lot::Mutex;
use std::sync::Arc;

/// A root rendering surface that can carry a theme marker.
pub trait ThemeSurface: Send + Sync {
    /// Apply or remove the theme marker.
    ///
    /// `Some(token)` sets the marker to the effective theme token; `None`
    /// removes it.
    fn set_marker(&self, marker: Option<&str>);
}

/// A surface that ignores the marker.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSurface;

impl ThemeSurface for NullSurface {
    fn set_marker(&self, _marker: Option<&str>) {}
}

/// A surface that records the marker in memory.
///
/// Embedders bridge this to their real surface; tests read it back with
/// [`MemorySurface::marker`].
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    marker: Arc<Mutex<Option<String>>>,
}

impl MemorySurface {
    /// Create a surface with no marker applied.
    pub fn new() -> Self {
        Self::default()
    }

    /// The currently applied marker, if any.
    pub fn marker(&self) -> Option<String> {
        self.marker.lock().clone()
    }
}

impl ThemeSurface for MemorySurface {
    fn set_marker(&self, marker: Option<&str>) {
        *self.marker.lock() = marker.map(str::to_string);
    }
}
