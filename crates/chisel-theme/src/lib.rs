//! Theme runtime for Chisel UI
//!
//! This crate owns the distinction between the theme the user asked for
//! (which may be `auto`) and the theme actually rendered (which never is).
//! [`ThemeResolver`] persists the request, resolves `auto` against the
//! system's "prefers dark" signal, publishes the effective theme as a
//! marker on the rendering surface, and notifies observers when either
//! input changes.
//!
//! # Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use chisel_platform::SchemeHub;
//! use chisel_theme::{MemorySurface, ThemeOptions, ThemeRequest, ThemeResolver};
//!
//! let hub = SchemeHub::new(false);
//! let resolver = ThemeResolver::new(
//!     ThemeOptions::default(),
//!     None,
//!     Arc::new(hub.clone()),
//!     Arc::new(MemorySurface::new()),
//! );
//! resolver.start();
//!
//! resolver.set_request(ThemeRequest::Auto).unwrap();
//! hub.set_prefers_dark(true);
//! assert_eq!(resolver.effective().as_str(), "dark");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod palette;
pub mod request;
pub mod resolver;
pub mod surface;

pub use palette::{builtin_palette, builtin_palettes, Color, Palette};
pub use request::{EffectiveTheme, Result, ThemeError, ThemeOptions, ThemeRequest};
pub use resolver::{ObserverId, ThemeResolver, ThemeSnapshot};
pub use surface::{MemorySurface, NullSurface, ThemeSurface};
