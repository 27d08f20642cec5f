//! Host environment integration for Chisel UI
//!
//! This crate exposes the host's light/dark preference as a boolean
//! "prefers dark" signal with change subscriptions.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod scheme;

pub use scheme::{PreferenceSignal, SchemeHub, SystemScheme, WatchHandle};
