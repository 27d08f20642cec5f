//! Preference persistence for Chisel UI
//!
//! This crate provides the durable client-side key-value store used for
//! user preferences such as the requested theme.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod store;

pub use store::{PrefStore, PrefsConfig, PrefsError, Result};
