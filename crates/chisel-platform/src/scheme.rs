//! The "prefers dark" environment signal
//!
//! The host tells us whether the system is in dark mode, and can change its
//! mind at any time. Consumers read the current value on demand and register
//! watchers for changes; a watcher lives exactly as long as its
//! [`WatchHandle`].

use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

type WatchCallback = Arc<dyn Fn(bool) + Send + Sync>;

/// A source for the boolean "system prefers dark" value.
pub trait PreferenceSignal: Send + Sync {
    /// Current value of the signal.
    fn prefers_dark(&self) -> bool;

    /// Register a watcher invoked on every change of the signal.
    ///
    /// The watcher is released when the returned handle is dropped.
    fn watch(&self, callback: Box<dyn Fn(bool) + Send + Sync>) -> WatchHandle;
}

/// RAII registration for a signal watcher.
///
/// Dropping the handle unregisters the watcher exactly once; a handle that
/// was already cancelled does nothing on drop.
pub struct WatchHandle {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl WatchHandle {
    /// Create a handle that runs `cancel` on drop.
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self { cancel: Some(Box::new(cancel)) }
    }

    /// A handle with nothing to release.
    pub fn noop() -> Self {
        Self { cancel: None }
    }

    /// Release the watcher now instead of at drop time.
    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for WatchHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchHandle")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// In-process preference signal.
///
/// The embedding event loop owns the authoritative value and pushes updates
/// through [`SchemeHub::set_prefers_dark`]; watchers are notified only when
/// the value actually flips, one notification per flip.
#[derive(Clone)]
pub struct SchemeHub {
    inner: Arc<HubInner>,
}

struct HubInner {
    prefers_dark: AtomicBool,
    watchers: Mutex<HashMap<u64, WatchCallback>>,
    next_id: AtomicU64,
}

impl SchemeHub {
    /// Create a hub with an initial value.
    pub fn new(prefers_dark: bool) -> Self {
        Self {
            inner: Arc::new(HubInner {
                prefers_dark: AtomicBool::new(prefers_dark),
                watchers: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    /// Update the signal, notifying watchers if the value changed.
    pub fn set_prefers_dark(&self, value: bool) {
        let previous = self.inner.prefers_dark.swap(value, Ordering::SeqCst);
        if previous == value {
            return;
        }

        tracing::debug!(prefers_dark = value, "color-scheme preference changed");

        // Snapshot the watcher list so callbacks can register or
        // unregister watchers without deadlocking.
        let callbacks: Vec<WatchCallback> =
            self.inner.watchers.lock().values().cloned().collect();
        for callback in callbacks {
            callback(value);
        }
    }
}

impl PreferenceSignal for SchemeHub {
    fn prefers_dark(&self) -> bool {
        self.inner.prefers_dark.load(Ordering::SeqCst)
    }

    fn watch(&self, callback: Box<dyn Fn(bool) + Send + Sync>) -> WatchHandle {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.watchers.lock().insert(id, Arc::from(callback));

        let weak: Weak<HubInner> = Arc::downgrade(&self.inner);
        WatchHandle::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.watchers.lock().remove(&id);
            }
        })
    }
}

/// Detector for the OS color mode.
type Detector = fn() -> bool;

/// OS-backed preference signal.
///
/// Reads the system color mode once at construction and again on every
/// [`SystemScheme::refresh`]; the host event loop decides when to re-detect
/// (there is no cross-platform change event to hook).
pub struct SystemScheme {
    hub: SchemeHub,
    detector: Detector,
}

impl SystemScheme {
    /// Create a signal backed by the operating system's color mode.
    pub fn new() -> Self {
        Self::with_detector(os_prefers_dark)
    }

    /// Create a signal with a custom detector (for testing or embedding).
    pub fn with_detector(detector: Detector) -> Self {
        Self { hub: SchemeHub::new(detector()), detector }
    }

    /// Re-run the detector and notify watchers if the mode changed.
    pub fn refresh(&self) {
        self.hub.set_prefers_dark((self.detector)());
    }
}

impl Default for SystemScheme {
    fn default() -> Self {
        Self::new()
    }
}

impl PreferenceSignal for SystemScheme {
    fn prefers_dark(&self) -> bool {
        self.hub.prefers_dark()
    }

    fn watch(&self, callback: Box<dyn Fn(bool) + Send + Sync>) -> WatchHandle {
        self.hub.watch(callback)
    }
}

fn os_prefers_dark() -> bool {
    matches!(dark_light::detect(), dark_light::Mode::Dark)
}
