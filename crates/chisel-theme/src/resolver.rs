//! Theme resolution and lifecycle
//!
//! [`ThemeResolver`] owns the single current [`ThemeRequest`], derives the
//! [`EffectiveTheme`] on demand, persists request changes, and listens to the
//! "prefers dark" signal while the request is `auto`. It is the one source of
//! truth for the theme; anything that renders reads it through
//! [`ThemeResolver::snapshot`] and mutates it through
//! [`ThemeResolver::set_request`].
//!
//! The effective theme is never cached: every snapshot recomputes it from
//! the live signal, so an `auto` request can never report a stale
//! resolution.

use crate::request::{EffectiveTheme, Result, ThemeError, ThemeOptions, ThemeRequest};
use crate::surface::ThemeSurface;
use chisel_platform::{PreferenceSignal, WatchHandle};
use chisel_prefs::PrefStore;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// The current request and its resolution, as seen by one observer call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeSnapshot {
    /// What was asked for (may be `auto`)
    pub request: ThemeRequest,
    /// What gets rendered (never `auto`)
    pub effective: EffectiveTheme,
}

/// Handle identifying a registered observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

type ObserverFn = Arc<dyn Fn(&ThemeSnapshot) + Send + Sync>;

/// The theme runtime.
///
/// Cloning yields another handle to the same resolver. Construct once at
/// application startup and pass handles to whatever needs theme access.
#[derive(Clone)]
pub struct ThemeResolver {
    inner: Arc<ResolverInner>,
}

struct ResolverInner {
    options: ThemeOptions,
    store: Option<PrefStore>,
    signal: Arc<dyn PreferenceSignal>,
    surface: Arc<dyn ThemeSurface>,
    state: Mutex<ResolverState>,
}

struct ResolverState {
    request: ThemeRequest,
    started: bool,
    watch: Option<WatchHandle>,
    observers: HashMap<u64, ObserverFn>,
    next_observer_id: u64,
}

impl ThemeResolver {
    /// Create a resolver.
    ///
    /// Reads the persisted request under `options.storage_key` when
    /// persistence is enabled and a store is present; an absent,
    /// unrecognized, or unreadable stored value falls back to
    /// `options.default_request` without error. The initial surface marker
    /// is applied before returning.
    ///
    /// The resolver does not listen for signal changes until
    /// [`ThemeResolver::start`] is called.
    pub fn new(
        options: ThemeOptions,
        store: Option<PrefStore>,
        signal: Arc<dyn PreferenceSignal>,
        surface: Arc<dyn ThemeSurface>,
    ) -> Self {
        let request = initial_request(&options, store.as_ref());

        let resolver = Self {
            inner: Arc::new(ResolverInner {
                options,
                store,
                signal,
                surface,
                state: Mutex::new(ResolverState {
                    request,
                    started: false,
                    watch: None,
                    observers: HashMap::new(),
                    next_observer_id: 0,
                }),
            }),
        };

        let snapshot = resolver.snapshot();
        resolver.inner.apply_marker(&snapshot);
        resolver
    }

    /// The current request and effective theme.
    ///
    /// The effective theme is recomputed from the live signal on every
    /// call. No side effects, never fails.
    pub fn snapshot(&self) -> ThemeSnapshot {
        let state = self.inner.state.lock();
        self.inner.snapshot_locked(&state)
    }

    /// The effective theme right now.
    pub fn effective(&self) -> EffectiveTheme {
        self.snapshot().effective
    }

    /// Change the current request.
    ///
    /// Rejects tokens that are neither built-in nor registered in
    /// `options.named_palettes`, leaving all state untouched. On success the
    /// request is persisted (write failures are logged and swallowed; the
    /// in-memory state still updates), the surface marker is updated, and
    /// observers are notified synchronously. Setting the already-current
    /// request is a no-op.
    pub fn set_request(&self, request: ThemeRequest) -> Result<()> {
        if !self.inner.options.is_valid(&request) {
            return Err(ThemeError::UnknownRequest(request.as_str().to_string()));
        }

        let released;
        let snapshot;
        let observers: Vec<ObserverFn>;
        {
            let mut state = self.inner.state.lock();
            if state.request == request {
                return Ok(());
            }
            state.request = request;

            released = if state.request.is_auto() {
                if state.started && state.watch.is_none() {
                    state.watch = Some(self.register_watch());
                }
                None
            } else {
                state.watch.take()
            };

            snapshot = self.inner.snapshot_locked(&state);
            observers = state.observers.values().cloned().collect();
        }
        drop(released);

        tracing::debug!(
            request = %snapshot.request,
            effective = %snapshot.effective,
            "theme request changed"
        );

        self.inner.persist(&snapshot.request);
        self.inner.apply_marker(&snapshot);
        for observer in &observers {
            observer(&snapshot);
        }
        Ok(())
    }

    /// Begin listening for signal changes while the request is `auto`.
    ///
    /// Calling `start` on a started resolver is a no-op.
    pub fn start(&self) {
        let mut state = self.inner.state.lock();
        if state.started {
            return;
        }
        state.started = true;
        if state.request.is_auto() && state.watch.is_none() {
            state.watch = Some(self.register_watch());
        }
    }

    /// Stop listening for signal changes.
    ///
    /// Releases the signal subscription if one is held. Idempotent, and
    /// safe to call on a resolver that was never started.
    pub fn stop(&self) {
        let released = {
            let mut state = self.inner.state.lock();
            state.started = false;
            state.watch.take()
        };
        drop(released);
    }

    /// Register an observer invoked synchronously after every change.
    ///
    /// Observers fire after `set_request` and after a signal change while
    /// the request is `auto`; all observers see the same final snapshot.
    /// Invocation order is unspecified.
    pub fn observe(
        &self,
        callback: impl Fn(&ThemeSnapshot) + Send + Sync + 'static,
    ) -> ObserverId {
        let mut state = self.inner.state.lock();
        let id = state.next_observer_id;
        state.next_observer_id += 1;
        state.observers.insert(id, Arc::new(callback));
        ObserverId(id)
    }

    /// Remove an observer. Returns false if the id was not registered.
    pub fn unobserve(&self, id: ObserverId) -> bool {
        self.inner.state.lock().observers.remove(&id.0).is_some()
    }

    fn register_watch(&self) -> WatchHandle {
        let weak = Arc::downgrade(&self.inner);
        self.inner.signal.watch(Box::new(move |_prefers_dark| {
            if let Some(inner) = weak.upgrade() {
                inner.on_signal_change();
            }
        }))
    }
}

impl ResolverInner {
    fn snapshot_locked(&self, state: &ResolverState) -> ThemeSnapshot {
        let request = state.request.clone();
        let effective = request.effective(self.signal.prefers_dark());
        ThemeSnapshot { request, effective }
    }

    /// Signal-change callback, live only while the request is `auto`.
    fn on_signal_change(&self) {
        let (snapshot, observers): (ThemeSnapshot, Vec<ObserverFn>) = {
            let state = self.state.lock();
            // A flip can land between leaving auto and the watch release.
            if !state.request.is_auto() {
                return;
            }
            (
                self.snapshot_locked(&state),
                state.observers.values().cloned().collect(),
            )
        };

        tracing::debug!(
            effective = %snapshot.effective,
            "system preference changed while auto"
        );

        for observer in &observers {
            observer(&snapshot);
        }
    }

    fn persist(&self, request: &ThemeRequest) {
        if !self.options.persistence {
            return;
        }
        let Some(store) = &self.store else {
            return;
        };
        if let Err(e) = store.set(&self.options.storage_key, &request.as_str()) {
            tracing::warn!(error = %e, "failed to persist theme request");
        }
    }

    fn apply_marker(&self, snapshot: &ThemeSnapshot) {
        let marker = if snapshot.request.is_auto() {
            None
        } else {
            Some(snapshot.effective.as_str())
        };
        self.surface.set_marker(marker);
    }
}

fn initial_request(options: &ThemeOptions, store: Option<&PrefStore>) -> ThemeRequest {
    if !options.persistence {
        return options.default_request.clone();
    }
    let Some(store) = store else {
        return options.default_request.clone();
    };

    match store.get::<String>(&options.storage_key) {
        Ok(Some(token)) => match options.parse_request(&token) {
            Some(request) => request,
            None => {
                tracing::debug!(token = %token, "ignoring unrecognized stored theme");
                options.default_request.clone()
            }
        },
        Ok(None) => options.default_request.clone(),
        Err(e) => {
            tracing::warn!(error = %e, "failed to read stored theme, using default");
            options.default_request.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::MemorySurface;
    use chisel_platform::SchemeHub;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixture {
        hub: SchemeHub,
        surface: MemorySurface,
        store: PrefStore,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                hub: SchemeHub::new(false),
                surface: MemorySurface::new(),
                store: PrefStore::in_memory().unwrap(),
            }
        }

        fn resolver(&self, options: ThemeOptions) -> ThemeResolver {
            ThemeResolver::new(
                options,
                Some(self.store.clone()),
                Arc::new(self.hub.clone()),
                Arc::new(self.surface.clone()),
            )
        }
    }

    fn counting_observer(resolver: &ThemeResolver) -> (Arc<AtomicUsize>, ObserverId) {
        let count = Arc::new(AtomicUsize::new(0));
        let count_in_observer = Arc::clone(&count);
        let id = resolver.observe(move |_| {
            count_in_observer.fetch_add(1, Ordering::SeqCst);
        });
        (count, id)
    }

    #[test]
    fn test_initial_snapshot_with_empty_store() {
        let fixture = Fixture::new();
        let resolver = fixture.resolver(ThemeOptions::default());

        let snapshot = resolver.snapshot();
        assert_eq!(snapshot.request, ThemeRequest::Light);
        assert_eq!(snapshot.effective, EffectiveTheme::Light);
        assert_eq!(fixture.surface.marker(), Some("light".to_string()));
    }

    #[test]
    fn test_stored_value_overrides_default() {
        let fixture = Fixture::new();
        fixture.store.set("theme-preference", &"dark").unwrap();

        let resolver = fixture.resolver(ThemeOptions::default());
        assert_eq!(resolver.snapshot().request, ThemeRequest::Dark);
    }

    #[test]
    fn test_unrecognized_stored_value_falls_back() {
        let fixture = Fixture::new();
        fixture.store.set("theme-preference", &"ultraviolet").unwrap();

        let resolver = fixture.resolver(ThemeOptions::new(ThemeRequest::Dark));
        assert_eq!(resolver.snapshot().request, ThemeRequest::Dark);
    }

    #[test]
    fn test_corrupt_stored_value_falls_back() {
        let fixture = Fixture::new();
        // Wrong type under the key: read fails, default wins
        fixture.store.set("theme-preference", &42).unwrap();

        let resolver = fixture.resolver(ThemeOptions::default());
        assert_eq!(resolver.snapshot().request, ThemeRequest::Light);
    }

    #[test]
    fn test_non_auto_requests_ignore_signal() {
        let fixture = Fixture::new();
        fixture.hub.set_prefers_dark(true);

        let resolver = fixture.resolver(ThemeOptions::default());
        assert_eq!(resolver.effective(), EffectiveTheme::Light);

        resolver.set_request(ThemeRequest::Dark).unwrap();
        let snapshot = resolver.snapshot();
        assert_eq!(snapshot.request, ThemeRequest::Dark);
        assert_eq!(snapshot.effective, EffectiveTheme::Dark);
    }

    #[test]
    fn test_auto_resolves_from_live_signal() {
        let fixture = Fixture::new();
        let resolver = fixture.resolver(ThemeOptions::default());

        resolver.set_request(ThemeRequest::Auto).unwrap();
        assert_eq!(resolver.effective(), EffectiveTheme::Light);

        fixture.hub.set_prefers_dark(true);
        let snapshot = resolver.snapshot();
        assert_eq!(snapshot.request, ThemeRequest::Auto);
        assert_eq!(snapshot.effective, EffectiveTheme::Dark);
    }

    #[test]
    fn test_marker_removed_while_auto() {
        let fixture = Fixture::new();
        let resolver = fixture.resolver(ThemeOptions::default());
        assert_eq!(fixture.surface.marker(), Some("light".to_string()));

        resolver.set_request(ThemeRequest::Auto).unwrap();
        assert_eq!(fixture.surface.marker(), None);

        resolver.set_request(ThemeRequest::Dark).unwrap();
        assert_eq!(fixture.surface.marker(), Some("dark".to_string()));
    }

    #[test]
    fn test_set_request_persists() {
        let fixture = Fixture::new();
        let resolver = fixture.resolver(ThemeOptions::default());

        resolver.set_request(ThemeRequest::Auto).unwrap();
        let stored: Option<String> = fixture.store.get("theme-preference").unwrap();
        assert_eq!(stored, Some("auto".to_string()));
    }

    #[test]
    fn test_persistence_round_trip() {
        let fixture = Fixture::new();
        {
            let resolver = fixture.resolver(ThemeOptions::default());
            resolver.set_request(ThemeRequest::Dark).unwrap();
        }

        let resolver = fixture.resolver(ThemeOptions::default());
        assert_eq!(resolver.snapshot().request, ThemeRequest::Dark);
    }

    #[test]
    fn test_custom_storage_key() {
        let fixture = Fixture::new();
        let options = ThemeOptions::default().storage_key("editor-theme");
        let resolver = fixture.resolver(options);

        resolver.set_request(ThemeRequest::Dark).unwrap();
        let stored: Option<String> = fixture.store.get("editor-theme").unwrap();
        assert_eq!(stored, Some("dark".to_string()));
        assert!(!fixture.store.contains("theme-preference").unwrap());
    }

    #[test]
    fn test_persistence_disabled() {
        let fixture = Fixture::new();
        let resolver = fixture.resolver(ThemeOptions::default().persistence(false));

        resolver.set_request(ThemeRequest::Dark).unwrap();
        assert_eq!(resolver.snapshot().request, ThemeRequest::Dark);
        assert!(!fixture.store.contains("theme-preference").unwrap());
    }

    #[test]
    fn test_works_without_store() {
        let hub = SchemeHub::new(true);
        let resolver = ThemeResolver::new(
            ThemeOptions::new(ThemeRequest::Auto),
            None,
            Arc::new(hub),
            Arc::new(MemorySurface::new()),
        );

        assert_eq!(resolver.effective(), EffectiveTheme::Dark);
        resolver.set_request(ThemeRequest::Light).unwrap();
        assert_eq!(resolver.effective(), EffectiveTheme::Light);
    }

    #[test]
    fn test_named_request_requires_registration() {
        let fixture = Fixture::new();
        let resolver = fixture.resolver(ThemeOptions::default().named_palette("ocean"));

        resolver
            .set_request(ThemeRequest::Named("ocean".to_string()))
            .unwrap();
        assert_eq!(
            resolver.effective(),
            EffectiveTheme::Named("ocean".to_string())
        );
        assert_eq!(fixture.surface.marker(), Some("ocean".to_string()));
    }

    #[test]
    fn test_unknown_request_rejected_without_side_effects() {
        let fixture = Fixture::new();
        let resolver = fixture.resolver(ThemeOptions::default());
        let (count, _id) = counting_observer(&resolver);

        let result = resolver.set_request(ThemeRequest::Named("ocean".to_string()));
        assert!(matches!(result, Err(ThemeError::UnknownRequest(_))));

        assert_eq!(resolver.snapshot().request, ThemeRequest::Light);
        assert!(!fixture.store.contains("theme-preference").unwrap());
        assert_eq!(fixture.surface.marker(), Some("light".to_string()));
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_set_request_is_idempotent() {
        let fixture = Fixture::new();
        let resolver = fixture.resolver(ThemeOptions::default());
        let (count, _id) = counting_observer(&resolver);

        resolver.set_request(ThemeRequest::Dark).unwrap();
        resolver.set_request(ThemeRequest::Dark).unwrap();

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(resolver.snapshot().request, ThemeRequest::Dark);
        let stored: Option<String> = fixture.store.get("theme-preference").unwrap();
        assert_eq!(stored, Some("dark".to_string()));
    }

    #[test]
    fn test_observers_see_final_state() {
        let fixture = Fixture::new();
        fixture.hub.set_prefers_dark(true);
        let resolver = fixture.resolver(ThemeOptions::default());

        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let seen_in_observer = Arc::clone(&seen);
        let _id = resolver.observe(move |snapshot| {
            seen_in_observer.lock().push(snapshot.clone());
        });

        resolver.set_request(ThemeRequest::Auto).unwrap();
        let snapshots = seen.lock();
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].request, ThemeRequest::Auto);
        assert_eq!(snapshots[0].effective, EffectiveTheme::Dark);
    }

    #[test]
    fn test_unobserve_stops_notifications() {
        let fixture = Fixture::new();
        let resolver = fixture.resolver(ThemeOptions::default());
        let (count, id) = counting_observer(&resolver);

        assert!(resolver.unobserve(id));
        assert!(!resolver.unobserve(id));

        resolver.set_request(ThemeRequest::Dark).unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_signal_changes_notify_while_auto() {
        let fixture = Fixture::new();
        let resolver = fixture.resolver(ThemeOptions::default());
        resolver.start();
        resolver.set_request(ThemeRequest::Auto).unwrap();

        let (count, _id) = counting_observer(&resolver);
        fixture.hub.set_prefers_dark(true);
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(resolver.effective(), EffectiveTheme::Dark);

        // No debouncing: every flip is a separate notification
        fixture.hub.set_prefers_dark(false);
        fixture.hub.set_prefers_dark(true);
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_leaving_auto_releases_listener() {
        let fixture = Fixture::new();
        let resolver = fixture.resolver(ThemeOptions::default());
        resolver.start();
        resolver.set_request(ThemeRequest::Auto).unwrap();

        resolver.set_request(ThemeRequest::Light).unwrap();
        let (count, _id) = counting_observer(&resolver);

        fixture.hub.set_prefers_dark(true);
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(resolver.effective(), EffectiveTheme::Light);
    }

    #[test]
    fn test_reentering_auto_resubscribes() {
        let fixture = Fixture::new();
        let resolver = fixture.resolver(ThemeOptions::default());
        resolver.start();
        resolver.set_request(ThemeRequest::Auto).unwrap();
        resolver.set_request(ThemeRequest::Light).unwrap();
        resolver.set_request(ThemeRequest::Auto).unwrap();

        let (count, _id) = counting_observer(&resolver);
        fixture.hub.set_prefers_dark(true);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_no_listening_before_start() {
        let fixture = Fixture::new();
        let resolver = fixture.resolver(ThemeOptions::new(ThemeRequest::Auto));
        let (count, _id) = counting_observer(&resolver);

        fixture.hub.set_prefers_dark(true);
        assert_eq!(count.load(Ordering::SeqCst), 0);
        // Snapshots still resolve from the live signal
        assert_eq!(resolver.effective(), EffectiveTheme::Dark);
    }

    #[test]
    fn test_start_while_auto_subscribes() {
        let fixture = Fixture::new();
        let resolver = fixture.resolver(ThemeOptions::new(ThemeRequest::Auto));
        resolver.start();

        let (count, _id) = counting_observer(&resolver);
        fixture.hub.set_prefers_dark(true);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_stop_releases_listener() {
        let fixture = Fixture::new();
        let resolver = fixture.resolver(ThemeOptions::new(ThemeRequest::Auto));
        resolver.start();
        resolver.stop();

        let (count, _id) = counting_observer(&resolver);
        fixture.hub.set_prefers_dark(true);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_stop_is_idempotent_and_safe_without_start() {
        let fixture = Fixture::new();
        let resolver = fixture.resolver(ThemeOptions::default());

        resolver.stop();
        resolver.stop();

        resolver.start();
        resolver.stop();
        resolver.stop();
    }

    #[test]
    fn test_drop_releases_listener() {
        let fixture = Fixture::new();
        {
            let resolver = fixture.resolver(ThemeOptions::new(ThemeRequest::Auto));
            resolver.start();
        }
        // Watcher is gone; a flip must not touch freed resolver state
        fixture.hub.set_prefers_dark(true);
    }

    #[test]
    fn test_example_scenario() {
        // Default light, storage empty, persistence enabled
        let fixture = Fixture::new();
        let resolver = fixture.resolver(ThemeOptions::default());
        resolver.start();

        let snapshot = resolver.snapshot();
        assert_eq!(
            (snapshot.request, snapshot.effective),
            (ThemeRequest::Light, EffectiveTheme::Light)
        );

        fixture.hub.set_prefers_dark(true);
        resolver.set_request(ThemeRequest::Auto).unwrap();
        let snapshot = resolver.snapshot();
        assert_eq!(
            (snapshot.request, snapshot.effective),
            (ThemeRequest::Auto, EffectiveTheme::Dark)
        );
        let stored: Option<String> = fixture.store.get("theme-preference").unwrap();
        assert_eq!(stored, Some("auto".to_string()));

        fixture.hub.set_prefers_dark(false);
        let snapshot = resolver.snapshot();
        assert_eq!(
            (snapshot.request, snapshot.effective),
            (ThemeRequest::Auto, EffectiveTheme::Light)
        );

        resolver.set_request(ThemeRequest::Dark).unwrap();
        let snapshot = resolver.snapshot();
        assert_eq!(
            (snapshot.request, snapshot.effective),
            (ThemeRequest::Dark, EffectiveTheme::Dark)
        );
        let stored: Option<String> = fixture.store.get("theme-preference").unwrap();
        assert_eq!(stored, Some("dark".to_string()));

        let (count, _id) = counting_observer(&resolver);
        fixture.hub.set_prefers_dark(true);
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(resolver.effective(), EffectiveTheme::Dark);
    }
}
