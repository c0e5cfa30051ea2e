//! Compatibility surface for an embedded legacy scripting handler.
//!
//! When the native engine is disabled, the reactor hands host callbacks and
//! user commands to a [`LegacyHandler`] instead. The handler sees the
//! persistent store, the host, command registration and logging through a
//! [`BridgeApi`]; the bridge itself keeps nothing but the handler and the
//! callbacks it registered.

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::actor::reactor::Event;
use crate::common::collections::HashMap;
use crate::model::ids::{GroupId, SurfaceId, WindowId};
use crate::model::store::{PersistentStore, StoreError};
use crate::sys::host::Host;

pub type CommandCallback = Box<dyn FnMut(&mut BridgeApi<'_>) + Send>;

/// An externally hosted handler that replaces the native engine.
pub trait LegacyHandler: Send {
    /// Called once when the reactor starts.
    fn init(&mut self, _api: &mut BridgeApi<'_>) {}

    fn on_current_surface_changed(&mut self, api: &mut BridgeApi<'_>);

    fn on_surface_update(&mut self, api: &mut BridgeApi<'_>);

    /// Window lifecycle events, passed on as the host reported them.
    fn on_window_event(&mut self, _api: &mut BridgeApi<'_>, _event: &Event) {}
}

pub struct BridgeApi<'a> {
    store: &'a PersistentStore,
    host: &'a mut dyn Host,
    callbacks: &'a mut HashMap<String, CommandCallback>,
}

fn report(result: Result<(), StoreError>) {
    if let Err(err) = result {
        warn!(%err, "legacy handler write failed; previous document kept");
    }
}

fn parse_surface(surface: &str) -> Option<SurfaceId> {
    surface
        .parse::<SurfaceId>()
        .inspect_err(|err| warn!(%err, "legacy handler passed a malformed surface id"))
        .ok()
}

impl<'a> BridgeApi<'a> {
    pub fn window_state(&self, window_id: u64) -> Value { self.store.window_state(WindowId::new(window_id)) }

    pub fn put_window_state(&self, window_id: u64, blob: Value) {
        report(self.store.put_window_state(WindowId::new(window_id), blob));
    }

    /// Empty object for malformed surface ids.
    pub fn layout_state(&self, surface: &str) -> Value {
        parse_surface(surface)
            .map(|surface| self.store.layout_state(surface))
            .unwrap_or_else(|| Value::Object(Default::default()))
    }

    pub fn put_layout_state(&self, surface: &str, blob: Value) {
        if let Some(surface) = parse_surface(surface) {
            report(self.store.put_layout_state(surface, blob));
        }
    }

    pub fn window_list(&self) -> Vec<u64> {
        self.store.window_list().into_iter().map(WindowId::get).collect()
    }

    pub fn put_window_list(&self, ids: &[u64]) {
        let ids: Vec<_> = ids.iter().copied().map(WindowId::new).collect();
        report(self.store.put_window_list(&ids));
    }

    /// The group shown on `surface`; 0 if none.
    pub fn surface_group(&self, surface: &str) -> i64 {
        parse_surface(surface)
            .and_then(|surface| self.store.surface_group(surface))
            .map_or(0, i64::from)
    }

    /// Sets the group shown on `surface`; 0 clears it. Out-of-range groups are
    /// declined.
    pub fn set_surface_group(&self, surface: &str, group: i64) {
        let Some(surface) = parse_surface(surface) else { return };
        let group = match group {
            0 => None,
            raw => match GroupId::new(raw) {
                Ok(group) => Some(group),
                Err(err) => {
                    warn!(%surface, %err, "legacy handler group change declined");
                    return;
                }
            },
        };
        report(self.store.set_surface_group(surface, group));
    }

    pub fn workspace(&mut self) -> &mut dyn Host { &mut *self.host }

    /// Registers a shortcut with the host and routes it to `callback`.
    pub fn register_command(
        &mut self,
        id: &str,
        description: &str,
        keybinding: &str,
        callback: impl FnMut(&mut BridgeApi<'_>) + Send + 'static,
    ) {
        self.host.register_shortcut(id, description, keybinding);
        if self.callbacks.insert(id.to_string(), Box::new(callback)).is_some() {
            debug!(id, "legacy command re-registered");
        }
    }

    pub fn log(&self, message: &str) {
        info!(target: "tilecore::legacy", "{message}");
    }
}

#[derive(Default)]
pub struct ScriptingBridge {
    handler: Option<Box<dyn LegacyHandler>>,
    callbacks: HashMap<String, CommandCallback>,
}

impl std::fmt::Debug for ScriptingBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptingBridge")
            .field("has_handler", &self.handler.is_some())
            .field("commands", &self.callbacks.len())
            .finish()
    }
}

impl ScriptingBridge {
    pub fn new(handler: Option<Box<dyn LegacyHandler>>) -> Self {
        Self { handler, callbacks: HashMap::default() }
    }

    fn with_handler(
        &mut self,
        store: &PersistentStore,
        host: &mut dyn Host,
        f: impl FnOnce(&mut dyn LegacyHandler, &mut BridgeApi<'_>),
    ) {
        let Some(handler) = self.handler.as_deref_mut() else {
            debug!("no legacy handler attached; dropping notification");
            return;
        };
        let mut api = BridgeApi { store, host, callbacks: &mut self.callbacks };
        f(handler, &mut api);
    }

    pub fn init(&mut self, store: &PersistentStore, host: &mut dyn Host) {
        self.with_handler(store, host, |handler, api| handler.init(api));
    }

    pub fn current_surface_changed(&mut self, store: &PersistentStore, host: &mut dyn Host) {
        self.with_handler(store, host, |handler, api| handler.on_current_surface_changed(api));
    }

    pub fn surface_update(&mut self, store: &PersistentStore, host: &mut dyn Host) {
        self.with_handler(store, host, |handler, api| handler.on_surface_update(api));
    }

    pub fn window_event(&mut self, store: &PersistentStore, host: &mut dyn Host, event: &Event) {
        self.with_handler(store, host, |handler, api| handler.on_window_event(api, event));
    }

    /// Runs the callback registered for `id`. Returns false if there is none.
    pub fn run_command(&mut self, store: &PersistentStore, host: &mut dyn Host, id: &str) -> bool {
        let Some(mut callback) = self.callbacks.remove(id) else {
            debug!(id, "no legacy command registered under this id");
            return false;
        };
        let mut api = BridgeApi { store, host, callbacks: &mut self.callbacks };
        callback(&mut api);
        // A callback may have re-registered itself; that registration wins.
        self.callbacks.entry(id.to_string()).or_insert(callback);
        true
    }

    pub fn commands(&self) -> impl Iterator<Item = &str> { self.callbacks.keys().map(String::as_str) }
}
