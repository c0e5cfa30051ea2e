use std::sync::Arc;

use parking_lot::Mutex;

use super::{Event, Reactor, Record};
use crate::actor::bridge::{BridgeApi, LegacyHandler};
use crate::common::config::Config;
use crate::model::ids::{SurfaceId, WindowHandle};
use crate::model::store::PersistentStore;
use crate::sys::headless::HeadlessHost;
use crate::sys::host::{Topology, WindowInfo};

pub fn window(raw: u64) -> WindowHandle { WindowHandle::new(raw) }

pub fn konsole(desktop: u32, screen: u32) -> WindowInfo {
    WindowInfo {
        class: "konsole".to_string(),
        title: "shell".to_string(),
        desktop,
        screen,
        ..WindowInfo::default()
    }
}

pub const ORIGIN: SurfaceId = SurfaceId::new(0, 0);

pub struct Harness {
    pub reactor: Reactor,
    pub host: HeadlessHost,
    pub store: PersistentStore,
}

impl Harness {
    pub fn new(config: Config) -> Self {
        Self::with_store(config, PersistentStore::in_memory(), HeadlessHost::new(Topology::new(2, 2)))
    }

    pub fn with_store(config: Config, store: PersistentStore, host: HeadlessHost) -> Self {
        let reactor =
            Reactor::new(config, store.clone(), Box::new(host.clone()), None, Record::default());
        Self { reactor, host, store }
    }

    pub fn legacy(handler: RecordingHandler) -> Self {
        let mut config = Config::default();
        config.settings.native_engine = false;
        let store = PersistentStore::in_memory();
        let host = HeadlessHost::new(Topology::new(2, 2));
        let reactor = Reactor::new(
            config,
            store.clone(),
            Box::new(host.clone()),
            Some(Box::new(handler)),
            Record::default(),
        );
        Self { reactor, host, store }
    }

    /// Delivers `event` the way a host would: its own view is updated first.
    pub fn send(&mut self, event: Event) {
        self.host.observe(&event);
        self.reactor.handle_event(event);
    }

    pub fn add(&mut self, raw: u64, screen: u32) {
        self.send(Event::WindowAdded(window(raw), konsole(0, screen)));
    }

    pub fn focus(&mut self, raw: u64) { self.send(Event::WindowActivated(Some(window(raw)))); }

    pub fn command(&mut self, id: &str) { self.send(Event::Command(id.to_string())); }
}

/// A legacy handler that writes down what it was told.
#[derive(Clone, Default)]
pub struct RecordingHandler {
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl RecordingHandler {
    pub fn calls(&self) -> Vec<String> { self.calls.lock().clone() }
}

impl LegacyHandler for RecordingHandler {
    fn init(&mut self, api: &mut BridgeApi<'_>) {
        self.calls.lock().push("init".to_string());
        let calls = self.calls.clone();
        api.register_command("legacy_tile", "Tile Everything", "Meta+T", move |api| {
            calls.lock().push("legacy_tile".to_string());
            api.put_window_list(&[7, 8]);
        });
    }

    fn on_current_surface_changed(&mut self, _api: &mut BridgeApi<'_>) {
        self.calls.lock().push("current_surface_changed".to_string());
    }

    fn on_surface_update(&mut self, _api: &mut BridgeApi<'_>) {
        self.calls.lock().push("surface_update".to_string());
    }

    fn on_window_event(&mut self, api: &mut BridgeApi<'_>, event: &Event) {
        if let Event::WindowAdded(handle, _) = event {
            api.log("window added");
            self.calls.lock().push(format!("added {}", handle.get()));
        }
    }
}
