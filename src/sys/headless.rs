//! A host without a display. Keeps whatever the reactor tells it so the CLI
//! and the tests can inspect it.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info};

use crate::actor::reactor::Event;
use crate::common::collections::BTreeMap;
use crate::layout_engine::{Arrangement, EventResponse, LayoutRequest};
use crate::model::ids::{SurfaceId, WindowHandle};
use crate::sys::host::{Host, ShortcutRegistrar, Topology, WindowInfo};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Shortcut {
    pub id: String,
    pub description: String,
    pub keybinding: String,
}

#[derive(Debug, Default)]
struct State {
    windows: BTreeMap<WindowHandle, WindowInfo>,
    topology: Topology,
    active: Option<WindowHandle>,
    shortcuts: Vec<Shortcut>,
    arrangements: BTreeMap<SurfaceId, Arrangement>,
    layout_requests: Vec<LayoutRequest>,
    notifications: Vec<String>,
}

/// Cloning shares the state, so a clone handed to the reactor can still be
/// inspected from outside.
#[derive(Debug, Clone, Default)]
pub struct HeadlessHost {
    state: Arc<Mutex<State>>,
}

impl HeadlessHost {
    pub fn new(topology: Topology) -> Self {
        let host = Self::default();
        host.state.lock().topology = topology;
        host
    }

    pub fn insert_window(&self, handle: WindowHandle, info: WindowInfo) {
        self.state.lock().windows.insert(handle, info);
    }

    pub fn remove_window(&self, handle: WindowHandle) {
        let mut state = self.state.lock();
        state.windows.remove(&handle);
        if state.active == Some(handle) {
            state.active = None;
        }
    }

    pub fn set_topology(&self, topology: Topology) { self.state.lock().topology = topology; }

    pub fn activate(&self, handle: Option<WindowHandle>) { self.state.lock().active = handle; }

    /// Mirrors what a real host would already know when it reports `event`.
    pub fn observe(&self, event: &Event) {
        match event {
            Event::WindowAdded(handle, info) => self.insert_window(*handle, info.clone()),
            Event::WindowRemoved(handle) => self.remove_window(*handle),
            Event::WindowActivated(handle) => self.activate(*handle),
            Event::SurfaceSetChanged(topology) => self.set_topology(*topology),
            Event::SurfaceChanged(surface) => self.state.lock().topology.current = *surface,
            _ => {}
        }
    }

    pub fn shortcuts(&self) -> Vec<String> {
        self.state.lock().shortcuts.iter().map(|s| s.id.clone()).collect()
    }

    pub fn shortcut(&self, id: &str) -> Option<Shortcut> {
        self.state.lock().shortcuts.iter().find(|s| s.id == id).cloned()
    }

    /// Latest arrangement per surface.
    pub fn arrangements(&self) -> Vec<Arrangement> {
        self.state.lock().arrangements.values().cloned().collect()
    }

    pub fn arrangement(&self, surface: SurfaceId) -> Option<Arrangement> {
        self.state.lock().arrangements.get(&surface).cloned()
    }

    pub fn layout_requests(&self) -> Vec<LayoutRequest> { self.state.lock().layout_requests.clone() }

    pub fn notifications(&self) -> Vec<String> { self.state.lock().notifications.clone() }
}

impl ShortcutRegistrar for HeadlessHost {
    fn register_shortcut(&mut self, id: &str, description: &str, keybinding: &str) {
        let mut state = self.state.lock();
        let shortcut = Shortcut {
            id: id.to_string(),
            description: description.to_string(),
            keybinding: keybinding.to_string(),
        };
        match state.shortcuts.iter_mut().find(|s| s.id == id) {
            Some(existing) => *existing = shortcut,
            None => state.shortcuts.push(shortcut),
        }
    }
}

impl Host for HeadlessHost {
    fn active_window(&self) -> Option<WindowHandle> { self.state.lock().active }

    fn set_active_window(&mut self, handle: WindowHandle) {
        debug!(?handle, "activating window");
        self.state.lock().active = Some(handle);
    }

    fn windows(&self) -> Vec<(WindowHandle, WindowInfo)> {
        self.state.lock().windows.iter().map(|(h, info)| (*h, info.clone())).collect()
    }

    fn topology(&self) -> Topology { self.state.lock().topology }

    fn apply(&mut self, response: &EventResponse) {
        let mut state = self.state.lock();
        for arrangement in &response.arrangements {
            state.arrangements.insert(arrangement.surface, arrangement.clone());
        }
        state.layout_requests.extend(response.layout_requests.iter().cloned());
        if let Some(text) = &response.notification {
            info!(notification = %text, "notification");
            state.notifications.push(text.clone());
        }
    }
}
