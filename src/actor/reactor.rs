//! The Reactor's job is to keep the host and the assignment state coherent.
//!
//! It takes lifecycle events and user commands from the host, routes them to
//! either the native [`AssignmentEngine`] or the legacy scripting bridge
//! (chosen once at startup), and hands the resulting arrangements back to the
//! host.

pub mod commands;
mod events;
mod managers;
mod query;
mod replay;

#[cfg(test)]
mod testing;

#[cfg(test)]
mod tests;

use std::thread;

use events::command::CommandEventHandler;
use events::legacy::LegacyEventHandler;
use events::space::SpaceEventHandler;
use events::window::WindowEventHandler;
use managers::Mode;
pub use query::{QueryRequest, ReactorQueryHandle};
pub use replay::{Record, replay};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, trace, warn};

use crate::actor;
use crate::actor::bridge::{LegacyHandler, ScriptingBridge};
use crate::common::collections::HashMap;
use crate::common::config::{Config, ConfigError};
use crate::layout_engine::{AssignmentEngine, EventResponse};
use crate::model::ids::{SurfaceId, WindowHandle};
use crate::model::store::PersistentStore;
use crate::sys::host::{Host, Topology, WindowInfo};

pub type Sender = actor::Sender<Event>;
type Receiver = actor::Receiver<Event>;

#[derive(Clone)]
pub struct ReactorHandle {
    sender: Sender,
    queries: ReactorQueryHandle,
}

impl ReactorHandle {
    pub fn new(sender: Sender, queries: ReactorQueryHandle) -> Self { Self { sender, queries } }

    pub fn sender(&self) -> Sender { self.sender.clone() }

    pub fn send(&self, event: Event) { self.sender.send(event) }
}

impl std::ops::Deref for ReactorHandle {
    type Target = ReactorQueryHandle;

    fn deref(&self) -> &Self::Target { &self.queries }
}

#[derive(Serialize, Deserialize, Debug)]
pub enum Event {
    /// The number of desktops or screens changed. Carries the new topology,
    /// including the surface that now has focus.
    SurfaceSetChanged(Topology),

    /// The user switched desktops or focus moved to another screen.
    SurfaceChanged(SurfaceId),

    /// A window appeared. The info is sampled at the time of the report.
    WindowAdded(WindowHandle, WindowInfo),

    /// A window went away. Hosts may report this more than once.
    WindowRemoved(WindowHandle),

    WindowActivated(Option<WindowHandle>),

    WindowMaximized {
        handle: WindowHandle,
        horizontal: bool,
        vertical: bool,
    },

    WindowMinimized(WindowHandle),

    WindowUnminimized(WindowHandle),

    /// The user finished dragging a window with the pointer.
    WindowDragged(WindowHandle),

    /// A shortcut from the command catalogue (or one registered by the legacy
    /// handler) was triggered.
    Command(String),

    /// Delete persisted window states nobody refers to anymore.
    CollectGarbage,

    #[serde(skip)]
    Query(QueryRequest),

    #[serde(skip)]
    ConfigUpdated(Config),
}

pub struct Reactor {
    pub config: Config,
    host: Box<dyn Host>,
    mode: Mode,
    window_manager: managers::WindowManager,
    recording_manager: managers::RecordingManager,
}

impl Reactor {
    /// Starts the event-dispatch thread with the reactor on it and returns a
    /// handle for sending events and queries. For hosts without a dispatch
    /// thread of their own; others drive [`Reactor::handle_event`] or
    /// [`Reactor::run`] directly. Events are handled one at a time on this
    /// thread, in the order they were sent.
    pub fn spawn(self) -> anyhow::Result<ReactorHandle> {
        let (events_tx, events) = actor::channel();
        let queries = ReactorQueryHandle::new(events_tx.clone());
        let runtime = tokio::runtime::Builder::new_current_thread().build()?;
        thread::Builder::new()
            .name("reactor".to_string())
            .spawn(move || runtime.block_on(Reactor::run(self, events)))?;
        Ok(ReactorHandle::new(events_tx, queries))
    }

    /// Builds the reactor and performs startup: configuration problems are
    /// reported, shortcuts registered and the host's current windows loaded.
    pub fn new(
        config: Config,
        store: PersistentStore,
        host: Box<dyn Host>,
        legacy_handler: Option<Box<dyn LegacyHandler>>,
        record: Record,
    ) -> Reactor {
        let mode = if config.settings.native_engine {
            Mode::Native(managers::LayoutManager {
                engine: AssignmentEngine::new(store, &config.settings),
            })
        } else {
            Mode::Legacy(managers::LegacyManager {
                store,
                bridge: ScriptingBridge::new(legacy_handler),
            })
        };
        let mut reactor = Reactor {
            config,
            host,
            mode,
            window_manager: managers::WindowManager { infos: HashMap::default() },
            recording_manager: managers::RecordingManager { record },
        };
        reactor.start();
        reactor
    }

    fn start(&mut self) {
        self.report_config_errors();
        if let Mode::Legacy(legacy) = &mut self.mode {
            legacy.bridge.init(&legacy.store, &mut *self.host);
            legacy.bridge.surface_update(&legacy.store, &mut *self.host);
            info!("native engine disabled; events go to the legacy handler");
            return;
        }
        let count = commands::register_all(&mut *self.host, &self.config.bindings);
        let topology = self.host.topology();
        let windows = self.host.windows();
        let active = self.host.active_window();
        self.with_engine(|engine| engine.set_topology(topology));
        self.with_engine(|engine| engine.load_existing(&windows));
        if let Some(engine) = self.engine_mut() {
            engine.set_focused(active);
        }
        info!(commands = count, windows = windows.len(), "native engine started");
        self.window_manager.infos.extend(windows);
    }

    fn report_config_errors(&self) {
        let errors = self
            .config
            .validate()
            .into_iter()
            .chain(commands::unknown_bindings(&self.config.bindings));
        for err in errors {
            match err {
                ConfigError::NoLayoutsEnabled => error!(%err, "configuration problem"),
                _ => warn!(%err, "configuration problem"),
            }
        }
    }

    pub fn is_native(&self) -> bool { matches!(self.mode, Mode::Native(_)) }

    pub fn engine(&self) -> Option<&AssignmentEngine> {
        match &self.mode {
            Mode::Native(layout) => Some(&layout.engine),
            Mode::Legacy(_) => None,
        }
    }

    fn engine_mut(&mut self) -> Option<&mut AssignmentEngine> {
        match &mut self.mode {
            Mode::Native(layout) => Some(&mut layout.engine),
            Mode::Legacy(_) => None,
        }
    }

    /// Runs `f` against the engine, then hands its response to the host.
    fn with_engine(&mut self, f: impl FnOnce(&mut AssignmentEngine) -> EventResponse) {
        let Some(engine) = self.engine_mut() else { return };
        let response = f(engine);
        self.apply(response);
    }

    fn apply(&mut self, response: EventResponse) {
        if response.is_empty() {
            return;
        }
        trace!(?response, "applying response");
        if let Some(text) = &response.notification {
            debug!(notification = %text, "showing notification");
        }
        self.host.apply(&response);
        if let Some(handle) = response.focus_window {
            self.host.set_active_window(handle);
        }
    }

    pub async fn run(mut reactor: Reactor, mut events: Receiver) {
        const MAX_EVENT_BATCH: usize = 64;

        while let Some((span, event)) = events.recv().await {
            let _guard = span.enter();
            reactor.handle_event(event);
            for _ in 1..MAX_EVENT_BATCH {
                let Ok((span, event)) = events.try_recv() else {
                    break;
                };
                let _guard = span.enter();
                reactor.handle_event(event);
            }
        }
        debug!("event channel closed; reactor stopping");
    }

    fn log_event(&self, event: &Event) {
        match event {
            Event::Query(..) => trace!(?event, "Event"),
            _ => debug!(?event, "Event"),
        }
    }

    #[instrument(name = "reactor::handle_event", skip(self), fields(event=?event))]
    pub fn handle_event(&mut self, event: Event) {
        self.log_event(&event);
        self.recording_manager.record.on_event(&event);

        match event {
            Event::Query(request) => self.handle_query_request(request),
            Event::ConfigUpdated(config) => CommandEventHandler::handle_config_updated(self, config),
            event if !self.is_native() => LegacyEventHandler::forward(self, event),
            Event::SurfaceSetChanged(topology) => {
                SpaceEventHandler::handle_surface_set_changed(self, topology)
            }
            Event::SurfaceChanged(surface) => {
                SpaceEventHandler::handle_surface_changed(self, surface)
            }
            Event::WindowAdded(handle, info) => {
                WindowEventHandler::handle_window_added(self, handle, info)
            }
            Event::WindowRemoved(handle) => WindowEventHandler::handle_window_removed(self, handle),
            Event::WindowActivated(handle) => {
                WindowEventHandler::handle_window_activated(self, handle)
            }
            Event::WindowMaximized { handle, horizontal, vertical } => {
                WindowEventHandler::handle_window_maximized(self, handle, horizontal, vertical)
            }
            Event::WindowMinimized(handle) => {
                WindowEventHandler::handle_window_minimized(self, handle)
            }
            Event::WindowUnminimized(handle) => {
                WindowEventHandler::handle_window_unminimized(self, handle)
            }
            Event::WindowDragged(handle) => WindowEventHandler::handle_window_dragged(self, handle),
            Event::Command(id) => CommandEventHandler::handle_command(self, &id),
            Event::CollectGarbage => CommandEventHandler::handle_collect_garbage(self),
        }
    }
}
