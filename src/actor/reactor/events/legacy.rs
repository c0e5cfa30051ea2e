use tracing::{debug, warn};

use crate::actor::reactor::{Event, Reactor, managers::Mode};

/// Routes events to the legacy handler when the native engine is off. The
/// assignment engine is never involved.
pub struct LegacyEventHandler;

impl LegacyEventHandler {
    pub fn forward(reactor: &mut Reactor, event: Event) {
        let Mode::Legacy(legacy) = &mut reactor.mode else {
            return;
        };
        let (store, bridge, host) = (&legacy.store, &mut legacy.bridge, &mut *reactor.host);
        match &event {
            Event::SurfaceChanged(_) => bridge.current_surface_changed(store, host),
            Event::SurfaceSetChanged(_) => bridge.surface_update(store, host),
            Event::Command(id) => {
                if !bridge.run_command(store, host, id) {
                    warn!(id, "no legacy command registered");
                }
            }
            Event::CollectGarbage => debug!("garbage collection is left to the legacy handler"),
            Event::Query(_) | Event::ConfigUpdated(_) => {}
            Event::WindowAdded(..)
            | Event::WindowRemoved(_)
            | Event::WindowActivated(_)
            | Event::WindowMaximized { .. }
            | Event::WindowMinimized(_)
            | Event::WindowUnminimized(_)
            | Event::WindowDragged(_) => bridge.window_event(store, host, &event),
        }
    }
}
