use tracing::debug;

use crate::actor::reactor::Reactor;
use crate::model::ids::SurfaceId;
use crate::sys::host::Topology;

pub struct SpaceEventHandler;

impl SpaceEventHandler {
    pub fn handle_surface_set_changed(reactor: &mut Reactor, topology: Topology) {
        debug!(
            desktops = topology.desktops,
            screens = topology.screens,
            current = %topology.current,
            "surface set changed"
        );
        reactor.with_engine(|engine| engine.set_topology(topology));
    }

    pub fn handle_surface_changed(reactor: &mut Reactor, surface: SurfaceId) {
        reactor.with_engine(|engine| engine.set_current_surface(surface));
    }
}
