use tracing::trace;

use crate::actor::reactor::Reactor;
use crate::model::ids::WindowHandle;
use crate::sys::host::WindowInfo;

pub struct WindowEventHandler;

impl WindowEventHandler {
    pub fn handle_window_added(reactor: &mut Reactor, handle: WindowHandle, info: WindowInfo) {
        reactor.with_engine(|engine| engine.add_window(handle, &info));
        reactor.window_manager.infos.insert(handle, info);
    }

    pub fn handle_window_removed(reactor: &mut Reactor, handle: WindowHandle) {
        if reactor.window_manager.infos.remove(&handle).is_none() {
            trace!(?handle, "removal of a window that was never reported");
        }
        reactor.with_engine(|engine| engine.remove_window(handle));
    }

    pub fn handle_window_activated(reactor: &mut Reactor, handle: Option<WindowHandle>) {
        if let Some(engine) = reactor.engine_mut() {
            engine.set_focused(handle);
        }
    }

    pub fn handle_window_maximized(
        reactor: &mut Reactor,
        handle: WindowHandle,
        horizontal: bool,
        vertical: bool,
    ) {
        reactor.with_engine(|engine| engine.set_maximized(handle, horizontal, vertical));
    }

    pub fn handle_window_minimized(reactor: &mut Reactor, handle: WindowHandle) {
        if let Some(info) = reactor.window_manager.infos.get_mut(&handle) {
            info.minimized = true;
        }
        reactor.with_engine(|engine| engine.minimize_window(handle));
    }

    pub fn handle_window_unminimized(reactor: &mut Reactor, handle: WindowHandle) {
        if let Some(info) = reactor.window_manager.infos.get_mut(&handle) {
            info.minimized = false;
        }
        reactor.with_engine(|engine| engine.unminimize_window(handle));
    }

    pub fn handle_window_dragged(reactor: &mut Reactor, handle: WindowHandle) {
        reactor.with_engine(|engine| engine.window_dragged(handle));
    }
}
