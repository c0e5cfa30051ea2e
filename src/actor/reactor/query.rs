use std::sync::mpsc::{RecvError, SyncSender, sync_channel};

use crate::actor::reactor::{Event, Reactor, Sender, managers::Mode};
use crate::model::ids::{SurfaceId, WindowHandle, WindowId};
use crate::model::server::{SurfaceData, WindowData};

#[derive(Clone)]
pub struct ReactorQueryHandle {
    tx: Sender,
}

impl ReactorQueryHandle {
    pub(super) fn new(tx: Sender) -> Self { Self { tx } }

    fn send_query<T>(
        &self,
        build: impl FnOnce(SyncSender<T>) -> QueryRequest,
    ) -> Result<T, RecvError> {
        let (tx, rx) = sync_channel(1);
        if self.tx.try_send(Event::Query(build(tx))).is_err() {
            return Err(RecvError);
        }
        rx.recv().map_err(|_| RecvError)
    }

    /// Managed windows in Window List order, optionally limited to those last
    /// shown on `surface`.
    pub fn query_windows(&self, surface: Option<SurfaceId>) -> Vec<WindowData> {
        self.send_query(|resp| QueryRequest::Windows { surface, resp })
            .unwrap_or_default()
    }

    pub fn query_window(&self, handle: WindowHandle) -> Option<WindowData> {
        self.send_query(|resp| QueryRequest::Window { handle, resp })
            .ok()
            .flatten()
    }

    pub fn query_surfaces(&self) -> Vec<SurfaceData> {
        self.send_query(QueryRequest::Surfaces).unwrap_or_default()
    }

    pub fn query_window_list(&self) -> Vec<WindowId> {
        self.send_query(QueryRequest::WindowList).unwrap_or_default()
    }
}

#[derive(Debug)]
pub enum QueryRequest {
    Windows {
        surface: Option<SurfaceId>,
        resp: SyncSender<Vec<WindowData>>,
    },
    Window {
        handle: WindowHandle,
        resp: SyncSender<Option<WindowData>>,
    },
    Surfaces(SyncSender<Vec<SurfaceData>>),
    WindowList(SyncSender<Vec<WindowId>>),
}

impl Reactor {
    pub(super) fn handle_query_request(&mut self, req: QueryRequest) {
        match req {
            QueryRequest::Windows { surface, resp } => {
                let _ = resp.send(self.windows(surface));
            }
            QueryRequest::Window { handle, resp } => {
                let data = self
                    .engine()
                    .and_then(|engine| engine.window_id(handle))
                    .and_then(|id| self.window_data(id));
                let _ = resp.send(data);
            }
            QueryRequest::Surfaces(resp) => {
                let _ = resp.send(self.surfaces());
            }
            QueryRequest::WindowList(resp) => {
                let _ = resp.send(self.window_list());
            }
        }
    }

    fn window_data(&self, id: WindowId) -> Option<WindowData> {
        let engine = self.engine()?;
        let window = engine.window(id)?;
        let topology = engine.topology();
        let info = self.window_manager.infos.get(&window.handle);
        Some(WindowData {
            id,
            handle: window.handle,
            group: window.group,
            surface: window.surface,
            mode: window.mode(),
            is_maximized: window.is_maximized(),
            is_focused: engine.focused() == Some(id),
            is_visible: topology
                .visible_surfaces()
                .filter(|surface| surface.desktop == window.surface.desktop)
                .any(|surface| engine.surface_group(surface) == Some(window.group)),
            class: info.map(|info| info.class.clone()),
            title: info.map(|info| info.title.clone()),
        })
    }

    pub fn windows(&self, surface: Option<SurfaceId>) -> Vec<WindowData> {
        self.window_list()
            .into_iter()
            .filter_map(|id| self.window_data(id))
            .filter(|data| surface.is_none_or(|surface| data.surface == surface))
            .collect()
    }

    pub fn surfaces(&self) -> Vec<SurfaceData> {
        let Some(engine) = self.engine() else {
            return Vec::new();
        };
        let current = engine.topology().current;
        engine
            .surfaces()
            .into_iter()
            .map(|surface| {
                let arrangement = engine.arrangement(surface);
                SurfaceData {
                    id: surface,
                    group: arrangement.group,
                    layout: arrangement.layout,
                    is_current: surface == current,
                    window_count: arrangement.tiled.len() + arrangement.floating.len(),
                }
            })
            .collect()
    }

    /// In legacy mode this is whatever the legacy handler last persisted.
    pub fn window_list(&self) -> Vec<WindowId> {
        match &self.mode {
            Mode::Native(layout) => layout.engine.window_list().to_vec(),
            Mode::Legacy(legacy) => legacy.store.window_list(),
        }
    }
}
