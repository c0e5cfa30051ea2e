use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use super::{
    Direction, LayoutAction, LayoutKind, ManagedWindow, Step, WindowFlags, WindowMode,
    WindowRecord,
};
use crate::common::collections::{HashMap, HashSet};
use crate::common::config::{CompiledRules, Placement, Settings};
use crate::model::ids::{GroupId, MAX_GROUPS, SurfaceId, WindowHandle, WindowId};
use crate::model::registry::{self, IdentityRegistry};
use crate::model::store::{PersistentStore, StoreError};
use crate::sys::host::{Topology, WindowInfo};

/// Key of the active layout kind inside a surface's layout state blob.
const LAYOUT_KEY: &str = "layout";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum LayoutCommand {
    FocusOrder(Step),
    MoveOrder(Step),
    MoveToSurface(Direction),
    ToggleFloating,
    PushToMaster,
    CycleLayout(Step),
    ToggleLayout(LayoutKind),
    SwapGroupToSurface(GroupId),
    AssignWindowToGroup(GroupId),
    Layout(LayoutAction),
}

/// What one surface should show.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Arrangement {
    pub surface: SurfaceId,
    pub group: Option<GroupId>,
    pub layout: LayoutKind,
    /// Windows for the layout strategy to place, in Window List order.
    pub tiled: Vec<WindowHandle>,
    /// Floating and maximized windows of the shown group.
    pub floating: Vec<WindowHandle>,
    /// Windows last shown here whose group is not swapped in.
    pub hidden: Vec<WindowHandle>,
}

/// A layout action addressed to the strategy active on `surface`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LayoutRequest {
    pub surface: SurfaceId,
    pub layout: LayoutKind,
    pub window: Option<WindowHandle>,
    pub action: LayoutAction,
}

#[must_use]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventResponse {
    pub arrangements: Vec<Arrangement>,
    pub focus_window: Option<WindowHandle>,
    pub layout_requests: Vec<LayoutRequest>,
    /// Short text for an on-screen notification.
    pub notification: Option<String>,
}

impl EventResponse {
    pub fn is_empty(&self) -> bool { *self == EventResponse::default() }
}

#[derive(Debug, Clone, Default)]
struct SurfaceState {
    group: Option<GroupId>,
    /// Index into the enabled layouts. Always in range.
    layout: usize,
    previous_layout: Option<usize>,
}

/// Owns window→group, window→surface and surface→group/layout, and writes
/// every change through to the persistent store.
///
/// Persistence failures are logged and never returned: the in-memory state
/// stays authoritative and the previous documents stay on disk.
#[derive(Debug)]
pub struct AssignmentEngine {
    store: PersistentStore,
    registry: IdentityRegistry,
    rules: CompiledRules,
    untile_by_dragging: bool,
    layouts: Vec<LayoutKind>,
    windows: HashMap<WindowId, ManagedWindow>,
    window_list: Vec<WindowId>,
    surfaces: HashMap<SurfaceId, SurfaceState>,
    topology: Topology,
    focused: Option<WindowId>,
}

fn report(result: Result<(), StoreError>) {
    if let Err(err) = result {
        let cause = std::error::Error::source(&err).map(ToString::to_string);
        warn!(%err, ?cause, "persisting state failed; previous document kept");
    }
}

fn load_surface(store: &PersistentStore, layouts: &[LayoutKind], surface: SurfaceId) -> SurfaceState {
    let layout = store
        .layout_state(surface)
        .get(LAYOUT_KEY)
        .and_then(Value::as_str)
        .and_then(|name| name.parse::<LayoutKind>().ok())
        .and_then(|kind| layouts.iter().position(|k| *k == kind))
        .unwrap_or(0);
    SurfaceState {
        group: store.surface_group(surface),
        layout,
        previous_layout: None,
    }
}

impl AssignmentEngine {
    pub fn new(store: PersistentStore, settings: &Settings) -> Self {
        let persisted = store.window_state_ids().into_iter().chain(store.window_list());
        AssignmentEngine {
            registry: IdentityRegistry::seeded(persisted),
            store,
            rules: settings.compile_rules(),
            untile_by_dragging: settings.untile_by_dragging,
            layouts: settings.layouts.effective(),
            windows: HashMap::default(),
            window_list: Vec::new(),
            surfaces: HashMap::default(),
            topology: Topology::default(),
            focused: None,
        }
    }

    pub fn store(&self) -> &PersistentStore { &self.store }

    pub fn topology(&self) -> Topology { self.topology }

    pub fn enabled_layouts(&self) -> &[LayoutKind] { &self.layouts }

    pub fn window_list(&self) -> &[WindowId] { &self.window_list }

    pub fn window(&self, id: WindowId) -> Option<&ManagedWindow> { self.windows.get(&id) }

    pub fn window_id(&self, handle: WindowHandle) -> Option<WindowId> {
        self.registry.lookup(handle)
    }

    pub fn window_mode(&self, handle: WindowHandle) -> WindowMode {
        self.window_id(handle)
            .and_then(|id| self.windows.get(&id))
            .map_or(WindowMode::Unmanaged, ManagedWindow::mode)
    }

    /// Live windows in Window List order.
    pub fn windows(&self) -> impl Iterator<Item = (WindowId, &ManagedWindow)> {
        self.window_list.iter().filter_map(|id| self.windows.get(id).map(|w| (*id, w)))
    }

    pub fn focused(&self) -> Option<WindowId> { self.focused }

    pub fn surface_group(&self, surface: SurfaceId) -> Option<GroupId> {
        self.surfaces.get(&surface).and_then(|s| s.group)
    }

    /// Surfaces the engine currently tracks, sorted.
    pub fn surfaces(&self) -> Vec<SurfaceId> {
        let mut surfaces: Vec<_> = self.surfaces.keys().copied().collect();
        surfaces.sort();
        surfaces
    }

    pub fn layout(&self, surface: SurfaceId) -> LayoutKind {
        let index = self.surfaces.get(&surface).map_or(0, |s| s.layout);
        self.layouts
            .get(index)
            .or_else(|| self.layouts.first())
            .copied()
            .unwrap_or(LayoutKind::Tile)
    }

    /// Applies changed settings. The layout of every surface is kept if it is
    /// still enabled, otherwise its index is clamped.
    pub fn apply_settings(&mut self, settings: &Settings) -> EventResponse {
        self.rules = settings.compile_rules();
        self.untile_by_dragging = settings.untile_by_dragging;
        let layouts = settings.layouts.effective();
        let old = std::mem::take(&mut self.layouts);
        let position = |index: usize| old.get(index).and_then(|k| layouts.iter().position(|n| n == k));
        for state in self.surfaces.values_mut() {
            state.layout = position(state.layout).unwrap_or(state.layout.min(layouts.len() - 1));
            state.previous_layout = state.previous_layout.and_then(position);
        }
        self.layouts = layouts;
        self.respond_visible()
    }

    fn surface_mut(&mut self, surface: SurfaceId) -> &mut SurfaceState {
        self.surfaces
            .entry(surface)
            .or_insert_with(|| load_surface(&self.store, &self.layouts, surface))
    }

    fn load_desktop(&mut self, desktop: u32) {
        for screen in 0..self.topology.screens {
            self.surface_mut(SurfaceId::new(desktop, screen));
        }
    }

    /// The group shown on `surface`, assigning and persisting a default one if
    /// nothing was ever swapped in. The default skips groups any other known
    /// surface already shows.
    fn ensure_group(&mut self, surface: SurfaceId) -> GroupId {
        if let Some(group) = self.surface_mut(surface).group {
            return group;
        }
        self.load_desktop(surface.desktop);
        let taken: HashSet<GroupId> = self
            .surfaces
            .iter()
            .filter(|(s, _)| **s != surface)
            .filter_map(|(_, state)| state.group)
            .collect();
        let mut group = surface.default_group();
        for _ in 0..MAX_GROUPS {
            if !taken.contains(&group) {
                break;
            }
            group = group.next();
        }
        self.surface_mut(surface).group = Some(group);
        info!(%surface, %group, "assigned default group");
        self.persist_surface_group(surface);
        group
    }

    fn surface_showing(&self, group: GroupId, desktop: u32) -> Option<SurfaceId> {
        self.surfaces
            .iter()
            .filter(|(s, state)| s.desktop == desktop && state.group == Some(group))
            .map(|(s, _)| *s)
            .min()
    }

    /// Where the window is on screen, or last was.
    fn displayed_surface(&self, window: &ManagedWindow) -> SurfaceId {
        self.surface_showing(window.group, window.surface.desktop)
            .unwrap_or(window.surface)
    }

    fn focused_surface(&self) -> SurfaceId {
        self.focused
            .and_then(|id| self.windows.get(&id))
            .map_or(self.topology.current, |w| self.displayed_surface(w))
    }

    /// Surfaces whose arrangement depends on `id`.
    fn affected(&self, id: WindowId) -> Vec<SurfaceId> {
        let Some(window) = self.windows.get(&id) else {
            return Vec::new();
        };
        let mut surfaces = vec![window.surface];
        surfaces.extend(
            self.topology
                .visible_surfaces()
                .filter(|s| s.desktop == window.surface.desktop)
                .filter(|s| self.surface_group(*s) == Some(window.group)),
        );
        surfaces
    }

    pub fn arrangement(&self, surface: SurfaceId) -> Arrangement {
        let group = self.surface_group(surface);
        let mut arrangement = Arrangement {
            surface,
            group,
            layout: self.layout(surface),
            tiled: Vec::new(),
            floating: Vec::new(),
            hidden: Vec::new(),
        };
        // Windows only ever appear on their own desktop.
        for (_, window) in self.windows().filter(|(_, w)| w.surface.desktop == surface.desktop) {
            if Some(window.group) == group {
                match window.mode() {
                    WindowMode::Minimized => {}
                    _ if window.is_tiled() => arrangement.tiled.push(window.handle),
                    _ => arrangement.floating.push(window.handle),
                }
            } else if window.surface == surface {
                arrangement.hidden.push(window.handle);
            }
        }
        arrangement
    }

    fn respond(&self, surfaces: impl IntoIterator<Item = SurfaceId>) -> EventResponse {
        let mut seen = HashSet::default();
        let arrangements = surfaces
            .into_iter()
            .filter(|s| seen.insert(*s))
            .map(|s| self.arrangement(s))
            .collect();
        EventResponse { arrangements, ..Default::default() }
    }

    fn respond_visible(&self) -> EventResponse { self.respond(self.topology.visible_surfaces()) }

    fn persist_window_list(&self) { report(self.store.put_window_list(&self.window_list)); }

    fn persist_windows(&self, ids: &[WindowId]) {
        let windows = &self.windows;
        report(self.store.update_window_states(ids, |id, blob| {
            if let Some(window) = windows.get(&id) {
                window.record().merge_into(blob);
            }
        }));
    }

    fn persist_surface_group(&self, surface: SurfaceId) {
        report(self.store.set_surface_group(surface, self.surface_group(surface)));
    }

    fn persist_layout(&self, surface: SurfaceId) {
        let mut blob = self.store.layout_state(surface);
        if !blob.is_object() {
            blob = Value::Object(Map::new());
        }
        if let Some(map) = blob.as_object_mut() {
            map.insert(LAYOUT_KEY.to_string(), Value::from(self.layout(surface).to_string()));
        }
        report(self.store.put_layout_state(surface, blob));
    }

    /// The host reported a new desktop/screen configuration.
    ///
    /// Surfaces that disappear are dropped from memory only; their persisted
    /// group and layout come back if they reappear.
    pub fn set_topology(&mut self, topology: Topology) -> EventResponse {
        self.topology = topology;
        self.surfaces.retain(|surface, _| topology.contains(*surface));
        for surface in topology.surfaces() {
            self.surface_mut(surface);
        }
        debug!(?topology, "topology updated");
        self.respond_visible()
    }

    pub fn set_current_surface(&mut self, surface: SurfaceId) -> EventResponse {
        if !self.topology.contains(surface) {
            debug!(%surface, "current surface outside the known topology");
            return EventResponse::default();
        }
        self.topology.current = surface;
        self.ensure_group(surface);
        self.respond_visible()
    }

    pub fn add_window(&mut self, handle: WindowHandle, info: &WindowInfo) -> EventResponse {
        let Some(id) = self.manage(handle, info) else {
            return EventResponse::default();
        };
        self.persist_window_list();
        self.respond(self.affected(id))
    }

    /// Starts tracking a window and writes its state. The Window List is only
    /// updated in memory.
    fn manage(&mut self, handle: WindowHandle, info: &WindowInfo) -> Option<WindowId> {
        let id = self.registry.resolve(handle, info.host_id);
        if self.windows.contains_key(&id) {
            debug!(?handle, %id, "window already managed");
            return None;
        }
        // A fresh ephemeral id has no history; anything stored under it was
        // written by someone else.
        let record = if registry::is_ephemeral(id) && info.host_id != Some(id.get()) {
            WindowRecord::default()
        } else {
            WindowRecord::from_blob(id, &self.store.window_state(id))
        };
        let initial = info.surface();
        let (group, surface) = match record.group {
            Some(group) => {
                let surface = self
                    .surface_showing(group, initial.desktop)
                    .or(record.surface.filter(|s| {
                        s.desktop == initial.desktop && self.topology.contains(*s)
                    }))
                    .unwrap_or(initial);
                (group, surface)
            }
            None => (self.ensure_group(initial), initial),
        };

        let mut flags = WindowFlags::empty();
        match self.rules.classify(info) {
            Placement::Tile => flags.set(WindowFlags::FLOATING, record.floating),
            Placement::Float => flags.insert(WindowFlags::FLOATING),
            Placement::Ignore => {
                debug!(?handle, class = %info.class, "window matches an ignore rule");
                flags.insert(WindowFlags::FLOATING | WindowFlags::IGNORED);
            }
        }
        flags.set(WindowFlags::MINIMIZED, info.minimized);

        let window = ManagedWindow::new(handle, group, surface, flags);
        debug!(?handle, %id, %group, %surface, mode = ?window.mode(), "window added");
        self.windows.insert(id, window);
        if !self.window_list.contains(&id) {
            self.window_list.push(id);
        }
        self.persist_windows(&[id]);
        Some(id)
    }

    /// Stops tracking a window. Unknown handles are ignored, so duplicate
    /// notifications are harmless. The persisted window state is kept until
    /// [`collect_garbage`](Self::collect_garbage).
    pub fn remove_window(&mut self, handle: WindowHandle) -> EventResponse {
        let Some(id) = self.registry.forget(handle) else {
            debug!(?handle, "removal of unknown window ignored");
            return EventResponse::default();
        };
        let affected = self.affected(id);
        self.windows.remove(&id);
        self.window_list.retain(|w| *w != id);
        if self.focused == Some(id) {
            self.focused = None;
        }
        debug!(?handle, %id, "window removed");
        self.persist_window_list();
        self.respond(affected)
    }

    /// Reconciles with the windows the host already has, at startup.
    ///
    /// Windows are ordered by the persisted Window List; persisted ids that
    /// are not live are dropped from it.
    pub fn load_existing(&mut self, windows: &[(WindowHandle, WindowInfo)]) -> EventResponse {
        let persisted = self.store.window_list();
        for (handle, info) in windows {
            self.manage(*handle, info);
        }
        let rank: HashMap<WindowId, usize> =
            persisted.iter().enumerate().map(|(index, id)| (*id, index)).collect();
        self.window_list.sort_by_key(|id| rank.get(id).copied().unwrap_or(usize::MAX));
        let stale = persisted.iter().filter(|id| !self.windows.contains_key(id)).count();
        if stale > 0 {
            info!(stale, "dropping windows that no longer exist from the window list");
        }
        self.persist_window_list();
        self.respond_visible()
    }

    fn update_window(
        &mut self,
        handle: WindowHandle,
        f: impl FnOnce(&mut ManagedWindow) -> bool,
    ) -> EventResponse {
        match self.registry.lookup(handle) {
            Some(id) => self.update_window_id(id, f),
            None => {
                debug!(?handle, "event for unknown window ignored");
                EventResponse::default()
            }
        }
    }

    fn update_window_id(
        &mut self,
        id: WindowId,
        f: impl FnOnce(&mut ManagedWindow) -> bool,
    ) -> EventResponse {
        let Some(window) = self.windows.get_mut(&id) else {
            return EventResponse::default();
        };
        if !f(window) {
            return EventResponse::default();
        }
        self.persist_windows(&[id]);
        self.respond(self.affected(id))
    }

    pub fn minimize_window(&mut self, handle: WindowHandle) -> EventResponse {
        self.update_window(handle, ManagedWindow::minimize)
    }

    pub fn unminimize_window(&mut self, handle: WindowHandle) -> EventResponse {
        self.update_window(handle, ManagedWindow::unminimize)
    }

    pub fn set_maximized(
        &mut self,
        handle: WindowHandle,
        horizontal: bool,
        vertical: bool,
    ) -> EventResponse {
        self.update_window(handle, |w| w.set_maximized(horizontal, vertical))
    }

    /// A window was moved by the user. Tiled windows come out of the layout
    /// if untiling by dragging is enabled.
    pub fn window_dragged(&mut self, handle: WindowHandle) -> EventResponse {
        if !self.untile_by_dragging {
            return EventResponse::default();
        }
        self.update_window(handle, ManagedWindow::untile)
    }

    /// Follows the host's active window. Unknown handles clear the focus.
    pub fn set_focused(&mut self, handle: Option<WindowHandle>) {
        self.focused = handle
            .and_then(|h| self.registry.lookup(h))
            .filter(|id| self.windows.contains_key(id));
    }

    /// Moves focus to the adjacent Window List entry, wrapping at both ends.
    /// Without a focused window, Next picks the first entry and Previous the last.
    pub fn focus_window_by_order(&mut self, step: Step) -> Option<WindowId> {
        let len = self.window_list.len();
        if len == 0 {
            return None;
        }
        let current = self.focused.and_then(|f| self.window_list.iter().position(|id| *id == f));
        let index = match (current, step) {
            (Some(index), step) => step.apply(index, len),
            (None, Step::Next) => 0,
            (None, Step::Previous) => len - 1,
        };
        let id = *self.window_list.get(index)?;
        self.focused = Some(id);
        Some(id)
    }

    /// Shows `group` on `surface`. If another surface of the same desktop was
    /// showing `group`, it takes over the group `surface` had before.
    pub fn swap_group_to_surface(&mut self, group: GroupId, surface: SurfaceId) -> EventResponse {
        self.load_desktop(surface.desktop);
        let previous = self.surface_mut(surface).group;
        if previous == Some(group) {
            return self.respond([surface]);
        }
        let holder = self
            .surfaces
            .iter()
            .filter(|(s, state)| {
                **s != surface && s.desktop == surface.desktop && state.group == Some(group)
            })
            .map(|(s, _)| *s)
            .min();

        let mut moved = self.retarget_group(group, surface);
        self.surface_mut(surface).group = Some(group);
        self.persist_surface_group(surface);
        if let Some(holder) = holder {
            self.surface_mut(holder).group = previous;
            self.persist_surface_group(holder);
            if let Some(previous) = previous {
                moved.extend(self.retarget_group(previous, holder));
            }
        }
        self.persist_windows(&moved);
        info!(%group, %surface, ?holder, "group swapped in");

        let mut response = self.respond(std::iter::once(surface).chain(holder));
        response.notification = Some(format!("Group {group}"));
        response
    }

    fn retarget_group(&mut self, group: GroupId, surface: SurfaceId) -> Vec<WindowId> {
        self.windows
            .iter_mut()
            .filter(|(_, w)| w.group == group && w.surface != surface)
            .map(|(id, w)| {
                w.surface = surface;
                *id
            })
            .collect()
    }

    /// Moves a window to another group. If no surface of its desktop shows the
    /// new group, the window is hidden until the group is swapped in.
    pub fn change_window_group(&mut self, id: WindowId, group: GroupId) -> EventResponse {
        let Some(window) = self.windows.get(&id) else {
            debug!(%id, "group change for unknown window ignored");
            return EventResponse::default();
        };
        if window.group == group {
            return EventResponse::default();
        }
        let target = self.surface_showing(group, window.surface.desktop);
        let mut surfaces = self.affected(id);
        if let Some(window) = self.windows.get_mut(&id) {
            window.group = group;
            if let Some(target) = target {
                window.surface = target;
            }
        }
        surfaces.extend(target);
        self.persist_windows(&[id]);
        debug!(%id, %group, ?target, "window group changed");
        self.respond(surfaces)
    }

    /// Moves a window to the neighbouring surface; it joins that surface's group.
    pub fn move_window_to_surface(&mut self, id: WindowId, direction: Direction) -> EventResponse {
        let Some(window) = self.windows.get(&id) else {
            return EventResponse::default();
        };
        let from = self.displayed_surface(window);
        let Some(target) = self.topology.neighbor(from, direction) else {
            debug!(%from, ?direction, "no surface in that direction");
            return EventResponse::default();
        };
        let group = self.ensure_group(target);
        let mut surfaces = self.affected(id);
        if let Some(window) = self.windows.get_mut(&id) {
            window.group = group;
            window.surface = target;
        }
        surfaces.push(target);
        self.persist_windows(&[id]);
        self.respond(surfaces)
    }

    /// Window List indices of the tiled windows sharing `id`'s group.
    fn tiled_peers(&self, id: WindowId) -> Vec<usize> {
        let Some(group) = self.windows.get(&id).map(|w| w.group) else {
            return Vec::new();
        };
        self.window_list
            .iter()
            .enumerate()
            .filter(|(_, id)| self.windows.get(*id).is_some_and(|w| w.group == group && w.is_tiled()))
            .map(|(index, _)| index)
            .collect()
    }

    pub fn move_window_by_order(&mut self, id: WindowId, step: Step) -> EventResponse {
        let peers = self.tiled_peers(id);
        let Some(pos) = peers.iter().position(|&index| self.window_list[index] == id) else {
            return EventResponse::default();
        };
        if peers.len() < 2 {
            return EventResponse::default();
        }
        self.window_list.swap(peers[pos], peers[step.apply(pos, peers.len())]);
        self.persist_window_list();
        self.respond(self.affected(id))
    }

    /// Moves a window ahead of every other tiled window of its group.
    pub fn push_to_master(&mut self, id: WindowId) -> EventResponse {
        let peers = self.tiled_peers(id);
        let (Some(&first), Some(&current)) =
            (peers.first(), peers.iter().find(|&&index| self.window_list[index] == id))
        else {
            return EventResponse::default();
        };
        if first == current {
            return EventResponse::default();
        }
        let id = self.window_list.remove(current);
        self.window_list.insert(first, id);
        self.persist_window_list();
        self.respond(self.affected(id))
    }

    pub fn cycle_layout(&mut self, surface: SurfaceId, step: Step) -> EventResponse {
        let len = self.layouts.len();
        let state = self.surface_mut(surface);
        state.previous_layout = Some(state.layout);
        state.layout = step.apply(state.layout, len);
        self.layout_changed(surface)
    }

    /// Switches to `kind`, or back to the previous layout if `kind` is active.
    pub fn toggle_layout(&mut self, surface: SurfaceId, kind: LayoutKind) -> EventResponse {
        let Some(target) = self.layouts.iter().position(|k| *k == kind) else {
            debug!(layout = %kind, "toggled layout is not enabled");
            return EventResponse::default();
        };
        let state = self.surface_mut(surface);
        if state.layout != target {
            state.previous_layout = Some(state.layout);
            state.layout = target;
        } else {
            match state.previous_layout {
                Some(previous) if previous != target => {
                    state.layout = previous;
                    state.previous_layout = Some(target);
                }
                _ => return EventResponse::default(),
            }
        }
        self.layout_changed(surface)
    }

    fn layout_changed(&mut self, surface: SurfaceId) -> EventResponse {
        self.persist_layout(surface);
        let layout = self.layout(surface);
        info!(%surface, %layout, "layout changed");
        let mut response = self.respond([surface]);
        response.notification = Some(layout.to_string());
        response
    }

    pub fn layout_action(&mut self, action: LayoutAction) -> EventResponse {
        let surface = self.focused_surface();
        let request = LayoutRequest {
            surface,
            layout: self.layout(surface),
            window: self.focused.and_then(|id| self.windows.get(&id)).map(|w| w.handle),
            action,
        };
        let mut response = self.respond([surface]);
        response.layout_requests.push(request);
        response
    }

    fn with_focused(
        &mut self,
        f: impl FnOnce(&mut Self, WindowId) -> EventResponse,
    ) -> EventResponse {
        match self.focused {
            Some(id) if self.windows.contains_key(&id) => f(self, id),
            _ => {
                debug!("command needs a focused window");
                EventResponse::default()
            }
        }
    }

    pub fn handle_command(&mut self, command: LayoutCommand) -> EventResponse {
        debug!(?command, "handling command");
        let surface = self.focused_surface();
        match command {
            LayoutCommand::FocusOrder(step) => {
                let focus_window = self
                    .focus_window_by_order(step)
                    .and_then(|id| self.windows.get(&id))
                    .map(|w| w.handle);
                EventResponse { focus_window, ..Default::default() }
            }
            LayoutCommand::MoveOrder(step) => {
                self.with_focused(|this, id| this.move_window_by_order(id, step))
            }
            LayoutCommand::MoveToSurface(direction) => {
                self.with_focused(|this, id| this.move_window_to_surface(id, direction))
            }
            LayoutCommand::ToggleFloating => self
                .with_focused(|this, id| this.update_window_id(id, ManagedWindow::toggle_floating)),
            LayoutCommand::PushToMaster => self.with_focused(Self::push_to_master),
            LayoutCommand::CycleLayout(step) => self.cycle_layout(surface, step),
            LayoutCommand::ToggleLayout(kind) => self.toggle_layout(surface, kind),
            LayoutCommand::SwapGroupToSurface(group) => {
                self.swap_group_to_surface(group, self.topology.current)
            }
            LayoutCommand::AssignWindowToGroup(group) => {
                self.with_focused(|this, id| this.change_window_group(id, group))
            }
            LayoutCommand::Layout(action) => self.layout_action(action),
        }
    }

    /// Deletes persisted window states whose ids are neither live nor in the
    /// Window List. Returns how many were removed.
    pub fn collect_garbage(&mut self) -> usize {
        let mut keep: HashSet<WindowId> = self.windows.keys().copied().collect();
        keep.extend(self.window_list.iter().copied());
        keep.extend(self.store.window_list());
        match self.store.retain_window_states(|id| keep.contains(&id)) {
            Ok(removed) => {
                info!(removed, "collected stale window states");
                removed
            }
            Err(err) => {
                report(Err(err));
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::model::store::{DocumentKind, MemoryBackend};

    fn test_engine() -> AssignmentEngine { engine_with(PersistentStore::in_memory()) }

    fn engine_with(store: PersistentStore) -> AssignmentEngine {
        let mut engine = AssignmentEngine::new(store, &Settings::default());
        let _ = engine.set_topology(Topology::new(2, 2));
        engine
    }

    fn info(screen: u32) -> WindowInfo {
        WindowInfo {
            class: "konsole".to_string(),
            screen,
            ..WindowInfo::default()
        }
    }

    fn add(engine: &mut AssignmentEngine, raw: u64) -> WindowId {
        let handle = WindowHandle::new(raw);
        let _ = engine.add_window(handle, &info(0));
        engine.window_id(handle).unwrap()
    }

    fn group(raw: i64) -> GroupId { GroupId::new(raw).unwrap() }

    const ORIGIN: SurfaceId = SurfaceId::new(0, 0);

    #[test]
    fn window_list_never_holds_duplicates() {
        let mut engine = test_engine();
        let handle = WindowHandle::new(1);
        let _ = engine.add_window(handle, &info(0));
        let _ = engine.add_window(handle, &info(0));
        assert_eq!(engine.window_list().len(), 1);

        let _ = engine.remove_window(handle);
        let second = engine.remove_window(handle);
        assert!(second.is_empty());
        assert!(engine.window_list().is_empty());
        assert!(engine.store().window_list().is_empty());

        let _ = engine.add_window(handle, &info(0));
        let _ = engine.add_window(WindowHandle::new(2), &info(0));
        assert_eq!(engine.window_list().len(), 2);
    }

    #[test]
    fn add_window_persists_state_and_list() {
        let mut engine = test_engine();
        let id = add(&mut engine, 1);
        assert_eq!(engine.store().window_list(), vec![id]);
        assert_eq!(
            engine.store().window_state(id),
            json!({
                "group": 1,
                "surface": "0:0",
                "floating": false,
                "minimized": false,
                "maximized": false,
            })
        );
        assert_eq!(engine.store().surface_group(ORIGIN), Some(GroupId::FIRST));
    }

    #[test]
    fn default_groups_differ_between_screens_of_a_desktop() {
        let mut engine = test_engine();
        let _ = engine.add_window(WindowHandle::new(1), &info(0));
        let _ = engine.add_window(WindowHandle::new(2), &info(1));
        assert_eq!(engine.surface_group(ORIGIN), Some(group(1)));
        assert_eq!(engine.surface_group(SurfaceId::new(0, 1)), Some(group(2)));

        // Screen 1 would default to group 2 but it is already taken there.
        let store = PersistentStore::in_memory();
        store.set_surface_group(ORIGIN, Some(group(2))).unwrap();
        let mut engine = engine_with(store);
        let _ = engine.add_window(WindowHandle::new(1), &info(1));
        assert_eq!(engine.surface_group(SurfaceId::new(0, 1)), Some(group(3)));
    }

    #[test]
    fn default_groups_are_unique_across_desktops() {
        let mut engine = AssignmentEngine::new(PersistentStore::in_memory(), &Settings::default());
        let _ = engine.set_topology(Topology::new(5, 1));
        let _ = add(&mut engine, 1);
        let far = SurfaceId::new(4, 0);
        let response = engine.set_current_surface(far);
        assert_eq!(engine.surface_group(far), Some(group(2)));
        assert!(response.arrangements[0].tiled.is_empty());
        assert!(engine.arrangement(far).hidden.is_empty());

        let groups: HashSet<_> = (0..5)
            .map(|desktop| {
                let _ = engine.set_current_surface(SurfaceId::new(desktop, 0));
                engine.surface_group(SurfaceId::new(desktop, 0))
            })
            .collect();
        assert_eq!(groups.len(), 5);
    }

    #[test]
    fn a_group_shown_on_two_desktops_keeps_windows_apart() {
        let store = PersistentStore::in_memory();
        let far = SurfaceId::new(4, 0);
        store.set_surface_group(ORIGIN, Some(group(3))).unwrap();
        store.set_surface_group(far, Some(group(3))).unwrap();
        let mut engine = AssignmentEngine::new(store, &Settings::default());
        let _ = engine.set_topology(Topology::new(5, 1));
        let id = add(&mut engine, 1);

        assert_eq!(engine.window(id).unwrap().group, group(3));
        assert_eq!(engine.arrangement(ORIGIN).tiled, vec![WindowHandle::new(1)]);
        assert!(engine.arrangement(far).tiled.is_empty());
        let _ = engine.set_current_surface(far);
        assert!(engine.arrangement(far).tiled.is_empty());
    }

    #[test]
    fn swap_is_persisted_for_every_group() {
        let store = PersistentStore::in_memory();
        let mut engine = engine_with(store.clone());
        for g in GroupId::all() {
            let _ = engine.swap_group_to_surface(g, ORIGIN);
            assert_eq!(store.surface_group(ORIGIN), Some(g));
        }
        let doc = store.document(DocumentKind::SurfaceGroups);
        assert_eq!(doc.get("Surfaces"), Some(&json!({ "0:0": { "group": 20 } })));
    }

    #[test]
    fn swap_exchanges_with_the_other_screen() {
        let mut engine = test_engine();
        let left = add(&mut engine, 1);
        let _ = engine.add_window(WindowHandle::new(2), &info(1));
        let right = engine.window_id(WindowHandle::new(2)).unwrap();
        let screen1 = SurfaceId::new(0, 1);

        let response = engine.swap_group_to_surface(group(2), ORIGIN);
        assert_eq!(engine.surface_group(ORIGIN), Some(group(2)));
        assert_eq!(engine.surface_group(screen1), Some(group(1)));
        assert_eq!(engine.store().surface_group(screen1), Some(group(1)));
        assert_eq!(engine.window(left).unwrap().surface, screen1);
        assert_eq!(engine.window(right).unwrap().surface, ORIGIN);
        assert_eq!(response.arrangements.len(), 2);
        assert_eq!(response.arrangements[0].tiled, vec![WindowHandle::new(2)]);
        assert_eq!(response.arrangements[1].tiled, vec![WindowHandle::new(1)]);
        assert_eq!(response.notification.as_deref(), Some("Group 2"));
    }

    #[test]
    fn swapped_out_windows_are_hidden_not_removed() {
        let mut engine = test_engine();
        let _ = add(&mut engine, 1);
        let response = engine.swap_group_to_surface(group(5), ORIGIN);
        let arrangement = &response.arrangements[0];
        assert!(arrangement.tiled.is_empty());
        assert_eq!(arrangement.hidden, vec![WindowHandle::new(1)]);
        assert_eq!(engine.window_list().len(), 1);

        let response = engine.swap_group_to_surface(group(1), ORIGIN);
        assert_eq!(response.arrangements[0].tiled, vec![WindowHandle::new(1)]);
    }

    #[test]
    fn assignment_scenario() {
        let mut engine = test_engine();
        let id1 = add(&mut engine, 1);
        let id2 = add(&mut engine, 2);
        assert_eq!(engine.window_list(), &[id1, id2]);

        let _ = engine.swap_group_to_surface(group(3), ORIGIN);
        let response = engine.change_window_group(id1, group(3));
        assert_eq!(engine.store().surface_group(ORIGIN), Some(group(3)));
        let arrangement = response.arrangements.iter().find(|a| a.surface == ORIGIN).unwrap();
        assert_eq!(arrangement.tiled, vec![WindowHandle::new(1)]);
        assert_eq!(arrangement.hidden, vec![WindowHandle::new(2)]);

        let _ = engine.remove_window(WindowHandle::new(1));
        assert_eq!(engine.window_list(), &[id2]);
        assert_eq!(engine.store().window_list(), vec![id2]);
        assert_eq!(engine.store().window_state(id1)["group"], json!(3));
    }

    #[test]
    fn change_group_without_a_showing_surface_hides_the_window() {
        let mut engine = test_engine();
        let id = add(&mut engine, 1);
        let response = engine.change_window_group(id, group(9));
        assert_eq!(engine.window(id).unwrap().surface, ORIGIN);
        assert_eq!(response.arrangements[0].hidden, vec![WindowHandle::new(1)]);
        assert!(engine.change_window_group(id, group(9)).is_empty());
        assert!(engine.change_window_group(WindowId::new(77), group(9)).is_empty());

        let response = engine.swap_group_to_surface(group(9), ORIGIN);
        assert_eq!(response.arrangements[0].tiled, vec![WindowHandle::new(1)]);
    }

    #[test]
    fn cycle_layout_returns_after_a_full_cycle() {
        let mut engine = test_engine();
        let start = engine.layout(ORIGIN);
        let count = engine.enabled_layouts().len();
        for _ in 0..count {
            let _ = engine.cycle_layout(ORIGIN, Step::Next);
        }
        assert_eq!(engine.layout(ORIGIN), start);

        let response = engine.cycle_layout(ORIGIN, Step::Previous);
        assert_eq!(engine.layout(ORIGIN), LayoutKind::Cascade);
        assert_eq!(response.notification.as_deref(), Some("cascade"));
        assert_eq!(engine.store().layout_state(ORIGIN)["layout"], json!("cascade"));
    }

    #[test]
    fn layout_is_restored_and_strategy_keys_kept() {
        let store = PersistentStore::in_memory();
        store.put_layout_state(ORIGIN, json!({ "layout": "spiral", "ratio": 0.6 })).unwrap();
        let mut engine = engine_with(store.clone());
        assert_eq!(engine.layout(ORIGIN), LayoutKind::Spiral);
        let _ = engine.cycle_layout(ORIGIN, Step::Next);
        assert_eq!(store.layout_state(ORIGIN), json!({ "layout": "quarter", "ratio": 0.6 }));
    }

    #[test]
    fn toggle_layout_switches_back() {
        let mut engine = test_engine();
        let _ = engine.cycle_layout(ORIGIN, Step::Next);
        assert_eq!(engine.layout(ORIGIN), LayoutKind::Monocle);
        let _ = engine.toggle_layout(ORIGIN, LayoutKind::Tile);
        assert_eq!(engine.layout(ORIGIN), LayoutKind::Tile);
        let _ = engine.toggle_layout(ORIGIN, LayoutKind::Tile);
        assert_eq!(engine.layout(ORIGIN), LayoutKind::Monocle);
    }

    #[test]
    fn shrinking_the_enabled_layouts_clamps() {
        let mut engine = test_engine();
        for _ in 0..8 {
            let _ = engine.cycle_layout(ORIGIN, Step::Next);
        }
        let _ = engine.cycle_layout(SurfaceId::new(0, 1), Step::Next);
        assert_eq!(engine.layout(ORIGIN), LayoutKind::Cascade);

        let mut settings = Settings::default();
        settings.layouts.enabled = vec![LayoutKind::Monocle, LayoutKind::Tile];
        let _ = engine.apply_settings(&settings);
        assert_eq!(engine.layout(ORIGIN), LayoutKind::Tile);
        assert_eq!(engine.layout(SurfaceId::new(0, 1)), LayoutKind::Monocle);

        settings.layouts.enabled = vec![];
        let _ = engine.apply_settings(&settings);
        assert_eq!(engine.enabled_layouts().len(), 9);
        let _ = engine.cycle_layout(ORIGIN, Step::Next);
    }

    #[test]
    fn focus_order_next_then_previous_is_identity() {
        let mut engine = test_engine();
        assert_eq!(engine.focus_window_by_order(Step::Next), None);

        let ids: Vec<_> = (1..=3).map(|raw| add(&mut engine, raw)).collect();
        assert_eq!(engine.focus_window_by_order(Step::Previous), Some(ids[2]));
        engine.set_focused(None);
        assert_eq!(engine.focus_window_by_order(Step::Next), Some(ids[0]));

        for &start in &ids {
            engine.set_focused(engine.window(start).map(|w| w.handle));
            engine.focus_window_by_order(Step::Next);
            assert_eq!(engine.focus_window_by_order(Step::Previous), Some(start));
        }
        engine.set_focused(Some(WindowHandle::new(3)));
        assert_eq!(engine.focus_window_by_order(Step::Next), Some(ids[0]));
    }

    #[test]
    fn focus_command_reports_the_handle() {
        let mut engine = test_engine();
        let _ = add(&mut engine, 1);
        let _ = add(&mut engine, 2);
        let response = engine.handle_command(LayoutCommand::FocusOrder(Step::Previous));
        assert_eq!(response.focus_window, Some(WindowHandle::new(2)));
    }

    #[test]
    fn ignored_and_utility_windows_float() {
        let mut engine = test_engine();
        let shell = WindowInfo { class: "plasmashell".into(), ..WindowInfo::default() };
        let dialog = WindowInfo { utility: true, ..info(0) };
        let _ = engine.add_window(WindowHandle::new(1), &shell);
        let response = engine.add_window(WindowHandle::new(2), &dialog);
        assert_eq!(engine.window_mode(WindowHandle::new(1)), WindowMode::Floating);
        assert_eq!(engine.window_mode(WindowHandle::new(2)), WindowMode::Floating);
        assert_eq!(engine.window_mode(WindowHandle::new(3)), WindowMode::Unmanaged);
        assert_eq!(
            response.arrangements[0].floating,
            vec![WindowHandle::new(1), WindowHandle::new(2)]
        );
    }

    #[test]
    fn ignored_windows_are_never_tiled() {
        let mut engine = test_engine();
        let shell = WindowInfo { class: "plasmashell".into(), ..WindowInfo::default() };
        let handle = WindowHandle::new(1);
        let _ = engine.add_window(handle, &shell);
        engine.set_focused(Some(handle));

        assert!(engine.handle_command(LayoutCommand::ToggleFloating).is_empty());
        assert!(engine.window_dragged(handle).is_empty());
        let _ = engine.set_maximized(handle, true, true);
        let _ = engine.set_maximized(handle, false, false);
        assert_eq!(engine.window_mode(handle), WindowMode::Floating);
        assert!(engine.arrangement(ORIGIN).tiled.is_empty());
        assert_eq!(engine.arrangement(ORIGIN).floating, vec![handle]);
    }

    #[test]
    fn minimized_and_maximized_windows_are_not_tiled() {
        let mut engine = test_engine();
        let _ = add(&mut engine, 1);
        let _ = add(&mut engine, 2);
        let h1 = WindowHandle::new(1);

        let response = engine.minimize_window(h1);
        assert_eq!(response.arrangements[0].tiled, vec![WindowHandle::new(2)]);
        assert!(response.arrangements[0].floating.is_empty());
        assert!(engine.minimize_window(h1).is_empty());
        let response = engine.unminimize_window(h1);
        assert_eq!(response.arrangements[0].tiled.len(), 2);

        let response = engine.set_maximized(h1, true, true);
        assert_eq!(response.arrangements[0].floating, vec![h1]);
        assert!(engine.set_maximized(h1, true, false).is_empty());
        let _ = engine.set_maximized(h1, false, false);
        assert_eq!(engine.arrangement(ORIGIN).tiled.len(), 2);
        assert!(engine.minimize_window(WindowHandle::new(99)).is_empty());
    }

    #[test]
    fn dragging_untiles_when_enabled() {
        let mut engine = test_engine();
        let _ = add(&mut engine, 1);
        let _ = engine.window_dragged(WindowHandle::new(1));
        assert_eq!(engine.window_mode(WindowHandle::new(1)), WindowMode::Floating);

        let settings = Settings { untile_by_dragging: false, ..Settings::default() };
        let mut engine = AssignmentEngine::new(PersistentStore::in_memory(), &settings);
        let _ = add(&mut engine, 1);
        assert!(engine.window_dragged(WindowHandle::new(1)).is_empty());
        assert_eq!(engine.window_mode(WindowHandle::new(1)), WindowMode::Tiled);
    }

    #[test]
    fn toggle_floating_needs_focus() {
        let mut engine = test_engine();
        let id = add(&mut engine, 1);
        assert!(engine.handle_command(LayoutCommand::ToggleFloating).is_empty());
        engine.set_focused(Some(WindowHandle::new(1)));
        let _ = engine.handle_command(LayoutCommand::ToggleFloating);
        assert_eq!(engine.window(id).unwrap().mode(), WindowMode::Floating);
        assert_eq!(engine.store().window_state(id)["floating"], json!(true));
    }

    #[test]
    fn move_and_push_reorder_tiled_peers() {
        let mut engine = test_engine();
        let ids: Vec<_> = (1..=3).map(|raw| add(&mut engine, raw)).collect();

        let _ = engine.move_window_by_order(ids[0], Step::Next);
        assert_eq!(engine.window_list(), &[ids[1], ids[0], ids[2]]);
        let _ = engine.move_window_by_order(ids[1], Step::Previous);
        assert_eq!(engine.window_list(), &[ids[2], ids[0], ids[1]]);

        let _ = engine.push_to_master(ids[1]);
        assert_eq!(engine.window_list(), &[ids[1], ids[2], ids[0]]);
        assert_eq!(engine.store().window_list(), vec![ids[1], ids[2], ids[0]]);
        assert!(engine.push_to_master(ids[1]).is_empty());
    }

    #[test]
    fn move_to_surface_takes_the_target_group() {
        let mut engine = test_engine();
        let id = add(&mut engine, 1);
        assert!(engine.move_window_to_surface(id, Direction::Left).is_empty());

        let response = engine.move_window_to_surface(id, Direction::Right);
        let window = engine.window(id).unwrap();
        assert_eq!(window.surface, SurfaceId::new(0, 1));
        assert_eq!(window.group, group(2));
        assert_eq!(response.arrangements.last().unwrap().tiled, vec![WindowHandle::new(1)]);

        let _ = engine.move_window_to_surface(id, Direction::Down);
        assert_eq!(engine.window(id).unwrap().surface, SurfaceId::new(1, 1));
        assert_eq!(engine.surface_group(SurfaceId::new(1, 1)), Some(group(7)));
    }

    #[test]
    fn layout_actions_are_forwarded() {
        let mut engine = test_engine();
        let _ = add(&mut engine, 1);
        engine.set_focused(Some(WindowHandle::new(1)));
        let response = engine.handle_command(LayoutCommand::Layout(LayoutAction::GrowWidth));
        assert_eq!(
            response.layout_requests,
            vec![LayoutRequest {
                surface: ORIGIN,
                layout: LayoutKind::Tile,
                window: Some(WindowHandle::new(1)),
                action: LayoutAction::GrowWidth,
            }]
        );
    }

    #[test]
    fn persisted_group_survives_restart() {
        let store = PersistentStore::in_memory();
        let mut engine = engine_with(store.clone());
        let stable = WindowInfo { host_id: Some(4242), ..info(0) };
        let _ = engine.add_window(WindowHandle::new(1), &stable);
        let id = engine.window_id(WindowHandle::new(1)).unwrap();
        let _ = engine.change_window_group(id, group(6));
        let _ = engine.handle_command(LayoutCommand::SwapGroupToSurface(group(6)));

        let mut engine = engine_with(store);
        let _ = engine.add_window(WindowHandle::new(50), &stable);
        assert_eq!(engine.window_id(WindowHandle::new(50)), Some(id));
        assert_eq!(engine.window(id).unwrap().group, group(6));
        assert_eq!(engine.arrangement(ORIGIN).tiled, vec![WindowHandle::new(50)]);
    }

    #[test]
    fn fresh_windows_do_not_inherit_an_earlier_session() {
        let store = PersistentStore::in_memory();
        let mut first = engine_with(store.clone());
        let old = add(&mut first, 1);
        let _ = first.change_window_group(old, group(9));
        drop(first);

        let mut second = engine_with(store.clone());
        let new = add(&mut second, 777);
        assert_ne!(new, old);
        assert_eq!(second.window(new).unwrap().group, GroupId::FIRST);
        assert_eq!(second.arrangement(ORIGIN).tiled, vec![WindowHandle::new(777)]);
        assert!(second.arrangement(ORIGIN).hidden.is_empty());
        assert_eq!(store.window_state(old)["group"], json!(9));
    }

    #[test]
    fn load_existing_follows_the_persisted_order() {
        let store = PersistentStore::in_memory();
        store
            .put_window_list(&[WindowId::new(30), WindowId::new(99), WindowId::new(10)])
            .unwrap();
        let mut engine = engine_with(store.clone());
        let windows: Vec<_> = [10, 20, 30]
            .into_iter()
            .map(|raw| {
                (WindowHandle::new(raw), WindowInfo { host_id: Some(raw), ..info(0) })
            })
            .collect();
        let response = engine.load_existing(&windows);
        let expected = vec![WindowId::new(30), WindowId::new(10), WindowId::new(20)];
        assert_eq!(engine.window_list(), expected.as_slice());
        assert_eq!(store.window_list(), expected);
        assert_eq!(
            response.arrangements[0].tiled,
            vec![WindowHandle::new(30), WindowHandle::new(10), WindowHandle::new(20)]
        );
    }

    #[test]
    fn collect_garbage_purges_only_dead_windows() {
        let store = PersistentStore::in_memory();
        store.put_window_state(WindowId::new(500), json!({ "group": 2 })).unwrap();
        let mut engine = engine_with(store);
        let live = add(&mut engine, 1);
        let removed = add(&mut engine, 2);
        let _ = engine.remove_window(WindowHandle::new(2));
        assert_eq!(engine.store().window_state_ids().len(), 3);

        assert_eq!(engine.collect_garbage(), 2);
        assert_eq!(engine.store().window_state_ids(), vec![live]);
        assert_eq!(engine.store().window_state(removed), json!({}));
    }

    #[test_log::test]
    fn corrupt_documents_degrade_to_empty_state() {
        let backend = MemoryBackend::new()
            .with_document(DocumentKind::WindowStates, "{not json")
            .with_document(DocumentKind::WindowList, "[]]")
            .with_document(DocumentKind::SurfaceGroups, "{\"Surfaces\": {\"0:0\": {\"group\": 40}}}")
            .with_document(DocumentKind::LayoutStates, "\u{0}");
        let mut engine = engine_with(PersistentStore::new(backend));
        let id = add(&mut engine, 1);
        assert_eq!(engine.window(id).unwrap().group, GroupId::FIRST);
        assert_eq!(engine.layout(ORIGIN), LayoutKind::Tile);
        assert_eq!(engine.store().window_list(), vec![id]);
    }

    #[test_log::test]
    fn write_failures_do_not_escape() {
        let backend = Arc::new(MemoryBackend::new());
        let mut engine = engine_with(PersistentStore::with_backend(backend.clone()));
        let first = add(&mut engine, 1);
        backend.set_fail_writes(true);

        let second = add(&mut engine, 2);
        let _ = engine.swap_group_to_surface(group(4), ORIGIN);
        assert_eq!(engine.window_list(), &[first, second]);
        assert_eq!(engine.surface_group(ORIGIN), Some(group(4)));
        assert_eq!(engine.store().window_list(), vec![first]);
        assert_eq!(engine.store().surface_group(ORIGIN), Some(GroupId::FIRST));
    }
}
