use serde::{Deserialize, Serialize};

use crate::layout_engine::{LayoutKind, WindowMode};
use crate::model::ids::{GroupId, SurfaceId, WindowHandle, WindowId};
use crate::model::store::PersistentStore;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowData {
    pub id: WindowId,
    pub handle: WindowHandle,
    pub group: GroupId,
    pub surface: SurfaceId,
    pub mode: WindowMode,
    pub is_maximized: bool,
    pub is_focused: bool,
    /// True if the window's group is shown on some surface of the current desktop.
    pub is_visible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceData {
    pub id: SurfaceId,
    pub group: Option<GroupId>,
    pub layout: LayoutKind,
    pub is_current: bool,
    pub window_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSummary {
    pub window_states: usize,
    pub window_list: Vec<WindowId>,
    pub surface_groups: Vec<(SurfaceId, GroupId)>,
}

impl StoreSummary {
    pub fn of(store: &PersistentStore) -> Self {
        Self {
            window_states: store.window_state_ids().len(),
            window_list: store.window_list(),
            surface_groups: store.surface_groups(),
        }
    }
}
