use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::model::ids::{GroupId, SurfaceId, WindowHandle, WindowId};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct WindowFlags: u8 {
        const FLOATING = 1 << 0;
        const MINIMIZED = 1 << 1;
        const MAXIMIZED = 1 << 2;
        /// Matched an ignore rule; never tiled.
        const IGNORED = 1 << 3;
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WindowMode {
    /// Not (or no longer) tracked by the engine.
    Unmanaged,
    Tiled,
    Floating,
    Minimized,
}

/// Engine-side state of one live window.
#[derive(Debug, Clone, PartialEq)]
pub struct ManagedWindow {
    pub handle: WindowHandle,
    pub group: GroupId,
    /// Last surface the window was shown on.
    pub surface: SurfaceId,
    flags: WindowFlags,
}

impl ManagedWindow {
    pub fn new(handle: WindowHandle, group: GroupId, surface: SurfaceId, flags: WindowFlags) -> Self {
        Self { handle, group, surface, flags }
    }

    pub fn flags(&self) -> WindowFlags { self.flags }

    pub fn mode(&self) -> WindowMode {
        if self.flags.contains(WindowFlags::MINIMIZED) {
            WindowMode::Minimized
        } else if self.flags.contains(WindowFlags::FLOATING) {
            WindowMode::Floating
        } else {
            WindowMode::Tiled
        }
    }

    pub fn is_maximized(&self) -> bool { self.flags.contains(WindowFlags::MAXIMIZED) }

    pub fn is_ignored(&self) -> bool { self.flags.contains(WindowFlags::IGNORED) }

    /// Whether the layout strategy should place this window.
    pub fn is_tiled(&self) -> bool {
        self.mode() == WindowMode::Tiled && !self.is_maximized() && !self.is_ignored()
    }

    /// Switches between tiled and floating. Minimized and ignored windows are
    /// left alone.
    pub fn toggle_floating(&mut self) -> bool {
        if self.mode() == WindowMode::Minimized || self.is_ignored() {
            return false;
        }
        self.flags.toggle(WindowFlags::FLOATING);
        true
    }

    /// Returns true if the window was tiled and is now floating.
    pub fn untile(&mut self) -> bool {
        if self.mode() != WindowMode::Tiled || self.is_ignored() {
            return false;
        }
        self.flags.insert(WindowFlags::FLOATING);
        true
    }

    pub fn minimize(&mut self) -> bool { self.update(WindowFlags::MINIMIZED, true) }

    /// Back to whichever of tiled or floating the window was before.
    pub fn unminimize(&mut self) -> bool { self.update(WindowFlags::MINIMIZED, false) }

    /// Maximized in both directions sets the flag, in neither clears it. A
    /// window maximized in only one direction keeps its previous state.
    pub fn set_maximized(&mut self, horizontal: bool, vertical: bool) -> bool {
        match (horizontal, vertical) {
            (true, true) => self.update(WindowFlags::MAXIMIZED, true),
            (false, false) => self.update(WindowFlags::MAXIMIZED, false),
            _ => false,
        }
    }

    fn update(&mut self, flag: WindowFlags, value: bool) -> bool {
        let before = self.flags;
        self.flags.set(flag, value);
        if self.is_ignored() {
            self.flags.insert(WindowFlags::FLOATING);
        }
        before != self.flags
    }

    pub fn record(&self) -> WindowRecord {
        WindowRecord {
            group: Some(self.group),
            surface: Some(self.surface),
            floating: self.flags.contains(WindowFlags::FLOATING),
            minimized: self.flags.contains(WindowFlags::MINIMIZED),
            maximized: self.is_maximized(),
        }
    }
}

/// The engine's fields inside a persisted window state blob. Every other key
/// of the blob belongs to the layout strategies and is never touched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowRecord {
    pub group: Option<GroupId>,
    pub surface: Option<SurfaceId>,
    pub floating: bool,
    pub minimized: bool,
    pub maximized: bool,
}

impl WindowRecord {
    pub fn from_blob(id: WindowId, blob: &Value) -> Self {
        let group = match blob.get("group") {
            None | Some(Value::Null) => None,
            Some(value) => match value.as_i64().map(GroupId::new) {
                Some(Ok(group)) => Some(group),
                _ => {
                    warn!(%id, %value, "ignoring invalid persisted group");
                    None
                }
            },
        };
        let flag = |key: &str| blob.get(key).and_then(Value::as_bool).unwrap_or(false);
        Self {
            group,
            surface: blob.get("surface").and_then(Value::as_str).and_then(|s| s.parse().ok()),
            floating: flag("floating"),
            minimized: flag("minimized"),
            maximized: flag("maximized"),
        }
    }

    pub fn merge_into(&self, blob: &mut Value) {
        if !blob.is_object() {
            *blob = Value::Object(Map::new());
        }
        let Some(map) = blob.as_object_mut() else { return };
        match self.group {
            Some(group) => map.insert("group".into(), Value::from(i64::from(group))),
            None => map.remove("group"),
        };
        match self.surface {
            Some(surface) => map.insert("surface".into(), Value::from(surface.to_string())),
            None => map.remove("surface"),
        };
        map.insert("floating".into(), Value::Bool(self.floating));
        map.insert("minimized".into(), Value::Bool(self.minimized));
        map.insert("maximized".into(), Value::Bool(self.maximized));
    }
}
