use super::replay::Record;
use crate::actor::bridge::ScriptingBridge;
use crate::common::collections::HashMap;
use crate::layout_engine::AssignmentEngine;
use crate::model::ids::WindowHandle;
use crate::model::store::PersistentStore;
use crate::sys::host::WindowInfo;

/// Host-reported properties of live windows, kept for queries.
pub struct WindowManager {
    pub infos: HashMap<WindowHandle, WindowInfo>,
}

/// Owns the native assignment engine
pub struct LayoutManager {
    pub engine: AssignmentEngine,
}

/// Store and bridge used when the native engine is disabled
pub struct LegacyManager {
    pub store: PersistentStore,
    pub bridge: ScriptingBridge,
}

/// Which backend receives events. Chosen once at startup.
pub enum Mode {
    Native(LayoutManager),
    Legacy(LegacyManager),
}

/// Manages recording state
pub struct RecordingManager {
    pub record: Record,
}
