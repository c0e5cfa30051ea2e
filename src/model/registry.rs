//! Maps transient host window handles to internal window ids.

use std::time::{SystemTime, UNIX_EPOCH};

use tracing::debug;

use crate::common::collections::{HashMap, HashSet};
use crate::model::ids::{WindowHandle, WindowId};

/// Ids handed out when the host does not expose a durable window id. Kept in
/// the upper half of the id space so they do not shadow host-assigned ids.
///
/// Layout: bit 63 set, bits 32..63 a per-session tag, bits 0..32 a counter.
/// The tag keeps ids from different runs and sibling processes apart.
const EPHEMERAL_BASE: u64 = 1 << 63;
const SESSION_SHIFT: u32 = 32;
const SESSION_MASK: u64 = (1 << 31) - 1;
const COUNTER_MASK: u64 = (1 << SESSION_SHIFT) - 1;

pub fn is_ephemeral(id: WindowId) -> bool { id.get() & EPHEMERAL_BASE != 0 }

fn session_of(id: WindowId) -> Option<u64> {
    is_ephemeral(id).then(|| (id.get() >> SESSION_SHIFT) & SESSION_MASK)
}

fn process_session() -> u64 {
    let clock = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs().rotate_left(20) ^ u64::from(d.subsec_nanos()));
    (u64::from(std::process::id()).rotate_left(13) ^ clock) & SESSION_MASK
}

#[derive(Debug)]
pub struct IdentityRegistry {
    by_handle: HashMap<WindowHandle, WindowId>,
    live: HashMap<WindowId, WindowHandle>,
    session: u64,
    next_ephemeral: u64,
}

impl Default for IdentityRegistry {
    fn default() -> Self { Self::new() }
}

impl IdentityRegistry {
    pub fn new() -> Self { Self::seeded(std::iter::empty()) }

    /// A registry whose ephemeral ids cannot collide with any of `persisted`,
    /// the ids already present in the store.
    pub fn seeded(persisted: impl IntoIterator<Item = WindowId>) -> Self {
        let used: HashSet<u64> = persisted.into_iter().filter_map(session_of).collect();
        Self::with_session(process_session(), &used)
    }

    fn with_session(mut session: u64, used: &HashSet<u64>) -> Self {
        while used.contains(&session) {
            session = (session + 1) & SESSION_MASK;
        }
        debug!(session, "ephemeral id session");
        IdentityRegistry {
            by_handle: HashMap::default(),
            live: HashMap::default(),
            session,
            next_ephemeral: 0,
        }
    }

    /// Returns the id registered for `handle`, registering it on first sight.
    ///
    /// `stable` is the host's durable window id, if it exposes one. It becomes
    /// the window id unless another live handle already owns it.
    pub fn resolve(&mut self, handle: WindowHandle, stable: Option<u64>) -> WindowId {
        if let Some(&id) = self.by_handle.get(&handle) {
            return id;
        }
        let id = match stable.map(WindowId::new) {
            Some(id) if !self.live.contains_key(&id) => id,
            Some(id) => {
                debug!(?handle, %id, "stable id already owned by a live window");
                self.allocate()
            }
            None => self.allocate(),
        };
        self.by_handle.insert(handle, id);
        self.live.insert(id, handle);
        id
    }

    pub fn lookup(&self, handle: WindowHandle) -> Option<WindowId> {
        self.by_handle.get(&handle).copied()
    }

    pub fn handle_of(&self, id: WindowId) -> Option<WindowHandle> { self.live.get(&id).copied() }

    pub fn is_live(&self, id: WindowId) -> bool { self.live.contains_key(&id) }

    /// Drops the mapping for `handle`. Returns the id it resolved to, if any.
    pub fn forget(&mut self, handle: WindowHandle) -> Option<WindowId> {
        let id = self.by_handle.remove(&handle)?;
        self.live.remove(&id);
        Some(id)
    }

    pub fn len(&self) -> usize { self.by_handle.len() }

    pub fn is_empty(&self) -> bool { self.by_handle.is_empty() }

    fn allocate(&mut self) -> WindowId {
        loop {
            let id = WindowId::new(
                EPHEMERAL_BASE | (self.session << SESSION_SHIFT) | self.next_ephemeral,
            );
            self.next_ephemeral = (self.next_ephemeral + 1) & COUNTER_MASK;
            if !self.live.contains_key(&id) {
                return id;
            }
        }
    }
}
