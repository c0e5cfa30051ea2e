use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use strum::{Display, EnumIter};
use tempfile::NamedTempFile;

use crate::common::collections::HashMap;

/// The four independently persisted documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum DocumentKind {
    WindowStates,
    LayoutStates,
    WindowList,
    SurfaceGroups,
}

impl DocumentKind {
    pub const fn file_name(self) -> &'static str {
        match self {
            DocumentKind::WindowStates => "windowstates.json",
            DocumentKind::LayoutStates => "layoutstates.json",
            DocumentKind::WindowList => "windowlist.json",
            DocumentKind::SurfaceGroups => "surfacegroups.json",
        }
    }

    /// Top-level key the collection lives under inside its document.
    pub const fn root_key(self) -> &'static str {
        match self {
            DocumentKind::WindowStates => "WindowStates",
            DocumentKind::LayoutStates => "LayoutStates",
            DocumentKind::WindowList => "WindowList",
            DocumentKind::SurfaceGroups => "Surfaces",
        }
    }
}

/// Raw byte storage for documents.
///
/// Every call is a complete open-read-close or open-write-close cycle; no
/// lock is held between calls.
pub trait DocumentBackend: Send + Sync {
    /// Returns `Ok(None)` if the document does not exist yet.
    fn read(&self, kind: DocumentKind) -> io::Result<Option<Vec<u8>>>;

    /// Replaces the whole document. A concurrent reader observes either the
    /// previous bytes or the new bytes, never a mix.
    fn replace(&self, kind: DocumentKind, bytes: &[u8]) -> io::Result<()>;
}

/// Documents stored as files in one directory, replaced by write-to-temp and
/// rename.
#[derive(Debug, Clone)]
pub struct FsBackend {
    dir: PathBuf,
}

impl FsBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self { Self { dir: dir.into() } }

    pub fn dir(&self) -> &Path { &self.dir }

    pub fn path(&self, kind: DocumentKind) -> PathBuf { self.dir.join(kind.file_name()) }
}

impl DocumentBackend for FsBackend {
    fn read(&self, kind: DocumentKind) -> io::Result<Option<Vec<u8>>> {
        match fs::read(self.path(kind)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn replace(&self, kind: DocumentKind, bytes: &[u8]) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        // The temp file must live on the same filesystem for the rename to be atomic.
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(self.path(kind)).map_err(|err| err.error)?;
        Ok(())
    }
}

/// In-process document storage, for tests and for running without a state
/// directory.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    docs: Mutex<HashMap<DocumentKind, Vec<u8>>>,
    fail_writes: AtomicBool,
}

impl MemoryBackend {
    pub fn new() -> Self { Self::default() }

    pub fn with_document(self, kind: DocumentKind, bytes: impl Into<Vec<u8>>) -> Self {
        self.docs.lock().insert(kind, bytes.into());
        self
    }

    /// Makes every subsequent `replace` fail with an I/O error.
    pub fn set_fail_writes(&self, fail: bool) { self.fail_writes.store(fail, Ordering::Relaxed); }

    pub fn raw(&self, kind: DocumentKind) -> Option<Vec<u8>> { self.docs.lock().get(&kind).cloned() }
}

impl DocumentBackend for MemoryBackend {
    fn read(&self, kind: DocumentKind) -> io::Result<Option<Vec<u8>>> { Ok(self.raw(kind)) }

    fn replace(&self, kind: DocumentKind, bytes: &[u8]) -> io::Result<()> {
        if self.fail_writes.load(Ordering::Relaxed) {
            return Err(io::Error::other("writes disabled"));
        }
        self.docs.lock().insert(kind, bytes.to_vec());
        Ok(())
    }
}
