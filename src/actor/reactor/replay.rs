//! Recording of reactor events as JSON lines, and playback of such logs.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::Context;
use tracing::{debug, warn};

use super::Event;

/// Appends every handled event to a log file, one JSON document per line.
/// Queries and config reloads are not recorded.
#[derive(Default)]
pub struct Record {
    file: Option<BufWriter<File>>,
}

impl Record {
    pub fn new(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let file = File::create(path)
            .with_context(|| format!("creating event record {}", path.display()))?;
        debug!(path = %path.display(), "recording events");
        Ok(Self { file: Some(BufWriter::new(file)) })
    }

    pub fn is_enabled(&self) -> bool { self.file.is_some() }

    pub(super) fn on_event(&mut self, event: &Event) {
        if matches!(event, Event::Query(_) | Event::ConfigUpdated(_)) {
            return;
        }
        let Some(file) = &mut self.file else { return };
        let written = serde_json::to_writer(&mut *file, event)
            .map_err(std::io::Error::from)
            .and_then(|()| file.write_all(b"\n"))
            .and_then(|()| file.flush());
        if let Err(err) = written {
            warn!(%err, "writing the event record failed; recording stopped");
            self.file = None;
        }
    }
}

/// Reads a recorded event log and passes each event to `handle` in order.
/// Blank lines and lines starting with `#` are skipped. Returns the number of
/// events replayed.
pub fn replay(path: &Path, mut handle: impl FnMut(Event)) -> anyhow::Result<usize> {
    let file =
        File::open(path).with_context(|| format!("opening event log {}", path.display()))?;
    let mut count = 0;
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("reading {}", path.display()))?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let event: Event = serde_json::from_str(line)
            .with_context(|| format!("{}:{}: malformed event", path.display(), index + 1))?;
        handle(event);
        count += 1;
    }
    Ok(count)
}
