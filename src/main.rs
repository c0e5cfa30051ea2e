use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde_json::json;
use tilecore::actor::reactor::{Reactor, Record, commands, replay};
use tilecore::common::config::Config;
use tilecore::common::log::init_logging;
use tilecore::layout_engine::AssignmentEngine;
use tilecore::model::server::StoreSummary;
use tilecore::model::store::PersistentStore;
use tilecore::sys::headless::HeadlessHost;
use tilecore::sys::host::{ShortcutRegistrar, Topology};
use tracing::warn;

#[derive(Parser)]
#[command(version, about = "Window assignment core of a tiling window manager")]
struct Cli {
    /// Config file to use instead of the default one.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding the persisted documents.
    #[arg(long)]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Feed a recorded event log through a headless host and print the
    /// resulting arrangements.
    Replay {
        file: PathBuf,
        #[arg(long, default_value_t = 1)]
        desktops: u32,
        #[arg(long, default_value_t = 1)]
        screens: u32,
        /// Record the replayed events again, e.g. after editing the log.
        #[arg(long)]
        record: Option<PathBuf>,
    },
    /// Print the command catalogue with the effective keybindings.
    Commands,
    /// Print a summary of the persisted state.
    Dump,
    /// Delete window states no window refers to anymore.
    Gc,
}

struct Printer;

impl ShortcutRegistrar for Printer {
    fn register_shortcut(&mut self, id: &str, description: &str, keybinding: &str) {
        println!("{id:<28} {keybinding:<16} {description}");
    }
}

fn run_replay(
    config: Config,
    store: PersistentStore,
    file: &Path,
    topology: Topology,
    record: Option<&Path>,
) -> anyhow::Result<()> {
    if !config.settings.native_engine {
        warn!("native engine disabled and no legacy handler available; replay has no effect");
    }
    let host = HeadlessHost::new(topology);
    let mut reactor =
        Reactor::new(config, store, Box::new(host.clone()), None, Record::new(record)?);
    let events = replay(file, |event| {
        host.observe(&event);
        reactor.handle_event(event);
    })?;
    let report = json!({
        "events": events,
        "arrangements": host.arrangements(),
        "layout_requests": host.layout_requests(),
        "notifications": host.notifications(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(dir) = cli.state_dir {
        config.settings.storage.dir = Some(dir);
    }
    let store = PersistentStore::open(config.state_dir());

    match cli.command {
        Command::Replay { file, desktops, screens, record } => {
            run_replay(config, store, &file, Topology::new(desktops, screens), record.as_deref())
        }
        Command::Commands => {
            println!("{}", commands::COMPONENT_NAME);
            commands::register_all(&mut Printer, &config.bindings);
            for err in commands::unknown_bindings(&config.bindings) {
                warn!(%err, "configuration problem");
            }
            Ok(())
        }
        Command::Dump => {
            println!("{}", serde_json::to_string_pretty(&StoreSummary::of(&store))?);
            Ok(())
        }
        Command::Gc => {
            let removed = AssignmentEngine::new(store, &config.settings).collect_garbage();
            println!("removed {removed} window states");
            Ok(())
        }
    }
}
