use tracing::{info, warn};

use crate::actor::reactor::{Reactor, commands};
use crate::common::config::Config;
use crate::layout_engine::EventResponse;

pub struct CommandEventHandler;

impl CommandEventHandler {
    pub fn handle_command(reactor: &mut Reactor, id: &str) {
        let Some(def) = commands::find(id) else {
            warn!(id, "unknown command");
            return;
        };
        // Shortcuts act on whatever the host considers active right now.
        let active = reactor.host.active_window();
        reactor.with_engine(|engine| {
            engine.set_focused(active);
            engine.handle_command(def.command.clone())
        });
    }

    pub fn handle_collect_garbage(reactor: &mut Reactor) {
        reactor.with_engine(|engine| {
            engine.collect_garbage();
            EventResponse::default()
        });
    }

    /// Settings are re-read; the native/legacy mode switch is not.
    pub fn handle_config_updated(reactor: &mut Reactor, config: Config) {
        if config.settings.native_engine != reactor.config.settings.native_engine {
            warn!("native_engine changes take effect after a restart");
        }
        let old = std::mem::replace(&mut reactor.config, config);
        reactor.report_config_errors();
        let settings = reactor.config.settings.clone();
        reactor.with_engine(|engine| engine.apply_settings(&settings));
        if old.bindings != reactor.config.bindings {
            let count = commands::register_all(&mut *reactor.host, &reactor.config.bindings);
            info!(count, "keybindings re-registered");
        }
    }
}
