use std::path::{Path, PathBuf};
use std::{env, fs};

use anyhow::Context;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::common::collections::{BTreeMap, HashSet};
use crate::layout_engine::LayoutKind;
use crate::sys::host::WindowInfo;

/// Shell components that are never tiled, whatever the rules say.
const BUILTIN_IGNORED_CLASSES: &[&str] =
    &["plasmashell", "ksmserver", "org.kde.plasmashell", "krunner", "kded5"];

pub fn config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tilecore").join("config.toml"))
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no layouts are enabled; using the default layout order")]
    NoLayoutsEnabled,
    #[error("layout {0} is enabled more than once")]
    DuplicateLayout(LayoutKind),
    #[error("invalid title pattern {pattern:?}: {message}")]
    InvalidPattern { pattern: String, message: String },
    #[error("keybinding given for unknown command {0:?}")]
    UnknownCommand(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub settings: Settings,
    /// Keybinding overrides, keyed by command id.
    pub bindings: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Run the native engine. When false, events are handed to the legacy
    /// scripting handler instead.
    pub native_engine: bool,
    pub layouts: LayoutSettings,
    pub untile_by_dragging: bool,
    pub float_utility: bool,
    pub new_window_floating: bool,
    pub rules: WindowRules,
    pub storage: StorageSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            native_engine: true,
            layouts: LayoutSettings::default(),
            untile_by_dragging: true,
            float_utility: true,
            new_window_floating: false,
            rules: WindowRules::default(),
            storage: StorageSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    pub enabled: Vec<LayoutKind>,
}

impl Default for LayoutSettings {
    fn default() -> Self { Self { enabled: LayoutKind::default_order() } }
}

impl LayoutSettings {
    /// The enabled layouts with duplicates dropped. Never empty.
    pub fn effective(&self) -> Vec<LayoutKind> {
        let mut seen = HashSet::default();
        let layouts: Vec<_> =
            self.enabled.iter().copied().filter(|kind| seen.insert(*kind)).collect();
        if layouts.is_empty() { LayoutKind::default_order() } else { layouts }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowRules {
    pub ignore_class: Vec<String>,
    /// Regular expressions matched against the window title.
    pub ignore_title: Vec<String>,
    pub ignore_role: Vec<String>,
    pub ignore_activity: Vec<String>,
    pub ignore_screen: Vec<u32>,
    pub floating_class: Vec<String>,
    /// Regular expressions matched against the window title.
    pub floating_title: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub dir: Option<PathBuf>,
}

/// How a newly reported window enters the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Ignore,
    Float,
    Tile,
}

#[derive(Debug, Default)]
pub struct CompiledRules {
    ignore_class: HashSet<String>,
    ignore_title: Vec<Regex>,
    ignore_role: HashSet<String>,
    ignore_activity: HashSet<String>,
    ignore_screen: HashSet<u32>,
    floating_class: HashSet<String>,
    floating_title: Vec<Regex>,
    float_utility: bool,
    new_window_floating: bool,
}

impl CompiledRules {
    pub fn classify(&self, info: &WindowInfo) -> Placement {
        let class = info.class.as_str();
        let ignored = BUILTIN_IGNORED_CLASSES.contains(&class)
            || self.ignore_class.contains(class)
            || self.ignore_role.contains(&info.role)
            || info.activity.as_ref().is_some_and(|a| self.ignore_activity.contains(a))
            || self.ignore_screen.contains(&info.screen)
            || self.ignore_title.iter().any(|re| re.is_match(&info.title));
        if ignored {
            return Placement::Ignore;
        }
        let floating = self.new_window_floating
            || (self.float_utility && info.utility)
            || self.floating_class.contains(class)
            || self.floating_title.iter().any(|re| re.is_match(&info.title));
        if floating { Placement::Float } else { Placement::Tile }
    }
}

fn compile_patterns(patterns: &[String]) -> Vec<Regex> {
    patterns
        .iter()
        .filter_map(|pattern| {
            Regex::new(pattern)
                .inspect_err(|err| warn!(%pattern, %err, "skipping invalid title pattern"))
                .ok()
        })
        .collect()
}

impl Settings {
    pub fn compile_rules(&self) -> CompiledRules {
        let rules = &self.rules;
        CompiledRules {
            ignore_class: rules.ignore_class.iter().cloned().collect(),
            ignore_title: compile_patterns(&rules.ignore_title),
            ignore_role: rules.ignore_role.iter().cloned().collect(),
            ignore_activity: rules.ignore_activity.iter().cloned().collect(),
            ignore_screen: rules.ignore_screen.iter().copied().collect(),
            floating_class: rules.floating_class.iter().cloned().collect(),
            floating_title: compile_patterns(&rules.floating_title),
            float_utility: self.float_utility,
            new_window_floating: self.new_window_floating,
        }
    }
}

impl Config {
    pub fn read(path: &Path) -> anyhow::Result<Config> {
        let buf = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::parse(&buf).with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn parse(buf: &str) -> anyhow::Result<Config> { Ok(toml::from_str(buf)?) }

    /// Reads `path`, or the default config file if none is given. A missing
    /// default file yields the default configuration.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Config> {
        match path {
            Some(path) => Self::read(path),
            None => match config_file() {
                Some(path) if path.exists() => Self::read(&path),
                _ => Ok(Config::default()),
            },
        }
    }

    /// Directory holding the persisted documents.
    pub fn state_dir(&self) -> PathBuf {
        self.settings
            .storage
            .dir
            .clone()
            .or_else(|| dirs::data_dir().map(|dir| dir.join("tilecore")))
            .unwrap_or_else(|| env::temp_dir().join("tilecore"))
    }

    /// Inconsistencies to report at startup. None of them is fatal.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let enabled = &self.settings.layouts.enabled;
        if enabled.is_empty() {
            errors.push(ConfigError::NoLayoutsEnabled);
        }
        let mut seen = HashSet::default();
        for kind in enabled {
            if !seen.insert(*kind) {
                errors.push(ConfigError::DuplicateLayout(*kind));
            }
        }
        let rules = &self.settings.rules;
        for pattern in rules.ignore_title.iter().chain(&rules.floating_title) {
            if let Err(err) = Regex::new(pattern) {
                errors.push(ConfigError::InvalidPattern {
                    pattern: pattern.clone(),
                    message: err.to_string(),
                });
            }
        }
        errors
    }
}
