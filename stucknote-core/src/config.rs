//! TOML configuration: embedded defaults plus an optional user override,
//! merged field by field. Everything here is resolved once at startup; the
//! resulting [`MonitorConfig`] is immutable for the process lifetime.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

const DEFAULT_CONFIG: &str = include_str!("../config.toml");

#[derive(Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    monitor: MonitorSection,
}

#[derive(Deserialize, Default)]
struct MonitorSection {
    device: Option<String>,
    timeout_ms: Option<u64>,
    sweep_interval_ms: Option<u64>,
    debug: Option<bool>,
}

/// Resolved monitor settings.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Case-insensitive substring matched against input port names.
    pub device: String,
    /// How long a Note On may go without a matching Note Off.
    pub timeout: Duration,
    /// Sweep cadence; worst-case detection latency is one interval.
    pub sweep_interval: Duration,
    /// Dump raw packets instead of tracking them.
    pub debug: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Config::load_embedded().monitor_config()
    }
}

pub struct Config {
    monitor: MonitorSection,
}

impl Config {
    /// Load the embedded defaults merged with the user config file, if any.
    pub fn load() -> Self {
        let user = user_config_path()
            .filter(|p| p.exists())
            .and_then(|p| read_user_config(&p));
        Self::from_sources(user.as_deref())
    }

    fn load_embedded() -> Self {
        Self::from_sources(None)
    }

    fn from_sources(user_toml: Option<&str>) -> Self {
        let mut base: ConfigFile =
            toml::from_str(DEFAULT_CONFIG).expect("Failed to parse embedded config.toml");

        if let Some(contents) = user_toml {
            match toml::from_str::<ConfigFile>(contents) {
                Ok(user) => merge_monitor(&mut base.monitor, user.monitor),
                Err(e) => {
                    log::warn!(target: "config", "ignoring malformed user config: {}", e)
                }
            }
        }

        Config {
            monitor: base.monitor,
        }
    }

    pub fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            device: self
                .monitor
                .device
                .clone()
                .unwrap_or_else(|| "k-board".to_string()),
            timeout: Duration::from_millis(self.monitor.timeout_ms.unwrap_or(2000)),
            sweep_interval: Duration::from_millis(
                self.monitor.sweep_interval_ms.unwrap_or(20),
            ),
            debug: self.monitor.debug.unwrap_or(false),
        }
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("stucknote").join("config.toml"))
}

fn read_user_config(path: &Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Some(contents),
        Err(e) => {
            log::warn!(
                target: "config",
                "could not read config {}: {}",
                path.display(),
                e
            );
            None
        }
    }
}

fn merge_monitor(base: &mut MonitorSection, user: MonitorSection) {
    if user.device.is_some() {
        base.device = user.device;
    }
    if user.timeout_ms.is_some() {
        base.timeout_ms = user.timeout_ms;
    }
    if user.sweep_interval_ms.is_some() {
        base.sweep_interval_ms = user.sweep_interval_ms;
    }
    if user.debug.is_some() {
        base.debug = user.debug;
    }
}
