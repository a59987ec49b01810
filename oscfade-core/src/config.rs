use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

const DEFAULT_CONFIG: &str = include_str!("../config.toml");

#[derive(Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    network: NetworkConfig,
    #[serde(default)]
    fade: FadeConfig,
}

#[derive(Deserialize, Default)]
struct NetworkConfig {
    bind_host: Option<String>,
    command_port: Option<u16>,
    response_port: Option<u16>,
    console_port: Option<u16>,
}

#[derive(Deserialize, Default)]
struct FadeConfig {
    tick_rate: Option<u32>,
    query_delay_ms: Option<u64>,
}

pub struct Config {
    network: NetworkConfig,
    fade: FadeConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self::embedded()
    }
}

impl Config {
    /// Embedded defaults merged with the user config file, if there is one.
    pub fn load() -> Self {
        Self::load_from(user_config_path().as_deref())
    }

    /// Embedded defaults merged with the file at `path`. A missing, unreadable,
    /// or malformed file is logged and ignored.
    pub fn load_from(path: Option<&Path>) -> Self {
        let mut config = Self::embedded();

        let Some(path) = path else {
            return config;
        };
        if !path.exists() {
            log::debug!(target: "config", "no config at {}", path.display());
            return config;
        }

        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<ConfigFile>(&contents) {
                Ok(user) => {
                    config.merge(user);
                    log::info!(target: "config", "loaded {}", path.display());
                }
                Err(e) => {
                    log::warn!(target: "config", "ignoring malformed config {}: {}", path.display(), e)
                }
            },
            Err(e) => {
                log::warn!(target: "config", "could not read config {}: {}", path.display(), e)
            }
        }

        config
    }

    /// Embedded defaults merged with a TOML snippet.
    pub fn with_overrides(contents: &str) -> Result<Self, toml::de::Error> {
        let user: ConfigFile = toml::from_str(contents)?;
        let mut config = Self::embedded();
        config.merge(user);
        Ok(config)
    }

    fn embedded() -> Self {
        // The embedded file is part of the build; a parse failure is a packaging bug.
        let base: ConfigFile =
            toml::from_str(DEFAULT_CONFIG).expect("Failed to parse embedded config.toml");
        Self {
            network: base.network,
            fade: base.fade,
        }
    }

    fn merge(&mut self, user: ConfigFile) {
        merge_network(&mut self.network, user.network);
        merge_fade(&mut self.fade, user.fade);
    }

    pub fn bind_host(&self) -> &str {
        self.network.bind_host.as_deref().unwrap_or("0.0.0.0")
    }

    pub fn command_port(&self) -> u16 {
        self.network.command_port.unwrap_or(10021)
    }

    pub fn response_port(&self) -> u16 {
        self.network.response_port.unwrap_or(10022)
    }

    pub fn console_port(&self) -> u16 {
        self.network.console_port.unwrap_or(10023)
    }

    /// Fade ticks per second (clamped to 1..=1000).
    pub fn tick_rate(&self) -> u32 {
        self.fade.tick_rate.unwrap_or(60).clamp(1, 1000)
    }

    pub fn query_delay(&self) -> Duration {
        Duration::from_millis(self.fade.query_delay_ms.unwrap_or(250))
    }
}

/// `<config_dir>/oscfade/config.toml`
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("oscfade").join("config.toml"))
}

fn merge_network(base: &mut NetworkConfig, user: NetworkConfig) {
    if user.bind_host.is_some() {
        base.bind_host = user.bind_host;
    }
    if user.command_port.is_some() {
        base.command_port = user.command_port;
    }
    if user.response_port.is_some() {
        base.response_port = user.response_port;
    }
    if user.console_port.is_some() {
        base.console_port = user.console_port;
    }
}

fn merge_fade(base: &mut FadeConfig, user: FadeConfig) {
    if user.tick_rate.is_some() {
        base.tick_rate = user.tick_rate;
    }
    if user.query_delay_ms.is_some() {
        base.query_delay_ms = user.query_delay_ms;
    }
}
