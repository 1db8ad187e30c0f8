use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use shire_agent::{AgentConfig, HandshakeMode, ReconnectPolicy, SweepConfig};
use shire_bridge::DEFAULT_MAX_FRAME_LEN;

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub bridge: BridgeConfig,

    #[serde(default)]
    pub reconnect: ReconnectPolicy,

    #[serde(default)]
    pub sweep: SweepConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct BridgeConfig {
    #[serde(default = "default_socket_path")]
    pub socket_path: PathBuf,
    #[serde(default)]
    pub handshake: HandshakeMode,
    #[serde(default = "default_max_frame_len")]
    pub max_frame_len: usize,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_socket_path() -> PathBuf {
    PathBuf::from("/tmp/shire_bridge.sock")
}

fn default_max_frame_len() -> usize {
    DEFAULT_MAX_FRAME_LEN
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            socket_path: default_socket_path(),
            handshake: HandshakeMode::default(),
            max_frame_len: default_max_frame_len(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// `$HOME/.config/shire/agent.toml`
pub fn default_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("shire").join("agent.toml"))
}

impl Config {
    pub fn parse(text: &str) -> Result<Self, String> {
        toml::from_str(text).map_err(|e| format!("Invalid config: {e}"))
    }

    /// Load `explicit` if given (it must exist), else the default path if it
    /// exists, else the built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, String> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match default_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(Self::default()),
            },
        };

        let text = fs::read_to_string(&path).map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?;
        Self::parse(&text).map_err(|e| format!("{}: {}", path.display(), e))
    }

    pub fn agent(&self) -> AgentConfig {
        AgentConfig {
            handshake: self.bridge.handshake,
            reconnect: self.reconnect,
            sweep: self.sweep.clone(),
        }
    }
}
