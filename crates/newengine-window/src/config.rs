use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{BridgeError, BridgeResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeConfig {
    #[serde(default)]
    pub window: WindowConfig,

    #[serde(default)]
    pub pump: PumpConfig,

    /// Initial capacity of every per-window event queue.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// env_logger filter; `RUST_LOG` wins when set.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default = "default_width")]
    pub width: i32,

    #[serde(default = "default_height")]
    pub height: i32,

    #[serde(default = "default_true")]
    pub resizable: bool,

    #[serde(default = "default_true")]
    pub visible: bool,

    #[serde(default = "default_true")]
    pub decorated: bool,
}

/// How `Window::advance` drives native event processing.
///
/// `wait_events` runs first, then `poll_events`. Both off means the host
/// calls `Environment::poll_events` itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PumpConfig {
    #[serde(default = "default_true")]
    pub poll_events: bool,

    #[serde(default)]
    pub wait_events: bool,

    /// Upper bound for the blocking wait; absent means wait indefinitely.
    #[serde(default)]
    pub wait_timeout_ms: Option<u64>,
}

fn default_title() -> String {
    "NewEngine".to_string()
}
fn default_width() -> i32 {
    1280
}
fn default_height() -> i32 {
    720
}
fn default_true() -> bool {
    true
}
fn default_queue_capacity() -> usize {
    64
}
fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            pump: PumpConfig::default(),
            queue_capacity: default_queue_capacity(),
            log_filter: default_log_filter(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            width: default_width(),
            height: default_height(),
            resizable: true,
            visible: true,
            decorated: true,
        }
    }
}

impl Default for PumpConfig {
    fn default() -> Self {
        Self {
            poll_events: true,
            wait_events: false,
            wait_timeout_ms: None,
        }
    }
}

impl BridgeConfig {
    pub fn from_toml_str(s: &str) -> BridgeResult<Self> {
        toml::from_str(s).map_err(|e| BridgeError::Config(e.to_string()))
    }

    /// Missing file means defaults; an unreadable or malformed one is an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> BridgeResult<Self> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(s) => toml::from_str(&s)
                .map_err(|e| BridgeError::Config(format!("parse {}: {}", path.display(), e))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(BridgeError::Config(format!("read {}: {}", path.display(), e))),
        }
    }
}
