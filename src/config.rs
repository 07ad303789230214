//! Runtime knobs for the screen. Read once at startup, never persisted.

use std::env;

/// Default `env_logger` filter; `RUST_LOG` overrides it.
pub const DEFAULT_LOG_FILTER: &str = "info";

const BELL_ENV: &str = "CHRONOX_BELL";
const SPLITS_ENV: &str = "CHRONOX_SPLITS";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScreenConfig {
    /// Ring the terminal bell when an action is rejected
    pub bell: bool,
    /// Show the split next to each lap
    pub show_splits: bool,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            bell: true,
            show_splits: true,
        }
    }
}

impl ScreenConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(bell) = flag(&lookup, BELL_ENV) {
            config.bell = bell;
        }
        if let Some(splits) = flag(&lookup, SPLITS_ENV) {
            config.show_splits = splits;
        }
        config
    }
}

fn flag(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<bool> {
    let raw = lookup(key)?;
    let parsed = parse_flag(&raw);
    if parsed.is_none() {
        log::warn!("ignoring {}={:?}: expected a boolean", key, raw);
    }
    parsed
}

pub fn parse_flag(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
