//! Client configuration read from the environment.

use std::time::Duration;

use otherworlds_core::input::Key;

use crate::error::AppError;

/// Input script used when `OTHERWORLDS_SCRIPT` is not set: recruit an
/// adventurer, visit the training grounds, run one expedition and return to
/// the title screen.
pub const DEFAULT_SCRIPT: &str = "enter,enter,enter,down,enter,down,down,enter,escape,\
     down,down,down,down,down,down,enter,enter,enter,enter,down,enter,up,enter";

/// Runtime settings for the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Interval between ticks.
    pub tick: Duration,
    /// Delay of the fade used for menu transitions.
    pub fade: Duration,
    /// Upper bound on the number of ticks the loop runs.
    pub max_ticks: u64,
    /// Keys fed to the input source, one per tick.
    pub script: Vec<Key>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(16),
            fade: Duration::from_millis(250),
            max_ticks: 600,
            script: parse_script(DEFAULT_SCRIPT).unwrap_or_default(),
        }
    }
}

impl ClientConfig {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is set but invalid.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, falling back to defaults for
    /// unset variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is set but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let defaults = Self::default();

        let tick_ms = read_u64(&lookup, "OTHERWORLDS_TICK_MS", 16)?;
        if tick_ms == 0 {
            return Err(AppError::Config(
                "OTHERWORLDS_TICK_MS must be greater than zero".to_string(),
            ));
        }
        let fade_ms = read_u64(&lookup, "OTHERWORLDS_FADE_MS", 250)?;
        let max_ticks = read_u64(&lookup, "OTHERWORLDS_MAX_TICKS", defaults.max_ticks)?;
        let script = match lookup("OTHERWORLDS_SCRIPT") {
            Some(raw) => parse_script(&raw)?,
            None => defaults.script,
        };

        Ok(Self {
            tick: Duration::from_millis(tick_ms),
            fade: Duration::from_millis(fade_ms),
            max_ticks,
            script,
        })
    }
}

fn read_u64(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: u64,
) -> Result<u64, AppError> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("{key} must be a valid u64: {e}"))),
        None => Ok(default),
    }
}

/// Parses a comma-separated list of key names. Blank entries are skipped.
///
/// # Errors
///
/// Returns `AppError::Config` naming the first unknown key.
pub fn parse_script(raw: &str) -> Result<Vec<Key>, AppError> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| {
            Key::parse(name)
                .ok_or_else(|| AppError::Config(format!("unknown key in OTHERWORLDS_SCRIPT: {name}")))
        })
        .collect()
}
