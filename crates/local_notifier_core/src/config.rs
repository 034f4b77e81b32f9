//! Bridge configuration.
//!
//! # Responsibility
//! - Hold the tunables of one `NotificationBridge` instance.
//! - Read overrides from `LOCAL_NOTIFIER_*` environment variables.
//!
//! # Invariants
//! - `index_capacity` is always >= 1.
//! - Unset variables keep defaults; malformed values are rejected, not ignored.

use crate::platform::DeliveryPath;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Method channel name shared with the Dart side.
pub const CHANNEL_NAME: &str = "local_notifier";
pub const DEFAULT_INDEX_CAPACITY: usize = 256;
pub const DEFAULT_SOUND_NAME: &str = "default";
pub const DEFAULT_CONTENT_IMAGE: &str = "AppIcon";

pub const ENV_INDEX_CAPACITY: &str = "LOCAL_NOTIFIER_INDEX_CAPACITY";
pub const ENV_DELIVERY_PATH: &str = "LOCAL_NOTIFIER_DELIVERY_PATH";
pub const ENV_PRESENT_IN_FOREGROUND: &str = "LOCAL_NOTIFIER_PRESENT_IN_FOREGROUND";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    pub channel_name: String,
    /// Upper bound of tracked active notifications.
    pub index_capacity: usize,
    pub sound_name: String,
    /// Image resource attached on the legacy path.
    pub content_image: String,
    /// Allow presentation while the application is foregrounded.
    pub present_in_foreground: bool,
    /// Skips the capability probe when set.
    pub forced_path: Option<DeliveryPath>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            channel_name: CHANNEL_NAME.to_string(),
            index_capacity: DEFAULT_INDEX_CAPACITY,
            sound_name: DEFAULT_SOUND_NAME.to_string(),
            content_image: DEFAULT_CONTENT_IMAGE.to_string(),
            present_in_foreground: true,
            forced_path: None,
        }
    }
}

impl BridgeConfig {
    /// Defaults overlaid with process environment overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with values from `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(raw) = non_blank(lookup(ENV_INDEX_CAPACITY)) {
            let capacity = raw
                .parse::<usize>()
                .ok()
                .filter(|value| *value > 0)
                .ok_or_else(|| ConfigError::invalid(ENV_INDEX_CAPACITY, &raw))?;
            config.index_capacity = capacity;
        }

        if let Some(raw) = non_blank(lookup(ENV_DELIVERY_PATH)) {
            let path = DeliveryPath::parse(&raw)
                .ok_or_else(|| ConfigError::invalid(ENV_DELIVERY_PATH, &raw))?;
            config.forced_path = Some(path);
        }

        if let Some(raw) = non_blank(lookup(ENV_PRESENT_IN_FOREGROUND)) {
            config.present_in_foreground = match raw.to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                _ => return Err(ConfigError::invalid(ENV_PRESENT_IN_FOREGROUND, &raw)),
            };
        }

        Ok(config)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue { key: &'static str, value: String },
}

impl ConfigError {
    fn invalid(key: &'static str, value: &str) -> Self {
        Self::InvalidValue {
            key,
            value: value.to_string(),
        }
    }
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, value } => write!(f, "invalid value for {key}: `{value}`"),
        }
    }
}

impl Error for ConfigError {}
