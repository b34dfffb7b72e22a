//! Thread configuration. Every field has a default so hosts can pass `{}`.

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_EMOJI_DIR: &str = "./images/emoji";
pub const DEFAULT_SHAKE_MS: u32 = 600;

/// What a failed delete does to the comment that was removed optimistically.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteFailurePolicy {
    /// The comment stays removed locally; only the button is restored.
    #[default]
    KeepRemoved,
    /// The comment is put back at its former position.
    Restore,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreadConfig {
    pub emoji_dir: String,
    pub shake_ms: u32,
    pub delete_failure: DeleteFailurePolicy,
    pub dispatch_timeout_ms: Option<u32>,
    /// Offset east of UTC used for comment dates. Unset means UTC.
    pub utc_offset_minutes: Option<i32>,
}

impl Default for ThreadConfig {
    fn default() -> Self {
        Self {
            emoji_dir: DEFAULT_EMOJI_DIR.to_string(),
            shake_ms: DEFAULT_SHAKE_MS,
            delete_failure: DeleteFailurePolicy::default(),
            dispatch_timeout_ms: None,
            utc_offset_minutes: None,
        }
    }
}

impl ThreadConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(json)?)
    }

    /// Falls back to UTC when the offset is unset or out of range.
    pub fn utc_offset(&self) -> FixedOffset {
        self.utc_offset_minutes
            .and_then(|m| m.checked_mul(60))
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Utc.fix())
    }
}
