//! Fixed set of emotions a comment can carry.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ThreadError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Smile,
    Sleeping,
    Puke,
    Angry,
}

impl Emotion {
    /// Picker order. Stable across renders.
    pub const ALL: [Emotion; 4] = [Emotion::Smile, Emotion::Sleeping, Emotion::Puke, Emotion::Angry];

    pub fn as_str(self) -> &'static str {
        match self {
            Emotion::Smile => "smile",
            Emotion::Sleeping => "sleeping",
            Emotion::Puke => "puke",
            Emotion::Angry => "angry",
        }
    }

    /// Position inside [`Emotion::ALL`].
    pub fn index(self) -> usize {
        match self {
            Emotion::Smile => 0,
            Emotion::Sleeping => 1,
            Emotion::Puke => 2,
            Emotion::Angry => 3,
        }
    }

    /// Icon assets are named after the emotion identifier.
    pub fn icon_path(self, emoji_dir: &str) -> String {
        format!("{}/{}.png", emoji_dir.trim_end_matches('/'), self.as_str())
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Emotion {
    type Err = ThreadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Emotion::ALL
            .into_iter()
            .find(|e| e.as_str() == s)
            .ok_or_else(|| ThreadError::UnknownEmotion(s.to_string()))
    }
}
