//! Comment model as exchanged with the backend.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::emotion::Emotion;

/// Server-assigned identifier. The backend sends either strings or numbers;
/// both are kept as their string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawId", into = "String")]
pub struct CommentId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
}

impl From<RawId> for CommentId {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(s) => CommentId(s),
            RawId::Number(n) => CommentId(n.to_string()),
        }
    }
}

impl From<CommentId> for String {
    fn from(id: CommentId) -> Self {
        id.0
    }
}

impl From<&str> for CommentId {
    fn from(s: &str) -> Self {
        CommentId(s.to_string())
    }
}

impl From<String> for CommentId {
    fn from(s: String) -> Self {
        CommentId(s)
    }
}

impl CommentId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub author: String,
    /// Body text as typed by the author; escape before rendering.
    pub comment: String,
    pub date: DateTime<Utc>,
    pub emotion: Emotion,
}

/// Draft payload sent with a create action. Carries no id: ids come from the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewComment {
    pub comment: String,
    pub emotion: Emotion,
    pub date: DateTime<Utc>,
}

pub fn parse_collection(json: &str) -> serde_json::Result<Vec<Comment>> {
    serde_json::from_str(json)
}

/// Removes the first comment with `id`, returning it with its former index.
pub fn remove_by_id(comments: &mut Vec<Comment>, id: &CommentId) -> Option<(usize, Comment)> {
    let idx = comments.iter().position(|c| &c.id == id)?;
    Some((idx, comments.remove(idx)))
}

#[cfg(test)]
pub(crate) fn sample(id: &str, text: &str, emotion: Emotion) -> Comment {
    use chrono::TimeZone;
    Comment {
        id: CommentId::from(id),
        author: "Tim Macoveev".into(),
        comment: text.into(),
        date: Utc.with_ymd_and_hms(2019, 12, 31, 23, 59, 0).unwrap(),
        emotion,
    }
}
