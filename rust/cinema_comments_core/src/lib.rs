//! Comment thread of the film details popup: rendering, optimistic
//! mutation and reconciliation with the backend.

pub mod emotion;
pub mod comment;
pub mod config;
pub mod error;
pub mod render;
pub mod patch;
pub mod controller;
pub mod dispatch;
pub mod view;

pub use comment::{Comment, CommentId, NewComment};
pub use config::{DeleteFailurePolicy, ThreadConfig};
pub use controller::{is_submit_gesture, CommentsController, DispatchOutcome};
pub use dispatch::{delete_comment, submit_comment, ActionPayload, Dispatcher, UpdateType, UserAction};
pub use emotion::Emotion;
pub use error::{ConfigError, DispatchError, ThreadError};
pub use patch::{Patch, Target};
pub use view::{CommentsView, RenderHost, View};
