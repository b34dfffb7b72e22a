//! Dispatcher contract and the drivers that run one mutation end to end.

use std::cell::RefCell;
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::comment::{CommentId, NewComment};
use crate::controller::{CommentsController, DispatchOutcome};
use crate::error::ThreadError;
use crate::patch::Patch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserAction {
    CreateComment,
    DeleteComment,
}

impl UserAction {
    pub fn as_str(self) -> &'static str {
        match self {
            UserAction::CreateComment => "CREATE_COMMENT",
            UserAction::DeleteComment => "DELETE_COMMENT",
        }
    }
}

/// How much of the surrounding page the catalog should refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UpdateType {
    Patch,
    Minor,
    Major,
    Init,
    JustData,
}

impl UpdateType {
    pub fn as_str(self) -> &'static str {
        match self {
            UpdateType::Patch => "PATCH",
            UpdateType::Minor => "MINOR",
            UpdateType::Major => "MAJOR",
            UpdateType::Init => "INIT",
            UpdateType::JustData => "JUST_DATA",
        }
    }
}

impl fmt::Display for UserAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ActionPayload {
    Create(NewComment),
    Delete(CommentId),
}

/// Performs the network/storage side of a mutation.
///
/// Resolves exactly once per call. Single threaded, hence `?Send`.
#[async_trait(?Send)]
pub trait Dispatcher {
    async fn dispatch(&self, action: UserAction, update: UpdateType, payload: ActionPayload) -> DispatchOutcome;
}

/// Runs a submit from the current draft. `flush` receives queued view
/// patches before the dispatch is awaited and again after reconciliation.
///
/// No borrow of `thread` is held across the await.
pub async fn submit_comment<D, F>(thread: &RefCell<CommentsController>, dispatcher: &D, mut flush: F) -> Result<(), ThreadError>
where
    D: Dispatcher + ?Sized,
    F: FnMut(Vec<Patch>),
{
    let begun = thread.borrow_mut().begin_submit();
    let patches = thread.borrow_mut().take_patches();
    flush(patches);
    let ticket = begun?;

    let payload = ActionPayload::Create(ticket.payload().clone());
    let outcome = dispatcher.dispatch(UserAction::CreateComment, UpdateType::Patch, payload).await;

    thread.borrow_mut().finish_submit(ticket, outcome);
    let patches = thread.borrow_mut().take_patches();
    flush(patches);
    Ok(())
}

/// Runs a delete of `id`, removing it locally before the dispatch.
pub async fn delete_comment<D, F>(
    thread: &RefCell<CommentsController>,
    dispatcher: &D,
    id: &CommentId,
    mut flush: F,
) -> Result<(), ThreadError>
where
    D: Dispatcher + ?Sized,
    F: FnMut(Vec<Patch>),
{
    let begun = thread.borrow_mut().begin_delete(id);
    let patches = thread.borrow_mut().take_patches();
    flush(patches);
    let ticket = begun?;

    let payload = ActionPayload::Delete(ticket.id().clone());
    let outcome = dispatcher.dispatch(UserAction::DeleteComment, UpdateType::Patch, payload).await;

    thread.borrow_mut().finish_delete(ticket, outcome);
    let patches = thread.borrow_mut().take_patches();
    flush(patches);
    Ok(())
}
