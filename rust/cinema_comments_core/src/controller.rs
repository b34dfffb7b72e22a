//! Optimistic mutation of a film's comment thread.
//!
//! Every mutation is split in two: `begin_*` validates, takes a lock and
//! applies the local change, returning a ticket; `finish_*` consumes that
//! ticket together with the dispatcher's outcome and reconciles the view.
//! Nothing is borrowed across the dispatch, so other intents (a delete of a
//! different comment, say) can be handled while one is in flight.
//!
//! View changes are queued as [`Patch`]es and drained with
//! [`CommentsController::take_patches`].

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use log::{debug, warn};

use crate::comment::{remove_by_id, Comment, CommentId, NewComment};
use crate::config::{DeleteFailurePolicy, ThreadConfig};
use crate::emotion::Emotion;
use crate::error::{DispatchError, ThreadError};
use crate::patch::{Patch, Target};
use crate::render;

/// Outcome of one dispatch. `Ok(None)` means success without a fresh collection.
pub type DispatchOutcome = Result<Option<Vec<Comment>>, DispatchError>;

/// Ctrl+Enter, or Cmd+Enter on macOS.
pub fn is_submit_gesture(key: &str, ctrl: bool, meta: bool) -> bool {
    (ctrl || meta) && key == "Enter"
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Lease(u64);

/// Proof of a pending create. Consumed by [`CommentsController::finish_submit`].
#[derive(Debug)]
pub struct SubmitTicket {
    lease: Lease,
    payload: NewComment,
}

impl SubmitTicket {
    pub fn payload(&self) -> &NewComment {
        &self.payload
    }
}

/// Proof of a pending delete. Consumed by [`CommentsController::finish_delete`].
#[derive(Debug)]
pub struct DeleteTicket {
    lease: Lease,
    id: CommentId,
}

impl DeleteTicket {
    pub fn id(&self) -> &CommentId {
        &self.id
    }
}

#[derive(Debug)]
struct DeleteLock {
    lease: Lease,
    removed: Option<(usize, Comment)>,
}

#[derive(Debug, Default)]
struct Locks {
    submit: Option<Lease>,
    deletes: BTreeMap<CommentId, DeleteLock>,
}

/// Enabled/disabled flags of the new-comment form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormFlags {
    pub input_disabled: bool,
    pub emoji_disabled: [bool; 4],
}

impl FormFlags {
    /// Flips every flag. Applying it twice is the identity.
    fn toggle(&mut self) {
        self.input_disabled = !self.input_disabled;
        for flag in &mut self.emoji_disabled {
            *flag = !*flag;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub text: String,
    pub emotion: Option<Emotion>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteButton {
    pub label: &'static str,
    pub disabled: bool,
}

#[derive(Debug)]
pub struct CommentsController {
    config: ThreadConfig,
    comments: Vec<Comment>,
    /// Ids whose delete buttons are in the currently rendered list.
    rendered: Vec<CommentId>,
    draft: Draft,
    form: FormFlags,
    locks: Locks,
    next_lease: u64,
    outbox: Vec<Patch>,
}

impl CommentsController {
    pub fn new(comments: Vec<Comment>, config: ThreadConfig) -> Self {
        let rendered = comments.iter().map(|c| c.id.clone()).collect();
        Self {
            config,
            comments,
            rendered,
            draft: Draft::default(),
            form: FormFlags::default(),
            locks: Locks::default(),
            next_lease: 0,
            outbox: Vec::new(),
        }
    }

    pub fn config(&self) -> &ThreadConfig {
        &self.config
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn form(&self) -> FormFlags {
        self.form
    }

    pub fn is_submitting(&self) -> bool {
        self.locks.submit.is_some()
    }

    pub fn pending_deletes(&self) -> impl Iterator<Item = &CommentId> {
        self.locks.deletes.keys()
    }

    pub fn is_idle(&self) -> bool {
        self.locks.submit.is_none() && self.locks.deletes.is_empty()
    }

    /// State of the delete button for `id`, if one is currently rendered.
    pub fn delete_button(&self, id: &CommentId) -> Option<DeleteButton> {
        if !self.rendered.contains(id) {
            return None;
        }
        Some(if self.locks.deletes.contains_key(id) {
            DeleteButton { label: render::DELETING_LABEL, disabled: true }
        } else {
            DeleteButton { label: render::DELETE_LABEL, disabled: false }
        })
    }

    /// Markup of the whole section for the current state.
    pub fn section_html(&self) -> String {
        render::section_html(&self.comments, &self.config.emoji_dir, self.config.utc_offset())
    }

    pub fn take_patches(&mut self) -> Vec<Patch> {
        std::mem::take(&mut self.outbox)
    }

    /// Mirrors the text field. Hosts call this on input.
    pub fn set_draft_text(&mut self, text: impl Into<String>) {
        self.draft.text = text.into();
    }

    pub fn select_emotion(&mut self, emotion: Emotion) -> Result<(), ThreadError> {
        if self.is_submitting() {
            return Err(ThreadError::SubmitInFlight);
        }
        self.draft.emotion = Some(emotion);
        self.outbox.push(Patch::ReplacePreview {
            markup: render::emoji_preview_html(Some(emotion), &self.config.emoji_dir),
        });
        Ok(())
    }

    pub fn begin_submit(&mut self) -> Result<SubmitTicket, ThreadError> {
        self.begin_submit_at(Utc::now())
    }

    pub fn begin_submit_at(&mut self, now: DateTime<Utc>) -> Result<SubmitTicket, ThreadError> {
        if self.is_submitting() {
            return Err(ThreadError::SubmitInFlight);
        }
        let Some(emotion) = self.draft.emotion else {
            warn!("comment submit rejected: no emotion selected");
            self.outbox.push(Patch::Shake(Target::Preview));
            return Err(ThreadError::MissingEmotion);
        };
        let lease = self.lease();
        self.locks.submit = Some(lease);
        self.toggle_form();
        debug!("submitting comment with emotion {}", emotion);
        Ok(SubmitTicket {
            lease,
            payload: NewComment { comment: self.draft.text.clone(), emotion, date: now },
        })
    }

    pub fn finish_submit(&mut self, ticket: SubmitTicket, outcome: DispatchOutcome) {
        if self.locks.submit != Some(ticket.lease) {
            warn!("ignoring stale submit ticket {:?}", ticket.lease);
            return;
        }
        self.locks.submit = None;
        match outcome {
            Ok(fresh) => {
                if let Some(fresh) = fresh {
                    self.comments = fresh;
                }
                self.reset_form();
                self.redraw();
                debug!("comment submitted, thread now has {} comments", self.comments.len());
            }
            Err(e) => {
                warn!("comment submit failed: {}", e);
                self.toggle_form();
                self.outbox.push(Patch::Shake(Target::TextInput));
            }
        }
    }

    pub fn begin_delete(&mut self, id: &CommentId) -> Result<DeleteTicket, ThreadError> {
        if self.locks.deletes.contains_key(id) {
            return Err(ThreadError::DeleteInFlight(id.clone()));
        }
        let removed = remove_by_id(&mut self.comments, id);
        if removed.is_none() && !self.rendered.contains(id) {
            return Err(ThreadError::UnknownComment(id.clone()));
        }
        let lease = self.lease();
        self.locks.deletes.insert(id.clone(), DeleteLock { lease, removed });
        let target = Target::DeleteButton(id.clone());
        self.outbox.push(Patch::SetLabel { target: target.clone(), label: render::DELETING_LABEL });
        self.outbox.push(Patch::disable(target));
        debug!("deleting comment {}", id);
        Ok(DeleteTicket { lease, id: id.clone() })
    }

    pub fn finish_delete(&mut self, ticket: DeleteTicket, outcome: DispatchOutcome) {
        let lock = match self.locks.deletes.remove(&ticket.id) {
            Some(lock) if lock.lease == ticket.lease => lock,
            Some(lock) => {
                warn!("ignoring stale delete ticket for comment {}", ticket.id);
                self.locks.deletes.insert(ticket.id, lock);
                return;
            }
            None => {
                warn!("ignoring delete ticket for comment {} with no lock", ticket.id);
                return;
            }
        };
        match outcome {
            Ok(fresh) => {
                match fresh {
                    Some(fresh) => self.comments = fresh,
                    // a collection adopted meanwhile may still carry it
                    None => {
                        remove_by_id(&mut self.comments, &ticket.id);
                    }
                }
                self.redraw();
                debug!("comment {} deleted", ticket.id);
            }
            Err(e) => {
                warn!("deleting comment {} failed: {}", ticket.id, e);
                self.recover_failed_delete(&ticket.id, lock.removed);
            }
        }
    }

    fn recover_failed_delete(&mut self, id: &CommentId, removed: Option<(usize, Comment)>) {
        let target = Target::DeleteButton(id.clone());
        let restorable = removed.filter(|_| self.config.delete_failure == DeleteFailurePolicy::Restore);
        match restorable {
            Some((idx, comment)) if !self.comments.iter().any(|c| &c.id == id) => {
                let idx = idx.min(self.comments.len());
                self.comments.insert(idx, comment);
                self.redraw();
            }
            _ => {
                self.outbox.push(Patch::SetLabel { target: target.clone(), label: render::DELETE_LABEL });
                self.outbox.push(Patch::enable(target.clone()));
            }
        }
        if self.rendered.contains(id) {
            self.outbox.push(Patch::Shake(target));
        }
    }

    fn toggle_form(&mut self) {
        self.form.toggle();
        self.outbox.push(Patch::SetDisabled { target: Target::TextInput, disabled: self.form.input_disabled });
        for e in Emotion::ALL {
            self.outbox.push(Patch::SetDisabled {
                target: Target::EmojiOption(e),
                disabled: self.form.emoji_disabled[e.index()],
            });
        }
    }

    fn reset_form(&mut self) {
        self.draft = Draft::default();
        self.form = FormFlags::default();
        let dir = &self.config.emoji_dir;
        self.outbox.push(Patch::ReplacePreview { markup: render::emoji_preview_html(None, dir) });
        self.outbox.push(Patch::SetInputValue(String::new()));
        self.outbox.push(Patch::enable(Target::TextInput));
        self.outbox.push(Patch::ResetEmojiList { markup: render::emoji_list_html(dir) });
    }

    /// Regenerates count and list. Buttons of comments still locked keep
    /// their pending look.
    fn redraw(&mut self) {
        self.rendered = self.comments.iter().map(|c| c.id.clone()).collect();
        self.outbox.push(Patch::SetCount(self.comments.len()));
        self.outbox.push(Patch::ReplaceList {
            markup: render::comment_list_html(&self.comments, &self.config.emoji_dir, self.config.utc_offset()),
        });
        for id in self.locks.deletes.keys() {
            if self.rendered.contains(id) {
                let target = Target::DeleteButton(id.clone());
                self.outbox.push(Patch::SetLabel { target: target.clone(), label: render::DELETING_LABEL });
                self.outbox.push(Patch::disable(target));
            }
        }
    }

    fn lease(&mut self) -> Lease {
        self.next_lease += 1;
        Lease(self.next_lease)
    }
}
