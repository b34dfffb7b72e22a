//! View operations emitted by the controller for a host to apply in order.

use crate::comment::CommentId;
use crate::emotion::Emotion;

/// An element of the mounted section the controller can address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Count,
    List,
    EmojiList,
    TextInput,
    EmojiOption(Emotion),
    Preview,
    DeleteButton(CommentId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch {
    /// Swap the preview slot node for a freshly built one.
    ReplacePreview { markup: String },
    /// Replace the picker's children with a pristine set of options.
    ResetEmojiList { markup: String },
    SetCount(usize),
    /// Replace the list's children. Delete listeners must be attached again.
    ReplaceList { markup: String },
    SetInputValue(String),
    SetDisabled { target: Target, disabled: bool },
    SetLabel { target: Target, label: &'static str },
    /// Play the rejection cue. Leaves the disabled flag alone.
    Shake(Target),
}

impl Patch {
    pub fn disable(target: Target) -> Self {
        Patch::SetDisabled { target, disabled: true }
    }

    pub fn enable(target: Target) -> Self {
        Patch::SetDisabled { target, disabled: false }
    }
}
