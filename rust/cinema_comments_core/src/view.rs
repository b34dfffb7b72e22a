//! Views over a rendering host.
//!
//! A [`RenderHost`] turns markup into live nodes and swaps nodes in place;
//! a [`View`] produces its root node from a template and can be mounted into
//! and unmounted from a parent. [`CommentsView`] is the comment section.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use log::debug;

use crate::controller::CommentsController;
use crate::patch::{Patch, Target};

pub trait RenderHost {
    type Node: Clone;
    type Error: fmt::Display;

    /// Builds a live node from a markup string with a single root element.
    fn create_element(&self, markup: &str) -> Result<Self::Node, Self::Error>;
    /// Puts `new` where `old` is. `old` is detached.
    fn replace(&self, old: &Self::Node, new: &Self::Node) -> Result<(), Self::Error>;
    fn append(&self, parent: &Self::Node, child: &Self::Node) -> Result<(), Self::Error>;
    fn remove(&self, node: &Self::Node);

    fn find(&self, root: &Self::Node, target: &Target) -> Option<Self::Node>;
    fn set_text(&self, node: &Self::Node, text: &str);
    fn set_inner_html(&self, node: &Self::Node, markup: &str);
    fn set_value(&self, node: &Self::Node, value: &str);
    fn set_disabled(&self, node: &Self::Node, disabled: bool);
    /// Starts the rejection cue; returns immediately.
    fn shake(&self, node: &Self::Node, duration_ms: u32);
}

pub trait View<H: RenderHost> {
    /// The root node, built from the template on first use.
    fn element(&mut self, host: &H) -> Result<H::Node, H::Error>;

    fn mount(&mut self, host: &H, parent: &H::Node) -> Result<(), H::Error> {
        let root = self.element(host)?;
        host.append(parent, &root)
    }

    /// Detaches and forgets the root node.
    fn unmount(&mut self, host: &H);
}

/// Applies one patch below `root`. Targets no longer present are skipped:
/// a list regeneration may have dropped the node a late reply refers to.
pub fn apply_patch<H: RenderHost>(host: &H, root: &H::Node, patch: &Patch, shake_ms: u32) -> Result<(), H::Error> {
    let find = |target: &Target| {
        let node = host.find(root, target);
        if node.is_none() {
            debug!("patch target {:?} not mounted, skipping", target);
        }
        node
    };
    match patch {
        Patch::ReplacePreview { markup } => {
            if let Some(old) = find(&Target::Preview) {
                let new = host.create_element(markup)?;
                host.replace(&old, &new)?;
            }
        }
        Patch::ResetEmojiList { markup } => {
            if let Some(list) = find(&Target::EmojiList) {
                host.set_inner_html(&list, markup);
            }
        }
        Patch::SetCount(n) => {
            if let Some(count) = find(&Target::Count) {
                host.set_text(&count, &n.to_string());
            }
        }
        Patch::ReplaceList { markup } => {
            if let Some(list) = find(&Target::List) {
                host.set_inner_html(&list, markup);
            }
        }
        Patch::SetInputValue(value) => {
            if let Some(input) = find(&Target::TextInput) {
                host.set_value(&input, value);
            }
        }
        Patch::SetDisabled { target, disabled } => {
            if let Some(node) = find(target) {
                host.set_disabled(&node, *disabled);
            }
        }
        Patch::SetLabel { target, label } => {
            if let Some(node) = find(target) {
                host.set_text(&node, label);
            }
        }
        Patch::Shake(target) => {
            if let Some(node) = find(target) {
                host.shake(&node, shake_ms);
            }
        }
    }
    Ok(())
}

pub struct CommentsView<H: RenderHost> {
    thread: Rc<RefCell<CommentsController>>,
    root: Option<H::Node>,
}

impl<H: RenderHost> CommentsView<H> {
    pub fn new(thread: Rc<RefCell<CommentsController>>) -> Self {
        Self { thread, root: None }
    }

    pub fn thread(&self) -> &Rc<RefCell<CommentsController>> {
        &self.thread
    }

    pub fn root(&self) -> Option<&H::Node> {
        self.root.as_ref()
    }

    /// Applies patches in order. Returns whether the comment list was
    /// regenerated, in which case delete listeners must be attached again.
    pub fn apply(&self, host: &H, patches: &[Patch]) -> Result<bool, H::Error> {
        let Some(root) = &self.root else {
            debug!("dropping {} patches for an unmounted view", patches.len());
            return Ok(false);
        };
        let shake_ms = self.thread.borrow().config().shake_ms;
        let mut list_replaced = false;
        for patch in patches {
            apply_patch(host, root, patch, shake_ms)?;
            list_replaced |= matches!(patch, Patch::ReplaceList { .. });
        }
        Ok(list_replaced)
    }
}

impl<H: RenderHost> View<H> for CommentsView<H> {
    fn element(&mut self, host: &H) -> Result<H::Node, H::Error> {
        if let Some(root) = &self.root {
            return Ok(root.clone());
        }
        let root = host.create_element(&self.thread.borrow().section_html())?;
        self.root = Some(root.clone());
        Ok(root)
    }

    fn unmount(&mut self, host: &H) {
        if let Some(root) = self.root.take() {
            host.remove(&root);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comment::{sample, CommentId};
    use crate::config::ThreadConfig;
    use crate::emotion::Emotion;
    use crate::render;

    type NodeRef = Rc<RefCell<MemNode>>;

    #[derive(Debug, Default)]
    struct MemNode {
        markup: String,
        role: Option<Target>,
        text: String,
        value: String,
        disabled: bool,
        shakes: u32,
        children: Vec<NodeRef>,
    }

    /// Just enough of a document to check node bookkeeping. Elements for the
    /// known targets are derived from the markup by class name and data-id.
    #[derive(Default)]
    struct MemoryHost;

    impl MemoryHost {
        fn node(role: Option<Target>, markup: &str) -> NodeRef {
            Rc::new(RefCell::new(MemNode { markup: markup.to_string(), role, ..Default::default() }))
        }

        fn delete_buttons(markup: &str) -> Vec<NodeRef> {
            markup
                .split("data-id=\"")
                .skip(1)
                .filter_map(|rest| rest.split('"').next())
                .map(|id| Self::node(Some(Target::DeleteButton(CommentId::from(id))), ""))
                .collect()
        }

        fn emoji_options() -> Vec<NodeRef> {
            Emotion::ALL.into_iter().map(|e| Self::node(Some(Target::EmojiOption(e)), "")).collect()
        }

        fn find_in(node: &NodeRef, target: &Target) -> Option<NodeRef> {
            if node.borrow().role.as_ref() == Some(target) {
                return Some(node.clone());
            }
            node.borrow().children.iter().find_map(|c| Self::find_in(c, target))
        }
    }

    impl RenderHost for MemoryHost {
        type Node = NodeRef;
        type Error = String;

        fn create_element(&self, markup: &str) -> Result<NodeRef, String> {
            if markup.contains(render::SECTION_CLASS) {
                let root = Self::node(None, markup);
                let list = Self::node(Some(Target::List), "");
                list.borrow_mut().children = Self::delete_buttons(markup);
                let picker = Self::node(Some(Target::EmojiList), "");
                picker.borrow_mut().children = Self::emoji_options();
                root.borrow_mut().children = vec![
                    Self::node(Some(Target::Count), ""),
                    list,
                    Self::node(Some(Target::Preview), &render::emoji_preview_html(None, "")),
                    Self::node(Some(Target::TextInput), ""),
                    picker,
                ];
                Ok(root)
            } else if markup.contains(render::PREVIEW_CLASS) {
                Ok(Self::node(Some(Target::Preview), markup))
            } else {
                Err(format!("unexpected markup: {markup}"))
            }
        }

        fn replace(&self, old: &NodeRef, new: &NodeRef) -> Result<(), String> {
            fn swap(parent: &NodeRef, old: &NodeRef, new: &NodeRef) -> bool {
                let mut p = parent.borrow_mut();
                if let Some(slot) = p.children.iter_mut().find(|c| Rc::ptr_eq(c, old)) {
                    *slot = new.clone();
                    return true;
                }
                p.children.iter().any(|c| swap(c, old, new))
            }
            // every page created by `mounted` is searched
            ROOTS.with(|roots| {
                roots
                    .borrow()
                    .iter()
                    .any(|r| swap(r, old, new))
                    .then_some(())
                    .ok_or_else(|| "node not attached".to_string())
            })
        }

        fn append(&self, parent: &NodeRef, child: &NodeRef) -> Result<(), String> {
            parent.borrow_mut().children.push(child.clone());
            Ok(())
        }

        fn remove(&self, node: &NodeRef) {
            ROOTS.with(|roots| {
                for r in roots.borrow().iter() {
                    r.borrow_mut().children.retain(|c| !Rc::ptr_eq(c, node));
                }
            });
        }

        fn find(&self, root: &NodeRef, target: &Target) -> Option<NodeRef> {
            Self::find_in(root, target)
        }

        fn set_text(&self, node: &NodeRef, text: &str) {
            node.borrow_mut().text = text.to_string();
        }

        fn set_inner_html(&self, node: &NodeRef, markup: &str) {
            let children = match node.borrow().role {
                Some(Target::List) => Self::delete_buttons(markup),
                Some(Target::EmojiList) => Self::emoji_options(),
                _ => Vec::new(),
            };
            let mut n = node.borrow_mut();
            n.markup = markup.to_string();
            n.children = children;
        }

        fn set_value(&self, node: &NodeRef, value: &str) {
            node.borrow_mut().value = value.to_string();
        }

        fn set_disabled(&self, node: &NodeRef, disabled: bool) {
            node.borrow_mut().disabled = disabled;
        }

        fn shake(&self, node: &NodeRef, _duration_ms: u32) {
            node.borrow_mut().shakes += 1;
        }
    }

    thread_local! {
        static ROOTS: RefCell<Vec<NodeRef>> = RefCell::new(Vec::new());
    }

    fn mounted(comments: Vec<crate::comment::Comment>) -> (MemoryHost, NodeRef, CommentsView<MemoryHost>) {
        let host = MemoryHost;
        let page = MemoryHost::node(None, "<body>");
        ROOTS.with(|r| r.borrow_mut().push(page.clone()));
        let thread = Rc::new(RefCell::new(CommentsController::new(comments, ThreadConfig::default())));
        let mut view = CommentsView::new(thread);
        view.mount(&host, &page).unwrap();
        (host, page, view)
    }

    fn count(node: &NodeRef, target: &Target) -> usize {
        let here = usize::from(node.borrow().role.as_ref() == Some(target));
        here + node.borrow().children.iter().map(|c| count(c, target)).sum::<usize>()
    }

    #[test]
    fn mount_and_unmount() {
        let (host, page, mut view) = mounted(vec![sample("1", "x", Emotion::Smile)]);
        assert_eq!(page.borrow().children.len(), 1);
        let root = view.root().cloned().unwrap();
        assert!(Rc::ptr_eq(&view.element(&host).unwrap(), &root));
        assert_eq!(count(&page, &Target::DeleteButton("1".into())), 1);

        view.unmount(&host);
        assert!(page.borrow().children.is_empty());
        assert!(view.root().is_none());
        assert!(!view.apply(&host, &[Patch::SetCount(3)]).unwrap());
    }

    #[test]
    fn preview_swaps_leave_one_node() {
        let (host, page, view) = mounted(Vec::new());
        for e in [Emotion::Smile, Emotion::Angry] {
            view.thread().borrow_mut().select_emotion(e).unwrap();
            let patches = view.thread().borrow_mut().take_patches();
            view.apply(&host, &patches).unwrap();
        }
        assert_eq!(count(&page, &Target::Preview), 1);
        let preview = host.find(&page, &Target::Preview).unwrap();
        assert!(preview.borrow().markup.contains("angry.png"));
        assert!(!preview.borrow().markup.contains("smile"));
    }

    #[test]
    fn list_regeneration_is_reported() {
        let (host, page, view) = mounted(vec![sample("1", "x", Emotion::Smile), sample("2", "y", Emotion::Puke)]);
        let ticket = view.thread().borrow_mut().begin_delete(&"2".into()).unwrap();
        let patches = view.thread().borrow_mut().take_patches();
        assert!(!view.apply(&host, &patches).unwrap());
        let button = host.find(&page, &Target::DeleteButton("2".into())).unwrap();
        assert_eq!(button.borrow().text, render::DELETING_LABEL);
        assert!(button.borrow().disabled);

        view.thread().borrow_mut().finish_delete(ticket, Ok(None));
        let patches = view.thread().borrow_mut().take_patches();
        assert!(view.apply(&host, &patches).unwrap());
        assert_eq!(count(&page, &Target::DeleteButton("2".into())), 0);
        assert_eq!(count(&page, &Target::DeleteButton("1".into())), 1);
        assert_eq!(host.find(&page, &Target::Count).unwrap().borrow().text, "1");
    }

    #[test]
    fn failed_submit_round_trips_disabled_flags() {
        let (host, page, view) = mounted(Vec::new());
        let thread = view.thread().clone();
        thread.borrow_mut().select_emotion(Emotion::Puke).unwrap();
        let ticket = thread.borrow_mut().begin_submit().unwrap();
        let patches = thread.borrow_mut().take_patches();
        view.apply(&host, &patches).unwrap();
        assert!(host.find(&page, &Target::TextInput).unwrap().borrow().disabled);
        assert!(host.find(&page, &Target::EmojiOption(Emotion::Angry)).unwrap().borrow().disabled);

        thread.borrow_mut().finish_submit(ticket, Err(crate::error::DispatchError::Network("down".into())));
        let patches = thread.borrow_mut().take_patches();
        view.apply(&host, &patches).unwrap();
        let input = host.find(&page, &Target::TextInput).unwrap();
        assert!(!input.borrow().disabled);
        assert_eq!(input.borrow().shakes, 1);
        for e in Emotion::ALL {
            assert!(!host.find(&page, &Target::EmojiOption(e)).unwrap().borrow().disabled);
        }
    }
}
