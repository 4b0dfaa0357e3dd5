use serde::Serialize;

use crate::model::frame::{Frame, Key};
use crate::model::tree::FocusTree;
use crate::parse::{INDENT, format_frame_line};

/// Default separator between breadcrumb segments
pub const BREADCRUMB_SEPARATOR: &str = " > ";

/// One row of the flattened tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListItem {
    /// Indented name, with the marker suffix on the current frame
    pub label: String,
    pub key: Key,
    pub depth: usize,
    pub is_current: bool,
}

/// Everything a status line needs to know about the current frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentDetails {
    pub breadcrumb: String,
    pub focus: String,
    pub is_root: bool,
    pub is_leaf: bool,
    pub depth: usize,
    /// Siblings excluding the current frame itself
    pub sibling_count: usize,
    /// Frames below the current frame
    pub descendant_count: usize,
    pub key: Key,
}

/// Pre-order list of every frame with its display label
pub fn items_list(tree: &FocusTree) -> Vec<ListItem> {
    let mut items = Vec::new();
    tree.root().walk(0, &mut |frame: &Frame, depth: usize| {
        items.push(ListItem {
            label: format!("{}{}", INDENT.repeat(depth), format_frame_line(frame)),
            key: frame.key,
            depth,
            is_current: frame.is_current,
        });
    });
    items
}

/// The root and every frame down `path`, in order
fn frames_along<'a>(root: &'a Frame, path: &[usize]) -> Vec<&'a Frame> {
    let mut frames = vec![root];
    let mut frame = root;
    for &i in path {
        match frame.children.get(i) {
            Some(child) => {
                frames.push(child);
                frame = child;
            }
            None => break,
        }
    }
    frames
}

/// Frames from the root down to the parent of the current frame
pub fn ancestors(tree: &FocusTree) -> Vec<&Frame> {
    let mut frames = frames_along(tree.root(), &tree.current_path());
    frames.pop();
    frames
}

/// The current frame's siblings, excluding itself. Empty for the root.
pub fn siblings(tree: &FocusTree) -> Vec<&Frame> {
    let path = tree.current_path();
    let Some((&index, parent_path)) = path.split_last() else {
        return Vec::new();
    };
    tree.root()
        .at(parent_path)
        .map(|parent| {
            parent
                .children
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != index)
                .map(|(_, f)| f)
                .collect()
        })
        .unwrap_or_default()
}

/// Names from the root to the current frame, joined with the default separator
pub fn breadcrumb(tree: &FocusTree) -> String {
    breadcrumb_with(tree, BREADCRUMB_SEPARATOR)
}

pub fn breadcrumb_with(tree: &FocusTree, separator: &str) -> String {
    frames_along(tree.root(), &tree.current_path())
        .iter()
        .map(|f| f.name.as_str())
        .collect::<Vec<_>>()
        .join(separator)
}

pub fn current_details(tree: &FocusTree) -> CurrentDetails {
    let path = tree.current_path();
    let current = tree.current();
    CurrentDetails {
        breadcrumb: breadcrumb(tree),
        focus: current.name.clone(),
        is_root: path.is_empty(),
        is_leaf: current.is_leaf(),
        depth: path.len(),
        sibling_count: siblings(tree).len(),
        descendant_count: current.descendant_count(),
        key: current.key,
    }
}

/// Look up a frame by key
pub fn find_frame(tree: &FocusTree, key: Key) -> Option<&Frame> {
    tree.find(key)
}
