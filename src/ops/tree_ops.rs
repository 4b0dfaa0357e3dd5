use tracing::{debug, warn};

use crate::model::frame::{Frame, Key, normalize_name};
use crate::model::tree::FocusTree;
use crate::ops::check::{CheckError, describe_errors};

/// Error type for tree operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    #[error("frame not found: {0}")]
    KeyNotFound(Key),
    #[error("cannot wrap the root frame: it has no parent")]
    WrapRoot,
    #[error("cannot move frame {0} under itself")]
    MoveToSelf(Key),
    #[error("cannot move frame {node} under its own descendant {parent}")]
    MoveIntoDescendant { node: Key, parent: Key },
    #[error("nothing to create: the nest spec has no names")]
    EmptyNestSpec,
    #[error("key {0} leaves no room for new keys")]
    KeySpaceExhausted(Key),
    #[error("invalid focus tree: {}", describe_errors(.0))]
    Invalid(Vec<CheckError>),
}

// Every operation below takes the tree by reference and returns a new one.
// The input is never touched, so callers can compare old and new to find
// out whether anything happened.

// ---------------------------------------------------------------------------
// Focus movement
// ---------------------------------------------------------------------------

/// Move the current marker to the frame with `key`.
pub fn set_current(tree: &FocusTree, key: Key) -> Result<FocusTree, TreeError> {
    let path = tree.root().path_to(key).ok_or(TreeError::KeyNotFound(key))?;
    Ok(move_marker(tree, &path))
}

/// Move the current marker to the leaf reached by following first children.
/// No-op on a leaf.
pub fn dive_in(tree: &FocusTree) -> FocusTree {
    let current = tree.current();
    if current.is_leaf() {
        debug!(key = %current.key, "dive: current frame is a leaf");
        return tree.clone();
    }
    let mut path = tree.current_path();
    path.extend(current.first_leaf_path());
    move_marker(tree, &path)
}

/// Move the current marker to the next sibling, wrapping after the last.
pub fn focus_next_sibling(tree: &FocusTree) -> FocusTree {
    focus_sibling(tree, true)
}

/// Move the current marker to the previous sibling, wrapping before the first.
pub fn focus_previous_sibling(tree: &FocusTree) -> FocusTree {
    focus_sibling(tree, false)
}

fn focus_sibling(tree: &FocusTree, forward: bool) -> FocusTree {
    let path = tree.current_path();
    let Some((&index, parent_path)) = path.split_last() else {
        debug!("sibling focus: root has no siblings");
        return tree.clone();
    };
    let count = tree
        .root()
        .at(parent_path)
        .map_or(0, |parent| parent.children.len());
    if count < 2 {
        debug!("sibling focus: current frame is an only child");
        return tree.clone();
    }
    let target = if forward {
        (index + 1) % count
    } else {
        (index + count - 1) % count
    };
    let mut target_path = parent_path.to_vec();
    target_path.push(target);
    move_marker(tree, &target_path)
}

/// Move the current marker up one level. No-op at the root.
pub fn focus_parent(tree: &FocusTree) -> FocusTree {
    let path = tree.current_path();
    match path.split_last() {
        Some((_, parent_path)) => move_marker(tree, parent_path),
        None => {
            debug!("parent focus: already at the root");
            tree.clone()
        }
    }
}

/// Move the current marker to the first child. No-op on a leaf.
pub fn focus_first_child(tree: &FocusTree) -> FocusTree {
    if tree.current().is_leaf() {
        debug!("first-child focus: current frame is a leaf");
        return tree.clone();
    }
    let mut path = tree.current_path();
    path.push(0);
    move_marker(tree, &path)
}

// ---------------------------------------------------------------------------
// Completion
// ---------------------------------------------------------------------------

/// Remove the current frame and its subtree, then pick the next focus:
/// the first-child leaf of the previous sibling, else that of the next
/// sibling, else the parent. The root cannot be completed.
pub fn complete_current(tree: &FocusTree) -> FocusTree {
    let path = tree.current_path();
    let Some((&index, parent_path)) = path.split_last() else {
        warn!("cannot complete the root frame");
        return tree.clone();
    };

    let mut next = tree.clone();
    let Some(parent) = next.root_mut().at_mut(parent_path) else {
        return tree.clone();
    };
    let removed = parent.children.remove(index);
    debug!(key = %removed.key, name = %removed.name, "completed frame");

    let mut new_path = parent_path.to_vec();
    if index > 0 {
        new_path.push(index - 1);
        new_path.extend(parent.children[index - 1].first_leaf_path());
    } else if let Some(next_sibling) = parent.children.get(index) {
        new_path.push(index);
        new_path.extend(next_sibling.first_leaf_path());
    }
    mark(&mut next, &new_path);
    next
}

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

/// Append a new child under the current frame and focus it.
pub fn add_child(tree: &FocusTree, name: &str) -> FocusTree {
    let mut next = tree.clone();
    let key = next.allocate_key();
    let path = unmark_current(&mut next);

    let mut child = Frame::new(key, normalize_name(name));
    child.is_current = true;
    if let Some(current) = next.root_mut().at_mut(&path) {
        current.children.push(child);
    }
    next
}

/// Create several levels of children at once.
///
/// `spec` is `/`-separated levels, each a `,`-separated list of sibling
/// names, e.g. `Design, Build / Parser / Tests`. Each level is appended under
/// the last frame of the level before it (the current frame for the first
/// level). The last frame created becomes current.
pub fn create_nested_children(tree: &FocusTree, spec: &str) -> Result<FocusTree, TreeError> {
    let levels: Vec<Vec<String>> = spec
        .split('/')
        .map(|level| {
            level
                .split(',')
                .map(normalize_name)
                .filter(|name| !name.is_empty())
                .collect::<Vec<_>>()
        })
        .filter(|names| !names.is_empty())
        .collect();
    if levels.is_empty() {
        return Err(TreeError::EmptyNestSpec);
    }

    let mut next = tree.clone();
    let mut parent_path = unmark_current(&mut next);
    for names in levels {
        let keys: Vec<Key> = names.iter().map(|_| next.allocate_key()).collect();
        let Some(parent) = next.root_mut().at_mut(&parent_path) else {
            break;
        };
        for (key, name) in keys.into_iter().zip(names) {
            parent.children.push(Frame::new(key, name));
        }
        parent_path.push(parent.children.len() - 1);
    }
    mark(&mut next, &parent_path);
    Ok(next)
}

/// Insert a new frame right after the current one, keeping focus where it
/// is. When the root is current the new frame becomes its first child.
pub fn add_next_sibling(tree: &FocusTree, name: &str) -> FocusTree {
    let mut next = tree.clone();
    let key = next.allocate_key();
    let frame = Frame::new(key, normalize_name(name));

    let path = next.current_path();
    match path.split_last() {
        None => next.root_mut().children.insert(0, frame),
        Some((&index, parent_path)) => {
            if let Some(parent) = next.root_mut().at_mut(parent_path) {
                parent.children.insert(index + 1, frame);
            }
        }
    }
    next
}

// ---------------------------------------------------------------------------
// Editing and restructuring
// ---------------------------------------------------------------------------

/// Rename the current frame. Empty names are refused.
pub fn rename_current(tree: &FocusTree, name: &str) -> FocusTree {
    let name = normalize_name(name);
    if name.is_empty() {
        warn!("refusing to rename the current frame to an empty name");
        return tree.clone();
    }
    let mut next = tree.clone();
    let path = next.current_path();
    if let Some(current) = next.root_mut().at_mut(&path) {
        current.name = name;
    }
    next
}

/// Put a new frame between the current frame and its parent. The current
/// frame keeps its focus.
pub fn wrap_current(tree: &FocusTree, name: &str) -> Result<FocusTree, TreeError> {
    let path = tree.current_path();
    let Some((&index, parent_path)) = path.split_last() else {
        return Err(TreeError::WrapRoot);
    };

    let mut next = tree.clone();
    let key = next.allocate_key();
    if let Some(parent) = next.root_mut().at_mut(parent_path) {
        let original = parent.children.remove(index);
        let mut wrapper = Frame::new(key, normalize_name(name));
        wrapper.children.push(original);
        parent.children.insert(index, wrapper);
    }
    Ok(next)
}

/// Detach the frame `node` (with its subtree) and append it as the last child
/// of `new_parent`.
///
/// Unknown keys leave the tree unchanged without an error. Moving a frame
/// under itself or under one of its own descendants is an error.
pub fn move_frame(tree: &FocusTree, node: Key, new_parent: Key) -> Result<FocusTree, TreeError> {
    if node == new_parent {
        return Err(TreeError::MoveToSelf(node));
    }
    let (Some(node_path), Some(parent_path)) =
        (tree.root().path_to(node), tree.root().path_to(new_parent))
    else {
        debug!(%node, %new_parent, "move: unknown key, nothing to do");
        return Ok(tree.clone());
    };
    if parent_path.starts_with(&node_path) {
        return Err(TreeError::MoveIntoDescendant {
            node,
            parent: new_parent,
        });
    }
    let Some((&index, old_parent_path)) = node_path.split_last() else {
        return Ok(tree.clone());
    };

    let mut next = tree.clone();
    let Some(old_parent) = next.root_mut().at_mut(old_parent_path) else {
        return Ok(tree.clone());
    };
    let frame = old_parent.children.remove(index);

    // Positions may have shifted after the detach
    let Some(target_path) = next.root().path_to(new_parent) else {
        return Ok(tree.clone());
    };
    match next.root_mut().at_mut(&target_path) {
        Some(target) => target.children.push(frame),
        None => return Ok(tree.clone()),
    }
    debug!(%node, %new_parent, "moved frame");
    Ok(next)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Clear the marker on the current frame and return its path
fn unmark_current(tree: &mut FocusTree) -> Vec<usize> {
    let path = tree.current_path();
    if let Some(current) = tree.root_mut().at_mut(&path) {
        current.is_current = false;
    }
    path
}

fn mark(tree: &mut FocusTree, path: &[usize]) {
    if let Some(frame) = tree.root_mut().at_mut(path) {
        frame.is_current = true;
    }
}

/// Copy of `tree` with the marker moved to `path`
fn move_marker(tree: &FocusTree, path: &[usize]) -> FocusTree {
    let mut next = tree.clone();
    unmark_current(&mut next);
    mark(&mut next, path);
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::check::check_tree;
    use crate::ops::nav::breadcrumb;
    use crate::parse::{parse_outline, serialize_outline};
    use insta::assert_snapshot;
    use pretty_assertions::assert_eq;

    fn tree(text: &str) -> FocusTree {
        parse_outline(text).unwrap()
    }

    fn outline(tree: &FocusTree) -> String {
        assert!(check_tree(tree).valid, "invariants broken:\n{}", serialize_outline(tree));
        serialize_outline(tree)
    }

    fn three_items(current: usize) -> FocusTree {
        let mut text = String::from("- Root\n");
        for i in 1..=3 {
            let marker = if i == current { " @" } else { "" };
            text.push_str(&format!("  - Item{}{}\n", i, marker));
        }
        tree(&text)
    }

    // --- Focus movement ---

    #[test]
    fn test_set_current() {
        let t = three_items(1);
        let next = set_current(&t, Key(4)).unwrap();
        assert_eq!(next.current().name, "Item3");
        assert_eq!(outline(&next), "- Root\n  - Item1\n  - Item2\n  - Item3 @\n");
        // input untouched
        assert_eq!(t.current().name, "Item1");
    }

    #[test]
    fn test_set_current_unknown_key() {
        let t = three_items(1);
        assert_eq!(set_current(&t, Key(99)), Err(TreeError::KeyNotFound(Key(99))));
    }

    #[test]
    fn test_dive_in_follows_first_children() {
        let t = tree("- Root @\n  - A\n    - A1\n      - A1a\n    - A2\n  - B\n");
        let next = dive_in(&t);
        assert_eq!(next.current().name, "A1a");
        assert_eq!(outline(&next).matches('@').count(), 1);
    }

    #[test]
    fn test_dive_in_leaf_is_noop() {
        let t = three_items(2);
        assert_eq!(dive_in(&t), t);
    }

    #[test]
    fn test_focus_next_sibling_wraps() {
        let t = three_items(3);
        assert_eq!(focus_next_sibling(&t).current().name, "Item1");
        assert_eq!(focus_next_sibling(&three_items(1)).current().name, "Item2");
    }

    #[test]
    fn test_focus_previous_sibling_wraps() {
        let t = three_items(1);
        assert_eq!(focus_previous_sibling(&t).current().name, "Item3");
        assert_eq!(focus_previous_sibling(&three_items(2)).current().name, "Item1");
    }

    #[test]
    fn test_sibling_focus_cycles_back() {
        let t = three_items(2);
        let mut next = t.clone();
        for _ in 0..3 {
            next = focus_next_sibling(&next);
        }
        assert_eq!(next, t);
    }

    #[test]
    fn test_sibling_focus_without_siblings_is_noop() {
        let root_only = tree("- Root @\n  - Child\n");
        assert_eq!(focus_next_sibling(&root_only), root_only);
        let only_child = tree("- Root\n  - Child @\n");
        assert_eq!(focus_previous_sibling(&only_child), only_child);
    }

    #[test]
    fn test_focus_parent_and_first_child() {
        let t = tree("- Root\n  - A @\n    - A1\n    - A2\n");
        let up = focus_parent(&t);
        assert_eq!(up.current().name, "Root");
        assert_eq!(focus_parent(&up), up);

        let down = focus_first_child(&t);
        assert_eq!(down.current().name, "A1");
        assert_eq!(focus_first_child(&down), down);
    }

    // --- Completion ---

    #[test]
    fn test_complete_prefers_previous_sibling() {
        let t = three_items(2);
        let next = complete_current(&t);
        assert_eq!(outline(&next), "- Root\n  - Item1 @\n  - Item3\n");
    }

    #[test]
    fn test_complete_previous_sibling_descends_first_children() {
        let t = tree("- Root\n  - A\n    - A1\n      - A1a\n    - A2\n  - B @\n");
        let next = complete_current(&t);
        assert_eq!(next.current().name, "A1a");
    }

    #[test]
    fn test_complete_first_child_goes_to_next_sibling_leaf() {
        let t = tree("- Root\n  - A @\n  - B\n    - B1\n");
        let next = complete_current(&t);
        assert_eq!(outline(&next), "- Root\n  - B\n    - B1 @\n");
    }

    #[test]
    fn test_complete_only_child_goes_to_parent() {
        let t = tree("- Root\n  - A\n    - A1 @\n");
        let next = complete_current(&t);
        assert_eq!(outline(&next), "- Root\n  - A @\n");
        let next = complete_current(&next);
        assert_eq!(outline(&next), "- Root @\n");
    }

    #[test]
    fn test_complete_removes_subtree() {
        let t = tree("- Root\n  - A @\n    - A1\n    - A2\n  - B\n");
        let next = complete_current(&t);
        assert_eq!(next.len(), 2);
        assert!(next.find(Key(3)).is_none());
    }

    #[test]
    fn test_complete_root_is_noop() {
        let t = tree("- Root @\n  - A\n");
        assert_eq!(complete_current(&t), t);
    }

    // --- Creation ---

    #[test]
    fn test_add_child() {
        let t = three_items(2);
        let next = add_child(&t, "Step one");
        assert_eq!(
            outline(&next),
            "- Root\n  - Item1\n  - Item2\n    - Step one @\n  - Item3\n"
        );
        assert_eq!(next.current().key, Key(5));
        assert_eq!(next.next_key(), Key(6));
    }

    #[test]
    fn test_add_child_appends_after_existing_children() {
        let t = tree("- Root @\n  - A\n");
        let next = add_child(&t, "  B  ");
        assert_eq!(outline(&next), "- Root\n  - A\n  - B @\n");
    }

    #[test]
    fn test_create_nested_children() {
        let t = tree("- Root\n  - X @\n");
        let next = create_nested_children(&t, "A, B / C").unwrap();
        assert_snapshot!(outline(&next).trim_end(), @r"
        - Root
          - X
            - A
            - B
              - C @
        ");
        assert_eq!(breadcrumb(&next), "Root > X > B > C");
    }

    #[test]
    fn test_create_nested_children_three_levels_fresh_keys() {
        let t = tree("- Root @\n");
        let next = create_nested_children(&t, " Plan / Draft,Review / Ship ").unwrap();
        assert_eq!(
            outline(&next),
            "- Root\n  - Plan\n    - Draft\n    - Review\n      - Ship @\n"
        );
        let keys: Vec<u32> = crate::ops::nav::items_list(&next)
            .iter()
            .map(|i| i.key.0)
            .collect();
        assert_eq!(keys, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_create_nested_children_skips_empty_names() {
        let t = tree("- Root @\n");
        let next = create_nested_children(&t, "A,, / / B").unwrap();
        assert_eq!(outline(&next), "- Root\n  - A\n    - B @\n");
    }

    #[test]
    fn test_create_nested_children_empty_spec() {
        let t = tree("- Root @\n");
        assert_eq!(
            create_nested_children(&t, " / , "),
            Err(TreeError::EmptyNestSpec)
        );
    }

    #[test]
    fn test_add_next_sibling() {
        let t = three_items(1);
        let next = add_next_sibling(&t, "Later");
        assert_eq!(
            outline(&next),
            "- Root\n  - Item1 @\n  - Later\n  - Item2\n  - Item3\n"
        );
    }

    #[test]
    fn test_add_next_sibling_of_root_becomes_first_child() {
        let t = tree("- Root @\n  - A\n");
        let next = add_next_sibling(&t, "New");
        assert_eq!(outline(&next), "- Root @\n  - New\n  - A\n");
        assert!(!next.root().children[0].is_current);
    }

    // --- Editing and restructuring ---

    #[test]
    fn test_rename_current() {
        let t = three_items(3);
        let next = rename_current(&t, "Renamed");
        assert_eq!(next.current().name, "Renamed");
        assert_eq!(next.current().key, t.current().key);
    }

    #[test]
    fn test_rename_keeps_inner_spacing() {
        let t = three_items(3);
        let next = rename_current(&t, "  Step  2:\n review ");
        assert_eq!(next.current().name, "Step  2: review");
        assert_eq!(outline(&next), "- Root\n  - Item1\n  - Item2\n  - Step  2: review @\n");
    }

    #[test]
    fn test_rename_to_blank_is_refused() {
        let t = three_items(3);
        assert_eq!(rename_current(&t, "   "), t);
        assert_eq!(rename_current(&t, "@"), t);
    }

    #[test]
    fn test_wrap_current() {
        let t = three_items(2);
        let next = wrap_current(&t, "Wrapper").unwrap();
        assert_eq!(
            outline(&next),
            "- Root\n  - Item1\n  - Wrapper\n    - Item2 @\n  - Item3\n"
        );
        let wrapper = &next.root().children[1];
        assert!(!wrapper.is_current);
        assert_eq!(wrapper.children[0], t.root().children[1]);
    }

    #[test]
    fn test_wrap_root_is_error() {
        let t = tree("- Root @\n");
        assert_eq!(wrap_current(&t, "Above"), Err(TreeError::WrapRoot));
    }

    #[test]
    fn test_move_frame() {
        let t = tree("- Root\n  - A\n    - A1 @\n  - B\n");
        let next = move_frame(&t, Key(3), Key(4)).unwrap();
        assert_eq!(outline(&next), "- Root\n  - A\n  - B\n    - A1 @\n");
    }

    #[test]
    fn test_move_frame_to_earlier_sibling() {
        let t = tree("- Root @\n  - A\n  - B\n    - B1\n");
        let next = move_frame(&t, Key(4), Key(2)).unwrap();
        assert_eq!(outline(&next), "- Root @\n  - A\n    - B1\n  - B\n");
    }

    #[test]
    fn test_move_frame_to_same_parent_moves_to_end() {
        let t = three_items(1);
        let next = move_frame(&t, Key(2), Key(1)).unwrap();
        assert_eq!(outline(&next), "- Root\n  - Item2\n  - Item3\n  - Item1 @\n");
    }

    #[test]
    fn test_move_frame_to_self_is_error() {
        let t = three_items(1);
        assert_eq!(move_frame(&t, Key(2), Key(2)), Err(TreeError::MoveToSelf(Key(2))));
    }

    #[test]
    fn test_move_frame_unknown_key_is_silent_noop() {
        let t = three_items(1);
        assert_eq!(move_frame(&t, Key(2), Key(42)).unwrap(), t);
        assert_eq!(move_frame(&t, Key(42), Key(2)).unwrap(), t);
    }

    #[test]
    fn test_move_frame_into_descendant_is_error() {
        let t = tree("- Root @\n  - A\n    - A1\n");
        assert_eq!(
            move_frame(&t, Key(2), Key(3)),
            Err(TreeError::MoveIntoDescendant {
                node: Key(2),
                parent: Key(3)
            })
        );
        assert!(matches!(
            move_frame(&t, Key(1), Key(2)),
            Err(TreeError::MoveIntoDescendant { .. })
        ));
    }

    #[test]
    fn test_new_keys_never_reuse_completed_keys() {
        let t = tree("- Root\n  - A\n  - B @\n");
        let next = complete_current(&t);
        let next = add_child(&next, "C");
        assert_eq!(next.current().key, Key(4));
    }
}
