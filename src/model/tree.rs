use super::frame::{Frame, Key};
use crate::ops::check::check_tree;
use crate::ops::tree_ops::TreeError;

/// A whole focus tree: the root frame plus the key counter.
///
/// Invariants held by every value of this type:
/// - exactly one frame has `is_current == true`
/// - all keys are pairwise distinct
/// - `next_key` is greater than every key in the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusTree {
    root: Frame,
    next_key: u32,
}

#[allow(clippy::len_without_is_empty)]
impl FocusTree {
    /// A fresh tree holding only a current root frame
    pub fn new(root_name: &str) -> Self {
        let mut root = Frame::new(Key(1), root_name);
        root.is_current = true;
        FocusTree { root, next_key: 2 }
    }

    /// Build a tree from an arbitrary root frame, validating the invariants.
    /// The key counter starts just past the largest key in use.
    pub fn from_root(root: Frame) -> Result<Self, TreeError> {
        let max_key = root.max_key();
        let next_key = max_key
            .0
            .checked_add(1)
            .ok_or(TreeError::KeySpaceExhausted(max_key))?;
        let tree = FocusTree { root, next_key };
        let result = check_tree(&tree);
        if !result.valid {
            return Err(TreeError::Invalid(result.errors));
        }
        Ok(tree)
    }

    /// Assemble a tree whose invariants the caller has already established.
    pub(crate) fn from_parts(root: Frame, next_key: u32) -> Self {
        FocusTree { root, next_key }
    }

    pub fn root(&self) -> &Frame {
        &self.root
    }

    pub(crate) fn root_mut(&mut self) -> &mut Frame {
        &mut self.root
    }

    /// The key the next created frame will receive
    pub fn next_key(&self) -> Key {
        Key(self.next_key)
    }

    pub(crate) fn allocate_key(&mut self) -> Key {
        let key = Key(self.next_key);
        self.next_key += 1;
        key
    }

    /// Index path from the root to the current frame
    pub fn current_path(&self) -> Vec<usize> {
        self.root
            .find_path(&|f: &Frame| f.is_current)
            .unwrap_or_default()
    }

    pub fn current(&self) -> &Frame {
        let path = self.current_path();
        self.root.at(&path).unwrap_or(&self.root)
    }

    pub fn find(&self, key: Key) -> Option<&Frame> {
        self.root.path_to(key).and_then(|p| self.root.at(&p))
    }

    /// Total number of frames, root included
    pub fn len(&self) -> usize {
        1 + self.root.descendant_count()
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_tree_has_current_root() {
        let tree = FocusTree::new("Focus");
        assert!(tree.root().is_current);
        assert_eq!(tree.current().name, "Focus");
        assert!(tree.current_path().is_empty());
        assert_eq!(tree.next_key(), Key(2));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_from_root_derives_counter() {
        let mut root = Frame::new(Key(3), "Root");
        let mut child = Frame::new(Key(10), "Child");
        child.is_current = true;
        root.children.push(child);

        let mut tree = FocusTree::from_root(root).unwrap();
        assert_eq!(tree.next_key(), Key(11));
        assert_eq!(tree.allocate_key(), Key(11));
        assert_eq!(tree.allocate_key(), Key(12));
        assert_eq!(tree.current().name, "Child");
        assert_eq!(tree.find(Key(3)).unwrap().name, "Root");
        assert!(tree.find(Key(4)).is_none());
    }

    #[test]
    fn test_from_root_rejects_missing_current() {
        let root = Frame::new(Key(1), "Root");
        assert!(matches!(
            FocusTree::from_root(root),
            Err(TreeError::Invalid(_))
        ));
    }

    #[test]
    fn test_from_root_rejects_exhausted_key_space() {
        let mut root = Frame::new(Key(1), "Root");
        root.is_current = true;
        root.children.push(Frame::new(Key(u32::MAX), "Last"));
        assert_eq!(
            FocusTree::from_root(root),
            Err(TreeError::KeySpaceExhausted(Key(u32::MAX)))
        );
    }

    #[test]
    fn test_from_root_rejects_duplicate_keys() {
        let mut root = Frame::new(Key(1), "Root");
        root.is_current = true;
        root.children.push(Frame::new(Key(1), "Twin"));
        assert!(FocusTree::from_root(root).is_err());
    }
}
