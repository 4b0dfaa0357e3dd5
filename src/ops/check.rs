use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::model::frame::{Frame, Key};
use crate::model::tree::FocusTree;
use crate::parse::outline_parser::parse_line_content;
use crate::parse::{ParseError, parse_outline};

/// Structured result from `fo check`, suitable for --json output.
#[derive(Debug, Default, Serialize)]
pub struct CheckResult {
    pub valid: bool,
    pub frame_count: usize,
    pub errors: Vec<CheckError>,
}

/// A broken tree invariant
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum CheckError {
    /// No frame is marked current
    #[serde(rename = "no_current")]
    NoCurrent,
    /// More than one frame is marked current
    #[serde(rename = "multiple_current")]
    MultipleCurrent { keys: Vec<Key> },
    /// The same key is used by more than one frame
    #[serde(rename = "duplicate_key")]
    DuplicateKey { key: Key, count: usize },
    /// The key counter would hand out a key that is already taken
    #[serde(rename = "stale_key_counter")]
    StaleKeyCounter { next_key: Key, max_key: Key },
    /// A line after the first sits at the root's level
    #[serde(rename = "multiple_roots")]
    MultipleRoots { line: usize },
    /// The outline has no frame lines
    #[serde(rename = "root_not_found")]
    RootNotFound,
}

impl fmt::Display for CheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckError::NoCurrent => write!(f, "no frame is marked current"),
            CheckError::MultipleCurrent { keys } => {
                let keys: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
                write!(f, "multiple frames marked current: {}", keys.join(", "))
            }
            CheckError::DuplicateKey { key, count } => {
                write!(f, "key {} is used by {} frames", key, count)
            }
            CheckError::StaleKeyCounter { next_key, max_key } => write!(
                f,
                "next key {} is not above the largest key {}",
                next_key, max_key
            ),
            CheckError::MultipleRoots { line } => {
                write!(f, "line {} is a second root", line)
            }
            CheckError::RootNotFound => write!(f, "outline has no root frame"),
        }
    }
}

/// Join errors into one line for error messages
pub fn describe_errors(errors: &[CheckError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Validate the single-current and unique-key invariants.
///
/// This is a read-only operation. Checks performed:
/// 1. Exactly one frame is current
/// 2. No key is used twice
/// 3. The key counter is past every key in use
pub fn check_tree(tree: &FocusTree) -> CheckResult {
    let mut result = CheckResult::default();
    let mut current = Vec::new();
    let mut key_counts: BTreeMap<Key, usize> = BTreeMap::new();

    tree.root().walk(0, &mut |frame: &Frame, _: usize| {
        result.frame_count += 1;
        if frame.is_current {
            current.push(frame.key);
        }
        *key_counts.entry(frame.key).or_default() += 1;
    });

    match current.len() {
        0 => result.errors.push(CheckError::NoCurrent),
        1 => {}
        _ => result.errors.push(CheckError::MultipleCurrent { keys: current }),
    }

    for (key, count) in key_counts {
        if count > 1 {
            result.errors.push(CheckError::DuplicateKey { key, count });
        }
    }

    let max_key = tree.root().max_key();
    if tree.next_key() <= max_key {
        result.errors.push(CheckError::StaleKeyCounter {
            next_key: tree.next_key(),
            max_key,
        });
    }

    result.valid = result.errors.is_empty();
    result
}

/// Validate outline text as it sits on disk.
///
/// Text that parses is checked like any tree. Text the parser refuses is
/// reported here instead, with keys numbered the way a load would number
/// them (line order from 1, blank lines skipped).
pub fn check_outline(text: &str) -> CheckResult {
    let err = match parse_outline(text) {
        Ok(tree) => return check_tree(&tree),
        Err(e) => e,
    };

    let mut result = CheckResult::default();
    let mut current = Vec::new();
    for (idx, line) in text.lines().filter(|l| !l.trim().is_empty()).enumerate() {
        result.frame_count += 1;
        if parse_line_content(line.trim()).1 {
            current.push(Key(idx as u32 + 1));
        }
    }
    if current.len() > 1 {
        result.errors.push(CheckError::MultipleCurrent { keys: current });
    }

    match err {
        ParseError::MultipleRoots { line } => result.errors.push(CheckError::MultipleRoots { line }),
        ParseError::RootNotFound => result.errors.push(CheckError::RootNotFound),
        ParseError::MultipleCurrent { .. } => {}
    }

    result.valid = result.errors.is_empty();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parsed_tree_is_valid() {
        let tree = parse_outline("- Root\n  - A @\n  - B\n").unwrap();
        let result = check_tree(&tree);
        assert!(result.valid);
        assert_eq!(result.frame_count, 3);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_detects_missing_and_duplicate_current() {
        let root = Frame::new(Key(1), "Root");
        let tree = FocusTree::from_parts(root, 2);
        assert_eq!(check_tree(&tree).errors, vec![CheckError::NoCurrent]);

        let mut root = Frame::new(Key(1), "Root");
        root.is_current = true;
        let mut child = Frame::new(Key(2), "Child");
        child.is_current = true;
        root.children.push(child);
        let tree = FocusTree::from_parts(root, 3);
        assert_eq!(
            check_tree(&tree).errors,
            vec![CheckError::MultipleCurrent {
                keys: vec![Key(1), Key(2)]
            }]
        );
    }

    #[test]
    fn test_detects_duplicate_keys_and_stale_counter() {
        let mut root = Frame::new(Key(1), "Root");
        root.is_current = true;
        root.children.push(Frame::new(Key(2), "A"));
        root.children.push(Frame::new(Key(2), "B"));
        let tree = FocusTree::from_parts(root, 2);
        let result = check_tree(&tree);
        assert!(!result.valid);
        assert_eq!(
            result.errors,
            vec![
                CheckError::DuplicateKey {
                    key: Key(2),
                    count: 2
                },
                CheckError::StaleKeyCounter {
                    next_key: Key(2),
                    max_key: Key(2)
                },
            ]
        );
    }

    #[test]
    fn test_describe_errors() {
        let text = describe_errors(&[
            CheckError::NoCurrent,
            CheckError::DuplicateKey {
                key: Key(4),
                count: 3,
            },
        ]);
        assert_eq!(text, "no frame is marked current; key 4 is used by 3 frames");
    }

    #[test]
    fn test_check_outline_accepts_valid_text() {
        let result = check_outline("- Root\n  - A @\n");
        assert!(result.valid);
        assert_eq!(result.frame_count, 2);
    }

    #[test]
    fn test_check_outline_reports_every_marker() {
        let result = check_outline("- A @\n\n  - B\n  - C @\n    - D @\n");
        assert!(!result.valid);
        assert_eq!(result.frame_count, 4);
        assert_eq!(
            result.errors,
            vec![CheckError::MultipleCurrent {
                keys: vec![Key(1), Key(3), Key(4)]
            }]
        );
    }

    #[test]
    fn test_check_outline_reports_second_root() {
        let result = check_outline("- A @\n- B\n");
        assert!(!result.valid);
        assert_eq!(result.errors, vec![CheckError::MultipleRoots { line: 2 }]);
        assert_eq!(
            describe_errors(&result.errors),
            "line 2 is a second root"
        );
    }

    #[test]
    fn test_check_outline_reports_missing_root() {
        let result = check_outline("\n  \n");
        assert_eq!(result.frame_count, 0);
        assert_eq!(result.errors, vec![CheckError::RootNotFound]);
    }
}
