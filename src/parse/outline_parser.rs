use tracing::debug;

use crate::model::frame::{Frame, Key};
use crate::model::tree::FocusTree;
use crate::parse::{CURRENT_MARKER, INDENT};

/// Error type for outline parsing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("multiple root nodes (line {line})")]
    MultipleRoots { line: usize },
    #[error("multiple items marked as current (line {line})")]
    MultipleCurrent { line: usize },
    #[error("root node not found")]
    RootNotFound,
}

/// Parse an indented outline into a focus tree.
///
/// Each non-blank line is `<indent>- <name>[ @]`. Indentation is normalized
/// rather than validated. A line's nominal depth is its leading width divided
/// by the indent unit, rounded up. A line indented further than the previous
/// one, or whose nominal depth skips a level, is placed exactly one level
/// below the previous line. Any other line takes its nominal depth. Keys are
/// assigned in line order starting at 1. If no line carries the marker the
/// root becomes current.
pub fn parse_outline(text: &str) -> Result<FocusTree, ParseError> {
    // Ancestor chain of the line being placed, root at the bottom.
    // Depths run 0, 1, 2, ... from bottom to top.
    let mut stack: Vec<OpenFrame> = Vec::new();
    let mut next_key = 1u32;
    let mut found_current = false;

    for (idx, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let line_no = idx + 1;
        let raw = line.chars().take_while(|c| c.is_whitespace()).count();
        let (name, is_current) = parse_line_content(line.trim());

        if is_current {
            if found_current {
                return Err(ParseError::MultipleCurrent { line: line_no });
            }
            found_current = true;
        }

        let depth = match stack.last() {
            None => 0,
            Some(prev) => {
                let depth = depth_for_indent(prev, raw);
                if depth == 0 {
                    return Err(ParseError::MultipleRoots { line: line_no });
                }
                depth
            }
        };
        if depth > 0 && raw != depth * INDENT.len() {
            debug!(line = line_no, raw, depth, "normalized irregular indentation");
        }

        let mut frame = Frame::new(Key(next_key), name);
        frame.is_current = is_current;
        next_key += 1;

        collapse_to_depth(&mut stack, depth);
        stack.push(OpenFrame { frame, depth, raw });
    }

    collapse_to_depth(&mut stack, 1);
    let mut root = stack.pop().ok_or(ParseError::RootNotFound)?.frame;
    if !found_current {
        root.is_current = true;
    }

    Ok(FocusTree::from_parts(root, next_key))
}

/// A frame whose children are still being read
struct OpenFrame {
    frame: Frame,
    depth: usize,
    raw: usize,
}

/// Depth of a new line given the line before it.
///
/// Deeper than the previous line, or a nominal depth more than one level
/// below it: exactly one level below it. Otherwise the nominal depth.
fn depth_for_indent(prev: &OpenFrame, raw: usize) -> usize {
    let nominal = raw.div_ceil(INDENT.len());
    if raw > prev.raw || nominal > prev.depth + 1 {
        prev.depth + 1
    } else {
        nominal
    }
}

/// Pop every frame at `depth` or deeper, attaching each to the frame below it
fn collapse_to_depth(stack: &mut Vec<OpenFrame>, depth: usize) {
    while stack.len() > 1 && stack.last().is_some_and(|open| open.depth >= depth) {
        if let Some(open) = stack.pop()
            && let Some(parent) = stack.last_mut()
        {
            parent.frame.children.push(open.frame);
        }
    }
}

/// Split `- name @` into the name and whether the marker is present
pub(crate) fn parse_line_content(content: &str) -> (String, bool) {
    let body = content
        .strip_prefix('-')
        .map(str::trim_start)
        .unwrap_or(content);
    match body.strip_suffix(CURRENT_MARKER) {
        Some(rest) if rest.is_empty() || rest.ends_with(' ') => (rest.trim_end().to_string(), true),
        _ => (body.to_string(), false),
    }
}
