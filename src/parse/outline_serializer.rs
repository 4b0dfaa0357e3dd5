use crate::model::frame::Frame;
use crate::model::tree::FocusTree;
use crate::parse::{CURRENT_MARKER, INDENT};

/// Serialize a focus tree to its outline text.
/// Pre-order, one `- name` line per frame, every line newline-terminated.
pub fn serialize_outline(tree: &FocusTree) -> String {
    let mut lines = Vec::new();
    serialize_frame(tree.root(), 0, &mut lines);
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn serialize_frame(frame: &Frame, depth: usize, lines: &mut Vec<String>) {
    lines.push(format!("{}- {}", INDENT.repeat(depth), format_frame_line(frame)));
    for child in &frame.children {
        serialize_frame(child, depth + 1, lines);
    }
}

/// A frame's name with the marker suffix when it is current
pub fn format_frame_line(frame: &Frame) -> String {
    if frame.is_current {
        format!("{} {}", frame.name, CURRENT_MARKER)
    } else {
        frame.name.clone()
    }
}
