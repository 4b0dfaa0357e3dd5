pub mod outline_parser;
pub mod outline_serializer;

pub use outline_parser::{ParseError, parse_outline};
pub use outline_serializer::{format_frame_line, serialize_outline};

/// One level of indentation in the outline format
pub const INDENT: &str = "  ";

/// Suffix character marking the current frame
pub const CURRENT_MARKER: char = '@';
