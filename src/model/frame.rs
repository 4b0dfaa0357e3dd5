use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier of a frame, unique within one tree.
///
/// Keys are plain integers handed out in increasing order. They are shown to
/// the user (and accepted back on the command line) as their decimal text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Key(pub u32);

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for Key {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u32>().map(Key)
    }
}

/// A single entry in the focus tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub key: Key,
    /// Free-form label
    pub name: String,
    /// Child frames in sibling order
    pub children: Vec<Frame>,
    /// Whether this frame is the current focus
    pub is_current: bool,
}

impl Frame {
    /// Create a leaf frame that is not current
    pub fn new(key: Key, name: impl Into<String>) -> Self {
        Frame {
            key,
            name: name.into(),
            children: Vec::new(),
            is_current: false,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of frames below this one (not counting itself)
    pub fn descendant_count(&self) -> usize {
        self.children
            .iter()
            .map(|c| 1 + c.descendant_count())
            .sum()
    }

    /// Index path (child positions from this frame) to the first frame, in
    /// pre-order, that satisfies `pred`. An empty path means `self`.
    pub fn find_path(&self, pred: &dyn Fn(&Frame) -> bool) -> Option<Vec<usize>> {
        if pred(self) {
            return Some(Vec::new());
        }
        for (i, child) in self.children.iter().enumerate() {
            if let Some(mut rest) = child.find_path(pred) {
                rest.insert(0, i);
                return Some(rest);
            }
        }
        None
    }

    /// Path to the frame with the given key
    pub fn path_to(&self, key: Key) -> Option<Vec<usize>> {
        self.find_path(&|f: &Frame| f.key == key)
    }

    /// Follow an index path down from this frame
    pub fn at(&self, path: &[usize]) -> Option<&Frame> {
        let mut frame = self;
        for &i in path {
            frame = frame.children.get(i)?;
        }
        Some(frame)
    }

    pub fn at_mut(&mut self, path: &[usize]) -> Option<&mut Frame> {
        let mut frame = self;
        for &i in path {
            frame = frame.children.get_mut(i)?;
        }
        Some(frame)
    }

    /// Path to the leaf reached by always descending into the first child
    pub fn first_leaf_path(&self) -> Vec<usize> {
        let mut path = Vec::new();
        let mut frame = self;
        while let Some(first) = frame.children.first() {
            path.push(0);
            frame = first;
        }
        path
    }

    /// Visit this frame and every descendant in pre-order, with depth
    pub fn walk<'a>(&'a self, depth: usize, f: &mut dyn FnMut(&'a Frame, usize)) {
        f(self, depth);
        for child in &self.children {
            child.walk(depth + 1, f);
        }
    }

    /// Largest key used in this subtree
    pub fn max_key(&self) -> Key {
        let mut max = self.key;
        self.walk(0, &mut |f: &Frame, _: usize| {
            if f.key > max {
                max = f.key;
            }
        });
        max
    }
}

/// Fold line breaks into single spaces, trim the ends, and drop a trailing
/// standalone `@` token so a name can never be mistaken for the current-focus
/// marker. Whitespace inside a line is kept as written.
pub fn normalize_name(name: &str) -> String {
    let mut name = name
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    loop {
        if name == "@" {
            name.clear();
        }
        match name.strip_suffix('@') {
            Some(rest) if rest.ends_with(char::is_whitespace) => {
                name = rest.trim_end().to_string();
            }
            _ => return name,
        }
    }
}
