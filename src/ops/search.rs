use std::ops::Range;

use regex::Regex;
use serde::Serialize;

use crate::model::frame::{Frame, Key};
use crate::model::tree::FocusTree;

/// A frame whose name matched a search pattern
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub key: Key,
    pub name: String,
    /// Names from the root down to the matching frame
    pub path: Vec<String>,
    pub is_current: bool,
    /// Byte ranges of each match within `name`
    pub spans: Vec<Range<usize>>,
}

impl SearchHit {
    pub fn breadcrumb(&self, separator: &str) -> String {
        self.path.join(separator)
    }
}

/// Search every frame name in pre-order.
pub fn search_frames(tree: &FocusTree, re: &Regex) -> Vec<SearchHit> {
    let mut hits = Vec::new();
    let mut path = Vec::new();
    search_frame(re, tree.root(), &mut path, &mut hits);
    hits
}

fn search_frame(re: &Regex, frame: &Frame, path: &mut Vec<String>, hits: &mut Vec<SearchHit>) {
    path.push(frame.name.clone());
    let spans: Vec<Range<usize>> = re
        .find_iter(&frame.name)
        .map(|m| m.start()..m.end())
        .collect();
    if !spans.is_empty() {
        hits.push(SearchHit {
            key: frame.key,
            name: frame.name.clone(),
            path: path.clone(),
            is_current: frame.is_current,
            spans,
        });
    }
    for child in &frame.children {
        search_frame(re, child, path, hits);
    }
    path.pop();
}
