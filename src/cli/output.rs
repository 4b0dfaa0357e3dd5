use serde::Serialize;

use crate::model::frame::Key;
use crate::ops::check::CheckResult;
use crate::ops::nav::{CurrentDetails, ListItem};
use crate::ops::search::SearchHit;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct WhereJson {
    pub breadcrumb: String,
    pub path: Vec<PathSegmentJson>,
}

#[derive(Serialize)]
pub struct PathSegmentJson {
    pub key: Key,
    pub name: String,
}

#[derive(Serialize)]
pub struct ListJson {
    pub current: Key,
    pub items: Vec<ListItem>,
}

#[derive(Serialize)]
pub struct SearchJson {
    pub pattern: String,
    pub hits: Vec<SearchHit>,
}

// ---------------------------------------------------------------------------
// Text formatting
// ---------------------------------------------------------------------------

/// Status block: breadcrumb, then one line of facts about the focus.
pub fn format_status(details: &CurrentDetails) -> Vec<String> {
    let mut facts = vec![format!("key {}", details.key)];
    if details.is_root {
        facts.push("root".to_string());
    } else {
        facts.push(format!("depth {}", details.depth));
    }
    facts.push(plural(details.sibling_count, "sibling", "siblings"));
    if details.is_leaf {
        facts.push("leaf".to_string());
    } else {
        facts.push(format!("{} below", details.descendant_count));
    }
    vec![details.breadcrumb.clone(), format!("  {}", facts.join(", "))]
}

/// One row of `fo list`
pub fn format_list_item(item: &ListItem, show_keys: bool) -> String {
    if show_keys {
        format!("{:>4}  {}", item.key, item.label)
    } else {
        item.label.clone()
    }
}

/// One row of `fo search`, with a `*` in front of the current frame
pub fn format_search_hit(hit: &SearchHit, separator: &str) -> String {
    let marker = if hit.is_current { '*' } else { ' ' };
    format!("{}{:>4}  {}", marker, hit.key, hit.breadcrumb(separator))
}

pub fn format_check(result: &CheckResult) -> Vec<String> {
    let mut lines = Vec::new();
    if !result.errors.is_empty() {
        lines.push("Errors:".to_string());
        for err in &result.errors {
            lines.push(format!("  {}", err));
        }
    }
    if result.valid {
        lines.push(format!(
            "✓ tree is valid ({})",
            plural(result.frame_count, "frame", "frames")
        ));
    } else {
        lines.push("✗ tree has errors".to_string());
    }
    lines
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{} {}", n, one)
    } else {
        format!("{} {}", n, many)
    }
}
