use std::path::PathBuf;

use super::config::FocusConfig;
use super::tree::FocusTree;

/// A loaded focus store
#[derive(Debug)]
pub struct Store {
    /// Directory containing `focus/`
    pub root: PathBuf,
    /// Path to the `focus/` directory
    pub focus_dir: PathBuf,
    /// Parsed focus.toml
    pub config: FocusConfig,
    /// The tree as read from the outline file
    pub tree: FocusTree,
}

impl Store {
    /// Full path of the outline file
    pub fn tree_path(&self) -> PathBuf {
        self.focus_dir.join(&self.config.tree.file)
    }
}
