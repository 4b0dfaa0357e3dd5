use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::io::recovery::{self, RecoveryCategory, RecoveryEntry};
use crate::model::config::FocusConfig;
use crate::model::store::Store;
use crate::model::tree::FocusTree;
use crate::parse::{ParseError, parse_outline, serialize_outline};

/// Name of the store directory
pub const FOCUS_DIR: &str = "focus";

/// Name of the config file inside the store directory
pub const CONFIG_FILE: &str = "focus.toml";

/// Error type for store I/O operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("not a focus store: no focus/ directory found (run `fo init`)")]
    NotAStore,
    #[error("a focus store already exists in {0} (use --force to reinitialize)")]
    AlreadyExists(PathBuf),
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse focus.toml: {0}")]
    ConfigParseError(#[from] toml::de::Error),
    #[error("could not parse {path}: {source}")]
    OutlineError { path: PathBuf, source: ParseError },
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Discover the store by walking up from the given directory, looking for
/// `focus/focus.toml`.
pub fn discover_store(start: &Path) -> Result<PathBuf, StoreError> {
    let mut current = start.to_path_buf();
    loop {
        let focus_dir = current.join(FOCUS_DIR);
        if focus_dir.is_dir() && focus_dir.join(CONFIG_FILE).exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(StoreError::NotAStore);
        }
    }
}

/// Read and parse focus.toml from a store directory.
pub fn read_config(focus_dir: &Path) -> Result<FocusConfig, StoreError> {
    let config_path = focus_dir.join(CONFIG_FILE);
    let config_text = fs::read_to_string(&config_path).map_err(|e| StoreError::ReadError {
        path: config_path.clone(),
        source: e,
    })?;
    Ok(toml::from_str(&config_text)?)
}

/// Load a complete store from the given root directory.
pub fn load_store(root: &Path) -> Result<Store, StoreError> {
    let focus_dir = root.join(FOCUS_DIR);
    if !focus_dir.is_dir() {
        return Err(StoreError::NotAStore);
    }
    let config = read_config(&focus_dir)?;
    let tree = load_tree(&focus_dir.join(&config.tree.file), &config.tree.root_name)?;

    Ok(Store {
        root: root.to_path_buf(),
        focus_dir,
        config,
        tree,
    })
}

/// Read an outline file. A missing or blank file yields a fresh tree whose
/// only frame is a current root named `root_name`.
pub fn load_tree(path: &Path, root_name: &str) -> Result<FocusTree, StoreError> {
    if !path.exists() {
        debug!(path = %path.display(), "no outline yet, starting a fresh tree");
        return Ok(FocusTree::new(root_name));
    }
    let text = fs::read_to_string(path).map_err(|e| StoreError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    if text.trim().is_empty() {
        debug!(path = %path.display(), "outline is blank, starting a fresh tree");
        return Ok(FocusTree::new(root_name));
    }
    let tree = match parse_outline(&text) {
        Ok(tree) => tree,
        Err(e) => {
            if let Some(focus_dir) = path.parent() {
                recovery::log_recovery(
                    focus_dir,
                    RecoveryEntry {
                        timestamp: chrono::Utc::now(),
                        category: RecoveryCategory::Parser,
                        description: "outline could not be parsed".to_string(),
                        fields: vec![("Error".to_string(), e.to_string())],
                        body: text,
                    },
                );
            }
            return Err(StoreError::OutlineError {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };
    debug!(frames = tree.len(), "loaded outline");
    Ok(tree)
}

/// Serialize `tree` and write it over the store's outline file.
///
/// If the write fails the serialized outline is appended to the recovery log
/// before the error is returned.
pub fn save_tree(store: &Store, tree: &FocusTree) -> Result<(), StoreError> {
    let path = store.tree_path();
    let content = serialize_outline(tree);
    if let Err(e) = recovery::atomic_write(&path, content.as_bytes()) {
        recovery::log_recovery(
            &store.focus_dir,
            RecoveryEntry {
                timestamp: chrono::Utc::now(),
                category: RecoveryCategory::Write,
                description: "outline write failed".to_string(),
                fields: vec![
                    ("Target".to_string(), store.config.tree.file.clone()),
                    ("Error".to_string(), e.to_string()),
                ],
                body: content,
            },
        );
        return Err(StoreError::WriteError { path, source: e });
    }
    info!(path = %path.display(), frames = tree.len(), "saved outline");
    Ok(())
}

/// Create the store directory with its config and a first outline.
/// Returns the path of the new `focus/` directory.
pub fn create_store(
    root: &Path,
    config_text: &str,
    tree: &FocusTree,
    force: bool,
) -> Result<PathBuf, StoreError> {
    let focus_dir = root.join(FOCUS_DIR);
    if focus_dir.join(CONFIG_FILE).exists() && !force {
        return Err(StoreError::AlreadyExists(root.to_path_buf()));
    }
    fs::create_dir_all(&focus_dir)?;

    let config: FocusConfig = toml::from_str(config_text)?;
    let config_path = focus_dir.join(CONFIG_FILE);
    recovery::atomic_write(&config_path, config_text.as_bytes()).map_err(|e| {
        StoreError::WriteError {
            path: config_path,
            source: e,
        }
    })?;

    let tree_path = focus_dir.join(&config.tree.file);
    recovery::atomic_write(&tree_path, serialize_outline(tree).as_bytes()).map_err(|e| {
        StoreError::WriteError {
            path: tree_path,
            source: e,
        }
    })?;
    Ok(focus_dir)
}
