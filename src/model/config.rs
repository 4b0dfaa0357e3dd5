use serde::{Deserialize, Serialize};

/// Configuration from focus.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FocusConfig {
    #[serde(default)]
    pub tree: TreeConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Outline file, relative to the focus/ directory
    #[serde(default = "default_tree_file")]
    pub file: String,
    /// Name given to the root frame when no outline exists yet
    #[serde(default = "default_root_name")]
    pub root_name: String,
}

impl Default for TreeConfig {
    fn default() -> Self {
        TreeConfig {
            file: default_tree_file(),
            root_name: default_root_name(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Prefix each row of `fo list` with the frame key
    #[serde(default = "default_true")]
    pub show_keys: bool,
    /// Separator between breadcrumb segments in human output
    #[serde(default = "default_separator")]
    pub separator: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            show_keys: true,
            separator: default_separator(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Default log filter when neither -v nor FOCUS_LOG is given
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: default_log_level(),
        }
    }
}

fn default_tree_file() -> String {
    "tree.md".to_string()
}

fn default_root_name() -> String {
    "Focus".to_string()
}

fn default_true() -> bool {
    true
}

fn default_separator() -> String {
    crate::ops::nav::BREADCRUMB_SEPARATOR.to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}
