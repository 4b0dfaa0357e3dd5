use std::fs;

use crate::cli::commands::InitArgs;
use crate::io::recovery::{self, RecoveryCategory, RecoveryEntry};
use crate::io::store_io::{self, CONFIG_FILE, FOCUS_DIR};
use crate::model::config::FocusConfig;
use crate::model::frame::normalize_name;
use crate::model::tree::FocusTree;

use super::start_dir;

const FOCUS_TOML_TEMPLATE: &str = r##"# focus store configuration

[tree]
# Outline file, relative to this directory
file = "tree.md"
# Name of the root frame whenever the outline is missing or empty
root_name = {root_name}

[ui]
# Prefix each row of `fo list` with its key
show_keys = true
# Separator between breadcrumb segments
separator = " > "

[log]
# Default log filter. FOCUS_LOG and -v take precedence.
level = "warn"
"##;

const DEFAULT_ROOT_NAME: &str = "Focus";

/// Render focus.toml with the root name filled in as a TOML string.
fn render_focus_toml(root_name: &str) -> String {
    let quoted = toml::Value::String(root_name.to_string()).to_string();
    FOCUS_TOML_TEMPLATE.replace("{root_name}", &quoted)
}

pub fn cmd_init(args: InitArgs) -> Result<(), Box<dyn std::error::Error>> {
    let cwd = start_dir()?;
    let focus_dir = cwd.join(FOCUS_DIR);

    // Check for parent store and warn
    if let Some(parent) = cwd.parent()
        && let Ok(parent_root) = store_io::discover_store(parent)
    {
        eprintln!(
            "Note: parent store found at {}/",
            parent_root.join(FOCUS_DIR).display()
        );
        eprintln!("Creating new store in ./{}/", FOCUS_DIR);
    }

    let root_name = normalize_name(args.root.as_deref().unwrap_or(DEFAULT_ROOT_NAME));
    if root_name.is_empty() {
        return Err("root name cannot be empty".into());
    }

    // Keep the outline being replaced by --force
    if args.force && focus_dir.join(CONFIG_FILE).exists() {
        let config = store_io::read_config(&focus_dir).unwrap_or_else(|_| FocusConfig::default());
        let old_path = focus_dir.join(&config.tree.file);
        if let Ok(old) = fs::read_to_string(&old_path)
            && !old.trim().is_empty()
        {
            recovery::log_recovery(
                &focus_dir,
                RecoveryEntry {
                    timestamp: chrono::Utc::now(),
                    category: RecoveryCategory::Write,
                    description: "outline replaced by init --force".to_string(),
                    fields: vec![("Target".to_string(), config.tree.file.clone())],
                    body: old,
                },
            );
            eprintln!("Previous outline saved to the recovery log (fo recovery)");
        }
    }

    let config_text = render_focus_toml(&root_name);
    let tree = FocusTree::new(&root_name);
    store_io::create_store(&cwd, &config_text, &tree, args.force)?;

    println!("Initialized focus store: {}", root_name);
    Ok(())
}
