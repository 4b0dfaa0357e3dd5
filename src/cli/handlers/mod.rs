mod init;
pub use init::cmd_init;

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use regex::Regex;
use tracing::debug;

/// Global override for the store directory (set by -C flag)
static PROJECT_DIR_OVERRIDE: Mutex<Option<PathBuf>> = Mutex::new(None);

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::recovery;
use crate::io::store_io::{self, FOCUS_DIR, StoreError};
use crate::model::store::Store;
use crate::model::tree::FocusTree;
use crate::ops::tree_ops::{self, TreeError};
use crate::ops::{check, nav, search};

type CmdResult = Result<(), Box<dyn std::error::Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let json = cli.json;

    // Store -C override for start_dir()
    if let Some(ref dir) = cli.project_dir {
        let abs = std::fs::canonicalize(dir)
            .map_err(|e| format!("cannot resolve -C path '{}': {}", dir, e))?;
        if let Ok(mut slot) = PROJECT_DIR_OVERRIDE.lock() {
            slot.replace(abs);
        }
    }

    match cli.command.unwrap_or(Commands::Status) {
        Commands::Init(args) => cmd_init(args),

        // Read commands
        Commands::Status => cmd_status(json),
        Commands::List => cmd_list(json),
        Commands::Where => cmd_where(json),
        Commands::Search(args) => cmd_search(args, json),
        Commands::Check => cmd_check(json),
        Commands::Recovery(args) => cmd_recovery(args),

        // Write commands
        Commands::Focus(args) => apply(json, |tree| tree_ops::set_current(tree, args.key)),
        Commands::Done => apply(json, |tree| Ok(tree_ops::complete_current(tree))),
        Commands::Dive => apply(json, |tree| Ok(tree_ops::dive_in(tree))),
        Commands::Add(args) => apply(json, |tree| Ok(tree_ops::add_child(tree, &args.joined()))),
        Commands::Nest(args) => apply(json, |tree| {
            tree_ops::create_nested_children(tree, &args.spec)
        }),
        Commands::Later(args) => apply(json, |tree| {
            Ok(tree_ops::add_next_sibling(tree, &args.joined()))
        }),
        Commands::Rename(args) => apply(json, |tree| {
            Ok(tree_ops::rename_current(tree, &args.joined()))
        }),
        Commands::Wrap(args) => apply(json, |tree| tree_ops::wrap_current(tree, &args.joined())),
        Commands::Mv(args) => cmd_mv(args, json),
        Commands::Next => apply(json, |tree| Ok(tree_ops::focus_next_sibling(tree))),
        Commands::Prev => apply(json, |tree| Ok(tree_ops::focus_previous_sibling(tree))),
        Commands::Up => apply(json, |tree| Ok(tree_ops::focus_parent(tree))),
        Commands::Down => apply(json, |tree| Ok(tree_ops::focus_first_child(tree))),
    }
}

/// Log filter from the nearest store's focus.toml, if there is one.
pub fn configured_log_level(project_dir: Option<&str>) -> Option<String> {
    let start = match project_dir {
        Some(dir) => PathBuf::from(dir),
        None => std::env::current_dir().ok()?,
    };
    let root = store_io::discover_store(&start).ok()?;
    let config = store_io::read_config(&root.join(FOCUS_DIR)).ok()?;
    Some(config.log.level)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Directory to start store discovery from: the -C override or the cwd.
fn start_dir() -> std::io::Result<PathBuf> {
    let overridden = PROJECT_DIR_OVERRIDE
        .lock()
        .ok()
        .and_then(|slot| slot.clone());
    match overridden {
        Some(dir) => Ok(dir),
        None => std::env::current_dir(),
    }
}

fn discover_cwd() -> Result<PathBuf, StoreError> {
    let start = start_dir()?;
    store_io::discover_store(&start)
}

fn load_store_cwd() -> Result<Store, StoreError> {
    let root = discover_cwd()?;
    debug!(root = %root.display(), "using store");
    store_io::load_store(&root)
}

/// Load the store, run one tree operation, save if anything changed, and
/// print where the focus ended up.
fn apply<F>(json: bool, op: F) -> CmdResult
where
    F: FnOnce(&FocusTree) -> Result<FocusTree, TreeError>,
{
    let store = load_store_cwd()?;
    let tree = op(&store.tree)?;
    if tree == store.tree {
        eprintln!("nothing changed");
    } else {
        store_io::save_tree(&store, &tree)?;
    }
    print_focus(&store, &tree, json)
}

fn print_focus(store: &Store, tree: &FocusTree, json: bool) -> CmdResult {
    if json {
        println!("{}", serde_json::to_string_pretty(&nav::current_details(tree))?);
    } else {
        println!("{}", nav::breadcrumb_with(tree, &store.config.ui.separator));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Read command handlers
// ---------------------------------------------------------------------------

fn cmd_status(json: bool) -> CmdResult {
    let store = load_store_cwd()?;
    let mut details = nav::current_details(&store.tree);

    if json {
        println!("{}", serde_json::to_string_pretty(&details)?);
    } else {
        details.breadcrumb = nav::breadcrumb_with(&store.tree, &store.config.ui.separator);
        for line in format_status(&details) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_list(json: bool) -> CmdResult {
    let store = load_store_cwd()?;
    let items = nav::items_list(&store.tree);

    if json {
        let out = ListJson {
            current: store.tree.current().key,
            items,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for item in &items {
            println!("{}", format_list_item(item, store.config.ui.show_keys));
        }
    }
    Ok(())
}

fn cmd_where(json: bool) -> CmdResult {
    let store = load_store_cwd()?;
    let tree = &store.tree;

    if json {
        let mut frames = nav::ancestors(tree);
        frames.push(tree.current());
        let out = WhereJson {
            breadcrumb: nav::breadcrumb(tree),
            path: frames
                .into_iter()
                .map(|f| PathSegmentJson {
                    key: f.key,
                    name: f.name.clone(),
                })
                .collect(),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{}", nav::breadcrumb_with(tree, &store.config.ui.separator));
    }
    Ok(())
}

fn cmd_search(args: SearchArgs, json: bool) -> CmdResult {
    let store = load_store_cwd()?;
    let re = Regex::new(&args.pattern)?;
    let hits = search::search_frames(&store.tree, &re);

    if json {
        let out = SearchJson {
            pattern: args.pattern,
            hits,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if hits.is_empty() {
        eprintln!("no matches for {}", args.pattern);
    }
    for hit in &hits {
        println!("{}", format_search_hit(hit, &store.config.ui.separator));
    }
    Ok(())
}

/// Checks the outline file as written, so text a load would refuse is still
/// reported as check errors.
fn cmd_check(json: bool) -> CmdResult {
    let focus_dir = discover_cwd()?.join(FOCUS_DIR);
    let config = store_io::read_config(&focus_dir)?;
    let path = focus_dir.join(&config.tree.file);
    let text = if path.exists() {
        std::fs::read_to_string(&path).map_err(|e| StoreError::ReadError {
            path: path.clone(),
            source: e,
        })?
    } else {
        String::new()
    };
    let result = if text.trim().is_empty() {
        check::check_tree(&FocusTree::new(&config.tree.root_name))
    } else {
        check::check_outline(&text)
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        for line in format_check(&result) {
            println!("{}", line);
        }
    }
    if !result.valid {
        return Err(check::describe_errors(&result.errors).into());
    }
    Ok(())
}

fn cmd_recovery(args: RecoveryArgs) -> CmdResult {
    // The outline may be the thing that is broken, so only locate the store
    let focus_dir = discover_cwd()?.join(FOCUS_DIR);
    print_recovery(&focus_dir, args.clear)
}

fn print_recovery(focus_dir: &Path, clear: bool) -> CmdResult {
    if clear {
        if recovery::clear_recovery_log(focus_dir)? {
            println!("recovery log cleared");
        } else {
            println!("no recovery log");
        }
        return Ok(());
    }

    match recovery::read_recovery_log(focus_dir) {
        Some(content) => {
            let entries = recovery::recovery_headers(&content);
            eprintln!(
                "{} recovery {} in {}",
                entries.len(),
                if entries.len() == 1 { "entry" } else { "entries" },
                recovery::recovery_log_path(focus_dir).display()
            );
            print!("{}", content);
        }
        None => println!("no recovery log"),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write command handlers
// ---------------------------------------------------------------------------

fn cmd_mv(args: MvArgs, json: bool) -> CmdResult {
    apply(json, |tree| {
        for key in [args.key, args.parent] {
            if nav::find_frame(tree, key).is_none() {
                eprintln!("no frame with key {}", key);
            }
        }
        tree_ops::move_frame(tree, args.key, args.parent)
    })
}
