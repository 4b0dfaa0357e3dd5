use clap::{Args, Parser, Subcommand};

use crate::model::frame::Key;

#[derive(Parser)]
#[command(name = "fo", about = concat!("fo v", env!("CARGO_PKG_VERSION"), " - one tree, one focus"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different store directory
    #[arg(short = 'C', long = "project-dir", global = true)]
    pub project_dir: Option<String>,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a focus store in the current directory
    Init(InitArgs),
    /// Show the current focus (default)
    Status,
    /// List every frame with its key
    List,
    /// Print the path from the root to the current focus
    Where,
    /// Focus the frame with the given key
    Focus(KeyArgs),
    /// Finish the current frame and move focus to the next piece of work
    Done,
    /// Focus the deepest first child of the current frame
    Dive,
    /// Add a child under the current frame and focus it
    Add(NameArgs),
    /// Add several levels at once: "A, B / C / D"
    Nest(NestArgs),
    /// Add a sibling after the current frame without moving focus
    Later(NameArgs),
    /// Rename the current frame
    Rename(NameArgs),
    /// Insert a new parent above the current frame
    Wrap(NameArgs),
    /// Move a frame (with its children) under another frame
    Mv(MvArgs),
    /// Focus the next sibling (wraps around)
    Next,
    /// Focus the previous sibling (wraps around)
    Prev,
    /// Focus the parent frame
    Up,
    /// Focus the first child
    Down,
    /// Search frame names by regex
    Search(SearchArgs),
    /// Validate the stored outline
    Check,
    /// View or clear the recovery log
    Recovery(RecoveryArgs),
}

#[derive(Args)]
pub struct InitArgs {
    /// Name of the root frame (default: from focus.toml, "Focus")
    #[arg(long)]
    pub root: Option<String>,
    /// Reinitialize even if focus/ already exists
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct KeyArgs {
    /// Frame key, as shown by `fo list`
    pub key: Key,
}

#[derive(Args)]
pub struct NameArgs {
    /// Frame name (remaining words are joined with spaces)
    #[arg(required = true, num_args = 1..)]
    pub name: Vec<String>,
}

impl NameArgs {
    pub fn joined(&self) -> String {
        self.name.join(" ")
    }
}

#[derive(Args)]
pub struct NestArgs {
    /// Levels separated by `/`, siblings by `,`
    pub spec: String,
}

#[derive(Args)]
pub struct MvArgs {
    /// Key of the frame to move
    pub key: Key,
    /// Key of the new parent
    pub parent: Key,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Regex pattern to search for
    pub pattern: String,
}

#[derive(Args)]
pub struct RecoveryArgs {
    /// Delete the recovery log
    #[arg(long)]
    pub clear: bool,
}
