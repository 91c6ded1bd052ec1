use clap::{Parser, Subcommand};

#[derive(Debug, Parser, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct CLI {
    #[command(subcommand)]
    pub(crate) command: ToolpinCommand,
}

#[derive(Debug, Subcommand, Clone, PartialEq)]
pub enum ToolpinCommand {
    /// Creates a `toolpin.json` manifest in the current directory
    Init {
        /// Mark the manifest as non-root (tools from parent scopes stay visible)
        #[clap(long)]
        no_root: bool,
    },
    /// Pins a tool in the manifest. Re-adding the same version and commands only updates --roll-forward
    Add {
        /// Name and version of the package: <name>@<version> (no leading 'v' for versions)
        name_at_version: String,
        /// Command name the tool exposes. Repeatable; defaults to the package name
        #[clap(long = "command")]
        commands: Vec<String>,
        /// Let the tool run on a newer runtime than the one it targets
        #[clap(long)]
        roll_forward: bool,
    },
    /// Changes the pinned version (and optionally the commands) of an existing tool
    Update {
        /// Name and new version of the package: <name>@<version>
        name_at_version: String,
        /// New command name. Repeatable; defaults to the currently pinned commands
        #[clap(long = "command")]
        commands: Vec<String>,
    },
    /// Removes a tool from the manifest
    Remove {
        name: String,
    },
    /// List all tools pinned in `toolpin.json`
    List {
        #[clap(short, long)]
        verbose: bool,
    },
}
