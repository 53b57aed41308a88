//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// repub content-addressed resource publisher CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Show per-file skip decisions and other debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path (default: repub.toml)
    #[arg(short = 'C', long, default_value = "repub.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Create the publishing root, the store and a starter config
    #[command(visible_alias = "i")]
    Init,

    /// Publish a static source tree under a package name
    #[command(visible_alias = "s")]
    Static {
        /// Source directory to mirror
        #[arg(value_hint = clap::ValueHint::DirPath)]
        source: PathBuf,

        /// Package name the tree publishes under
        package: String,
    },

    /// Import a file into the resource store and publish it
    #[command(visible_alias = "p")]
    Publish {
        /// File to import and publish
        #[arg(value_hint = clap::ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Remove a published persistent resource
    #[command(visible_alias = "u")]
    Unpublish {
        /// Content hash of the resource
        hash: String,

        /// File extension the resource was published with
        #[arg(short, long)]
        extension: Option<String>,
    },

    /// Print the public URI of a stored resource (publishes on demand)
    Uri {
        /// Content hash of the resource
        hash: String,

        /// File extension the resource was published with
        #[arg(short, long)]
        extension: Option<String>,

        /// Original filename to append to the URI
        #[arg(short, long)]
        filename: Option<String>,
    },
}
