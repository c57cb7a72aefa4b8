use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::color::Color;

/// Assign persistent, distinct colors to the speakers of a conversation.
#[derive(Parser, Debug)]
#[command(name = "dialogue-hues", version, about)]
pub struct Args {
    /// State file (defaults to the data directory, one file per scope)
    #[arg(short, long, global = true)]
    pub state: Option<PathBuf>,

    /// Conversation scope whose state is used
    #[arg(long, global = true, default_value = "default")]
    pub scope: String,

    /// Background mode to assume when settings are on auto
    #[arg(short, long, value_enum, global = true)]
    pub mode: Option<ThemeMode>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scan transcript files for color annotations
    Scan {
        /// Transcript files; messages are separated by blank lines
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Only apply the last message, keeping existing counts
        #[arg(long)]
        incremental: bool,
    },
    /// List every speaker
    Show {
        /// Print colored swatches
        #[arg(long)]
        preview: bool,
    },
    /// Add a speaker, allocating a color unless one is given
    Add {
        name: String,
        color: Option<Color>,
    },
    /// Set a speaker's color
    Recolor { name: String, color: Color },
    /// Toggle a speaker's lock
    Lock { name: String },
    /// Give a speaker another name
    Alias { name: String, alias: String },
    /// Cycle a speaker's text style
    Style { name: String },
    /// Exchange the colors of two speakers
    Swap { a: String, b: String },
    /// Remove a speaker
    Remove { name: String },
    /// Remove every locked (or unlocked) speaker
    Purge {
        #[arg(long, conflicts_with = "unlocked", required_unless_present = "unlocked")]
        locked: bool,
        #[arg(long)]
        unlocked: bool,
    },
    /// Remove every speaker
    Clear,
    /// Report speakers whose colors are too similar
    Conflicts {
        /// Recolor unlocked speakers to separate them
        #[arg(long)]
        resolve: bool,
    },
    /// Reassign colors to every unlocked speaker
    Regenerate,
    /// Suggest a color from a keyword in a name
    Suggest { name: String },
    /// Print the prompt instruction for the current state
    Prompt,
    /// Write the state document to a file
    Export { path: PathBuf },
    /// Replace the state with a document from a file
    Import { path: PathBuf },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Dark,
    Light,
}
