//! Command-line argument definitions for the clipgraph CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Global arguments select the input snapshot, output path,
//! configuration file and logging verbosity; the [`Command`] picks the engine
//! operation to run.

use clap::{Parser, Subcommand, ValueEnum};

use clipgraph::alignment::TidyMode;

/// Command-line arguments for the clipgraph canvas engine
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input graph snapshot (JSON)
    #[arg(help = "Path to the input snapshot")]
    pub input: String,

    /// Path to the output JSON file; standard output when omitted
    #[arg(short, long)]
    pub output: Option<String>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Engine operation to run on the loaded snapshot
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the detected cycles
    Cycles,

    /// Lay out every newly detected cycle and print the updated snapshot
    Layout,

    /// Tidy all nodes and print the updated snapshot
    Tidy {
        /// Arrangement (horizontal, vertical, grid, distribute-h, distribute-v)
        #[arg(long)]
        mode: Option<TidyMode>,

        /// Gap between nodes in canvas units
        #[arg(long)]
        gap: Option<f32>,
    },

    /// Print the lineage chain of a node, nearest first
    Lineage {
        /// Node id
        node: String,

        #[arg(long, value_enum, default_value_t = Direction::Up)]
        direction: Direction,
    },

    /// Print the guide lines shown while dragging a node to a position
    Guides {
        /// Node id
        node: String,

        #[arg(long, allow_hyphen_values = true)]
        x: f32,

        #[arg(long, allow_hyphen_values = true)]
        y: f32,
    },
}

/// Lineage direction
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Ancestors
    Up,
    /// Descendants
    Down,
}
