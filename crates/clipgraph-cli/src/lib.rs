//! CLI logic for the clipgraph canvas engine.
//!
//! Loads a graph snapshot into an [`EditorSession`], runs one engine
//! operation and writes the result as JSON.

pub mod error_adapter;

mod args;
mod config;

pub use args::{Args, Command, Direction};

use std::fs;

use log::info;
use serde::Serialize;

use clipgraph::{ClipgraphError, EditorSession, geometry::Point, snapshot::GraphSnapshot};

/// Run the clipgraph CLI application
///
/// # Errors
///
/// Returns `ClipgraphError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Malformed snapshots
/// - Node ids missing from the snapshot
pub fn run(args: &Args) -> Result<(), ClipgraphError> {
    info!(input_path = args.input; "Processing snapshot");

    let app_config = config::load_config(args.config.as_ref())?;
    let (nodes, edges) = GraphSnapshot::load(&args.input)?.into_parts();

    let mut session = EditorSession::new(&app_config);
    session.sync(nodes, edges);

    let output = match &args.command {
        Command::Cycles => to_json(session.cycles())?,
        Command::Layout => {
            let moved = session.on_animation_frame();
            info!(moved = moved.len(), cycles = session.cycles().len(); "Cycles laid out");
            to_json(&GraphSnapshot::from_graph(session.graph()))?
        }
        Command::Tidy { mode, gap } => {
            let moved = session.tidy(*mode, *gap, None);
            info!(moved = moved.len(); "Tidy finished");
            to_json(&GraphSnapshot::from_graph(session.graph()))?
        }
        Command::Lineage { node, direction } => {
            let id = session.resolve_node(node)?;
            let chain = match direction {
                Direction::Up => session.upstream_chain(id),
                Direction::Down => session.downstream_chain(id),
            };
            to_json(&chain)?
        }
        Command::Guides { node, x, y } => {
            let id = session.resolve_node(node)?;
            to_json(&session.on_node_drag(id, Point::new(*x, *y)))?
        }
    };

    match &args.output {
        Some(path) => {
            fs::write(path, output)?;
            info!(output_file = path; "Result written");
        }
        None => println!("{output}"),
    }

    Ok(())
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, ClipgraphError> {
    serde_json::to_string_pretty(value).map_err(ClipgraphError::Encode)
}
