//! Clipgraph Core Types and Definitions
//!
//! This crate provides the foundational types shared by the clipgraph canvas
//! engines. It includes:
//!
//! - **Identifiers**: String-interned node and edge identifiers ([`identifier::Id`])
//! - **Geometry**: Points, sizes and boxes in canvas space ([`geometry`] module)
//! - **Graph**: The canvas graph model of nodes and directed edges ([`graph`] module)

pub mod geometry;
pub mod graph;
pub mod identifier;
