//! Configuration types for the clipgraph engines.
//!
//! All types implement [`serde::Deserialize`] with every field defaulted, so
//! a partial TOML document (or none at all) yields a usable configuration.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining every section.
//! - [`AlignmentConfig`] - Snap and equal-spacing tolerances used while dragging.
//! - [`CycleLayoutConfig`] - Search bound and polygon geometry for cycle auto-layout.
//! - [`TidyConfig`] - Defaults for one-shot tidy layouts.
//! - [`LineageConfig`] - Which edges lineage chains follow.
//!
//! # Example
//!
//! ```
//! # use clipgraph::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.alignment().snap_threshold(), 8.0);
//! assert_eq!(config.cycle_layout().max_cycle_len(), 4);
//! ```

use serde::Deserialize;

use crate::{alignment::TidyMode, relation::Traversal};

/// Top-level configuration combining every engine section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    alignment: AlignmentConfig,

    #[serde(default)]
    cycle_layout: CycleLayoutConfig,

    #[serde(default)]
    tidy: TidyConfig,

    #[serde(default)]
    lineage: LineageConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(
        alignment: AlignmentConfig,
        cycle_layout: CycleLayoutConfig,
        tidy: TidyConfig,
        lineage: LineageConfig,
    ) -> Self {
        Self {
            alignment,
            cycle_layout,
            tidy,
            lineage,
        }
    }

    /// Returns the alignment configuration.
    pub fn alignment(&self) -> &AlignmentConfig {
        &self.alignment
    }

    /// Returns the cycle layout configuration.
    pub fn cycle_layout(&self) -> &CycleLayoutConfig {
        &self.cycle_layout
    }

    /// Returns the tidy layout configuration.
    pub fn tidy(&self) -> &TidyConfig {
        &self.tidy
    }

    /// Returns the lineage configuration.
    pub fn lineage(&self) -> &LineageConfig {
        &self.lineage
    }
}

/// Tolerances for interactive drag alignment.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AlignmentConfig {
    /// Two edges closer than this (strictly) produce a guide line.
    snap_threshold: f32,

    /// Two adjacent gaps closer than this (strictly) count as equal.
    equal_spacing_threshold: f32,

    /// Gaps at or below this are treated as overlap and ignored.
    min_equal_gap: f32,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            snap_threshold: 8.0,
            equal_spacing_threshold: 12.0,
            min_equal_gap: 10.0,
        }
    }
}

impl AlignmentConfig {
    /// Creates an [`AlignmentConfig`] from explicit tolerances.
    pub fn new(snap_threshold: f32, equal_spacing_threshold: f32, min_equal_gap: f32) -> Self {
        Self {
            snap_threshold,
            equal_spacing_threshold,
            min_equal_gap,
        }
    }

    /// Returns the snap distance for edge and center guides.
    pub fn snap_threshold(&self) -> f32 {
        self.snap_threshold
    }

    /// Returns the tolerance for two gaps to count as equal.
    pub fn equal_spacing_threshold(&self) -> f32 {
        self.equal_spacing_threshold
    }

    /// Returns the smallest gap considered for equal spacing.
    pub fn min_equal_gap(&self) -> f32 {
        self.min_equal_gap
    }
}

/// Cycle search bound and polygon geometry.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CycleLayoutConfig {
    /// Longest cycle (in distinct nodes) the detector reports.
    max_cycle_len: usize,

    /// Floor for the polygon circumradius.
    min_radius: f32,

    /// Fraction of the average node diagonal used as the base chord length.
    diagonal_factor: f32,

    /// Fixed spacing added to every chord.
    spacing: f32,

    /// Apply new-cycle layouts on the next animation frame instead of immediately.
    defer_layout: bool,
}

impl Default for CycleLayoutConfig {
    fn default() -> Self {
        Self {
            max_cycle_len: 4,
            min_radius: 180.0,
            diagonal_factor: 0.8,
            spacing: 40.0,
            defer_layout: true,
        }
    }
}

impl CycleLayoutConfig {
    /// Returns the longest cycle reported, in distinct nodes.
    pub fn max_cycle_len(&self) -> usize {
        self.max_cycle_len
    }

    /// Returns the polygon radius floor.
    pub fn min_radius(&self) -> f32 {
        self.min_radius
    }

    /// Returns the fraction of the average node diagonal used per chord.
    pub fn diagonal_factor(&self) -> f32 {
        self.diagonal_factor
    }

    /// Returns the fixed spacing added to every chord.
    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    /// Returns whether new-cycle layouts wait for the next animation frame.
    pub fn defer_layout(&self) -> bool {
        self.defer_layout
    }

    /// Returns a copy with deferral switched on or off.
    pub fn with_defer_layout(mut self, defer_layout: bool) -> Self {
        self.defer_layout = defer_layout;
        self
    }
}

/// Defaults for tidy layouts requested without explicit arguments.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TidyConfig {
    gap: f32,
    mode: TidyMode,
}

impl Default for TidyConfig {
    fn default() -> Self {
        Self {
            gap: 40.0,
            mode: TidyMode::Grid,
        }
    }
}

impl TidyConfig {
    /// Returns the default gap between tidied nodes.
    pub fn gap(&self) -> f32 {
        self.gap
    }

    /// Returns the default tidy mode.
    pub fn mode(&self) -> TidyMode {
        self.mode
    }
}

/// Lineage traversal settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LineageConfig {
    traversal: Traversal,
}

impl LineageConfig {
    /// Creates a [`LineageConfig`] following `traversal`.
    pub fn new(traversal: Traversal) -> Self {
        Self { traversal }
    }

    /// Returns which edges lineage queries follow.
    pub fn traversal(&self) -> Traversal {
        self.traversal
    }
}
