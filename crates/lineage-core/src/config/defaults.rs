//! Default values for Lineage configuration.
//!
//! All hardcoded defaults are centralized here for easy maintenance.

use crate::layout::LayoutMode;

// ============================================================================
// Storage Defaults
// ============================================================================

/// Default data directory.
pub const DEFAULT_DATA_DIR: &str = ".lineage";

/// Default person collection file name.
pub const DEFAULT_PERSONS_FILE: &str = "persons.json";

/// Default ancestry tree collection file name.
pub const DEFAULT_TREES_FILE: &str = "trees.json";

// ============================================================================
// Layout Defaults
// ============================================================================

/// Layout used when neither the caller nor the config picks one.
pub const DEFAULT_LAYOUT_MODE: LayoutMode = LayoutMode::Generational;

/// Default viewport width used when the caller gives none.
pub const DEFAULT_VIEW_WIDTH: f64 = 1200.0;

/// Default viewport height used when the caller gives none.
pub const DEFAULT_VIEW_HEIGHT: f64 = 800.0;

// Hierarchical layout

/// Horizontal footprint of one node.
pub const DEFAULT_NODE_WIDTH: f64 = 220.0;

/// Distance between two depth levels.
pub const DEFAULT_NODE_HEIGHT: f64 = 300.0;

/// Separation between nodes sharing a display parent, in node widths.
pub const DEFAULT_SIBLING_SEPARATION: f64 = 2.5;

/// Separation between nodes with different display parents, in node widths.
pub const DEFAULT_COUSIN_SEPARATION: f64 = 3.5;

/// Share of the viewport the hierarchical layout is fitted into.
pub const DEFAULT_VIEWPORT_FRACTION: f64 = 0.9;

// Generational layout

/// Share of the viewport height covered by generation bands.
pub const DEFAULT_BAND_HEIGHT_FRACTION: f64 = 0.85;

/// Widening applied to band spacing so deep trees do not overlap.
pub const DEFAULT_BAND_SPACING_FACTOR: f64 = 1.8;

/// Horizontal offset of each parent from the centre, as a width fraction.
pub const DEFAULT_PARENT_OFFSET: f64 = 0.15;

/// Grandparent slot positions as width fractions, left to right.
pub const DEFAULT_GRANDPARENT_SLOTS: [f64; 4] = [0.125, 0.375, 0.625, 0.875];

/// Great-grandparent slot positions as width fractions, left to right.
pub const DEFAULT_GREAT_GRANDPARENT_SLOTS: [f64; 8] = [
    0.0625, 0.1875, 0.3125, 0.4375, 0.5625, 0.6875, 0.8125, 0.9375,
];

/// Offset from the centre for nodes without a slot, as a width fraction.
pub const DEFAULT_FALLBACK_SIDE_OFFSET: f64 = 0.25;

// ============================================================================
// Server Defaults
// ============================================================================

/// Default port for `lineage serve`.
pub const DEFAULT_SERVER_PORT: u16 = 3333;
