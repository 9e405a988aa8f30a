/*!
# KdIndex

Incremental 3D k-d tree for nearest-neighbor queries over a moving point set.

The index stores caller-owned handles (anything implementing [`Positioned`]),
keeps them in insertion order, and answers "which item is closest to this
position" with an iterative, allocation-free traversal.

## Architecture

- **SpatialIndex**: arena of nodes with tree links (left/right) and an
  insertion-order link (next)
- **Positioned**: the only thing the index reads from an item
- **IndexConfig**: construction-time tuning (metric smoothing, capacity, log tag)
- **Diagnostics**: global logger used by the index and by its owners

Positions may change behind the index's back. The tree is only guaranteed to
match current positions right after `update_positions()`; the owner decides
when to call it.

[`Positioned`]: crate::kd3d::Positioned
*/

// Internal modules
mod config;
mod diagnostics;
mod error;
mod kd_tree;
pub mod log;
mod positioned;

// Main kd3d namespace module
pub mod kd3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Global logger access
    pub use crate::diagnostics::Diagnostics;

    // Index configuration
    pub use crate::config::IndexConfig;

    // Entity abstraction
    pub use crate::positioned::Positioned;

    // Spatial index
    pub use crate::kd_tree::{Iter, Nearest, SearchStats, SpatialIndex};

    // Logging sub-module (types only, macros live at the crate root)
    pub mod log {
        pub use crate::log::{DefaultLogger, LogEntry, LogSeverity, Logger};
    }
}

// Re-export math library at crate root
pub use glam;
