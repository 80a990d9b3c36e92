//! Holdout: edge holdout and negative sampling for knowledge graphs
//!
//! Given a node table and an edge table (tab-separated, header row), this
//! crate produces disjoint train/test/(validation) partitions of positive
//! edges and matching partitions of sampled negative edges, suitable as
//! labeled data for link-prediction models.
//!
//! # Core Concepts
//!
//! - **Positive edges**: edges present in the graph; a seeded fraction is
//!   held out for evaluation and the rest stays for training.
//! - **Negative edges**: random node pairs known not to be connected —
//!   non-reflexive, non-duplicated, never coinciding with a positive.
//! - **Determinism**: a run is fully reproducible from a single seed.
//!
//! # Example
//!
//! ```
//! use holdout::HoldoutConfig;
//!
//! let config = HoldoutConfig::default()
//!     .with_train_fraction(0.8)
//!     .with_validation(true)
//!     .with_seed(42);
//! assert_eq!(config.seed, 42);
//! ```

pub mod graph;
pub mod holdout;
pub mod sample;
pub mod table;

pub use graph::{degree_index, has_disconnected_nodes};
pub use holdout::{
    run, HoldoutConfig, HoldoutError, HoldoutReport, HoldoutResult, HoldoutRun, RunState,
};
pub use sample::{
    make_negative_edges, make_positive_edges, SampleError, SampleResult, NEGATIVE_EDGE_LABEL,
    POSITIVE_EDGE_LABEL,
};
pub use table::{SchemaError, Table, TableError, TableResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
