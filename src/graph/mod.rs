//! Graph-level views derived from the node and edge tables.
//!
//! Everything here is a pure function of its inputs: the degree index and
//! the integrity check are recomputed per run and never cached, so callers
//! can reason about them without hidden state.

mod degree;
mod integrity;

pub use degree::degree_index;
pub use integrity::has_disconnected_nodes;
