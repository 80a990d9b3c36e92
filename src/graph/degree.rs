//! Per-node incidence counts over the edge table

use crate::table::{SchemaError, Table};
use std::collections::HashMap;

/// Count, for every node id, the edge rows in which it appears as subject
/// or object.
///
/// Counts rows, not unique neighbors: parallel edges each contribute, and a
/// self-loop increments its node twice.
pub fn degree_index(edges: &Table) -> Result<HashMap<String, usize>, SchemaError> {
    let subject = edges.require_column("subject", "edge")?;
    let object = edges.require_column("object", "edge")?;

    let mut degrees: HashMap<String, usize> = HashMap::new();
    for row in edges.rows() {
        *degrees.entry(row[subject].clone()).or_insert(0) += 1;
        *degrees.entry(row[object].clone()).or_insert(0) += 1;
    }
    Ok(degrees)
}
