//! Advisory integrity check between the node and edge tables

use crate::table::{SchemaError, Table};
use std::collections::HashSet;
use tracing::warn;

/// Check whether the node table contains ids never referenced by any edge.
///
/// As a side channel, edge endpoints that are absent from the node table are
/// logged as a warning: that is an integrity problem in the inputs, flagged
/// but never fixed. Neither table is mutated and downstream processing is
/// never blocked by the answer.
pub fn has_disconnected_nodes(edges: &Table, nodes: &Table) -> Result<bool, SchemaError> {
    let id_col = nodes.require_column("id", "node")?;
    let subj_col = edges.require_column("subject", "edge")?;
    let obj_col = edges.require_column("object", "edge")?;

    let node_ids: HashSet<&str> = nodes.rows().iter().map(|r| r[id_col].as_str()).collect();

    let mut referenced: HashSet<&str> = HashSet::new();
    for row in edges.rows() {
        referenced.insert(row[subj_col].as_str());
        referenced.insert(row[obj_col].as_str());
    }

    let dangling: Vec<&&str> = referenced.difference(&node_ids).collect();
    if !dangling.is_empty() {
        warn!(
            count = dangling.len(),
            "edges reference node ids absent from the node table"
        );
    }

    let disconnected = node_ids.difference(&referenced).count();
    Ok(disconnected > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nodes(ids: &[&str]) -> Table {
        let mut table = Table::new(vec!["id".to_string()]);
        for id in ids {
            table.push_row(vec![id.to_string()]);
        }
        table
    }

    fn edges(pairs: &[(&str, &str)]) -> Table {
        let mut table = Table::new(vec!["subject".to_string(), "object".to_string()]);
        for (s, o) in pairs {
            table.push_row(vec![s.to_string(), o.to_string()]);
        }
        table
    }

    #[test]
    fn test_fully_connected_graph_has_no_disconnected_nodes() {
        let nodes = nodes(&["g1", "g2", "g3"]);
        let edges = edges(&[("g1", "g2"), ("g2", "g3")]);
        assert!(!has_disconnected_nodes(&edges, &nodes).unwrap());
    }

    #[test]
    fn test_orphan_node_is_detected() {
        let nodes = nodes(&["g1", "g2", "orphan"]);
        let edges = edges(&[("g1", "g2")]);
        assert!(has_disconnected_nodes(&edges, &nodes).unwrap());
    }

    #[test]
    fn test_dangling_endpoint_does_not_flag_disconnection() {
        // g9 is referenced but missing from the node table; that is warned
        // about, not reported through the return value.
        let nodes = nodes(&["g1", "g2"]);
        let edges = edges(&[("g1", "g2"), ("g1", "g9")]);
        assert!(!has_disconnected_nodes(&edges, &nodes).unwrap());
    }

    #[test]
    fn test_missing_id_column_is_schema_error() {
        let bad_nodes = Table::new(vec!["name".to_string()]);
        let edges = edges(&[("g1", "g2")]);
        let err = has_disconnected_nodes(&edges, &bad_nodes).unwrap_err();
        assert_eq!(err.column, "id");
        assert_eq!(err.table, "node");
    }
}
