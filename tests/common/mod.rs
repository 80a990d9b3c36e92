//! Shared table builders for integration tests

use holdout::Table;

/// Node table with `id` and `category` columns
pub fn node_table(entries: &[(&str, &str)]) -> Table {
    let mut table = Table::new(vec!["id".to_string(), "category".to_string()]);
    for (id, category) in entries {
        table.push_row(vec![id.to_string(), category.to_string()]);
    }
    table
}

/// Edge table with the KGX-style four columns
pub fn edge_table(pairs: &[(&str, &str)]) -> Table {
    let mut table = Table::new(vec![
        "subject".to_string(),
        "predicate".to_string(),
        "object".to_string(),
        "relation".to_string(),
    ]);
    for (subject, object) in pairs {
        table.push_row(vec![
            subject.to_string(),
            "biolink:interacts_with".to_string(),
            object.to_string(),
            "RO:0002434".to_string(),
        ]);
    }
    table
}

/// The canonical small test graph: five genes, first edge subject "g1"
pub fn small_graph() -> (Table, Table) {
    let nodes = node_table(&[
        ("g1", "gene"),
        ("g2", "gene"),
        ("g3", "gene"),
        ("g4", "gene"),
        ("g5", "gene"),
    ]);
    let edges = edge_table(&[
        ("g1", "g2"),
        ("g1", "g3"),
        ("g2", "g3"),
        ("g3", "g4"),
        ("g4", "g5"),
    ]);
    (nodes, edges)
}

/// Ring of `n` nodes (g1..gn) and `n` edges; every node has degree 2 and
/// every unordered pair is unique
pub fn ring_graph(n: usize) -> (Table, Table) {
    let ids: Vec<String> = (1..=n).map(|i| format!("g{}", i)).collect();
    let node_entries: Vec<(&str, &str)> = ids.iter().map(|id| (id.as_str(), "gene")).collect();
    let nodes = node_table(&node_entries);

    let pairs: Vec<(String, String)> = (0..n)
        .map(|i| (ids[i].clone(), ids[(i + 1) % n].clone()))
        .collect();
    let pair_refs: Vec<(&str, &str)> = pairs
        .iter()
        .map(|(a, b)| (a.as_str(), b.as_str()))
        .collect();
    let edges = edge_table(&pair_refs);

    (nodes, edges)
}

/// Unordered (subject, object) pairs of an edge table
pub fn pair_set(table: &Table) -> std::collections::HashSet<(String, String)> {
    let subj = table.column_index("subject").unwrap();
    let obj = table.column_index("object").unwrap();
    table
        .rows()
        .iter()
        .map(|r| {
            let (a, b) = (&r[subj], &r[obj]);
            if a <= b {
                (a.clone(), b.clone())
            } else {
                (b.clone(), a.clone())
            }
        })
        .collect()
}
