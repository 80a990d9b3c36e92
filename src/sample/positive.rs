//! Held-out positive edge selection

use super::{unordered_pair, SampleError, SampleResult, POSITIVE_EDGE_LABEL};
use crate::graph::degree_index;
use crate::table::Table;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Split the edge table into training edges and held-out test edges.
///
/// The test set targets `round((1 - train_fraction) * |edge rows|)` rows,
/// drawn uniformly from eligible edges. Eligibility is decided per unordered
/// (subject, object) pair against the full pre-removal edge set:
///
/// - both endpoints must have degree at least `min_degree`, so promoting an
///   edge never strands a node whose only connection it was;
/// - when `node_types` is given, at least one endpoint's `category` must be
///   in the list.
///
/// Every row sharing a drawn pair moves to the test table together, which
/// keeps train and test disjoint as unordered pairs even when the input
/// contains duplicate pair rows. Test rows get `predicate` and `relation`
/// overwritten with `"positive_edge"`; training rows are the untouched
/// complement in original row order.
///
/// If fewer eligible pairs exist than requested, all of them are taken and a
/// warning is logged; callers must tolerate a smaller test set.
pub fn make_positive_edges(
    nodes: &Table,
    edges: &Table,
    train_fraction: f64,
    node_types: Option<&[String]>,
    min_degree: usize,
    rng: &mut impl Rng,
) -> SampleResult<(Table, Table)> {
    if !(train_fraction > 0.0 && train_fraction < 1.0) {
        return Err(SampleError::InvalidFraction(train_fraction));
    }
    let id_col = nodes.require_column("id", "node")?;
    let subj_col = edges.require_column("subject", "edge")?;
    let obj_col = edges.require_column("object", "edge")?;

    // Category lookup is only needed when filtering by node type.
    let categories: Option<HashMap<&str, &str>> = match node_types {
        Some(_) => {
            let cat_col = nodes.require_column("category", "node")?;
            Some(
                nodes
                    .rows()
                    .iter()
                    .map(|r| (r[id_col].as_str(), r[cat_col].as_str()))
                    .collect(),
            )
        }
        None => None,
    };
    let allowed: Option<HashSet<&str>> =
        node_types.map(|types| types.iter().map(String::as_str).collect());

    let degrees = degree_index(edges)?;

    // Group rows by unordered pair, keeping first-seen order so the shuffle
    // below is the only source of randomness.
    let mut pair_rows: HashMap<(String, String), Vec<usize>> = HashMap::new();
    let mut pair_order: Vec<(String, String)> = Vec::new();
    for (i, row) in edges.rows().iter().enumerate() {
        let key = unordered_pair(&row[subj_col], &row[obj_col]);
        match pair_rows.entry(key.clone()) {
            Entry::Occupied(mut entry) => entry.get_mut().push(i),
            Entry::Vacant(entry) => {
                entry.insert(vec![i]);
                pair_order.push(key);
            }
        }
    }

    let mut eligible: Vec<usize> = Vec::new();
    for (pi, (a, b)) in pair_order.iter().enumerate() {
        if degrees.get(a.as_str()).copied().unwrap_or(0) < min_degree
            || degrees.get(b.as_str()).copied().unwrap_or(0) < min_degree
        {
            continue;
        }
        if let (Some(allowed), Some(categories)) = (&allowed, &categories) {
            let a_ok = categories.get(a.as_str()).is_some_and(|c| allowed.contains(c));
            let b_ok = categories.get(b.as_str()).is_some_and(|c| allowed.contains(c));
            if !a_ok && !b_ok {
                continue;
            }
        }
        eligible.push(pi);
    }

    let target = ((1.0 - train_fraction) * edges.len() as f64).round() as usize;
    eligible.shuffle(rng);

    let mut test_rows: HashSet<usize> = HashSet::new();
    for &pi in &eligible {
        if test_rows.len() >= target {
            break;
        }
        for &ri in &pair_rows[&pair_order[pi]] {
            test_rows.insert(ri);
        }
    }
    if test_rows.len() < target {
        warn!(
            requested = target,
            sampled = test_rows.len(),
            "fewer eligible edges than requested for the test split"
        );
    }

    let mut test_header = edges.header().to_vec();
    let pred_col = ensure_column(&mut test_header, "predicate");
    let rel_col = ensure_column(&mut test_header, "relation");

    let mut train = Table::new(edges.header().to_vec());
    let mut test = Table::new(test_header.clone());
    for (i, row) in edges.rows().iter().enumerate() {
        if test_rows.contains(&i) {
            let mut promoted = row.clone();
            promoted.resize(test_header.len(), String::new());
            promoted[pred_col] = POSITIVE_EDGE_LABEL.to_string();
            promoted[rel_col] = POSITIVE_EDGE_LABEL.to_string();
            test.push_row(promoted);
        } else {
            train.push_row(row.clone());
        }
    }

    Ok((train, test))
}

/// Index of `name` in the header, appending it when absent
fn ensure_column(header: &mut Vec<String>, name: &str) -> usize {
    match header.iter().position(|h| h == name) {
        Some(i) => i,
        None => {
            header.push(name.to_string());
            header.len() - 1
        }
    }
}
