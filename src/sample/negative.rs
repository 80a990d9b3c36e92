//! Random non-edge generation

use super::{unordered_pair, SampleResult};
use crate::table::Table;
use rand::Rng;
use std::collections::{BTreeSet, HashSet};
use tracing::warn;

/// Draws per round, as a multiple of the still-needed pair count
const OVERSAMPLE_FACTOR: usize = 2;

/// Retry budget before accepting a short result on dense graphs
const MAX_ROUNDS: usize = 5;

/// Generate up to `count` random node pairs that are not edges in the graph.
///
/// The candidate universe is every id in the node table plus every edge
/// endpoint, sorted so the draw sequence depends only on the seed and not on
/// hash order. Each round draws [`OVERSAMPLE_FACTOR`]× the remaining need and
/// rejects pairs that are reflexive, duplicate another accepted pair (as
/// unordered pairs), or coincide with an existing edge — checked against the
/// full edge table, so no negative is a positive in either direction.
///
/// A small, dense graph can have fewer possible negatives than requested;
/// once the retry budget is exhausted the survivors are returned with a
/// warning, never an error.
///
/// The output carries the minimal edge schema: `subject`, `predicate`,
/// `object`, `relation`, with `predicate`/`relation` set to the supplied
/// constants.
pub fn make_negative_edges(
    nodes: &Table,
    edges: &Table,
    count: usize,
    edge_label: &str,
    relation: &str,
    rng: &mut impl Rng,
) -> SampleResult<Table> {
    let id_col = nodes.require_column("id", "node")?;
    let subj_col = edges.require_column("subject", "edge")?;
    let obj_col = edges.require_column("object", "edge")?;

    let mut universe: BTreeSet<&str> = nodes.rows().iter().map(|r| r[id_col].as_str()).collect();
    for row in edges.rows() {
        universe.insert(row[subj_col].as_str());
        universe.insert(row[obj_col].as_str());
    }
    let ids: Vec<&str> = universe.into_iter().collect();

    let positives: HashSet<(String, String)> = edges
        .rows()
        .iter()
        .map(|r| unordered_pair(&r[subj_col], &r[obj_col]))
        .collect();

    let mut out = Table::new(vec![
        "subject".to_string(),
        "predicate".to_string(),
        "object".to_string(),
        "relation".to_string(),
    ]);

    if ids.len() < 2 {
        warn!(
            requested = count,
            sampled = 0usize,
            "not enough distinct node ids to sample negative edges"
        );
        return Ok(out);
    }

    let mut seen: HashSet<(String, String)> = HashSet::new();
    'rounds: for _ in 0..MAX_ROUNDS {
        let need = count - out.len();
        if need == 0 {
            break;
        }
        for _ in 0..need * OVERSAMPLE_FACTOR {
            let subject = ids[rng.gen_range(0..ids.len())];
            let object = ids[rng.gen_range(0..ids.len())];
            if subject == object {
                continue;
            }
            let key = unordered_pair(subject, object);
            if positives.contains(&key) || !seen.insert(key) {
                continue;
            }
            out.push_row(vec![
                subject.to_string(),
                edge_label.to_string(),
                object.to_string(),
                relation.to_string(),
            ]);
            if out.len() == count {
                break 'rounds;
            }
        }
    }

    if out.len() < count {
        warn!(
            requested = count,
            sampled = out.len(),
            "exhausted retry budget before reaching the requested negative edge count"
        );
    }

    Ok(out)
}
