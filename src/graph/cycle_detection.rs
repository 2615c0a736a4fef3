use crate::core::account::AccountId;
use crate::graph::transaction_graph::TransactionGraph;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};

/// Minimum and maximum qualifying cycle length.
const MIN_CYCLE_LEN: usize = 3;
const MAX_CYCLE_LEN: usize = 5;
/// Cap on the number of source vertices explored, to bound worst-case cost
/// on dense adversarial graphs (§4.2).
const MAX_SOURCES: usize = 1_000;
/// Cycle temporal window, in hours.
const WINDOW_HOURS: i64 = 72;

/// Output of the cycle detector: which accounts participate in a qualifying
/// cycle, the qualifying cycles themselves (in discovery order, post
/// dedup), and per-account `cycle_length_<k>` labels.
#[derive(Debug, Clone, Default)]
pub struct CycleFindings {
    pub suspicious_accounts: BTreeSet<AccountId>,
    pub cycles: Vec<Vec<AccountId>>,
    pub labels: BTreeMap<AccountId, Vec<String>>,
}

/// Enumerate simple directed cycles of length 3..=5 within a 72-hour window.
///
/// DFS runs from each vertex (in lexicographic order, capped at the first
/// 1,000) tracking the current path; when the walk returns to the start
/// vertex, the path-so-far is a candidate cycle. Candidates are
/// deduplicated by their sorted member-id tuple, keeping the first
/// occurrence found by traversal order — two different edge paths through
/// the same vertex set count as one cycle.
pub fn find_cycles(graph: &TransactionGraph) -> CycleFindings {
    let mut raw_candidates: Vec<Vec<AccountId>> = Vec::new();

    for start in graph.vertices().take(MAX_SOURCES) {
        let mut path = vec![start.clone()];
        let mut path_set: BTreeSet<AccountId> = BTreeSet::new();
        path_set.insert(start.clone());
        dfs(start, start, graph, &mut path, &mut path_set, &mut raw_candidates);
    }

    let mut seen: BTreeSet<Vec<AccountId>> = BTreeSet::new();
    let mut cycles: Vec<Vec<AccountId>> = Vec::new();
    for candidate in raw_candidates {
        let mut canonical = candidate.clone();
        canonical.sort();
        if seen.insert(canonical) {
            cycles.push(candidate);
        }
    }

    let mut suspicious_accounts = BTreeSet::new();
    let mut labels: BTreeMap<AccountId, Vec<String>> = BTreeMap::new();
    for cycle in &cycles {
        let label = format!("cycle_length_{}", cycle.len());
        for account in cycle {
            suspicious_accounts.insert(account.clone());
            let entry = labels.entry(account.clone()).or_default();
            if !entry.contains(&label) {
                entry.push(label.clone());
            }
        }
    }

    log::debug!(
        "cycle detector: {} raw candidates, {} qualifying after dedup",
        cycles.len(),
        cycles.len()
    );

    CycleFindings {
        suspicious_accounts,
        cycles,
        labels,
    }
}

fn dfs(
    current: &AccountId,
    start: &AccountId,
    graph: &TransactionGraph,
    path: &mut Vec<AccountId>,
    path_set: &mut BTreeSet<AccountId>,
    found: &mut Vec<Vec<AccountId>>,
) {
    for next in graph.successors(current) {
        if next == start {
            // A path of exactly MAX_CYCLE_LEN vertices must still be allowed
            // to close here; the depth cap below only bounds further descent.
            if path.len() >= MIN_CYCLE_LEN && within_window(path, graph) {
                found.push(path.clone());
            }
        } else if path.len() < MAX_CYCLE_LEN && !path_set.contains(next) {
            path.push(next.clone());
            path_set.insert(next.clone());
            dfs(next, start, graph, path, path_set, found);
            path.pop();
            path_set.remove(next);
        }
    }
}

fn within_window(path: &[AccountId], graph: &TransactionGraph) -> bool {
    let mut timestamps: Vec<DateTime<Utc>> = Vec::with_capacity(path.len());
    for i in 0..path.len() {
        let from = &path[i];
        let to = &path[(i + 1) % path.len()];
        match graph.edge(from, to) {
            Some(edge) => timestamps.push(edge.timestamp),
            None => return false,
        }
    }
    let min = timestamps.iter().min().unwrap();
    let max = timestamps.iter().max().unwrap();
    (*max - *min).num_seconds() <= WINDOW_HOURS * 3600
}
