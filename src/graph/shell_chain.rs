use crate::core::account::AccountId;
use crate::graph::transaction_graph::TransactionGraph;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};

/// Maximum number of edges (hops) explored past a source.
const MAX_DEPTH: usize = 6;
/// Total chain span, start to end, in hours.
const WINDOW_HOURS: i64 = 72;
/// Maximum "intermediate velocity" — time between a vertex's earliest
/// inbound and earliest outbound record — before a hop is rejected.
const DWELL_HOURS: i64 = 24;
/// An account with this many or fewer records in the original table is a
/// ghost and may serve as an intermediate layering hop.
const GHOST_MAX_RECORDS: usize = 3;
/// Candidate sources are capped to bound worst-case cost on dense graphs.
const MAX_SOURCES: usize = 500;
const MIN_SOURCE_OUT_DEGREE: usize = 1;
const MAX_SOURCE_OUT_DEGREE: usize = 5;

/// Output of the shell-chain (layering) detector.
#[derive(Debug, Clone, Default)]
pub struct ShellChainFindings {
    pub suspicious_accounts: BTreeSet<AccountId>,
    pub chains: Vec<Vec<AccountId>>,
    pub labels: BTreeMap<AccountId, Vec<String>>,
}

/// Enumerate amount-decaying chains of ghost intermediates.
///
/// Walks forward from every low-degree source (out-degree 1..=5, capped at
/// the first 500 in lexicographic order). Descending from `v` to a neighbor
/// `w` requires: `w` isn't already on the path, the edge amount is
/// strictly smaller than the edge before it, and — once the path already
/// has two or more vertices — `v`'s "intermediate velocity" (its earliest
/// outbound record minus its earliest inbound record, clamped to zero) is
/// at most 24h. Every path of length 3 or more is checked as a candidate
/// as soon as it's built: its total span must be within 72h and every
/// vertex strictly between the first and last must be a ghost account (at
/// most 3 records in the original table). A vertex can be explored as a
/// stepping stone even if it turns out not to be a ghost — only whether
/// it ends up an *intermediate* in an accepted candidate matters.
/// Recursion continues past an accepted candidate, since a longer
/// extension of it may also qualify.
pub fn find_shell_chains(graph: &TransactionGraph) -> ShellChainFindings {
    let mut chains: Vec<Vec<AccountId>> = Vec::new();

    let sources: Vec<&AccountId> = graph
        .vertices()
        .filter(|v| {
            let od = graph.out_degree(v);
            od >= MIN_SOURCE_OUT_DEGREE && od <= MAX_SOURCE_OUT_DEGREE
        })
        .take(MAX_SOURCES)
        .collect();

    for source in sources {
        let mut path = vec![source.clone()];
        let mut amounts: Vec<Decimal> = Vec::new();
        let mut timestamps: Vec<DateTime<Utc>> = Vec::new();
        dfs(source, graph, &mut path, &mut amounts, &mut timestamps, &mut chains);
    }

    let mut suspicious_accounts = BTreeSet::new();
    let mut labels: BTreeMap<AccountId, Vec<String>> = BTreeMap::new();
    for chain in &chains {
        let label = format!("shell_hop_{}", chain.len());
        for account in chain {
            suspicious_accounts.insert(account.clone());
            let entry = labels.entry(account.clone()).or_default();
            if !entry.contains(&label) {
                entry.push(label.clone());
            }
        }
    }

    log::debug!("shell-chain detector: {} qualifying chains", chains.len());

    ShellChainFindings {
        suspicious_accounts,
        chains,
        labels,
    }
}

fn is_ghost(graph: &TransactionGraph, account: &AccountId) -> bool {
    graph.record_count(account) <= GHOST_MAX_RECORDS
}

/// Earliest outbound record minus earliest inbound record for `v`, in
/// hours, clamped to zero when outbound precedes inbound. `None` if `v`
/// has no recorded inbound or outbound edge.
fn intermediate_velocity_hours(graph: &TransactionGraph, v: &AccountId) -> Option<f64> {
    let earliest_out = graph.outgoing_by_time(v).first().map(|(_, e)| e.timestamp)?;
    let earliest_in = graph.incoming_by_time(v).first().map(|(_, e)| e.timestamp)?;
    let hours = (earliest_out - earliest_in).num_seconds() as f64 / 3600.0;
    Some(hours.max(0.0))
}

fn try_record_candidate(
    path: &[AccountId],
    timestamps: &[DateTime<Utc>],
    graph: &TransactionGraph,
    found: &mut Vec<Vec<AccountId>>,
) {
    if path.len() < 3 {
        return;
    }
    let min_ts = timestamps.iter().min().unwrap();
    let max_ts = timestamps.iter().max().unwrap();
    if (*max_ts - *min_ts).num_seconds() > WINDOW_HOURS * 3600 {
        return;
    }
    let intermediates = &path[1..path.len() - 1];
    if intermediates.iter().all(|v| is_ghost(graph, v)) {
        found.push(path.to_vec());
    }
}

fn dfs(
    current: &AccountId,
    graph: &TransactionGraph,
    path: &mut Vec<AccountId>,
    amounts: &mut Vec<Decimal>,
    timestamps: &mut Vec<DateTime<Utc>>,
    found: &mut Vec<Vec<AccountId>>,
) {
    try_record_candidate(path, timestamps, graph, found);

    if amounts.len() >= MAX_DEPTH {
        return;
    }

    for next in graph.successors(current) {
        if path.contains(next) {
            continue;
        }
        let Some(edge) = graph.edge(current, next) else {
            continue;
        };
        if let Some(&last_amount) = amounts.last() {
            if edge.amount >= last_amount {
                continue;
            }
        }
        if path.len() >= 2 {
            match intermediate_velocity_hours(graph, current) {
                Some(hours) if hours <= DWELL_HOURS as f64 => {}
                _ => continue,
            }
        }

        path.push(next.clone());
        amounts.push(edge.amount);
        timestamps.push(edge.timestamp);

        dfs(next, graph, path, amounts, timestamps, found);

        path.pop();
        amounts.pop();
        timestamps.pop();
    }
}
