use crate::core::account::AccountId;
use crate::graph::transaction_graph::TransactionGraph;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};

const VELOCITY_RATIO_THRESHOLD: f64 = 0.85;
const MEAN_DWELL_HOURS_THRESHOLD: f64 = 24.0;

/// Output of the pass-through velocity detector.
#[derive(Debug, Clone, Default)]
pub struct VelocityFindings {
    pub suspicious_accounts: BTreeSet<AccountId>,
    pub labels: BTreeMap<AccountId, Vec<String>>,
}

/// Flag accounts that forward nearly everything they receive, quickly.
///
/// An account qualifies when `total_out / total_in > 0.85` and the mean of
/// every positive `t_out - t_in` delta, taken over the full Cartesian
/// product of its incoming and outgoing edge timestamps, is under 24h.
/// Unlike the cycle, smurfing, and shell-chain detectors, velocity findings
/// do not feed the ring grouper — pass-through behavior marks an account,
/// not a coordinated group.
pub fn find_velocity(graph: &TransactionGraph) -> VelocityFindings {
    let mut suspicious_accounts = BTreeSet::new();
    let mut labels: BTreeMap<AccountId, Vec<String>> = BTreeMap::new();

    for account in graph.vertices() {
        let total_in = graph.total_in(account);
        if total_in == Decimal::ZERO {
            continue;
        }
        let total_out = graph.total_out(account);
        let ratio = decimal_ratio(total_out, total_in);
        if ratio <= VELOCITY_RATIO_THRESHOLD {
            continue;
        }

        let incoming = graph.incoming_by_time(account);
        let outgoing = graph.outgoing_by_time(account);
        if incoming.is_empty() || outgoing.is_empty() {
            continue;
        }

        let mut sum_hours = 0f64;
        let mut count = 0usize;
        for (_, in_edge) in &incoming {
            for (_, out_edge) in &outgoing {
                let delta_hours = (out_edge.timestamp - in_edge.timestamp).num_seconds() as f64 / 3600.0;
                if delta_hours > 0.0 {
                    sum_hours += delta_hours;
                    count += 1;
                }
            }
        }
        if count == 0 {
            continue;
        }
        let mean_hours = sum_hours / count as f64;
        if mean_hours < MEAN_DWELL_HOURS_THRESHOLD {
            suspicious_accounts.insert(account.clone());
            labels
                .entry(account.clone())
                .or_default()
                .push("high_velocity".to_string());
        }
    }

    log::debug!("velocity detector: {} accounts flagged", suspicious_accounts.len());

    VelocityFindings {
        suspicious_accounts,
        labels,
    }
}

fn decimal_ratio(numerator: Decimal, denominator: Decimal) -> f64 {
    (numerator / denominator).to_string().parse::<f64>().unwrap_or(0.0)
}
