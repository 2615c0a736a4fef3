use crate::core::account::AccountId;
use crate::graph::transaction_graph::{Edge, TransactionGraph};
use std::collections::{BTreeMap, BTreeSet};

const DEGREE_FLOOR: usize = 10;
const WINDOW_SIZE: usize = 10;
const WINDOW_HOURS: i64 = 72;
const VELOCITY_RATIO_MIN: f64 = 0.7;
const MERCHANT_SPAN_HOURS: f64 = 30.0 * 24.0;
const MERCHANT_IN_DEGREE: usize = 50;

/// Output of the fan-in/fan-out smurfing detector.
#[derive(Debug, Clone, Default)]
pub struct SmurfingFindings {
    pub suspicious_accounts: BTreeSet<AccountId>,
    /// One group per accepted burst window (pivot + 10 counterparties).
    pub groups: Vec<Vec<AccountId>>,
    pub labels: BTreeMap<AccountId, Vec<String>>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Direction {
    FanIn,
    FanOut,
}

/// Detect fan-in and fan-out smurfing bursts around every pivot account.
pub fn find_smurfing(graph: &TransactionGraph) -> SmurfingFindings {
    let mut findings = SmurfingFindings::default();
    detect_direction(graph, Direction::FanIn, &mut findings);
    detect_direction(graph, Direction::FanOut, &mut findings);
    findings
}

fn detect_direction(graph: &TransactionGraph, direction: Direction, findings: &mut SmurfingFindings) {
    let mut accepted = 0usize;
    for pivot in graph.vertices() {
        if direction == Direction::FanIn && is_merchant(graph, pivot) {
            continue;
        }

        let degree = match direction {
            Direction::FanIn => graph.in_degree(pivot),
            Direction::FanOut => graph.out_degree(pivot),
        };
        if degree < DEGREE_FLOOR {
            continue;
        }

        let edges: Vec<(&AccountId, &Edge)> = match direction {
            Direction::FanIn => graph.incoming_by_time(pivot),
            Direction::FanOut => graph.outgoing_by_time(pivot),
        };
        if edges.len() < WINDOW_SIZE {
            continue;
        }

        let window = first_accepted_window(&edges);
        let Some(window) = window else { continue };

        let total_in = graph.total_in(pivot);
        let total_out = graph.total_out(pivot);
        if total_in == rust_decimal::Decimal::ZERO {
            continue;
        }
        let ratio = (total_out / total_in)
            .to_string()
            .parse::<f64>()
            .unwrap_or(0.0);
        if ratio < VELOCITY_RATIO_MIN {
            continue;
        }

        let counterparties: Vec<AccountId> = window.iter().map(|(acc, _)| (*acc).clone()).collect();

        let (pivot_label, participant_label) = match direction {
            Direction::FanIn => (
                format!("fan_in_{}_senders", WINDOW_SIZE),
                "fan_in_participant".to_string(),
            ),
            Direction::FanOut => (
                format!("fan_out_{}_receivers", WINDOW_SIZE),
                "fan_out_participant".to_string(),
            ),
        };

        push_label(findings, pivot, pivot_label);
        findings.suspicious_accounts.insert(pivot.clone());

        let mut group = vec![pivot.clone()];
        for counterparty in &counterparties {
            push_label(findings, counterparty, participant_label.clone());
            findings.suspicious_accounts.insert(counterparty.clone());
            group.push(counterparty.clone());
        }
        findings.groups.push(group);
        accepted += 1;
    }
    log::debug!(
        "smurfing detector ({}): {} pivots accepted",
        if matches!(direction, Direction::FanIn) { "fan-in" } else { "fan-out" },
        accepted
    );
}

fn push_label(findings: &mut SmurfingFindings, account: &AccountId, label: String) {
    let entry = findings.labels.entry(account.clone()).or_default();
    if !entry.contains(&label) {
        entry.push(label);
    }
}

/// First window of exactly `WINDOW_SIZE` consecutive (by timestamp) edges
/// whose span is within `WINDOW_HOURS`.
fn first_accepted_window<'a>(
    edges: &'a [(&'a AccountId, &'a Edge)],
) -> Option<&'a [(&'a AccountId, &'a Edge)]> {
    if edges.len() < WINDOW_SIZE {
        return None;
    }
    for start in 0..=(edges.len() - WINDOW_SIZE) {
        let window = &edges[start..start + WINDOW_SIZE];
        let first_ts = window.first().unwrap().1.timestamp;
        let last_ts = window.last().unwrap().1.timestamp;
        if (last_ts - first_ts).num_seconds() <= WINDOW_HOURS * 3600 {
            return Some(window);
        }
    }
    None
}

fn is_merchant(graph: &TransactionGraph, account: &AccountId) -> bool {
    let span_ok = graph
        .activity_span_hours(account)
        .map(|h| h >= MERCHANT_SPAN_HOURS)
        .unwrap_or(false);
    span_ok && graph.in_degree(account) > MERCHANT_IN_DEGREE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transaction::Transaction;
    use chrono::{DateTime, Duration, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn base_time() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn txn(id: &str, from: &str, to: &str, amount: Decimal, hours: i64) -> Transaction {
        Transaction::new(
            id,
            AccountId::new(from),
            AccountId::new(to),
            amount,
            base_time() + Duration::hours(hours),
        )
    }

    #[test]
    fn test_fan_in_burst() {
        let mut txns = Vec::new();
        for i in 0..10 {
            txns.push(txn(
                &format!("IN{i}"),
                &format!("S{i}"),
                "P",
                dec!(1_000),
                i as i64,
            ));
        }
        txns.push(txn("OUT1", "P", "Q", dec!(8_000), 20));
        let graph = TransactionGraph::build(txns).unwrap();
        let findings = find_smurfing(&graph);

        assert_eq!(findings.groups.len(), 1);
        let p = AccountId::new("P");
        assert!(findings.suspicious_accounts.contains(&p));
        assert_eq!(findings.labels[&p], vec!["fan_in_10_senders".to_string()]);
        assert_eq!(findings.groups[0].len(), 11);
    }

    #[test]
    fn test_fan_in_rejected_low_velocity_ratio() {
        let mut txns = Vec::new();
        for i in 0..10 {
            txns.push(txn(
                &format!("IN{i}"),
                &format!("S{i}"),
                "P",
                dec!(1_000),
                i as i64,
            ));
        }
        // Forwards far less than 0.7 of inflow.
        txns.push(txn("OUT1", "P", "Q", dec!(100), 20));
        let graph = TransactionGraph::build(txns).unwrap();
        let findings = find_smurfing(&graph);
        assert!(findings.groups.is_empty());
    }

    #[test]
    fn test_merchant_excluded_from_fan_in() {
        let mut txns = Vec::new();
        // 60 distinct senders spread over 45 days (merchant).
        for i in 0..60 {
            txns.push(txn(
                &format!("IN{i}"),
                &format!("S{i}"),
                "M",
                dec!(1_000),
                (i as i64) * 18, // spread roughly 45 days across 60 txns
            ));
        }
        txns.push(txn("OUT1", "M", "Q", dec!(50_000), 2000));
        let graph = TransactionGraph::build(txns).unwrap();
        let findings = find_smurfing(&graph);
        let m = AccountId::new("M");
        assert!(!findings.suspicious_accounts.contains(&m));
    }

    #[test]
    fn test_fan_out_burst() {
        let mut txns = Vec::new();
        txns.push(txn("IN1", "X", "P", dec!(12_000), 0));
        for i in 0..10 {
            txns.push(txn(
                &format!("OUT{i}"),
                "P",
                &format!("R{i}"),
                dec!(1_000),
                10 + i as i64,
            ));
        }
        let graph = TransactionGraph::build(txns).unwrap();
        let findings = find_smurfing(&graph);
        let p = AccountId::new("P");
        assert!(findings.suspicious_accounts.contains(&p));
        assert_eq!(findings.labels[&p], vec!["fan_out_10_receivers".to_string()]);
    }
}
