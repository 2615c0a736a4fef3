use crate::core::account::AccountId;
use crate::graph::transaction_graph::TransactionGraph;
use crate::rings::grouper::Ring;
use crate::scoring::scorer::{emitted_accounts, ring_risk_score, ScoredAccount};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize)]
pub struct SuspiciousAccountReport {
    pub account_id: String,
    pub suspicion_score: f64,
    pub detected_patterns: Vec<String>,
    pub ring_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FraudRingReport {
    pub ring_id: String,
    pub member_accounts: Vec<String>,
    pub pattern_type: String,
    pub risk_score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub total_accounts_analyzed: usize,
    pub suspicious_accounts_flagged: usize,
    pub fraud_rings_detected: usize,
    pub processing_time_seconds: f64,
}

/// The engine's final, deterministic output. Every field is reproducible
/// run to run for the same input, with the sole exception of
/// `summary.processing_time_seconds`.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub suspicious_accounts: Vec<SuspiciousAccountReport>,
    pub fraud_rings: Vec<FraudRingReport>,
    pub summary: Summary,
}

/// Assemble the final report from detector output, scores, and rings.
pub fn build_report(
    graph: &TransactionGraph,
    scores: &BTreeMap<AccountId, ScoredAccount>,
    rings: &[Ring],
    processing_time_seconds: f64,
) -> Report {
    let mut ring_of_account: BTreeMap<AccountId, String> = BTreeMap::new();
    for ring in rings {
        for member in &ring.members {
            ring_of_account.insert(member.clone(), ring.id.clone());
        }
    }

    let suspicious_accounts: Vec<SuspiciousAccountReport> = emitted_accounts(scores)
        .into_iter()
        .map(|s| SuspiciousAccountReport {
            account_id: s.account.as_str().to_string(),
            suspicion_score: s.score as f64,
            detected_patterns: s.labels.clone(),
            ring_id: ring_of_account.get(&s.account).cloned().unwrap_or_default(),
        })
        .collect();

    let fraud_rings: Vec<FraudRingReport> = rings
        .iter()
        .map(|ring| FraudRingReport {
            ring_id: ring.id.clone(),
            member_accounts: ring.members.iter().map(|m| m.as_str().to_string()).collect(),
            pattern_type: ring.pattern.to_string(),
            risk_score: ring_risk_score(ring, scores),
        })
        .collect();

    let summary = Summary {
        total_accounts_analyzed: graph.vertex_count(),
        suspicious_accounts_flagged: suspicious_accounts.len(),
        fraud_rings_detected: fraud_rings.len(),
        processing_time_seconds,
    };

    Report {
        suspicious_accounts,
        fraud_rings,
        summary,
    }
}
