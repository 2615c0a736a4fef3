use crate::core::account::AccountId;
use crate::graph::cycle_detection::CycleFindings;
use crate::graph::shell_chain::ShellChainFindings;
use crate::graph::smurfing::SmurfingFindings;
use crate::graph::velocity::VelocityFindings;
use crate::rings::grouper::Ring;
use std::collections::BTreeMap;

const CYCLE_POINTS: u32 = 40;
const FAN_POINTS: u32 = 40;
const SHELL_POINTS: u32 = 30;
const VELOCITY_POINTS: u32 = 30;
const SCORE_CAP: u32 = 100;
/// An account is reported individually only once its score clears this bar.
const EMISSION_THRESHOLD: u32 = 50;

/// An account's combined risk score and the pattern labels behind it.
#[derive(Debug, Clone)]
pub struct ScoredAccount {
    pub account: AccountId,
    pub score: u32,
    pub labels: Vec<String>,
}

/// Combine per-detector labels into one risk score per account.
///
/// Points are awarded per category present in an account's label set, not
/// per label: an account with two different `cycle_length_*` labels still
/// only earns the 40 cycle points once. Categories are matched by
/// substring — `cycle`, `fan_in`/`fan_out`, `shell`, `velocity` — worth 40,
/// 40, 30, and 30 points respectively, summed and capped at 100.
pub fn score_accounts(
    cycle: &CycleFindings,
    smurfing: &SmurfingFindings,
    shell: &ShellChainFindings,
    velocity: &VelocityFindings,
) -> BTreeMap<AccountId, ScoredAccount> {
    let mut labels_by_account: BTreeMap<AccountId, Vec<String>> = BTreeMap::new();

    for (account, labels) in [
        &cycle.labels,
        &smurfing.labels,
        &shell.labels,
        &velocity.labels,
    ]
    .into_iter()
    .flatten()
    {
        let entry = labels_by_account.entry(account.clone()).or_default();
        for label in labels {
            if !entry.contains(label) {
                entry.push(label.clone());
            }
        }
    }

    labels_by_account
        .into_iter()
        .map(|(account, labels)| {
            let score = category_points(&labels);
            (
                account.clone(),
                ScoredAccount {
                    account,
                    score,
                    labels,
                },
            )
        })
        .collect()
}

fn category_points(labels: &[String]) -> u32 {
    let has = |needle: &str| labels.iter().any(|l| l.contains(needle));
    let mut score = 0u32;
    if has("cycle") {
        score += CYCLE_POINTS;
    }
    if has("fan_in") || has("fan_out") {
        score += FAN_POINTS;
    }
    if has("shell") {
        score += SHELL_POINTS;
    }
    if has("velocity") {
        score += VELOCITY_POINTS;
    }
    score.min(SCORE_CAP)
}

/// Accounts clearing the emission threshold, sorted by score descending
/// then account id ascending.
pub fn emitted_accounts(scores: &BTreeMap<AccountId, ScoredAccount>) -> Vec<&ScoredAccount> {
    let mut emitted: Vec<&ScoredAccount> = scores
        .values()
        .filter(|s| s.score > EMISSION_THRESHOLD)
        .collect();
    emitted.sort_by(|a, b| b.score.cmp(&a.score).then(a.account.cmp(&b.account)));
    emitted
}

/// A ring's risk score, the mean of all member scores (including members
/// that don't individually clear the emission threshold), rounded to one
/// decimal place.
pub fn ring_risk_score(ring: &Ring, scores: &BTreeMap<AccountId, ScoredAccount>) -> f64 {
    if ring.members.is_empty() {
        return 0.0;
    }
    let total: u32 = ring
        .members
        .iter()
        .map(|m| scores.get(m).map(|s| s.score).unwrap_or(0))
        .sum();
    let mean = total as f64 / ring.members.len() as f64;
    (mean * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acc(s: &str) -> AccountId {
        AccountId::new(s)
    }

    fn findings_with(labels: Vec<(AccountId, Vec<&str>)>) -> CycleFindings {
        let mut f = CycleFindings::default();
        for (account, ls) in labels {
            f.suspicious_accounts.insert(account.clone());
            f.labels
                .insert(account, ls.into_iter().map(String::from).collect());
        }
        f
    }

    #[test]
    fn test_cycle_plus_shell_caps_at_one_hundred() {
        let cycle = findings_with(vec![(acc("A"), vec!["cycle_length_3"])]);
        let mut shell = ShellChainFindings::default();
        shell.suspicious_accounts.insert(acc("A"));
        shell.labels.insert(acc("A"), vec!["shell_hop_4".to_string()]);
        let smurfing = SmurfingFindings::default();
        let velocity_labels = {
            let mut v = VelocityFindings::default();
            v.suspicious_accounts.insert(acc("A"));
            v.labels.insert(acc("A"), vec!["high_velocity".to_string()]);
            v
        };
        let scores = score_accounts(&cycle, &smurfing, &shell, &velocity_labels);
        // 40 + 30 + 30 = 100, exactly at the cap.
        assert_eq!(scores[&acc("A")].score, 100);
    }

    #[test]
    fn test_duplicate_cycle_labels_only_counted_once() {
        let mut cycle = CycleFindings::default();
        cycle.suspicious_accounts.insert(acc("A"));
        cycle.labels.insert(
            acc("A"),
            vec!["cycle_length_3".to_string(), "cycle_length_4".to_string()],
        );
        let scores = score_accounts(
            &cycle,
            &SmurfingFindings::default(),
            &ShellChainFindings::default(),
            &VelocityFindings::default(),
        );
        assert_eq!(scores[&acc("A")].score, 40);
    }

    #[test]
    fn test_emission_threshold_excludes_low_scores() {
        let cycle = findings_with(vec![(acc("A"), vec!["shell_hop_3"])]);
        let scores = score_accounts(
            &cycle,
            &SmurfingFindings::default(),
            &ShellChainFindings::default(),
            &VelocityFindings::default(),
        );
        // "shell_hop_3" contains "shell" -> 30 points, below threshold.
        assert_eq!(scores[&acc("A")].score, 30);
        assert!(emitted_accounts(&scores).is_empty());
    }

    #[test]
    fn test_ring_risk_score_includes_non_emitted_members() {
        let cycle = findings_with(vec![
            (acc("A"), vec!["cycle_length_3"]),
            (acc("B"), vec!["cycle_length_3"]),
        ]);
        let scores = score_accounts(
            &cycle,
            &SmurfingFindings::default(),
            &ShellChainFindings::default(),
            &VelocityFindings::default(),
        );
        let ring = Ring {
            id: "RING_001".to_string(),
            members: vec![acc("A"), acc("B"), acc("C")], // C has no score at all
            pattern: "cycle",
        };
        // (40 + 40 + 0) / 3 = 26.666... -> 26.7
        assert_eq!(ring_risk_score(&ring, &scores), 26.7);
    }
}
