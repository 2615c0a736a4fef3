use crate::core::account::AccountId;
use crate::core::error::EngineError;
use crate::core::transaction::Transaction;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// A single aggregated edge `sender -> receiver`.
///
/// Multiple input rows sharing the same `(sender, receiver)` pair collapse
/// into one `Edge`: `amount` is the sum of the component amounts, and
/// `timestamp` is the earliest component timestamp (see data model §3).
#[derive(Debug, Clone)]
pub struct Edge {
    pub amount: Decimal,
    pub timestamp: DateTime<Utc>,
    pub transaction_id: String,
}

/// Per-account stats derived from the original (pre-aggregation) input table,
/// consulted by the merchant and ghost-account predicates.
#[derive(Debug, Clone, Copy)]
struct TableStats {
    record_count: usize,
    first_seen: DateTime<Utc>,
    last_seen: DateTime<Utc>,
}

/// Internal, non-reported bookkeeping populated during graph build and
/// logged at `info` level; never part of the JSON report.
#[derive(Debug, Clone, Copy)]
struct ProcessingStats {
    raw_row_count: usize,
    dropped_self_loop_count: usize,
    pruned_vertex_count: usize,
}

/// The directed transaction multigraph, collapsed per §3, plus the original
/// transaction table it was built from.
///
/// Vertex and adjacency iteration is always lexicographic on account id —
/// every detector that walks this graph inherits that determinism for free.
#[derive(Debug, Clone)]
pub struct TransactionGraph {
    raw_transactions: Vec<Transaction>,
    edges: BTreeMap<(AccountId, AccountId), Edge>,
    vertices: BTreeSet<AccountId>,
    out_neighbors: BTreeMap<AccountId, Vec<AccountId>>,
    in_neighbors: BTreeMap<AccountId, Vec<AccountId>>,
    table_stats: HashMap<AccountId, TableStats>,
}

impl TransactionGraph {
    /// Build the graph from a batch of transactions: aggregate edges, drop
    /// self-loops, then run a single pruning pass removing any vertex with
    /// in-degree 0 or out-degree 0 (not iterated to a fixed point).
    pub fn build(transactions: Vec<Transaction>) -> Result<Self, EngineError> {
        let table_stats = compute_table_stats(&transactions);

        // Aggregate non-self-loop transactions into edges.
        struct Accum {
            amount: Decimal,
            timestamp: DateTime<Utc>,
            transaction_id: String,
        }
        let raw_row_count = transactions.len();
        let mut dropped_self_loop_count = 0usize;
        let mut accum: HashMap<(AccountId, AccountId), Accum> = HashMap::new();
        for txn in &transactions {
            if txn.is_self_loop() {
                dropped_self_loop_count += 1;
                continue;
            }
            let key = (txn.sender_id().clone(), txn.receiver_id().clone());
            match accum.get_mut(&key) {
                None => {
                    accum.insert(
                        key,
                        Accum {
                            amount: txn.amount(),
                            timestamp: txn.timestamp(),
                            transaction_id: txn.transaction_id().to_string(),
                        },
                    );
                }
                Some(existing) => {
                    existing.amount += txn.amount();
                    // Earliest timestamp wins; ties broken by the
                    // lexicographically smaller transaction id so the
                    // aggregate is independent of input row order.
                    if txn.timestamp() < existing.timestamp
                        || (txn.timestamp() == existing.timestamp
                            && txn.transaction_id() < existing.transaction_id.as_str())
                    {
                        existing.timestamp = txn.timestamp();
                        existing.transaction_id = txn.transaction_id().to_string();
                    }
                }
            }
        }

        let mut edges: BTreeMap<(AccountId, AccountId), Edge> = BTreeMap::new();
        let mut vertices: BTreeSet<AccountId> = BTreeSet::new();
        for ((from, to), a) in accum {
            vertices.insert(from.clone());
            vertices.insert(to.clone());
            edges.insert(
                (from, to),
                Edge {
                    amount: a.amount,
                    timestamp: a.timestamp,
                    transaction_id: a.transaction_id,
                },
            );
        }

        // Single pruning pass: drop any vertex with in-degree 0 or
        // out-degree 0, and every edge touching it.
        let mut out_degree: HashMap<AccountId, usize> = HashMap::new();
        let mut in_degree: HashMap<AccountId, usize> = HashMap::new();
        for (from, to) in edges.keys() {
            *out_degree.entry(from.clone()).or_insert(0) += 1;
            *in_degree.entry(to.clone()).or_insert(0) += 1;
        }
        let to_drop: BTreeSet<AccountId> = vertices
            .iter()
            .filter(|v| {
                out_degree.get(*v).copied().unwrap_or(0) == 0
                    || in_degree.get(*v).copied().unwrap_or(0) == 0
            })
            .cloned()
            .collect();

        vertices.retain(|v| !to_drop.contains(v));
        edges.retain(|(from, to), _| !to_drop.contains(from) && !to_drop.contains(to));

        let mut out_neighbors: BTreeMap<AccountId, Vec<AccountId>> = BTreeMap::new();
        let mut in_neighbors: BTreeMap<AccountId, Vec<AccountId>> = BTreeMap::new();
        for v in &vertices {
            out_neighbors.entry(v.clone()).or_default();
            in_neighbors.entry(v.clone()).or_default();
        }
        for (from, to) in edges.keys() {
            out_neighbors.entry(from.clone()).or_default().push(to.clone());
            in_neighbors.entry(to.clone()).or_default().push(from.clone());
        }
        for neighbors in out_neighbors.values_mut() {
            neighbors.sort();
        }
        for neighbors in in_neighbors.values_mut() {
            neighbors.sort();
        }

        let graph = Self {
            raw_transactions: transactions,
            edges,
            vertices,
            out_neighbors,
            in_neighbors,
            table_stats,
        };

        graph.check_invariants()?;

        let stats = ProcessingStats {
            raw_row_count,
            dropped_self_loop_count,
            pruned_vertex_count: to_drop.len(),
        };
        log::info!(
            "graph built: {} raw rows, {} self-loops dropped, {} vertices pruned, {} vertices / {} edges retained",
            stats.raw_row_count,
            stats.dropped_self_loop_count,
            stats.pruned_vertex_count,
            graph.vertices.len(),
            graph.edges.len(),
        );
        Ok(graph)
    }

    /// Sanity-checks that are always supposed to hold regardless of the
    /// single-pass pruning quirk (§4.1): no dangling edge endpoints, and no
    /// self-loop survived aggregation. A violation here means a bug in the
    /// builder, not an artifact of the intentionally-partial prune.
    fn check_invariants(&self) -> Result<(), EngineError> {
        for (from, to) in self.edges.keys() {
            if from == to {
                return Err(EngineError::InternalInvariant(format!(
                    "self-loop edge on '{}' survived aggregation",
                    from
                )));
            }
            if !self.vertices.contains(from) || !self.vertices.contains(to) {
                return Err(EngineError::InternalInvariant(format!(
                    "edge '{}' -> '{}' references a vertex outside the retained set",
                    from, to
                )));
            }
        }
        Ok(())
    }

    pub fn vertices(&self) -> impl Iterator<Item = &AccountId> {
        self.vertices.iter()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn successors(&self, v: &AccountId) -> &[AccountId] {
        self.out_neighbors.get(v).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn predecessors(&self, v: &AccountId) -> &[AccountId] {
        self.in_neighbors.get(v).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn out_degree(&self, v: &AccountId) -> usize {
        self.successors(v).len()
    }

    pub fn in_degree(&self, v: &AccountId) -> usize {
        self.predecessors(v).len()
    }

    pub fn edge(&self, from: &AccountId, to: &AccountId) -> Option<&Edge> {
        self.edges.get(&(from.clone(), to.clone()))
    }

    pub fn total_out(&self, v: &AccountId) -> Decimal {
        self.successors(v)
            .iter()
            .filter_map(|to| self.edge(v, to))
            .map(|e| e.amount)
            .sum()
    }

    pub fn total_in(&self, v: &AccountId) -> Decimal {
        self.predecessors(v)
            .iter()
            .filter_map(|from| self.edge(from, v))
            .map(|e| e.amount)
            .sum()
    }

    /// Incoming edges sorted by timestamp ascending; ties broken by
    /// counterparty id so the order is fully deterministic.
    pub fn incoming_by_time(&self, v: &AccountId) -> Vec<(&AccountId, &Edge)> {
        let mut items: Vec<(&AccountId, &Edge)> = self
            .predecessors(v)
            .iter()
            .filter_map(|from| self.edge(from, v).map(|e| (from, e)))
            .collect();
        items.sort_by(|a, b| a.1.timestamp.cmp(&b.1.timestamp).then(a.0.cmp(b.0)));
        items
    }

    /// Outgoing edges sorted by timestamp ascending; ties broken by
    /// counterparty id.
    pub fn outgoing_by_time(&self, v: &AccountId) -> Vec<(&AccountId, &Edge)> {
        let mut items: Vec<(&AccountId, &Edge)> = self
            .successors(v)
            .iter()
            .filter_map(|to| self.edge(v, to).map(|e| (to, e)))
            .collect();
        items.sort_by(|a, b| a.1.timestamp.cmp(&b.1.timestamp).then(a.0.cmp(b.0)));
        items
    }

    pub fn raw_transactions(&self) -> &[Transaction] {
        &self.raw_transactions
    }

    /// Number of records in the original table where this account appears
    /// as sender or receiver. Used by the ghost-account predicate.
    pub fn record_count(&self, v: &AccountId) -> usize {
        self.table_stats.get(v).map(|s| s.record_count).unwrap_or(0)
    }

    /// Span, in hours, between the earliest and latest record involving this
    /// account in the original table. `None` if the account never appears.
    pub fn activity_span_hours(&self, v: &AccountId) -> Option<f64> {
        self.table_stats.get(v).map(|s| {
            (s.last_seen - s.first_seen).num_seconds() as f64 / 3600.0
        })
    }
}

fn compute_table_stats(transactions: &[Transaction]) -> HashMap<AccountId, TableStats> {
    let mut stats: HashMap<AccountId, TableStats> = HashMap::new();
    for txn in transactions {
        for account in [txn.sender_id(), txn.receiver_id()] {
            stats
                .entry(account.clone())
                .and_modify(|s| {
                    s.record_count += 1;
                    if txn.timestamp() < s.first_seen {
                        s.first_seen = txn.timestamp();
                    }
                    if txn.timestamp() > s.last_seen {
                        s.last_seen = txn.timestamp();
                    }
                })
                .or_insert(TableStats {
                    record_count: 1,
                    first_seen: txn.timestamp(),
                    last_seen: txn.timestamp(),
                });
            if txn.is_self_loop() {
                // sender == receiver; don't double count the same record.
                break;
            }
        }
    }
    stats
}
