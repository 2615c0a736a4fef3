use chrono::{DateTime, Duration, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fraud_ring_engine::core::account::AccountId;
use fraud_ring_engine::core::transaction::Transaction;
use fraud_ring_engine::graph::cycle_detection::find_cycles;
use fraud_ring_engine::graph::shell_chain::find_shell_chains;
use fraud_ring_engine::graph::smurfing::find_smurfing;
use fraud_ring_engine::graph::transaction_graph::TransactionGraph;
use fraud_ring_engine::graph::velocity::find_velocity;
use rust_decimal::Decimal;

fn base_time() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

/// Deterministic synthetic transaction batch: each account sends to a few
/// others chosen by a fixed stride, so the graph has cycles, fan-in/out
/// hubs, and chains without needing a random number generator.
fn synthetic_transactions(account_count: usize, edges_per_account: usize) -> Vec<Transaction> {
    let mut transactions = Vec::with_capacity(account_count * edges_per_account);
    let mut id = 0usize;
    for i in 0..account_count {
        for k in 0..edges_per_account {
            let target = (i * 7 + k * 13 + 1) % account_count;
            if target == i {
                continue;
            }
            let amount = Decimal::from(1_000 + (i * 37 + k) % 5_000);
            let timestamp = base_time() + Duration::hours((id % 200) as i64);
            transactions.push(Transaction::new(
                format!("T{id}"),
                AccountId::new(format!("ACC{i}")),
                AccountId::new(format!("ACC{target}")),
                amount,
                timestamp,
            ));
            id += 1;
        }
    }
    transactions
}

fn bench_full_pipeline(c: &mut Criterion, name: &str, account_count: usize, edges_per_account: usize) {
    let transactions = synthetic_transactions(account_count, edges_per_account);
    let graph = TransactionGraph::build(transactions).unwrap();

    c.bench_function(name, |b| {
        b.iter(|| {
            let g = black_box(&graph);
            let cycle = find_cycles(g);
            let smurfing = find_smurfing(g);
            let shell = find_shell_chains(g);
            let velocity = find_velocity(g);
            black_box((cycle, smurfing, shell, velocity))
        })
    });
}

fn bench_detection_100_accounts(c: &mut Criterion) {
    bench_full_pipeline(c, "detection_100_accounts", 100, 5);
}

fn bench_detection_1000_accounts(c: &mut Criterion) {
    bench_full_pipeline(c, "detection_1000_accounts", 1_000, 5);
}

fn bench_detection_5000_accounts(c: &mut Criterion) {
    bench_full_pipeline(c, "detection_5000_accounts", 5_000, 4);
}

fn bench_graph_build_1000_accounts(c: &mut Criterion) {
    let transactions = synthetic_transactions(1_000, 5);
    c.bench_function("graph_build_1000_accounts", |b| {
        b.iter(|| TransactionGraph::build(black_box(transactions.clone())).unwrap())
    });
}

criterion_group!(
    benches,
    bench_detection_100_accounts,
    bench_detection_1000_accounts,
    bench_detection_5000_accounts,
    bench_graph_build_1000_accounts
);
criterion_main!(benches);
