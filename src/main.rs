//! fraud-ring-engine CLI
//!
//! Run the detection pipeline over a CSV transaction table from the
//! command line.
//!
//! # Usage
//!
//! ```bash
//! fraud-ring-engine transactions.csv
//! ```
//!
//! The CSV must have a header row with columns `transaction_id`,
//! `sender_id`, `receiver_id`, `amount`, `timestamp`. The report is
//! written to stdout as pretty JSON; on failure, an error envelope is
//! written to stderr and the process exits nonzero.

use fraud_ring_engine::core::error::EngineError;
use fraud_ring_engine::graph::cycle_detection::find_cycles;
use fraud_ring_engine::graph::shell_chain::find_shell_chains;
use fraud_ring_engine::graph::smurfing::find_smurfing;
use fraud_ring_engine::graph::transaction_graph::TransactionGraph;
use fraud_ring_engine::graph::velocity::find_velocity;
use fraud_ring_engine::io::csv_loader::load_transactions;
use fraud_ring_engine::report::emitter::{build_report, Report};
use fraud_ring_engine::rings::grouper::group_rings;
use fraud_ring_engine::scoring::scorer::score_accounts;
use std::path::Path;
use std::process;
use std::time::Instant;

fn print_usage() {
    eprintln!(
        r#"fraud-ring-engine — deterministic money-muling and fraud-ring detection

USAGE:
    fraud-ring-engine <INPUT.csv>

The input CSV must have a header row with columns:
    transaction_id, sender_id, receiver_id, amount, timestamp

The report is printed to stdout as JSON. On failure, an error envelope
`{{"error": "<kind>", "message": "<detail>"}}` is printed to stderr and the
process exits with status 1."#
    );
}

fn run(path: &Path) -> Result<Report, EngineError> {
    let transactions = load_transactions(path)?;

    let start = Instant::now();
    let graph = TransactionGraph::build(transactions)?;

    let cycle_findings = find_cycles(&graph);
    let smurfing_findings = find_smurfing(&graph);
    let shell_findings = find_shell_chains(&graph);
    let velocity_findings = find_velocity(&graph);

    let scores = score_accounts(
        &cycle_findings,
        &smurfing_findings,
        &shell_findings,
        &velocity_findings,
    );
    let rings = group_rings(&cycle_findings.cycles, &smurfing_findings.groups, &shell_findings.chains);

    let elapsed = start.elapsed().as_secs_f64();
    Ok(build_report(&graph, &scores, &rings, elapsed))
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() == 2 && matches!(args[1].as_str(), "help" | "--help" | "-h") {
        print_usage();
        return;
    }
    if args.len() != 2 {
        print_usage();
        process::exit(1);
    }

    let path = Path::new(&args[1]);
    match run(path) {
        Ok(report) => {
            println!("{}", serde_json::to_string_pretty(&report).unwrap());
        }
        Err(err) => {
            log::error!("{err}");
            let envelope = serde_json::json!({
                "error": err.kind(),
                "message": err.to_string(),
            });
            eprintln!("{}", serde_json::to_string(&envelope).unwrap());
            process::exit(1);
        }
    }
}
