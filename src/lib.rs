//! # fraud-ring-engine
//!
//! Deterministic money-muling and fraud-ring detection engine for batch
//! transaction tables.
//!
//! Given a directed graph of transactions between accounts, this engine
//! enumerates four independent laundering patterns — payment cycles,
//! fan-in/fan-out smurfing bursts, ghost-account shell chains, and
//! fast pass-through velocity — scores every account they touch, and
//! merges overlapping detections into coordinated fraud rings.
//!
//! ## Architecture
//!
//! - **core** — Foundational types: accounts, transactions, the engine error
//! - **graph** — Transaction graph and the four pattern detectors
//! - **rings** — Union-find merge of detector output into fraud rings
//! - **scoring** — Per-account and per-ring risk scoring
//! - **report** — The deterministic JSON report
//! - **io** — CSV ingestion

pub mod core;
pub mod graph;
pub mod io;
pub mod report;
pub mod rings;
pub mod scoring;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::core::account::AccountId;
    pub use crate::core::error::EngineError;
    pub use crate::core::transaction::Transaction;
    pub use crate::graph::transaction_graph::TransactionGraph;
    pub use crate::report::emitter::Report;
}
