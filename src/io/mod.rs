//! Input adapters.

pub mod csv_loader;
