//! Risk scoring for individual accounts and merged rings.

pub mod scorer;
