//! Movement Ledger
//!
//! Append-only record of every stock change. Rows are only ever inserted; there is no
//! update or delete path.

pub mod records;
pub(crate) mod repository;

pub use records::*;
