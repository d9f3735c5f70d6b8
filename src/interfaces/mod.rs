//! Outer interfaces: CSV ingestion of ledger seeds and CSV reporting of the
//! final ledger state.

pub mod csv;
