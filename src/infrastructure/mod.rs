//! Adapters backing the domain ports: in-process cache and lock services,
//! an in-memory ledger for tests and single runs, and an optional RocksDB
//! ledger behind the `storage-rocksdb` feature.

pub mod cache;
pub mod in_memory;
pub mod lock;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
