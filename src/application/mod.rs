//! Application layer containing the core business logic orchestration.
//!
//! This module defines the `BalanceCoordinator`, which serializes concurrent
//! balance reservations per coupon, and the `ExpiryBatchProcessor`, which runs
//! the nightly sweep retiring coupons past their expiry date. Both are wired
//! to storage through the ports in the domain layer.

pub mod coordinator;
pub mod expiry;
pub mod joblog;
pub mod stats;
