//! Domain layer: entities, value objects and the ports the application
//! layer is wired through.

pub mod coupon;
pub mod expiry;
pub mod joblog;
pub mod keys;
pub mod ports;
