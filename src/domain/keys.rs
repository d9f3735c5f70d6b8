//! Cache and lock key scheme shared with the wider payment platform.
//!
//! Every key carries the `benefit:pay:` namespace so coupon entries can
//! coexist with other services on a shared cache cluster.

use crate::error::{CouponError, Result};

pub const NAMESPACE: &str = "benefit:pay:";
pub const BALANCE_PREFIX: &str = "coupon:balance:";
pub const LOCK_PREFIX: &str = "coupon:lock:";

/// Key under which a coupon's spendable balance is cached.
pub fn balance_key(coupon_id: &str) -> String {
    format!("{NAMESPACE}{BALANCE_PREFIX}{coupon_id}")
}

/// Key of the mutual-exclusion lock guarding a coupon's cached balance.
pub fn lock_key(coupon_id: &str) -> String {
    format!("{NAMESPACE}{LOCK_PREFIX}{coupon_id}")
}

/// Glob pattern matching every cached balance key.
pub fn balance_pattern() -> String {
    format!("{NAMESPACE}{BALANCE_PREFIX}*")
}

/// Recovers the coupon id from a balance key, if the key follows the scheme.
pub fn coupon_id_from_balance_key(key: &str) -> Option<&str> {
    key.strip_prefix(NAMESPACE)?.strip_prefix(BALANCE_PREFIX)
}

/// Rejects ids that would produce ambiguous or unusable keys.
pub fn validate_coupon_id(coupon_id: &str) -> Result<()> {
    if coupon_id.is_empty() {
        return Err(CouponError::ValidationError(
            "coupon id must not be empty".to_string(),
        ));
    }
    if coupon_id.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(CouponError::ValidationError(format!(
            "coupon id contains whitespace or control characters: {coupon_id:?}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balance_key_layout() {
        assert_eq!(balance_key("CPN1"), "benefit:pay:coupon:balance:CPN1");
    }

    #[test]
    fn test_lock_key_layout() {
        assert_eq!(lock_key("CPN1"), "benefit:pay:coupon:lock:CPN1");
    }

    #[test]
    fn test_balance_pattern_matches_prefix() {
        let pattern = balance_pattern();
        assert!(pattern.ends_with('*'));
        assert!(balance_key("X").starts_with(pattern.trim_end_matches('*')));
    }

    #[test]
    fn test_coupon_id_roundtrip() {
        let key = balance_key("CPN42");
        assert_eq!(coupon_id_from_balance_key(&key), Some("CPN42"));
    }

    #[test]
    fn test_coupon_id_from_foreign_key() {
        assert_eq!(coupon_id_from_balance_key("other:key"), None);
        assert_eq!(coupon_id_from_balance_key(&lock_key("CPN1")), None);
    }

    #[test]
    fn test_validate_rejects_bad_ids() {
        assert!(validate_coupon_id("CPN1").is_ok());
        assert!(validate_coupon_id("").is_err());
        assert!(validate_coupon_id("CPN 1").is_err());
        assert!(validate_coupon_id("CPN\n1").is_err());
    }
}
