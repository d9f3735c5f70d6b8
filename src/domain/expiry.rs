use crate::domain::coupon::Balance;
use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt;

/// How many individual error messages a detailed summary prints.
const MAX_DETAILED_ERRORS: usize = 5;

/// Outcome of one expiry batch run.
///
/// The total count is always the sum of successes and failures; the struct
/// can only be built through [`ExpiryResult::new`] and [`ExpiryResult::empty`]
/// so that invariant holds by construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpiryResult {
    total_count: usize,
    success_count: usize,
    error_count: usize,
    total_expired_amount: Balance,
    error_messages: Vec<String>,
    processed_at: DateTime<Utc>,
}

impl ExpiryResult {
    /// Result of a run that found nothing to expire.
    pub fn empty() -> Self {
        Self::new(0, 0, Balance::ZERO, Vec::new())
    }

    pub fn new(
        success_count: usize,
        error_count: usize,
        total_expired_amount: Balance,
        error_messages: Vec<String>,
    ) -> Self {
        Self {
            total_count: success_count + error_count,
            success_count,
            error_count,
            total_expired_amount,
            error_messages,
            processed_at: Utc::now(),
        }
    }

    pub fn total_count(&self) -> usize {
        self.total_count
    }

    pub fn success_count(&self) -> usize {
        self.success_count
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn total_expired_amount(&self) -> Balance {
        self.total_expired_amount
    }

    pub fn error_messages(&self) -> &[String] {
        &self.error_messages
    }

    pub fn processed_at(&self) -> DateTime<Utc> {
        self.processed_at
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn has_processed_items(&self) -> bool {
        self.total_count > 0
    }

    pub fn is_complete_success(&self) -> bool {
        self.total_count > 0 && self.error_count == 0
    }

    /// Share of items that expired successfully, as a percentage.
    pub fn success_rate(&self) -> f64 {
        if self.total_count == 0 {
            return 0.0;
        }
        self.success_count as f64 / self.total_count as f64 * 100.0
    }

    /// Share of items that failed, as a percentage.
    pub fn error_rate(&self) -> f64 {
        if self.total_count == 0 {
            return 0.0;
        }
        self.error_count as f64 / self.total_count as f64 * 100.0
    }

    /// Mean forfeited amount per expired coupon, rounded half-up to two
    /// decimal places. Zero when nothing expired.
    pub fn average_expired_amount(&self) -> Balance {
        if self.success_count == 0 {
            return Balance::ZERO;
        }
        let mean =
            Decimal::from(self.total_expired_amount) / Decimal::from(self.success_count as u64);
        Balance::new(mean.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }

    /// One-line report suitable for log output.
    pub fn summary(&self) -> String {
        if self.total_count == 0 {
            return "no expired coupons to process".to_string();
        }
        format!(
            "processed {} coupons: {} expired, {} failed ({:.1}% success), forfeited amount {}",
            self.total_count,
            self.success_count,
            self.error_count,
            self.success_rate(),
            self.total_expired_amount
        )
    }

    /// Multi-line report listing up to [`MAX_DETAILED_ERRORS`] failures.
    pub fn detailed_summary(&self) -> String {
        let mut out = self.summary();
        if !self.error_messages.is_empty() {
            out.push_str("\nerrors:");
            for (i, message) in self.error_messages.iter().take(MAX_DETAILED_ERRORS).enumerate() {
                out.push_str(&format!("\n  {}. {message}", i + 1));
            }
            let hidden = self.error_messages.len().saturating_sub(MAX_DETAILED_ERRORS);
            if hidden > 0 {
                out.push_str(&format!("\n  ... and {hidden} more"));
            }
        }
        out
    }
}

impl fmt::Display for ExpiryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_total_is_derived() {
        let result = ExpiryResult::new(3, 2, Balance::new(dec!(500)), vec!["e1".into(), "e2".into()]);
        assert_eq!(result.total_count(), 5);
        assert!(result.has_errors());
        assert!(!result.is_complete_success());
    }

    #[test]
    fn test_empty_result_rates() {
        let result = ExpiryResult::empty();
        assert_eq!(result.total_count(), 0);
        assert_eq!(result.success_rate(), 0.0);
        assert_eq!(result.error_rate(), 0.0);
        assert!(!result.has_errors());
        assert!(!result.has_processed_items());
        assert!(!result.is_complete_success());
        assert_eq!(result.average_expired_amount(), Balance::ZERO);
    }

    #[test]
    fn test_rates_sum_to_hundred() {
        let result = ExpiryResult::new(3, 1, Balance::ZERO, vec!["e".into()]);
        assert_eq!(result.success_rate(), 75.0);
        assert_eq!(result.error_rate(), 25.0);
    }

    #[test]
    fn test_average_rounds_half_up() {
        // 100 / 3 = 33.333... -> 33.33
        let result = ExpiryResult::new(3, 0, Balance::new(dec!(100)), Vec::new());
        assert_eq!(result.average_expired_amount(), Balance::new(dec!(33.33)));

        // 0.25 / 2 = 0.125 -> 0.13 under half-up
        let result = ExpiryResult::new(2, 0, Balance::new(dec!(0.25)), Vec::new());
        assert_eq!(result.average_expired_amount(), Balance::new(dec!(0.13)));
    }

    #[test]
    fn test_average_ignores_failed_items() {
        let result = ExpiryResult::new(2, 3, Balance::new(dec!(100)), Vec::new());
        assert_eq!(result.average_expired_amount(), Balance::new(dec!(50)));
    }

    #[test]
    fn test_summary_wording() {
        assert_eq!(ExpiryResult::empty().summary(), "no expired coupons to process");

        let result = ExpiryResult::new(9, 1, Balance::new(dec!(1000)), vec!["boom".into()]);
        let summary = result.summary();
        assert!(summary.contains("processed 10 coupons"));
        assert!(summary.contains("9 expired"));
        assert!(summary.contains("1 failed"));
        assert!(summary.contains("90.0% success"));
        assert!(summary.contains("forfeited amount 1000"));
    }

    #[test]
    fn test_detailed_summary_caps_errors() {
        let messages: Vec<String> = (1..=7).map(|i| format!("error {i}")).collect();
        let result = ExpiryResult::new(0, 7, Balance::ZERO, messages);
        let detailed = result.detailed_summary();
        assert!(detailed.contains("1. error 1"));
        assert!(detailed.contains("5. error 5"));
        assert!(!detailed.contains("error 6"));
        assert!(detailed.contains("... and 2 more"));
    }

    #[test]
    fn test_display_matches_summary() {
        let result = ExpiryResult::new(1, 0, Balance::new(dec!(10)), Vec::new());
        assert_eq!(result.to_string(), result.summary());
    }
}
