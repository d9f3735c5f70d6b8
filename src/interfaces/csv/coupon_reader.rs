use crate::domain::coupon::{Balance, Coupon, CouponStatus};
use crate::error::{CouponError, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

/// One row of a coupon seed file.
#[derive(Debug, Deserialize)]
struct CouponRecord {
    coupon_id: String,
    user_id: String,
    original_amount: Decimal,
    remaining_amount: Decimal,
    expiry_date: NaiveDate,
    status: CouponStatus,
}

impl TryFrom<CouponRecord> for Coupon {
    type Error = CouponError;

    fn try_from(record: CouponRecord) -> Result<Coupon> {
        Coupon::from_parts(
            record.coupon_id,
            record.user_id,
            Balance::new(record.original_amount),
            Balance::new(record.remaining_amount),
            record.expiry_date,
            record.status,
        )
    }
}

/// Reads coupon ledger records from a CSV source.
///
/// This reader wraps `csv::Reader` and provides an iterator over `Result<Coupon>`.
/// It handles whitespace trimming and flexible record lengths automatically;
/// rows that parse but violate a ledger invariant come back as errors too.
pub struct CouponReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CouponReader<R> {
    /// Creates a new `CouponReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and validates coupons.
    pub fn coupons(self) -> impl Iterator<Item = Result<Coupon>> {
        self.reader
            .into_deserialize::<CouponRecord>()
            .map(|result| result.map_err(CouponError::from).and_then(Coupon::try_from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_reader_valid_stream() {
        let data = "coupon_id, user_id, original_amount, remaining_amount, expiry_date, status\n\
                    CPN1, user-1, 10000.00, 2500.00, 2025-06-30, active\n\
                    CPN2, user-2, 5000.00, 0.00, 2025-09-30, used";
        let reader = CouponReader::new(data.as_bytes());
        let results: Vec<Result<Coupon>> = reader.coupons().collect();

        assert_eq!(results.len(), 2);
        let first = results[0].as_ref().unwrap();
        assert_eq!(first.coupon_id, "CPN1");
        assert_eq!(first.remaining_amount, Balance::new(dec!(2500.00)));
        assert_eq!(first.status, CouponStatus::Active);
        let second = results[1].as_ref().unwrap();
        assert_eq!(second.status, CouponStatus::Used);
    }

    #[test]
    fn test_reader_malformed_amount() {
        let data = "coupon_id, user_id, original_amount, remaining_amount, expiry_date, status\n\
                    CPN1, user-1, not-a-number, 0, 2025-06-30, active";
        let reader = CouponReader::new(data.as_bytes());
        let results: Vec<Result<Coupon>> = reader.coupons().collect();

        assert_eq!(results.len(), 1);
        assert!(results[0].is_err());
    }

    #[test]
    fn test_reader_unknown_status() {
        let data = "coupon_id, user_id, original_amount, remaining_amount, expiry_date, status\n\
                    CPN1, user-1, 100, 100, 2025-06-30, frozen";
        let reader = CouponReader::new(data.as_bytes());
        let results: Vec<Result<Coupon>> = reader.coupons().collect();

        assert!(results[0].is_err());
    }

    #[test]
    fn test_reader_rejects_invariant_violations() {
        // remaining exceeds original: parses fine, fails validation
        let data = "coupon_id, user_id, original_amount, remaining_amount, expiry_date, status\n\
                    CPN1, user-1, 100, 200, 2025-06-30, active";
        let reader = CouponReader::new(data.as_bytes());
        let results: Vec<Result<Coupon>> = reader.coupons().collect();

        assert!(matches!(
            results[0],
            Err(CouponError::ValidationError(_))
        ));
    }

    #[test]
    fn test_reader_bad_row_does_not_poison_stream() {
        let data = "coupon_id, user_id, original_amount, remaining_amount, expiry_date, status\n\
                    CPN1, user-1, 100, broken, 2025-06-30, active\n\
                    CPN2, user-2, 100, 50, 2025-06-30, active";
        let reader = CouponReader::new(data.as_bytes());
        let results: Vec<Result<Coupon>> = reader.coupons().collect();

        assert_eq!(results.len(), 2);
        assert!(results[0].is_err());
        assert_eq!(results[1].as_ref().unwrap().coupon_id, "CPN2");
    }
}
