use crate::domain::coupon::{Balance, Coupon};
use crate::error::Result;
use rust_decimal::Decimal;
use std::io::Write;

/// Writes the final ledger state as CSV.
///
/// Rows are sorted by coupon id and monetary fields are rendered with two
/// decimal places, so identical ledgers always produce identical reports.
pub struct CouponWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CouponWriter<W> {
    /// Creates a new `CouponWriter` targeting any `Write` sink (e.g., Stdout, File).
    pub fn new(target: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(target),
        }
    }

    /// Writes the header and one row per coupon, then flushes the sink.
    pub fn write_coupons(&mut self, mut coupons: Vec<Coupon>) -> Result<()> {
        coupons.sort_by(|a, b| a.coupon_id.cmp(&b.coupon_id));

        self.writer.write_record([
            "coupon_id",
            "user_id",
            "original_amount",
            "remaining_amount",
            "expiry_date",
            "status",
        ])?;

        for coupon in &coupons {
            let original = money(coupon.original_amount);
            let remaining = money(coupon.remaining_amount);
            let expiry = coupon.expiry_date.to_string();
            let status = coupon.status.to_string();
            self.writer.write_record([
                &coupon.coupon_id,
                &coupon.user_id,
                &original,
                &remaining,
                &expiry,
                &status,
            ])?;
        }

        self.writer.flush()?;
        Ok(())
    }
}

fn money(balance: Balance) -> String {
    let mut value = Decimal::from(balance);
    value.rescale(2);
    value.to_string()
}
