use std::fs::File;
use std::io::{Error, Write};
use std::path::Path;

pub const CSV_HEADER: &str =
    "coupon_id,user_id,original_amount,remaining_amount,expiry_date,status";

/// Writes a coupon seed file with the standard header and the given raw rows.
pub fn write_coupon_csv(path: &Path, rows: &[&str]) -> Result<(), Error> {
    let mut file = File::create(path)?;
    writeln!(file, "{CSV_HEADER}")?;
    for row in rows {
        writeln!(file, "{row}")?;
    }
    file.flush()?;
    Ok(())
}

/// Generates `count` active coupons worth 1000.00 each, all expiring on `expiry`.
#[allow(dead_code)]
pub fn generate_coupon_csv(path: &Path, count: usize, expiry: &str) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);

    wtr.write_record([
        "coupon_id",
        "user_id",
        "original_amount",
        "remaining_amount",
        "expiry_date",
        "status",
    ])?;

    for i in 1..=count {
        let coupon_id = format!("CPN{i:05}");
        let user_id = format!("user-{i}");
        wtr.write_record([
            coupon_id.as_str(),
            user_id.as_str(),
            "1000.00",
            "1000.00",
            expiry,
            "active",
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
