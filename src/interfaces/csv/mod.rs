pub mod coupon_reader;
pub mod coupon_writer;
