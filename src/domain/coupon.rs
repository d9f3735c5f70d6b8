use crate::domain::keys;
use crate::error::{CouponError, Result};
use chrono::{Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use tracing::info;

/// Number of days a coupon stays valid when issued without an explicit expiry.
pub const DEFAULT_EXPIRY_DAYS: u64 = 90;

/// Days before expiry at which a coupon counts as expiring soon.
pub const EXPIRING_SOON_DAYS: i64 = 7;

/// Represents a monetary value held on a coupon.
///
/// This is a wrapper around `rust_decimal::Decimal` to enforce domain-specific rules
/// and provide type safety for financial calculations.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Balance(pub Decimal);

/// Represents a positive monetary amount for reservations and debits.
///
/// Ensures that requested amounts are always positive.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self> {
        if value <= Decimal::ZERO {
            return Err(CouponError::ValidationError(
                "amount must be positive".to_string(),
            ));
        }
        // fixed 2-decimal currency
        if value.normalize().scale() > 2 {
            return Err(CouponError::ValidationError(format!(
                "amount has sub-cent precision: {value}"
            )));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = CouponError;

    fn try_from(value: Decimal) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl From<Amount> for Balance {
    fn from(amount: Amount) -> Self {
        Self(amount.0)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Balance {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl From<Balance> for Decimal {
    fn from(balance: Balance) -> Self {
        balance.0
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// Implement basic arithmetic for Balance to make it a usable Value Object
impl Add for Balance {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Balance {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl AddAssign for Balance {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Balance {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum CouponStatus {
    Active,
    Reserved,
    Used,
    Expired,
    Cancelled,
}

impl fmt::Display for CouponStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CouponStatus::Active => "active",
            CouponStatus::Reserved => "reserved",
            CouponStatus::Used => "used",
            CouponStatus::Expired => "expired",
            CouponStatus::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Represents the permanent ledger record of a prepaid coupon.
///
/// Tracks the issued amount, what is still spendable, and the lifecycle
/// status. The cached balance used during reservation lives outside this
/// entity; the ledger record only changes on confirmed usage or expiry.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Coupon {
    /// The unique identifier of the coupon.
    pub coupon_id: String,
    /// The user the coupon was issued to.
    pub user_id: String,
    /// The amount the coupon was issued with.
    pub original_amount: Balance,
    /// The amount still spendable.
    pub remaining_amount: Balance,
    /// Last day on which the coupon may be spent.
    pub expiry_date: NaiveDate,
    /// The lifecycle status of the coupon.
    pub status: CouponStatus,
}

impl Coupon {
    /// Issues a new coupon holding `original_amount`.
    ///
    /// Without an explicit expiry date the coupon is valid for
    /// [`DEFAULT_EXPIRY_DAYS`] from today.
    pub fn new(
        coupon_id: impl Into<String>,
        user_id: impl Into<String>,
        original_amount: Balance,
        expiry_date: Option<NaiveDate>,
    ) -> Result<Self> {
        let coupon_id = coupon_id.into();
        keys::validate_coupon_id(&coupon_id)?;
        if original_amount < Balance::ZERO {
            return Err(CouponError::ValidationError(format!(
                "original amount must not be negative: {original_amount}"
            )));
        }
        let expiry_date = expiry_date
            .unwrap_or_else(|| Utc::now().date_naive() + Days::new(DEFAULT_EXPIRY_DAYS));
        Ok(Self {
            coupon_id,
            user_id: user_id.into(),
            original_amount,
            remaining_amount: original_amount,
            expiry_date,
            status: CouponStatus::Active,
        })
    }

    /// Rebuilds a coupon from stored fields, checking the ledger invariants.
    pub fn from_parts(
        coupon_id: impl Into<String>,
        user_id: impl Into<String>,
        original_amount: Balance,
        remaining_amount: Balance,
        expiry_date: NaiveDate,
        status: CouponStatus,
    ) -> Result<Self> {
        let coupon_id = coupon_id.into();
        keys::validate_coupon_id(&coupon_id)?;
        if remaining_amount < Balance::ZERO {
            return Err(CouponError::ValidationError(format!(
                "remaining amount must not be negative: coupon_id={coupon_id}"
            )));
        }
        if remaining_amount > original_amount {
            return Err(CouponError::ValidationError(format!(
                "remaining amount exceeds original amount: coupon_id={coupon_id}"
            )));
        }
        if matches!(status, CouponStatus::Used | CouponStatus::Expired)
            && remaining_amount != Balance::ZERO
        {
            return Err(CouponError::ValidationError(format!(
                "{status} coupon must have zero remaining amount: coupon_id={coupon_id}"
            )));
        }
        Ok(Self {
            coupon_id,
            user_id: user_id.into(),
            original_amount,
            remaining_amount,
            expiry_date,
            status,
        })
    }

    /// True once the expiry date has passed. The expiry day itself still counts
    /// as valid.
    pub fn is_expired(&self, as_of: NaiveDate) -> bool {
        as_of > self.expiry_date
    }

    /// True while the coupon is spendable.
    pub fn is_active(&self, as_of: NaiveDate) -> bool {
        self.status == CouponStatus::Active && !self.is_expired(as_of)
    }

    /// Whether a debit of `amount` would succeed as of the given date.
    pub fn can_use(&self, amount: Amount, as_of: NaiveDate) -> bool {
        self.is_active(as_of) && self.remaining_amount >= amount.into()
    }

    /// True for active coupons within [`EXPIRING_SOON_DAYS`] of their expiry.
    pub fn is_expiring_soon(&self, as_of: NaiveDate) -> bool {
        self.is_active(as_of)
            && self.expiry_date.signed_duration_since(as_of).num_days() <= EXPIRING_SOON_DAYS
    }

    /// Permanently spends `amount` from the remaining balance.
    ///
    /// The coupon flips to `Used` exactly when the balance reaches zero.
    pub fn debit(&mut self, amount: Amount) -> Result<()> {
        let amount: Balance = amount.into();
        if amount > self.remaining_amount {
            return Err(CouponError::ValidationError(format!(
                "debit of {amount} exceeds remaining amount {} on coupon {}",
                self.remaining_amount, self.coupon_id
            )));
        }
        self.remaining_amount -= amount;
        if self.remaining_amount == Balance::ZERO {
            self.status = CouponStatus::Used;
        }
        Ok(())
    }

    /// Returns a previously confirmed amount to the coupon.
    ///
    /// A fully used coupon becomes spendable again; the balance can never
    /// exceed the originally issued amount.
    pub fn refund(&mut self, amount: Amount) -> Result<()> {
        let restored = self.remaining_amount + amount.into();
        if restored > self.original_amount {
            return Err(CouponError::ValidationError(format!(
                "refund would exceed original amount {} on coupon {}",
                self.original_amount, self.coupon_id
            )));
        }
        self.remaining_amount = restored;
        if self.status == CouponStatus::Used && self.remaining_amount > Balance::ZERO {
            self.status = CouponStatus::Active;
        }
        Ok(())
    }

    /// Expires the coupon once its expiry date has passed.
    pub fn expire(&mut self, as_of: NaiveDate) -> Result<Balance> {
        if !self.is_expired(as_of) {
            return Err(CouponError::ValidationError(format!(
                "coupon {} does not expire until {}",
                self.coupon_id, self.expiry_date
            )));
        }
        self.force_expire("expiry date passed")
    }

    /// Expires the coupon regardless of its expiry date.
    ///
    /// Only active coupons can be expired; the forfeited remaining amount is
    /// returned so batch jobs can aggregate it.
    pub fn force_expire(&mut self, reason: &str) -> Result<Balance> {
        if self.status != CouponStatus::Active {
            return Err(CouponError::ValidationError(format!(
                "cannot expire coupon {}: status is {}",
                self.coupon_id, self.status
            )));
        }
        let forfeited = self.remaining_amount;
        self.remaining_amount = Balance::ZERO;
        self.status = CouponStatus::Expired;
        info!(
            coupon_id = %self.coupon_id,
            %forfeited,
            reason,
            "coupon expired"
        );
        Ok(forfeited)
    }
}
