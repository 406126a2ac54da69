//! Value Objects for the storefront

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! typed_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generates a new time-ordered identifier.
            pub fn generate() -> Self { Self(Uuid::now_v7()) }
            pub const fn from_uuid(uuid: Uuid) -> Self { Self(uuid) }
            pub const fn into_uuid(self) -> Uuid { self.0 }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self { Self(value) }
        }

        impl From<$name> for Uuid {
            fn from(value: $name) -> Self { value.0 }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { fmt::Display::fmt(&self.0, f) }
        }
    };
}

typed_id!(
    /// Product identifier
    ProductId
);
typed_id!(
    /// Category identifier
    CategoryId
);
typed_id!(
    /// Supplier identifier
    SupplierId
);
typed_id!(
    /// Client (user identity) identifier
    ClientId
);
typed_id!(
    /// Order identifier
    OrderId
);

/// Largest quantity a cart line, order line or stock count may hold. Matches
/// the `INTEGER` columns they are stored in.
pub const MAX_QUANTITY: u32 = i32::MAX as u32;

/// An amount that no longer fits in [`Money`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("amount out of range")]
pub struct MoneyOverflow;

/// Fixed-point money amount in the store currency.
///
/// Formatting for display is left to the presentation layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Highest unit price a product may carry (`NUMERIC(10, 2)`).
    pub const MAX_PRICE: Money = Money(Decimal::from_parts(1_410_065_407, 2, 0, false, 2));

    /// Decimal places a unit price may carry.
    pub const PRICE_SCALE: u32 = 2;

    pub const fn new(amount: Decimal) -> Self { Self(amount) }
    pub const fn amount(&self) -> Decimal { self.0 }
    pub fn is_negative(&self) -> bool { self.0.is_sign_negative() && !self.0.is_zero() }

    /// Whether this amount can be stored as a unit price without rounding:
    /// non-negative, at most two decimal places and at most [`Money::MAX_PRICE`].
    pub fn is_valid_price(&self) -> bool {
        !self.is_negative() && self.0.normalize().scale() <= Self::PRICE_SCALE && *self <= Self::MAX_PRICE
    }

    /// Price of `qty` units at this unit price.
    pub fn multiply(&self, qty: u32) -> Result<Money, MoneyOverflow> {
        self.0.checked_mul(Decimal::from(qty)).map(Money).ok_or(MoneyOverflow)
    }

    pub fn checked_add(self, rhs: Money) -> Result<Money, MoneyOverflow> {
        self.0.checked_add(rhs.0).map(Money).ok_or(MoneyOverflow)
    }

    /// Sum of `amounts`, failing instead of overflowing.
    pub fn total<I: IntoIterator<Item = Money>>(amounts: I) -> Result<Money, MoneyOverflow> {
        amounts.into_iter().try_fold(Money::ZERO, Money::checked_add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_multiply_and_sum() {
        let unit = Money::new(dec!(12.34));
        assert_eq!(unit.multiply(3).unwrap().amount(), dec!(37.02));
        let total = Money::total([unit, Money::new(dec!(0.66))]).unwrap();
        assert_eq!(total.amount(), dec!(13.00));
    }

    #[test]
    fn test_money_keeps_exact_cents() {
        let total = Money::total(std::iter::repeat(Money::new(dec!(0.10))).take(3)).unwrap();
        assert_eq!(total, Money::new(dec!(0.30)));
    }

    #[test]
    fn test_overflow_is_an_error() {
        let huge = Money::new(Decimal::MAX);
        assert_eq!(huge.multiply(2), Err(MoneyOverflow));
        assert_eq!(huge.checked_add(Money::new(dec!(1))), Err(MoneyOverflow));
        assert_eq!(Money::total([huge, huge]), Err(MoneyOverflow));
        assert_eq!(Money::MAX_PRICE.multiply(MAX_QUANTITY).map(|m| m.amount()), Ok(dec!(214748364678525163.53)));
    }

    #[test]
    fn test_price_bounds() {
        assert_eq!(Money::MAX_PRICE, Money::new(dec!(99999999.99)));
        assert!(Money::new(dec!(0)).is_valid_price());
        assert!(Money::new(dec!(1.50000)).is_valid_price());
        assert!(Money::new(dec!(99999999.99)).is_valid_price());
        assert!(!Money::new(dec!(100000000.00)).is_valid_price());
        assert!(!Money::new(dec!(1.005)).is_valid_price());
        assert!(!Money::new(dec!(-0.01)).is_valid_price());
        assert!(!Money::new(Decimal::MAX).is_valid_price());
    }

    #[test]
    fn test_negative_detection() {
        assert!(Money::new(dec!(-0.01)).is_negative());
        assert!(!Money::ZERO.is_negative());
    }

    #[test]
    fn test_ids_are_distinct_and_round_trip() {
        let a = ProductId::generate();
        let b = ProductId::generate();
        assert_ne!(a, b);
        assert_eq!(ProductId::from_uuid(a.into_uuid()), a);
        let json = serde_json::to_string(&a).unwrap();
        assert_eq!(json, format!("\"{a}\""));
    }
}
