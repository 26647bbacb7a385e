//! Cart, order and discount types

pub mod cart;
pub mod discount;
pub mod event;
pub mod placed;

pub use cart::{Cart, CartLine};
pub use discount::{AppliedTo, DiscountLine, DiscountTotals};
pub use event::CouponEvent;
pub use placed::{OrderStatus, PlacedOrder, RuleUsage};

/// Legacy single-coupon field value for a coupon set
///
/// Older single-coupon reporting reads one code; it is only populated when
/// exactly one code is applied.
pub fn legacy_coupon_code(codes: &[String]) -> Option<String> {
    match codes {
        [only] => Some(only.clone()),
        _ => None,
    }
}
