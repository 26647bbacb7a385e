//! Placed order - immutable post-purchase record

use super::discount::DiscountTotals;
use serde::{Deserialize, Serialize};

/// Order status after leaving the cart
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Placed,
    Cancelled,
}

/// Rule consumed by a coupon code when the order was placed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleUsage {
    pub code: String,
    pub rule_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlacedOrder {
    pub id: String,
    pub cart_id: String,
    pub customer_id: Option<i64>,
    pub store_id: i64,
    pub status: OrderStatus,
    /// Coupon codes copied from the cart, order preserved
    pub coupon_codes: Vec<String>,
    /// Legacy single-coupon field
    pub coupon_code: Option<String>,
    /// Usage consumed at placement, replayed on cancellation
    pub applied_rules: Vec<RuleUsage>,
    pub totals: DiscountTotals,
    pub placed_at: i64,
    #[serde(default)]
    pub cancelled_at: Option<i64>,
}

impl PlacedOrder {
    pub fn is_cancelled(&self) -> bool {
        self.status == OrderStatus::Cancelled
    }
}
