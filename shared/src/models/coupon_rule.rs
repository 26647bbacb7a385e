//! Coupon Rule Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How a rule computes its discount
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    /// Percentage of the running total (discount_amount: 10 = 10%)
    ByPercent,
    /// Flat amount off the whole cart
    CartFixed,
    /// Flat amount off every unit in the cart
    ByFixed,
}

/// Discount rule activated by a coupon code
///
/// Looked up by a rule matcher and never mutated by the engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CouponRule {
    pub id: i64,
    pub name: String,
    /// Display label for discount lines; empty falls back to the coupon code
    #[serde(default)]
    pub label: String,
    pub action_type: ActionType,
    /// Percent for `ByPercent`, money for the fixed actions
    pub discount_amount: Decimal,
    #[serde(default)]
    pub apply_to_shipping: bool,
    #[serde(default)]
    pub stop_rules_processing: bool,
    /// Global cap on placed orders using this rule
    #[serde(default)]
    pub uses_per_coupon: Option<u32>,
    /// Cap on placed orders per customer
    #[serde(default)]
    pub uses_per_customer: Option<u32>,

    // === Matching conditions ===
    #[serde(default = "default_active")]
    pub is_active: bool,
    /// Valid from datetime (Unix millis)
    #[serde(default)]
    pub valid_from: Option<i64>,
    /// Valid until datetime (Unix millis)
    #[serde(default)]
    pub valid_until: Option<i64>,
    /// Minimum cart subtotal required
    #[serde(default)]
    pub min_subtotal: Option<Decimal>,
    /// Stores the rule is valid in (empty = all stores)
    #[serde(default)]
    pub store_ids: Vec<i64>,
}

fn default_active() -> bool {
    true
}

impl CouponRule {
    /// Label shown on the discount line for `code`
    pub fn line_label(&self, code: &str) -> String {
        if self.label.trim().is_empty() {
            format!("Discount ({})", code)
        } else {
            self.label.clone()
        }
    }

    /// Whether the rule carries any usage cap
    pub fn has_usage_limits(&self) -> bool {
        self.uses_per_coupon.is_some() || self.uses_per_customer.is_some()
    }
}
