//! Discount lines - output of a totals pass

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// What a discount line reduces
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppliedTo {
    Item,
    Shipping,
}

/// One discount contribution of one rule
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiscountLine {
    pub rule_id: i64,
    pub code: String,
    pub label: String,
    pub applied_to: AppliedTo,
    pub amount: Decimal,
}

/// Totals computed for a cart or snapshotted onto an order
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DiscountTotals {
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub item_discount: Decimal,
    pub shipping_discount: Decimal,
    pub total_discount: Decimal,
    pub grand_total: Decimal,
    pub lines: Vec<DiscountLine>,
}
