//! Shared fixtures for unit tests

use rust_decimal::Decimal;
use shared::models::{ActionType, CouponRule};

/// Active, uncapped rule with no matching conditions
pub(crate) fn make_rule(id: i64, action_type: ActionType, discount_amount: Decimal) -> CouponRule {
    CouponRule {
        id,
        name: format!("rule_{}", id),
        label: format!("Rule {}", id),
        action_type,
        discount_amount,
        apply_to_shipping: false,
        stop_rules_processing: false,
        uses_per_coupon: None,
        uses_per_customer: None,
        is_active: true,
        valid_from: None,
        valid_until: None,
        min_subtotal: None,
        store_ids: vec![],
    }
}

/// Same as [`make_rule`] with `stop_rules_processing` set
pub(crate) fn make_stop_rule(
    id: i64,
    action_type: ActionType,
    discount_amount: Decimal,
) -> CouponRule {
    CouponRule {
        stop_rules_processing: true,
        ..make_rule(id, action_type, discount_amount)
    }
}
