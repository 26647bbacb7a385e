//! Coupon Rule Matcher
//!
//! Resolves a coupon code to the discount rule it activates for a cart.
//! The engine only depends on the [`RuleMatcher`] trait; catalog-backed
//! matching lives outside this crate. [`CatalogRuleMatcher`] is an in-memory
//! implementation covering activity, validity window, store scope and
//! minimum subtotal.

use parking_lot::RwLock;
use rust_decimal::Decimal;
use shared::models::CouponRule;
use shared::order::Cart;
use std::collections::HashMap;

/// Cart facts a matcher may inspect
#[derive(Debug, Clone)]
pub struct CartContext {
    pub cart_id: String,
    pub customer_id: Option<i64>,
    pub store_id: i64,
    pub subtotal: Decimal,
    pub item_qty: u64,
    /// Evaluation time (Unix millis)
    pub now: i64,
}

impl CartContext {
    pub fn from_cart(cart: &Cart) -> Self {
        Self {
            cart_id: cart.id.clone(),
            customer_id: cart.customer_id,
            store_id: cart.store_id,
            subtotal: cart.subtotal(),
            item_qty: cart.item_qty(),
            now: shared::util::now_millis(),
        }
    }
}

/// A coupon code together with the rule it resolved to
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCoupon {
    pub code: String,
    pub rule: CouponRule,
}

/// Resolves coupon codes to rules
pub trait RuleMatcher: Send + Sync {
    /// Rule activated by `code` for this cart, or None when the code is
    /// unknown, expired or its conditions do not hold
    fn resolve(&self, cart: &CartContext, code: &str) -> Option<CouponRule>;
}

/// Check if a rule is inside its validity window
pub fn is_time_valid(rule: &CouponRule, current_time: i64) -> bool {
    if let Some(from) = rule.valid_from
        && current_time < from
    {
        return false;
    }
    if let Some(until) = rule.valid_until
        && current_time > until
    {
        return false;
    }
    true
}

/// Check if a rule applies to the cart's store (empty = all stores)
pub fn matches_store_scope(rule: &CouponRule, store_id: i64) -> bool {
    rule.store_ids.is_empty() || rule.store_ids.contains(&store_id)
}

/// Check the minimum subtotal condition
pub fn meets_min_subtotal(rule: &CouponRule, subtotal: Decimal) -> bool {
    rule.min_subtotal.is_none_or(|min| subtotal >= min)
}

/// In-memory coupon catalog
#[derive(Debug, Default)]
pub struct CatalogRuleMatcher {
    rules: RwLock<HashMap<i64, CouponRule>>,
    /// coupon code -> rule id
    coupons: RwLock<HashMap<String, i64>>,
}

impl CatalogRuleMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a rule
    pub fn upsert_rule(&self, rule: CouponRule) {
        self.rules.write().insert(rule.id, rule);
    }

    /// Register a coupon code for a rule
    pub fn add_coupon(&self, code: impl Into<String>, rule_id: i64) {
        self.coupons.write().insert(code.into(), rule_id);
    }

    /// Register a rule together with its coupon codes
    pub fn add_rule_with_codes(&self, rule: CouponRule, codes: &[&str]) {
        let rule_id = rule.id;
        self.upsert_rule(rule);
        let mut coupons = self.coupons.write();
        for code in codes {
            coupons.insert((*code).to_string(), rule_id);
        }
    }

    pub fn remove_coupon(&self, code: &str) -> bool {
        self.coupons.write().remove(code).is_some()
    }
}

impl RuleMatcher for CatalogRuleMatcher {
    fn resolve(&self, cart: &CartContext, code: &str) -> Option<CouponRule> {
        let rule_id = *self.coupons.read().get(code)?;
        let rules = self.rules.read();
        let Some(rule) = rules.get(&rule_id) else {
            tracing::warn!(code = %code, rule_id, "Coupon points at a missing rule");
            return None;
        };

        if !rule.is_active
            || !is_time_valid(rule, cart.now)
            || !matches_store_scope(rule, cart.store_id)
            || !meets_min_subtotal(rule, cart.subtotal)
        {
            return None;
        }

        Some(rule.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::make_rule;
    use rust_decimal_macros::dec;
    use shared::models::ActionType;

    fn context(store_id: i64, subtotal: Decimal, now: i64) -> CartContext {
        CartContext {
            cart_id: "cart-1".to_string(),
            customer_id: Some(1),
            store_id,
            subtotal,
            item_qty: 1,
            now,
        }
    }

    #[test]
    fn test_resolve_known_code() {
        let matcher = CatalogRuleMatcher::new();
        matcher.add_rule_with_codes(make_rule(1, ActionType::ByPercent, dec!(10)), &["SPRING"]);

        let rule = matcher.resolve(&context(1, dec!(50), 0), "SPRING");
        assert_eq!(rule.map(|r| r.id), Some(1));
    }

    #[test]
    fn test_codes_are_case_sensitive() {
        let matcher = CatalogRuleMatcher::new();
        matcher.add_rule_with_codes(make_rule(1, ActionType::ByPercent, dec!(10)), &["SPRING"]);

        assert!(matcher.resolve(&context(1, dec!(50), 0), "spring").is_none());
        assert!(matcher.resolve(&context(1, dec!(50), 0), "UNKNOWN").is_none());
    }

    #[test]
    fn test_inactive_and_expired_rules_do_not_resolve() {
        let matcher = CatalogRuleMatcher::new();

        let mut inactive = make_rule(1, ActionType::ByPercent, dec!(10));
        inactive.is_active = false;
        matcher.add_rule_with_codes(inactive, &["OFF"]);

        let mut windowed = make_rule(2, ActionType::ByPercent, dec!(10));
        windowed.valid_from = Some(1_000);
        windowed.valid_until = Some(2_000);
        matcher.add_rule_with_codes(windowed, &["WINDOW"]);

        assert!(matcher.resolve(&context(1, dec!(50), 1_500), "OFF").is_none());
        assert!(matcher.resolve(&context(1, dec!(50), 999), "WINDOW").is_none());
        assert!(matcher.resolve(&context(1, dec!(50), 1_500), "WINDOW").is_some());
        assert!(matcher.resolve(&context(1, dec!(50), 2_001), "WINDOW").is_none());
    }

    #[test]
    fn test_store_scope_and_min_subtotal() {
        let matcher = CatalogRuleMatcher::new();
        let mut rule = make_rule(1, ActionType::CartFixed, dec!(5));
        rule.store_ids = vec![2];
        rule.min_subtotal = Some(dec!(30));
        matcher.add_rule_with_codes(rule, &["BIG"]);

        assert!(matcher.resolve(&context(1, dec!(50), 0), "BIG").is_none());
        assert!(matcher.resolve(&context(2, dec!(29.99), 0), "BIG").is_none());
        assert!(matcher.resolve(&context(2, dec!(30), 0), "BIG").is_some());
    }

    #[test]
    fn test_removed_coupon_no_longer_resolves() {
        let matcher = CatalogRuleMatcher::new();
        matcher.add_rule_with_codes(make_rule(1, ActionType::ByPercent, dec!(10)), &["A", "B"]);

        assert!(matcher.remove_coupon("A"));
        assert!(!matcher.remove_coupon("A"));
        assert!(matcher.resolve(&context(1, dec!(50), 0), "A").is_none());
        assert!(matcher.resolve(&context(1, dec!(50), 0), "B").is_some());
    }
}
