//! Stop-rules-processing chain
//!
//! Rules fire in coupon order. Once a rule flagged `stop_rules_processing`
//! has been admitted, the chain is closed and nothing after it takes effect.
//! Coupon validation and the discount calculator walk the same chain so the
//! two can never disagree about which rules are live.

use shared::models::CouponRule;

#[derive(Debug, Default, Clone)]
pub struct StopChain {
    stopped_by: Option<i64>,
}

impl StopChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether later rules may still take effect
    pub fn is_open(&self) -> bool {
        self.stopped_by.is_none()
    }

    /// Rule id that closed the chain
    pub fn stopped_by(&self) -> Option<i64> {
        self.stopped_by
    }

    /// Record that `rule` took effect
    pub fn admit(&mut self, rule: &CouponRule) {
        if self.stopped_by.is_none() && rule.stop_rules_processing {
            self.stopped_by = Some(rule.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use shared::models::ActionType;

    fn rule(id: i64, stop: bool) -> CouponRule {
        CouponRule {
            id,
            name: format!("rule_{}", id),
            label: String::new(),
            action_type: ActionType::ByPercent,
            discount_amount: dec!(10),
            apply_to_shipping: false,
            stop_rules_processing: stop,
            uses_per_coupon: None,
            uses_per_customer: None,
            is_active: true,
            valid_from: None,
            valid_until: None,
            min_subtotal: None,
            store_ids: vec![],
        }
    }

    #[test]
    fn test_chain_closes_on_first_stop_rule() {
        let mut chain = StopChain::new();
        chain.admit(&rule(1, false));
        assert!(chain.is_open());

        chain.admit(&rule(2, true));
        assert!(!chain.is_open());
        assert_eq!(chain.stopped_by(), Some(2));

        // A second stop rule does not move the cut point
        chain.admit(&rule(3, true));
        assert_eq!(chain.stopped_by(), Some(2));
    }
}
