//! Discount Calculator
//!
//! Applies resolved coupons to a cart in order. Each rule is evaluated
//! against the running total left by the rules before it, so percentages
//! compound instead of summing:
//!
//! ```text
//! subtotal 100, 10% then 5%  =>  100 - 10 - (90 * 5%) = 85.50
//! ```
//!
//! Amounts are rounded half-up to the currency's minor unit as each line is
//! produced, so every displayed line equals its contribution to the total.

use super::chain::StopChain;
use super::matcher::ResolvedCoupon;
use rust_decimal::prelude::*;
use shared::models::{ActionType, CouponRule};
use shared::order::{AppliedTo, DiscountLine, DiscountTotals};

/// Default minor-unit scale (cents)
pub const DEFAULT_CURRENCY_SCALE: u32 = 2;

/// Round a monetary value half-up to `scale` decimal places
#[inline]
pub fn round_money(value: Decimal, scale: u32) -> Decimal {
    value.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero)
}

/// Amounts the engine prices against
#[derive(Debug, Clone, Copy)]
pub struct PricingInput {
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub item_qty: u64,
}

/// Sequential coupon discount engine
#[derive(Debug, Clone, Copy)]
pub struct DiscountEngine {
    scale: u32,
}

impl Default for DiscountEngine {
    fn default() -> Self {
        Self::new(DEFAULT_CURRENCY_SCALE)
    }
}

impl DiscountEngine {
    pub fn new(scale: u32) -> Self {
        Self { scale }
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Compute discount lines and totals for coupons in evaluation order
    pub fn compute(&self, input: PricingInput, coupons: &[ResolvedCoupon]) -> DiscountTotals {
        let subtotal = round_money(input.subtotal.max(Decimal::ZERO), self.scale);
        let shipping = round_money(input.shipping.max(Decimal::ZERO), self.scale);

        let mut running_items = subtotal;
        let mut running_shipping = shipping;
        let mut item_discount = Decimal::ZERO;
        let mut shipping_discount = Decimal::ZERO;
        let mut lines = Vec::new();
        let mut chain = StopChain::new();

        for coupon in coupons {
            if !chain.is_open() {
                tracing::debug!(
                    code = %coupon.code,
                    rule_id = coupon.rule.id,
                    stopped_by = ?chain.stopped_by(),
                    "Rule skipped after stop-rules-processing"
                );
                continue;
            }
            let rule = &coupon.rule;
            let label = rule.line_label(&coupon.code);

            let amount = self.item_amount(rule, running_items, input.item_qty);
            if amount > Decimal::ZERO {
                running_items -= amount;
                item_discount += amount;
                lines.push(DiscountLine {
                    rule_id: rule.id,
                    code: coupon.code.clone(),
                    label: label.clone(),
                    applied_to: AppliedTo::Item,
                    amount,
                });
            }

            if rule.apply_to_shipping {
                let amount = self.shipping_amount(rule, running_shipping);
                if amount > Decimal::ZERO {
                    running_shipping -= amount;
                    shipping_discount += amount;
                    lines.push(DiscountLine {
                        rule_id: rule.id,
                        code: coupon.code.clone(),
                        label,
                        applied_to: AppliedTo::Shipping,
                        amount,
                    });
                }
            }

            chain.admit(rule);
        }

        let total_discount = item_discount + shipping_discount;
        let grand_total = (subtotal + shipping - total_discount).max(Decimal::ZERO);

        DiscountTotals {
            subtotal,
            shipping,
            item_discount,
            shipping_discount,
            total_discount,
            grand_total,
            lines,
        }
    }

    /// Item discount for one rule against the running item total
    fn item_amount(&self, rule: &CouponRule, running: Decimal, item_qty: u64) -> Decimal {
        let raw = match rule.action_type {
            ActionType::ByPercent => {
                running * clamp_percent(rule.discount_amount) / Decimal::ONE_HUNDRED
            }
            ActionType::CartFixed => rule.discount_amount,
            ActionType::ByFixed => rule.discount_amount * Decimal::from(item_qty),
        };
        self.cap(raw, running)
    }

    /// Shipping discount for one rule against the running shipping total
    ///
    /// Both fixed actions take their amount once off shipping.
    fn shipping_amount(&self, rule: &CouponRule, running: Decimal) -> Decimal {
        let raw = match rule.action_type {
            ActionType::ByPercent => {
                running * clamp_percent(rule.discount_amount) / Decimal::ONE_HUNDRED
            }
            ActionType::CartFixed | ActionType::ByFixed => rule.discount_amount,
        };
        self.cap(raw, running)
    }

    /// Round and keep within `[0, available]`
    fn cap(&self, raw: Decimal, available: Decimal) -> Decimal {
        round_money(raw, self.scale)
            .max(Decimal::ZERO)
            .min(available)
    }
}

/// Percentages outside 0..=100 are clamped
#[inline]
fn clamp_percent(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO).min(Decimal::ONE_HUNDRED)
}
