//! Coupon set validation
//!
//! Checks run over the whole resulting set, in order:
//!
//! 1. Distinct codes must fit the coupon cap
//! 2. The cart must contain products
//! 3. Each code must resolve to a rule
//! 4. One code per rule; a repeated code is a duplicate
//! 5. The rule's usage caps must not be reached
//! 6. Nothing after an accepted stop-rules-processing rule
//!
//! Strict validation (apply / append / replace) fails the whole batch on any
//! rejection. Lenient validation (cart merge) keeps what passes and drops the
//! rest, including codes beyond the cap.

use super::error::{CouponError, CouponResult};
use crate::orders::storage::StorageResult;
use crate::pricing::{CartContext, ResolvedCoupon, RuleMatcher, StopChain};
use shared::models::CouponRule;
use std::collections::HashSet;

/// Why a code was turned away
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Code already present earlier in the set
    Duplicate,
    /// Cart has no products
    EmptyCart,
    /// An earlier accepted rule stops further processing
    AfterStopRule,
    /// Coupon cap already filled
    OverLimit,
    /// Unknown code or its rule conditions do not hold
    NotApplicable,
    /// Rule already applied through another code
    SameRule,
    /// Rule's usage cap reached
    UsageLimit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedCode {
    pub code: String,
    pub reason: RejectReason,
}

#[derive(Debug, Clone, Default)]
pub struct ValidationOutcome {
    pub accepted: Vec<ResolvedCoupon>,
    pub rejected: Vec<RejectedCode>,
}

impl ValidationOutcome {
    pub fn accepted_codes(&self) -> Vec<String> {
        self.accepted.iter().map(|c| c.code.clone()).collect()
    }

    /// Rejected codes in set order, each listed once
    pub fn rejected_codes(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.rejected
            .iter()
            .filter(|r| seen.insert(r.code.as_str()))
            .map(|r| r.code.clone())
            .collect()
    }
}

pub struct CouponValidator<'a> {
    matcher: &'a dyn RuleMatcher,
    max_coupons: usize,
}

impl<'a> CouponValidator<'a> {
    pub fn new(matcher: &'a dyn RuleMatcher, max_coupons: usize) -> Self {
        Self {
            matcher,
            max_coupons: max_coupons.max(1),
        }
    }

    /// Validate a set as one batch; any rejection fails the batch
    ///
    /// `has_capacity` reports whether a rule's usage caps leave room for the
    /// cart's customer.
    pub fn validate_strict<F>(
        &self,
        ctx: &CartContext,
        codes: &[String],
        has_capacity: F,
    ) -> CouponResult<Vec<ResolvedCoupon>>
    where
        F: FnMut(&CouponRule) -> StorageResult<bool>,
    {
        let distinct: HashSet<&str> = codes.iter().map(String::as_str).collect();
        if distinct.len() > self.max_coupons {
            return Err(CouponError::TooManyCoupons);
        }
        if ctx.item_qty == 0 {
            return Err(CouponError::EmptyCart);
        }

        let outcome = self.walk(ctx, codes, false, has_capacity)?;
        if !outcome.rejected.is_empty() {
            return Err(CouponError::CouponsNotApplicable(outcome.rejected_codes()));
        }
        Ok(outcome.accepted)
    }

    /// Validate a set keeping what passes
    pub fn validate_lenient<F>(
        &self,
        ctx: &CartContext,
        codes: &[String],
        has_capacity: F,
    ) -> StorageResult<ValidationOutcome>
    where
        F: FnMut(&CouponRule) -> StorageResult<bool>,
    {
        if ctx.item_qty == 0 {
            let rejected = codes
                .iter()
                .map(|code| RejectedCode {
                    code: code.clone(),
                    reason: RejectReason::EmptyCart,
                })
                .collect();
            return Ok(ValidationOutcome {
                accepted: vec![],
                rejected,
            });
        }
        self.walk(ctx, codes, true, has_capacity)
    }

    fn walk<F>(
        &self,
        ctx: &CartContext,
        codes: &[String],
        enforce_cap: bool,
        mut has_capacity: F,
    ) -> StorageResult<ValidationOutcome>
    where
        F: FnMut(&CouponRule) -> StorageResult<bool>,
    {
        let mut outcome = ValidationOutcome::default();
        let mut seen_codes = HashSet::new();
        let mut seen_rules = HashSet::new();
        let mut chain = StopChain::new();

        for code in codes {
            let reject = |outcome: &mut ValidationOutcome, reason| {
                outcome.rejected.push(RejectedCode {
                    code: code.clone(),
                    reason,
                })
            };

            if !seen_codes.insert(code.as_str()) {
                reject(&mut outcome, RejectReason::Duplicate);
                continue;
            }
            if !chain.is_open() {
                reject(&mut outcome, RejectReason::AfterStopRule);
                continue;
            }
            if enforce_cap && outcome.accepted.len() >= self.max_coupons {
                reject(&mut outcome, RejectReason::OverLimit);
                continue;
            }
            let Some(rule) = self.matcher.resolve(ctx, code) else {
                reject(&mut outcome, RejectReason::NotApplicable);
                continue;
            };
            if seen_rules.contains(&rule.id) {
                reject(&mut outcome, RejectReason::SameRule);
                continue;
            }
            if !has_capacity(&rule)? {
                reject(&mut outcome, RejectReason::UsageLimit);
                continue;
            }

            seen_rules.insert(rule.id);
            chain.admit(&rule);
            outcome.accepted.push(ResolvedCoupon {
                code: code.clone(),
                rule,
            });
        }

        Ok(outcome)
    }
}
