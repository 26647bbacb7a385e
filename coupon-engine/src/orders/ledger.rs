//! Usage Ledger
//!
//! Per-rule usage counters (global and per customer) bound to one write
//! transaction. Increments happen when an order is placed, decrements when it
//! is cancelled; nothing else touches the counters.

use super::storage::{CouponStorage, StorageResult};
use crate::utils::logger::USAGE_TARGET;
use redb::WriteTransaction;
use shared::models::CouponRule;

pub struct UsageLedger<'a> {
    storage: &'a CouponStorage,
    txn: &'a WriteTransaction,
}

impl<'a> UsageLedger<'a> {
    pub fn new(storage: &'a CouponStorage, txn: &'a WriteTransaction) -> Self {
        Self { storage, txn }
    }

    /// Whether one more use of `rule` fits its caps
    ///
    /// The per-customer cap is only checked for known customers.
    pub fn check_capacity(
        &self,
        rule: &CouponRule,
        customer_id: Option<i64>,
    ) -> StorageResult<bool> {
        if !rule.has_usage_limits() {
            return Ok(true);
        }
        if let Some(limit) = rule.uses_per_coupon
            && self.storage.rule_usage_txn(self.txn, rule.id)? >= u64::from(limit)
        {
            return Ok(false);
        }
        if let (Some(limit), Some(customer_id)) = (rule.uses_per_customer, customer_id)
            && self.storage.customer_usage_txn(self.txn, rule.id, customer_id)? >= u64::from(limit)
        {
            return Ok(false);
        }
        Ok(true)
    }

    /// Record one use of `rule`; returns false without writing when a cap is reached
    pub fn increment(&self, rule: &CouponRule, customer_id: Option<i64>) -> StorageResult<bool> {
        if !self.check_capacity(rule, customer_id)? {
            return Ok(false);
        }

        let global = self.storage.rule_usage_txn(self.txn, rule.id)? + 1;
        self.storage.set_rule_usage(self.txn, rule.id, global)?;

        if let Some(customer_id) = customer_id {
            let times = self.storage.customer_usage_txn(self.txn, rule.id, customer_id)? + 1;
            self.storage.set_customer_usage(self.txn, rule.id, customer_id, times)?;
        }

        tracing::info!(
            target: USAGE_TARGET,
            rule_id = rule.id,
            customer_id = ?customer_id,
            times_used = global,
            "Rule usage incremented"
        );
        Ok(true)
    }

    /// Release one use of `rule_id`; counters never drop below zero
    pub fn decrement(&self, rule_id: i64, customer_id: Option<i64>) -> StorageResult<()> {
        let global = self.storage.rule_usage_txn(self.txn, rule_id)?;
        if global > 0 {
            self.storage.set_rule_usage(self.txn, rule_id, global - 1)?;
        }

        if let Some(customer_id) = customer_id {
            let times = self.storage.customer_usage_txn(self.txn, rule_id, customer_id)?;
            if times > 0 {
                self.storage.set_customer_usage(self.txn, rule_id, customer_id, times - 1)?;
            }
        }

        tracing::info!(
            target: USAGE_TARGET,
            rule_id,
            customer_id = ?customer_id,
            times_used = global.saturating_sub(1),
            "Rule usage decremented"
        );
        Ok(())
    }
}
