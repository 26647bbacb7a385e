//! CouponManager - cart coupon sets and the cart-to-order lifecycle
//!
//! This module handles:
//! - Coupon set mutations with batch validation
//! - Cart merge with lenient re-validation
//! - Totals collection through the discount engine
//! - Usage accounting on order placement and cancellation
//! - Event broadcasting after commit
//!
//! # Mutation Flow
//!
//! ```text
//! mutate(cart_id, mutation)
//!     ├─ 1. Begin write transaction
//!     ├─ 2. Load cart
//!     ├─ 3. Compute resulting code list
//!     ├─ 4. Validate (skipped for removals and empty sets)
//!     ├─ 5. Store cart (coupon set + legacy field)
//!     ├─ 6. Commit transaction
//!     └─ 7. Broadcast CouponEvent
//! ```
//!
//! redb runs one write transaction at a time, so validation and the write it
//! guards can never interleave with another placement.

use super::ledger::UsageLedger;
use super::storage::{CouponStorage, StorageError};
use crate::core::Config;
use crate::coupons::{CouponError, CouponMutation, CouponResult, CouponValidator, merge_codes};
use crate::pricing::{
    CartContext, DiscountEngine, PricingInput, ResolvedCoupon, RuleMatcher, StopChain,
};
use redb::WriteTransaction;
use rust_decimal::Decimal;
use shared::order::{
    Cart, CartLine, CouponEvent, DiscountTotals, OrderStatus, PlacedOrder, RuleUsage,
    legacy_coupon_code,
};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Event broadcast channel capacity
const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Coupon lifecycle coordinator
///
/// Cheap to clone; clones share storage, matcher and event channel.
#[derive(Clone)]
pub struct CouponManager {
    storage: CouponStorage,
    matcher: Arc<dyn RuleMatcher>,
    engine: DiscountEngine,
    max_coupons: usize,
    event_tx: broadcast::Sender<CouponEvent>,
}

impl std::fmt::Debug for CouponManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CouponManager")
            .field("storage", &"<CouponStorage>")
            .field("matcher", &"<dyn RuleMatcher>")
            .field("max_coupons", &self.max_coupons)
            .field("scale", &self.engine.scale())
            .finish()
    }
}

impl CouponManager {
    /// Open the database under the configured work dir
    pub fn new(config: &Config, matcher: Arc<dyn RuleMatcher>) -> CouponResult<Self> {
        let db_path = config.db_path();
        let storage = CouponStorage::open(&db_path)?;
        let manager = Self::with_storage(
            storage,
            matcher,
            config.effective_max_coupons(),
            config.currency_scale,
        );
        tracing::info!(
            db_path = %db_path.display(),
            environment = %config.environment,
            max_coupons = manager.max_coupons,
            multi_coupon = config.multi_coupon_enabled,
            "CouponManager started"
        );
        Ok(manager)
    }

    /// Create a manager over existing storage
    pub fn with_storage(
        storage: CouponStorage,
        matcher: Arc<dyn RuleMatcher>,
        max_coupons: usize,
        currency_scale: u32,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            storage,
            matcher,
            engine: DiscountEngine::new(currency_scale),
            max_coupons: max_coupons.max(1),
            event_tx,
        }
    }

    /// Subscribe to coupon events
    pub fn subscribe(&self) -> broadcast::Receiver<CouponEvent> {
        self.event_tx.subscribe()
    }

    /// Effective coupon cap per cart
    pub fn max_coupons(&self) -> usize {
        self.max_coupons
    }

    fn publish(&self, event: CouponEvent) {
        if self.event_tx.send(event).is_err() {
            tracing::trace!("Coupon event not broadcast: no active receivers");
        }
    }

    fn load_cart(&self, txn: &WriteTransaction, cart_id: &str) -> CouponResult<Cart> {
        self.storage
            .get_cart_txn(txn, cart_id)?
            .ok_or_else(|| CouponError::CartNotFound(cart_id.to_string()))
    }

    // ========== Carts ==========

    /// Create an empty cart
    pub fn create_cart(&self, customer_id: Option<i64>, store_id: i64) -> CouponResult<Cart> {
        let cart = Cart::new(uuid::Uuid::new_v4().to_string(), customer_id, store_id);
        let txn = self.storage.begin_write()?;
        self.storage.store_cart(&txn, &cart)?;
        txn.commit().map_err(StorageError::from)?;
        tracing::debug!(cart_id = %cart.id, customer_id = ?customer_id, "Cart created");
        Ok(cart)
    }

    /// Get a cart by ID
    pub fn get_cart(&self, cart_id: &str) -> CouponResult<Cart> {
        self.storage
            .get_cart(cart_id)?
            .ok_or_else(|| CouponError::CartNotFound(cart_id.to_string()))
    }

    /// Add product lines to a cart
    pub fn add_items(&self, cart_id: &str, lines: Vec<CartLine>) -> CouponResult<Cart> {
        let txn = self.storage.begin_write()?;
        let mut cart = self.load_cart(&txn, cart_id)?;
        for line in lines.into_iter().filter(|l| l.quantity > 0) {
            cart.add_line(line);
        }
        cart.updated_at = shared::util::now_millis();
        self.storage.store_cart(&txn, &cart)?;
        txn.commit().map_err(StorageError::from)?;
        Ok(cart)
    }

    /// Set the cart's shipping amount (negative is treated as zero)
    pub fn set_shipping_amount(&self, cart_id: &str, amount: Decimal) -> CouponResult<Cart> {
        let txn = self.storage.begin_write()?;
        let mut cart = self.load_cart(&txn, cart_id)?;
        cart.shipping_amount = amount.max(Decimal::ZERO);
        cart.updated_at = shared::util::now_millis();
        self.storage.store_cart(&txn, &cart)?;
        txn.commit().map_err(StorageError::from)?;
        Ok(cart)
    }

    // ========== Coupon Set ==========

    /// Install `codes` as the cart's coupon set
    pub fn apply_coupons(&self, cart_id: &str, codes: Vec<String>) -> CouponResult<Vec<String>> {
        self.mutate(cart_id, CouponMutation::Apply(codes))
    }

    /// Add `codes` after the cart's current codes
    pub fn append_coupons(&self, cart_id: &str, codes: Vec<String>) -> CouponResult<Vec<String>> {
        self.mutate(cart_id, CouponMutation::Append(codes))
    }

    /// Replace the cart's coupon set with `codes`
    pub fn replace_coupons(&self, cart_id: &str, codes: Vec<String>) -> CouponResult<Vec<String>> {
        self.mutate(cart_id, CouponMutation::Replace(codes))
    }

    /// Remove `codes` from the cart; unknown codes are ignored
    pub fn remove_coupons(&self, cart_id: &str, codes: Vec<String>) -> CouponResult<Vec<String>> {
        self.mutate(cart_id, CouponMutation::Remove(codes))
    }

    /// Clear the cart's coupon set
    pub fn remove_all_coupons(&self, cart_id: &str) -> CouponResult<Vec<String>> {
        self.mutate(cart_id, CouponMutation::RemoveAll)
    }

    /// Run one coupon set mutation; the set is unchanged on any error
    pub fn mutate(&self, cart_id: &str, mutation: CouponMutation) -> CouponResult<Vec<String>> {
        let txn = self.storage.begin_write()?;
        let mut cart = self.load_cart(&txn, cart_id)?;
        let codes = mutation.resulting_codes(&cart.coupon_codes);

        if mutation.is_removal() {
            if codes == cart.coupon_codes {
                return Ok(codes);
            }
        } else if !codes.is_empty() {
            let ctx = CartContext::from_cart(&cart);
            let ledger = UsageLedger::new(&self.storage, &txn);
            let validator = CouponValidator::new(self.matcher.as_ref(), self.max_coupons);
            let customer_id = cart.customer_id;

            if let Err(e) = validator.validate_strict(&ctx, &codes, |rule| {
                ledger.check_capacity(rule, customer_id)
            }) {
                match &e {
                    CouponError::Storage(err) => tracing::error!(
                        cart_id = %cart_id,
                        error = %err,
                        "Coupon validation failed"
                    ),
                    _ => tracing::warn!(
                        cart_id = %cart_id,
                        operation = mutation.name(),
                        codes = ?codes,
                        error = %e,
                        "Coupon codes rejected"
                    ),
                }
                return Err(e);
            }
        }

        cart.set_coupon_codes(codes.clone());
        cart.updated_at = shared::util::now_millis();
        self.storage.store_cart(&txn, &cart)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(
            cart_id = %cart_id,
            operation = mutation.name(),
            coupon_codes = ?codes,
            "Coupon set updated"
        );
        self.publish(CouponEvent::CouponsChanged {
            cart_id: cart_id.to_string(),
            coupon_codes: codes.clone(),
        });
        Ok(codes)
    }

    // ========== Merge ==========

    /// Merge `source_id` into `destination_id`
    ///
    /// Lines move to the destination, the coupon sets are unioned
    /// (destination first) and re-validated; codes that fail are dropped
    /// instead of failing the merge. The source cart is deleted.
    pub fn merge_carts(&self, source_id: &str, destination_id: &str) -> CouponResult<Cart> {
        if source_id == destination_id {
            return self.get_cart(destination_id);
        }

        let txn = self.storage.begin_write()?;
        let source = self.load_cart(&txn, source_id)?;
        let mut destination = self.load_cart(&txn, destination_id)?;

        for line in source.lines {
            destination.add_line(line);
        }

        let union = merge_codes(&destination.coupon_codes, &source.coupon_codes);
        let (accepted, dropped) = if union.is_empty() {
            (vec![], vec![])
        } else {
            let ctx = CartContext::from_cart(&destination);
            let ledger = UsageLedger::new(&self.storage, &txn);
            let validator = CouponValidator::new(self.matcher.as_ref(), self.max_coupons);
            let customer_id = destination.customer_id;
            let outcome = validator.validate_lenient(&ctx, &union, |rule| {
                ledger.check_capacity(rule, customer_id)
            })?;
            (outcome.accepted_codes(), outcome.rejected_codes())
        };

        destination.set_coupon_codes(accepted.clone());
        destination.updated_at = shared::util::now_millis();
        self.storage.store_cart(&txn, &destination)?;
        self.storage.remove_cart(&txn, source_id)?;
        txn.commit().map_err(StorageError::from)?;

        if !dropped.is_empty() {
            tracing::warn!(
                destination_cart_id = %destination_id,
                dropped_codes = ?dropped,
                "Coupon codes dropped during cart merge"
            );
        }
        tracing::info!(
            source_cart_id = %source_id,
            destination_cart_id = %destination_id,
            coupon_codes = ?accepted,
            "Carts merged"
        );
        self.publish(CouponEvent::CartsMerged {
            source_cart_id: source_id.to_string(),
            destination_cart_id: destination_id.to_string(),
            coupon_codes: accepted,
            dropped_codes: dropped,
        });
        Ok(destination)
    }

    // ========== Totals ==========

    /// Price a cart with its current coupon set
    ///
    /// Codes that no longer resolve are skipped.
    pub fn collect_totals(&self, cart_id: &str) -> CouponResult<DiscountTotals> {
        let cart = self.get_cart(cart_id)?;
        let ctx = CartContext::from_cart(&cart);

        let mut resolved = Vec::with_capacity(cart.coupon_codes.len());
        for code in &cart.coupon_codes {
            match self.matcher.resolve(&ctx, code) {
                Some(rule) => resolved.push(ResolvedCoupon {
                    code: code.clone(),
                    rule,
                }),
                None => tracing::debug!(
                    cart_id = %cart_id,
                    code = %code,
                    "Coupon skipped: no longer applicable"
                ),
            }
        }

        Ok(self.engine.compute(pricing_input(&cart), &effective_coupons(resolved)))
    }

    // ========== Lifecycle ==========

    /// Turn a cart into a placed order, consuming coupon usage
    ///
    /// Any code that no longer resolves, or whose rule has run out of uses,
    /// fails the placement and nothing is written.
    pub fn place_order(&self, cart_id: &str) -> CouponResult<PlacedOrder> {
        let txn = self.storage.begin_write()?;
        let cart = self.load_cart(&txn, cart_id)?;
        if cart.is_empty() {
            return Err(CouponError::EmptyCart);
        }

        let ctx = CartContext::from_cart(&cart);
        let mut resolved = Vec::with_capacity(cart.coupon_codes.len());
        let mut missing = Vec::new();
        for code in &cart.coupon_codes {
            match self.matcher.resolve(&ctx, code) {
                Some(rule) => resolved.push(ResolvedCoupon {
                    code: code.clone(),
                    rule,
                }),
                None => missing.push(code.clone()),
            }
        }
        if !missing.is_empty() {
            tracing::warn!(
                cart_id = %cart_id,
                codes = ?missing,
                "Order placement rejected: coupons no longer applicable"
            );
            return Err(CouponError::CouponsNotApplicable(missing));
        }

        let applied = effective_coupons(resolved);
        let mut exhausted = Vec::new();
        {
            let ledger = UsageLedger::new(&self.storage, &txn);
            for coupon in &applied {
                if !ledger.increment(&coupon.rule, cart.customer_id)? {
                    exhausted.push(coupon.code.clone());
                }
            }
        }
        if !exhausted.is_empty() {
            tracing::warn!(
                cart_id = %cart_id,
                codes = ?exhausted,
                "Order placement lost usage race"
            );
            return Err(CouponError::UsageLimitRace(exhausted));
        }

        let totals = self.engine.compute(pricing_input(&cart), &applied);
        let order = PlacedOrder {
            id: uuid::Uuid::new_v4().to_string(),
            cart_id: cart.id.clone(),
            customer_id: cart.customer_id,
            store_id: cart.store_id,
            status: OrderStatus::Placed,
            coupon_code: legacy_coupon_code(&cart.coupon_codes),
            coupon_codes: cart.coupon_codes.clone(),
            applied_rules: applied
                .iter()
                .map(|c| RuleUsage {
                    code: c.code.clone(),
                    rule_id: c.rule.id,
                })
                .collect(),
            totals,
            placed_at: shared::util::now_millis(),
            cancelled_at: None,
        };

        self.storage.store_order(&txn, &order)?;
        self.storage.remove_cart(&txn, cart_id)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(
            order_id = %order.id,
            cart_id = %cart_id,
            coupon_codes = ?order.coupon_codes,
            grand_total = %order.totals.grand_total,
            "Order placed"
        );
        self.publish(CouponEvent::OrderPlaced {
            order_id: order.id.clone(),
            cart_id: order.cart_id.clone(),
            coupon_codes: order.coupon_codes.clone(),
        });
        Ok(order)
    }

    /// Cancel a placed order, releasing its coupon usage
    ///
    /// Cancelling an already cancelled order changes nothing.
    pub fn cancel_order(&self, order_id: &str) -> CouponResult<PlacedOrder> {
        let txn = self.storage.begin_write()?;
        let mut order = self
            .storage
            .get_order_txn(&txn, order_id)?
            .ok_or_else(|| CouponError::OrderNotFound(order_id.to_string()))?;

        if order.is_cancelled() {
            tracing::debug!(order_id = %order_id, "Order already cancelled");
            return Ok(order);
        }

        {
            let ledger = UsageLedger::new(&self.storage, &txn);
            for usage in &order.applied_rules {
                ledger.decrement(usage.rule_id, order.customer_id)?;
            }
        }

        order.status = OrderStatus::Cancelled;
        order.cancelled_at = Some(shared::util::now_millis());
        self.storage.store_order(&txn, &order)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(order_id = %order_id, coupon_codes = ?order.coupon_codes, "Order cancelled");
        self.publish(CouponEvent::OrderCancelled {
            order_id: order.id.clone(),
            coupon_codes: order.coupon_codes.clone(),
        });
        Ok(order)
    }

    /// Get an order by ID
    pub fn get_order(&self, order_id: &str) -> CouponResult<PlacedOrder> {
        self.storage
            .get_order(order_id)?
            .ok_or_else(|| CouponError::OrderNotFound(order_id.to_string()))
    }

    // ========== Usage ==========

    /// Global usage count for a rule
    pub fn rule_usage(&self, rule_id: i64) -> CouponResult<u64> {
        Ok(self.storage.get_rule_usage(rule_id)?)
    }

    /// Usage count for a rule by one customer
    pub fn customer_usage(&self, rule_id: i64, customer_id: i64) -> CouponResult<u64> {
        Ok(self.storage.get_customer_usage(rule_id, customer_id)?)
    }
}

fn pricing_input(cart: &Cart) -> PricingInput {
    PricingInput {
        subtotal: cart.subtotal(),
        shipping: cart.shipping_amount,
        item_qty: cart.item_qty(),
    }
}

/// Coupons that take effect: one per rule, nothing after a stop rule
fn effective_coupons(resolved: Vec<ResolvedCoupon>) -> Vec<ResolvedCoupon> {
    let mut chain = StopChain::new();
    let mut seen_rules = HashSet::new();
    let mut applied = Vec::with_capacity(resolved.len());
    for coupon in resolved {
        if !chain.is_open() {
            break;
        }
        if !seen_rules.insert(coupon.rule.id) {
            continue;
        }
        chain.admit(&coupon.rule);
        applied.push(coupon);
    }
    applied
}

#[cfg(test)]
mod tests;
