//! Coupon Engine - multi-coupon cart discounts
//!
//! Decides, for a cart carrying zero or more coupon codes, which codes are
//! valid, in what order their rules fire, how much each discounts, and how
//! usage counters follow the cart-to-order lifecycle.
//!
//! # Modules
//!
//! - `coupons` - coupon set mutations, validation and errors
//! - `pricing` - rule matching, stop-rule chain and the discount calculator
//! - `orders` - lifecycle coordinator, usage ledger and redb storage
//! - `core` - configuration
//! - `utils` - logging
//!
//! # Example
//!
//! ```no_run
//! use coupon_engine::{CatalogRuleMatcher, Config, CouponManager};
//! use std::sync::Arc;
//!
//! let config = Config::load();
//! let matcher = Arc::new(CatalogRuleMatcher::new());
//! let manager = CouponManager::new(&config, matcher)?;
//! let cart = manager.create_cart(Some(42), 1)?;
//! let totals = manager.collect_totals(&cart.id)?;
//! # Ok::<(), coupon_engine::CouponError>(())
//! ```

pub mod core;
pub mod coupons;
pub mod orders;
pub mod pricing;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

// Re-export public types
pub use crate::core::Config;
pub use coupons::{CouponError, CouponMutation, CouponResult};
pub use orders::{CouponManager, CouponStorage, StorageError, UsageLedger};
pub use pricing::{CartContext, CatalogRuleMatcher, DiscountEngine, ResolvedCoupon, RuleMatcher};
pub use utils::logger::{init_logger, init_logger_with_file};
