//! Discount pricing
//!
//! - `matcher`: resolves coupon codes to rules for a cart
//! - `chain`: stop-rules-processing short circuit shared by validation and pricing
//! - `calculator`: sequential discount computation

mod calculator;
pub mod chain;
pub mod matcher;

pub use calculator::*;
pub use chain::StopChain;
pub use matcher::{CartContext, CatalogRuleMatcher, ResolvedCoupon, RuleMatcher};
