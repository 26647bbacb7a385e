//! Shared types for the coupon engine
//!
//! Plain value types passed between the engine and its callers:
//! coupon rules, carts, placed orders, discount lines, coupon events,
//! and the unified error code system.

pub mod error;
pub mod models;
pub mod order;
pub mod util;

// Re-exports
pub use rust_decimal::Decimal;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use models::{ActionType, CouponRule};
pub use order::{
    AppliedTo, Cart, CartLine, CouponEvent, DiscountLine, DiscountTotals, OrderStatus,
    PlacedOrder, RuleUsage,
};
