//! Data models

pub mod coupon_rule;

pub use coupon_rule::{ActionType, CouponRule};
