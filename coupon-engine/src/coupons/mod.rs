//! Coupon sets
//!
//! - **set**: mutations (apply / append / replace / remove) and merge union
//! - **validator**: batch validation of a resulting set
//! - **error**: coupon and lifecycle error taxonomy

pub mod error;
pub mod set;
pub mod validator;

pub use error::{CouponError, CouponResult, quote_codes};
pub use set::{CouponMutation, merge_codes};
pub use validator::{CouponValidator, RejectReason, RejectedCode, ValidationOutcome};
