//! Unified error system for the coupon engine
//!
//! - [`ErrorCode`]: Standardized numeric error codes
//! - [`ErrorCategory`]: Classification of errors by domain
//! - [`AppError`]: Error with code, message, and details
//! - [`ApiResponse`]: Response envelope for an outer API layer
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 1xxx: Cart errors
//! - 2xxx: Coupon errors
//! - 3xxx: Order errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{ApiResponse, AppError, ErrorCode};
//!
//! let err = AppError::with_message(
//!     ErrorCode::CouponsNotApplicable,
//!     "The following coupon codes could not be applied: \"SPRING\".",
//! )
//! .with_detail("codes", vec!["SPRING"]);
//!
//! let response = ApiResponse::<()>::error(&err);
//! assert_eq!(response.code, Some(2002));
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiResponse, AppError, AppResult};
