//! Error codes for the coupon engine
//!
//! Codes are grouped by category:
//! - 0xxx: General errors
//! - 1xxx: Cart errors
//! - 2xxx: Coupon errors
//! - 3xxx: Order errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Serialized as a bare `u16` so any API layer can forward it unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Resource not found
    NotFound = 3,

    // ==================== 1xxx: Cart ====================
    /// Cart not found
    CartNotFound = 1001,
    /// Cart has no purchasable items
    CartEmpty = 1002,

    // ==================== 2xxx: Coupon ====================
    /// Too many coupon codes for the configured maximum
    TooManyCoupons = 2001,
    /// One or more coupon codes failed validation
    CouponsNotApplicable = 2002,
    /// Usage capacity consumed concurrently between validation and placement
    CouponUsageLimitExceeded = 2003,

    // ==================== 3xxx: Order ====================
    /// Order not found
    OrderNotFound = 3001,

    // ==================== 9xxx: System ====================
    InternalError = 9001,
    DatabaseError = 9002,

    // ==================== 94xx: Storage ====================
    StorageFull = 9401,
    StorageCorrupted = 9403,
    SystemBusy = 9404,
}

impl ErrorCode {
    /// Numeric value of the code
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Default English message for the code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::NotFound => "Resource not found",

            // Cart
            ErrorCode::CartNotFound => "Cart not found",
            ErrorCode::CartEmpty => "Cart does not contain products.",

            // Coupon
            ErrorCode::TooManyCoupons => {
                "Maximum allowed number of applied coupons was exceeded."
            }
            ErrorCode::CouponsNotApplicable => "The coupon codes could not be applied.",
            ErrorCode::CouponUsageLimitExceeded => "Coupon usage limit exceeded",

            // Order
            ErrorCode::OrderNotFound => "Order not found",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",

            // Storage
            ErrorCode::StorageFull => "Storage full (disk space insufficient)",
            ErrorCode::StorageCorrupted => "Storage corrupted (data file damaged)",
            ErrorCode::SystemBusy => "System busy, please retry later",
        }
    }

    /// Whether a client may retry the same request after re-validating
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorCode::CouponUsageLimitExceeded | ErrorCode::SystemBusy
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            3 => Ok(ErrorCode::NotFound),

            // Cart
            1001 => Ok(ErrorCode::CartNotFound),
            1002 => Ok(ErrorCode::CartEmpty),

            // Coupon
            2001 => Ok(ErrorCode::TooManyCoupons),
            2002 => Ok(ErrorCode::CouponsNotApplicable),
            2003 => Ok(ErrorCode::CouponUsageLimitExceeded),

            // Order
            3001 => Ok(ErrorCode::OrderNotFound),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),

            // Storage
            9401 => Ok(ErrorCode::StorageFull),
            9403 => Ok(ErrorCode::StorageCorrupted),
            9404 => Ok(ErrorCode::SystemBusy),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::CartEmpty.code(), 1002);
        assert_eq!(ErrorCode::TooManyCoupons.code(), 2001);
        assert_eq!(ErrorCode::OrderNotFound.code(), 3001);
        assert_eq!(ErrorCode::SystemBusy.code(), 9404);
    }

    #[test]
    fn test_try_from_round_trip() {
        for code in [
            ErrorCode::CartNotFound,
            ErrorCode::CouponsNotApplicable,
            ErrorCode::CouponUsageLimitExceeded,
            ErrorCode::OrderNotFound,
            ErrorCode::StorageCorrupted,
        ] {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
        assert_eq!(ErrorCode::try_from(4242), Err(InvalidErrorCode(4242)));
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::TooManyCoupons).unwrap();
        assert_eq!(json, "2001");

        let code: ErrorCode = serde_json::from_str("1002").unwrap();
        assert_eq!(code, ErrorCode::CartEmpty);

        assert!(serde_json::from_str::<ErrorCode>("77").is_err());
    }

    #[test]
    fn test_display_and_retryable() {
        assert_eq!(ErrorCode::CartEmpty.to_string(), "E1002");
        assert!(ErrorCode::CouponUsageLimitExceeded.is_retryable());
        assert!(!ErrorCode::CouponsNotApplicable.is_retryable());
    }
}
