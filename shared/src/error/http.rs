//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,

            Self::NotFound | Self::CartNotFound | Self::OrderNotFound => StatusCode::NOT_FOUND,

            Self::CouponUsageLimitExceeded => StatusCode::CONFLICT,

            Self::CartEmpty | Self::TooManyCoupons | Self::CouponsNotApplicable => {
                StatusCode::UNPROCESSABLE_ENTITY
            }

            Self::SystemBusy => StatusCode::SERVICE_UNAVAILABLE,

            Self::Unknown
            | Self::InternalError
            | Self::DatabaseError
            | Self::StorageFull
            | Self::StorageCorrupted => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
