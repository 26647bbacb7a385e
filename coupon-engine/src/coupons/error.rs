use crate::orders::storage::StorageError;
use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Coupon and lifecycle errors
#[derive(Debug, Error)]
pub enum CouponError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Cart does not contain products.")]
    EmptyCart,

    #[error("Maximum allowed number of applied coupons was exceeded.")]
    TooManyCoupons,

    #[error("The following coupon codes could not be applied: {}.", quote_codes(.0))]
    CouponsNotApplicable(Vec<String>),

    #[error(
        "The following coupon codes could not be applied: usage limit exceeded ({})",
        quote_codes(.0)
    )]
    UsageLimitRace(Vec<String>),

    #[error("Cart not found: {0}")]
    CartNotFound(String),

    #[error("Order not found: {0}")]
    OrderNotFound(String),
}

impl CouponError {
    /// Whether the caller may retry after re-validating the cart
    pub fn is_retryable(&self) -> bool {
        matches!(self, CouponError::UsageLimitRace(_))
    }

    /// Coupon codes the error refers to
    pub fn codes(&self) -> &[String] {
        match self {
            CouponError::CouponsNotApplicable(codes) | CouponError::UsageLimitRace(codes) => codes,
            _ => &[],
        }
    }
}

/// `"A","B"`
pub fn quote_codes(codes: &[String]) -> String {
    codes
        .iter()
        .map(|c| format!("\"{}\"", c))
        .collect::<Vec<_>>()
        .join(",")
}

/// Map a storage error to an error code
fn classify_storage_error(e: &StorageError) -> ErrorCode {
    match e {
        StorageError::Serialization(_) => return ErrorCode::StorageCorrupted,
        StorageError::Io(_) => return ErrorCode::DatabaseError,
        _ => {}
    }

    // redb errors are classified by message
    let err_str = e.to_string().to_lowercase();

    if err_str.contains("no space") || err_str.contains("disk full") || err_str.contains("enospc")
    {
        return ErrorCode::StorageFull;
    }

    if err_str.contains("corrupt") || err_str.contains("invalid database") {
        return ErrorCode::StorageCorrupted;
    }

    // Database/Transaction/Table/Storage/Commit errors default to busy
    ErrorCode::SystemBusy
}

impl From<CouponError> for AppError {
    fn from(err: CouponError) -> Self {
        let message = err.to_string();
        match err {
            CouponError::Storage(e) => {
                let code = classify_storage_error(&e);
                tracing::error!(error = %e, error_code = ?code, "Storage error occurred");
                AppError::with_message(code, message)
            }
            CouponError::EmptyCart => AppError::new(ErrorCode::CartEmpty),
            CouponError::TooManyCoupons => AppError::new(ErrorCode::TooManyCoupons),
            CouponError::CouponsNotApplicable(codes) => {
                AppError::with_message(ErrorCode::CouponsNotApplicable, message)
                    .with_detail("codes", codes)
            }
            CouponError::UsageLimitRace(codes) => {
                AppError::with_message(ErrorCode::CouponUsageLimitExceeded, message)
                    .with_detail("codes", codes)
            }
            CouponError::CartNotFound(id) => {
                AppError::with_message(ErrorCode::CartNotFound, message).with_detail("cart_id", id)
            }
            CouponError::OrderNotFound(id) => {
                AppError::with_message(ErrorCode::OrderNotFound, message)
                    .with_detail("order_id", id)
            }
        }
    }
}

pub type CouponResult<T> = Result<T, CouponError>;
