//! Cart-to-order lifecycle
//!
//! - **manager**: CouponManager for coupon set mutations, merge, placement and cancellation
//! - **ledger**: per-rule usage counters bound to a write transaction
//! - **storage**: redb persistence for carts, orders and usage
//!
//! # Architecture
//!
//! ```text
//! apply / append / replace / remove ─┐
//! merge_carts ───────────────────────┤
//! place_order / cancel_order ────────┴→ CouponManager ─→ CouponStorage (redb)
//!                                            ↓                ↑
//!                                       Broadcast        UsageLedger
//!                                            ↓
//!                                     All Subscribers
//! ```

pub mod ledger;
pub mod manager;
pub mod storage;

// Re-exports
pub use ledger::UsageLedger;
pub use manager::CouponManager;
pub use storage::{CouponStorage, StorageError, StorageResult};
