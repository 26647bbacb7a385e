//! redb-based storage for carts, placed orders and coupon usage
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `carts` | `cart_id` | `Cart` | Draft carts with their coupon set |
//! | `orders` | `order_id` | `PlacedOrder` | Placed / cancelled orders |
//! | `rule_usage` | `rule_id` | `u64` | Global usage per rule |
//! | `customer_usage` | `(rule_id, customer_id)` | `u64` | Usage per rule and customer |
//!
//! # Transactions
//!
//! redb admits a single write transaction at a time. Every mutating method
//! takes the caller's `WriteTransaction`, so a validation pass and the writes
//! it guards commit or abort together.

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};
use shared::order::{Cart, PlacedOrder};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Table for draft carts: key = cart_id, value = JSON-serialized Cart
const CARTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("carts");

/// Table for placed orders: key = order_id, value = JSON-serialized PlacedOrder
const ORDERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("orders");

/// Table for global rule usage: key = rule_id, value = times used
const RULE_USAGE_TABLE: TableDefinition<i64, u64> = TableDefinition::new("rule_usage");

/// Table for per-customer usage: key = (rule_id, customer_id), value = times used
const CUSTOMER_USAGE_TABLE: TableDefinition<(i64, i64), u64> =
    TableDefinition::new("customer_usage");

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Coupon storage backed by redb
#[derive(Clone)]
pub struct CouponStorage {
    db: Arc<Database>,
}

impl std::fmt::Debug for CouponStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CouponStorage").finish_non_exhaustive()
    }
}

impl CouponStorage {
    /// Open or create the database at the given path
    ///
    /// Commits are durable once `commit()` returns (redb's default
    /// `Durability::Immediate`).
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            // Create all tables if they don't exist
            let _ = write_txn.open_table(CARTS_TABLE)?;
            let _ = write_txn.open_table(ORDERS_TABLE)?;
            let _ = write_txn.open_table(RULE_USAGE_TABLE)?;
            let _ = write_txn.open_table(CUSTOMER_USAGE_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Begin a write transaction
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== Cart Operations ==========

    /// Store a cart
    pub fn store_cart(&self, txn: &WriteTransaction, cart: &Cart) -> StorageResult<()> {
        let mut table = txn.open_table(CARTS_TABLE)?;
        let value = serde_json::to_vec(cart)?;
        table.insert(cart.id.as_str(), value.as_slice())?;
        Ok(())
    }

    /// Get a cart by ID (within transaction)
    pub fn get_cart_txn(
        &self,
        txn: &WriteTransaction,
        cart_id: &str,
    ) -> StorageResult<Option<Cart>> {
        let table = txn.open_table(CARTS_TABLE)?;
        match table.get(cart_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Get a cart by ID
    pub fn get_cart(&self, cart_id: &str) -> StorageResult<Option<Cart>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CARTS_TABLE)?;
        match table.get(cart_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Remove a cart
    pub fn remove_cart(&self, txn: &WriteTransaction, cart_id: &str) -> StorageResult<()> {
        let mut table = txn.open_table(CARTS_TABLE)?;
        table.remove(cart_id)?;
        Ok(())
    }

    // ========== Order Operations ==========

    /// Store a placed order
    pub fn store_order(&self, txn: &WriteTransaction, order: &PlacedOrder) -> StorageResult<()> {
        let mut table = txn.open_table(ORDERS_TABLE)?;
        let value = serde_json::to_vec(order)?;
        table.insert(order.id.as_str(), value.as_slice())?;
        Ok(())
    }

    /// Get an order by ID (within transaction)
    pub fn get_order_txn(
        &self,
        txn: &WriteTransaction,
        order_id: &str,
    ) -> StorageResult<Option<PlacedOrder>> {
        let table = txn.open_table(ORDERS_TABLE)?;
        match table.get(order_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Get an order by ID
    pub fn get_order(&self, order_id: &str) -> StorageResult<Option<PlacedOrder>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        match table.get(order_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    // ========== Usage Counters ==========

    /// Global usage for a rule (within transaction)
    pub fn rule_usage_txn(&self, txn: &WriteTransaction, rule_id: i64) -> StorageResult<u64> {
        let table = txn.open_table(RULE_USAGE_TABLE)?;
        Ok(table.get(rule_id)?.map(|g| g.value()).unwrap_or(0))
    }

    /// Set global usage for a rule; zero removes the entry
    pub fn set_rule_usage(
        &self,
        txn: &WriteTransaction,
        rule_id: i64,
        count: u64,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(RULE_USAGE_TABLE)?;
        if count == 0 {
            table.remove(rule_id)?;
        } else {
            table.insert(rule_id, count)?;
        }
        Ok(())
    }

    /// Usage for a rule by one customer (within transaction)
    pub fn customer_usage_txn(
        &self,
        txn: &WriteTransaction,
        rule_id: i64,
        customer_id: i64,
    ) -> StorageResult<u64> {
        let table = txn.open_table(CUSTOMER_USAGE_TABLE)?;
        Ok(table
            .get((rule_id, customer_id))?
            .map(|g| g.value())
            .unwrap_or(0))
    }

    /// Set usage for a rule by one customer; zero removes the entry
    pub fn set_customer_usage(
        &self,
        txn: &WriteTransaction,
        rule_id: i64,
        customer_id: i64,
        count: u64,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(CUSTOMER_USAGE_TABLE)?;
        if count == 0 {
            table.remove((rule_id, customer_id))?;
        } else {
            table.insert((rule_id, customer_id), count)?;
        }
        Ok(())
    }

    /// Global usage for a rule
    pub fn get_rule_usage(&self, rule_id: i64) -> StorageResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(RULE_USAGE_TABLE)?;
        Ok(table.get(rule_id)?.map(|g| g.value()).unwrap_or(0))
    }

    /// Usage for a rule by one customer
    pub fn get_customer_usage(&self, rule_id: i64, customer_id: i64) -> StorageResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CUSTOMER_USAGE_TABLE)?;
        Ok(table
            .get((rule_id, customer_id))?
            .map(|g| g.value())
            .unwrap_or(0))
    }
}
