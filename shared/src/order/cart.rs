//! Cart - pre-purchase container for lines and coupon codes

use super::legacy_coupon_code;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One product line in a cart
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartLine {
    pub sku: String,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
}

impl CartLine {
    pub fn new(
        sku: impl Into<String>,
        name: impl Into<String>,
        unit_price: Decimal,
        quantity: u32,
    ) -> Self {
        Self {
            sku: sku.into(),
            name: name.into(),
            unit_price,
            quantity,
        }
    }

    pub fn row_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Shopping cart
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cart {
    pub id: String,
    /// None for guest carts
    pub customer_id: Option<i64>,
    pub store_id: i64,
    #[serde(default)]
    pub lines: Vec<CartLine>,
    #[serde(default)]
    pub shipping_amount: Decimal,
    /// Applied coupon codes in evaluation order
    #[serde(default)]
    pub coupon_codes: Vec<String>,
    /// Legacy single-coupon field
    #[serde(default)]
    pub coupon_code: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Cart {
    pub fn new(id: impl Into<String>, customer_id: Option<i64>, store_id: i64) -> Self {
        let now = crate::util::now_millis();
        Self {
            id: id.into(),
            customer_id,
            store_id,
            lines: vec![],
            shipping_amount: Decimal::ZERO,
            coupon_codes: vec![],
            coupon_code: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sum of line totals
    pub fn subtotal(&self) -> Decimal {
        self.lines.iter().map(CartLine::row_total).sum()
    }

    /// Total number of units across lines
    pub fn item_qty(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    /// True when the cart holds no purchasable units
    pub fn is_empty(&self) -> bool {
        self.item_qty() == 0
    }

    /// Install a coupon set, keeping the legacy field in step
    pub fn set_coupon_codes(&mut self, codes: Vec<String>) {
        self.coupon_code = legacy_coupon_code(&codes);
        self.coupon_codes = codes;
    }

    /// Add a line, summing quantities for an existing SKU (saturating)
    pub fn add_line(&mut self, line: CartLine) {
        match self.lines.iter_mut().find(|l| l.sku == line.sku) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(line.quantity),
            None => self.lines.push(line),
        }
    }
}
