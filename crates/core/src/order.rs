//! Orders assembled at checkout.
//!
//! There is no order endpoint on the backend: an [`Order`] is a snapshot of
//! the cart taken when the cashier confirms checkout, used for the receipt
//! and the log, and then dropped.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cart::{CartItem, CartSummary};
use crate::types::{CartItemId, CustomerName, ProductId, Rupiah};

/// Errors building an [`Order`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    /// Checkout was attempted with nothing in the cart.
    #[error("cart is empty")]
    EmptyCart,
}

/// One cart record as it appears on the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub cart_item_id: CartItemId,
    pub product_id: Option<ProductId>,
    pub name: String,
    pub price: Rupiah,
    pub quantity: u32,
    pub note: Option<String>,
    pub line_total: Rupiah,
}

/// A checked-out order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub reference: Uuid,
    pub customer_name: CustomerName,
    pub note: Option<String>,
    pub items: Vec<OrderLine>,
    pub total_items: u64,
    pub total_price: Rupiah,
    pub timestamp: DateTime<Utc>,
}

impl Order {
    /// Snapshot `items` into an order for `customer_name`.
    ///
    /// `item_notes` overrides the note stored on each cart record; blank
    /// notes are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::EmptyCart`] if `items` is empty.
    pub fn build(
        customer_name: CustomerName,
        note: Option<&str>,
        items: &[CartItem],
        item_notes: &HashMap<CartItemId, String>,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, OrderError> {
        if items.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        let summary = CartSummary::of(items);
        let lines = items
            .iter()
            .map(|item| OrderLine {
                cart_item_id: item.id.clone(),
                product_id: item.product_id.clone(),
                name: item.name.clone(),
                price: item.price,
                quantity: item.quantity,
                note: non_blank(
                    item_notes
                        .get(&item.id)
                        .map(String::as_str)
                        .or(item.note.as_deref()),
                ),
                line_total: item.line_total(),
            })
            .collect();

        Ok(Self {
            reference: Uuid::new_v4(),
            customer_name,
            note: non_blank(note),
            items: lines,
            total_items: summary.total_items,
            total_price: summary.total_price,
            timestamp,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}
