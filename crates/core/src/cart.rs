//! Cart records and derived totals.
//!
//! The backend's `/cart` collection is the source of truth. Name and price
//! are copied from the product when the item is created and are not kept in
//! sync with the catalog afterwards.

use serde::{Deserialize, Deserializer, Serialize};

use crate::catalog::Product;
use crate::types::{CartItemId, ProductId, Rupiah};

/// A cart record as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    #[serde(rename = "productId", default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<ProductId>,
    #[serde(rename = "nama")]
    pub name: String,
    #[serde(rename = "harga")]
    pub price: Rupiah,
    /// At least 1 for records this screen writes. A record stored with a
    /// quantity below 1 by another client reads as 0; see [`Self::is_valid`].
    #[serde(rename = "jumlah", deserialize_with = "lenient_quantity")]
    pub quantity: u32,
    #[serde(rename = "keterangan", default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl CartItem {
    /// Whether the record holds a sellable quantity.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.quantity >= 1
    }

    /// The same record with a different quantity, ready for a full replace.
    #[must_use]
    pub fn with_quantity(&self, quantity: u32) -> Self {
        Self {
            quantity,
            ..self.clone()
        }
    }

    /// Price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Rupiah {
        self.price.times(self.quantity)
    }
}

/// A cart record before the backend has assigned it an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCartItem {
    #[serde(rename = "productId")]
    pub product_id: ProductId,
    #[serde(rename = "nama")]
    pub name: String,
    #[serde(rename = "harga")]
    pub price: Rupiah,
    #[serde(rename = "jumlah")]
    pub quantity: u32,
    #[serde(rename = "keterangan")]
    pub note: String,
}

impl NewCartItem {
    /// One unit of `product`, snapshotting its name and price.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
            quantity: 1,
            note: String::new(),
        }
    }
}

/// Totals shown in the cart panel and on the receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    pub total_items: u64,
    pub total_price: Rupiah,
}

impl CartSummary {
    /// Sum quantities and line totals over `items`.
    #[must_use]
    pub fn of(items: &[CartItem]) -> Self {
        Self {
            total_items: items.iter().map(|item| u64::from(item.quantity)).sum(),
            total_price: items.iter().map(CartItem::line_total).sum(),
        }
    }
}

/// Find the cart item that was created from `product_id`.
#[must_use]
pub fn find_by_product<'a>(items: &'a [CartItem], product_id: &ProductId) -> Option<&'a CartItem> {
    items
        .iter()
        .find(|item| item.product_id.as_ref() == Some(product_id))
}

/// Read a stored quantity. Values below 0 clamp to 0 and values past
/// `u32::MAX` saturate, so a single bad record does not fail the cart read.
fn lenient_quantity<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = i64::deserialize(deserializer)?;
    Ok(u32::try_from(raw.max(0)).unwrap_or(u32::MAX))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::CategoryId;

    fn item(id: i64, price: i64, quantity: u32) -> CartItem {
        CartItem {
            id: CartItemId::new(id),
            product_id: Some(ProductId::new(id * 10)),
            name: format!("Item {id}"),
            price: Rupiah::new(price),
            quantity,
            note: None,
        }
    }

    #[test]
    fn test_summary_example() {
        let items = vec![item(1, 10_000, 2), item(2, 5_000, 1)];
        let summary = CartSummary::of(&items);
        assert_eq!(summary.total_price, Rupiah::new(25_000));
        assert_eq!(summary.total_items, 3);
    }

    #[test]
    fn test_summary_empty() {
        assert_eq!(CartSummary::of(&[]), CartSummary::default());
    }

    #[test]
    fn test_cart_item_wire_format() {
        let json = r#"{"id": 4, "productId": 2, "nama": "Es Teh", "harga": 5000, "jumlah": 3, "keterangan": ""}"#;
        let parsed: CartItem = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.product_id, Some(ProductId::new(2)));
        assert_eq!(parsed.quantity, 3);
        assert_eq!(parsed.note.as_deref(), Some(""));

        let value = serde_json::to_value(parsed.with_quantity(4)).unwrap();
        assert_eq!(value["jumlah"], 4);
        assert_eq!(value["id"], 4);
        assert_eq!(value["nama"], "Es Teh");
    }

    #[test]
    fn test_cart_item_without_product_id() {
        let json = r#"{"id": 9, "nama": "Manual", "harga": 2000, "jumlah": 1}"#;
        let parsed: CartItem = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.product_id, None);
        assert_eq!(parsed.note, None);
    }

    #[test]
    fn test_new_item_snapshots_product() {
        let product = Product {
            id: ProductId::new(5),
            name: "Mie Ayam".to_string(),
            price: Rupiah::new(12_000),
            code: "MKN-005".to_string(),
            image: String::new(),
            category_id: CategoryId::new(1),
        };

        let new_item = NewCartItem::from_product(&product);
        assert_eq!(new_item.quantity, 1);
        assert_eq!(new_item.price, Rupiah::new(12_000));
        assert_eq!(new_item.note, "");

        let value = serde_json::to_value(&new_item).unwrap();
        assert!(value.get("id").is_none());
        assert_eq!(value["productId"], 5);
    }

    #[test]
    fn test_find_by_product() {
        let items = vec![item(1, 1_000, 1), item(2, 1_000, 1)];
        assert_eq!(
            find_by_product(&items, &ProductId::new(20)).map(|i| i.id.clone()),
            Some(CartItemId::new(2))
        );
        assert!(find_by_product(&items, &ProductId::new(99)).is_none());
    }

    #[test]
    fn test_cart_item_with_string_ids() {
        let json = r#"{"id": "9f3a", "productId": 2, "nama": "Es Teh", "harga": 5000, "jumlah": 1, "keterangan": ""}"#;
        let parsed: CartItem = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.id, CartItemId::new("9f3a"));
        assert_eq!(parsed.product_id, Some(ProductId::new(2)));

        let value = serde_json::to_value(&parsed).unwrap();
        assert_eq!(value["id"], "9f3a");
        assert_eq!(value["productId"], 2);
    }

    #[test]
    fn test_invalid_quantity_does_not_fail_the_cart() {
        let json = r#"[
            {"id": 1, "productId": 1, "nama": "Nasi Goreng", "harga": 25000, "jumlah": 1},
            {"id": 2, "productId": 3, "nama": "Es Teh", "harga": 5000, "jumlah": -1},
            {"id": 3, "productId": 2, "nama": "Mie Ayam", "harga": 20000, "jumlah": 0}
        ]"#;
        let parsed: Vec<CartItem> = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[1].quantity, 0);

        let valid: Vec<_> = parsed.iter().filter(|item| item.is_valid()).collect();
        assert_eq!(valid.len(), 1);
        assert_eq!(valid[0].name, "Nasi Goreng");
    }
}
