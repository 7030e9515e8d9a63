//! Catalog records served by the backend: categories and products.
//!
//! Both are read-only from the point of view of the cashier screen.

use serde::{Deserialize, Serialize};

use crate::types::{CategoryId, ProductId, Rupiah};

/// A product category shown in the category filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    /// Icon class names, e.g. `fas fa-utensils`.
    #[serde(default)]
    pub icon: String,
}

/// A sellable product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    #[serde(rename = "nama")]
    pub name: String,
    #[serde(rename = "harga")]
    pub price: Rupiah,
    #[serde(rename = "kode", default)]
    pub code: String,
    /// Image path, usually below `/images/products/`.
    #[serde(rename = "gambar", default)]
    pub image: String,
    #[serde(rename = "kategori")]
    pub category_id: CategoryId,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_wire_format() {
        let json = r#"{
            "id": 1,
            "nama": "Nasi Goreng",
            "harga": 15000,
            "kode": "MKN-001",
            "gambar": "/images/products/nasi-goreng.jpg",
            "kategori": 1
        }"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.name, "Nasi Goreng");
        assert_eq!(product.price, Rupiah::new(15_000));
        assert_eq!(product.category_id, CategoryId::new(1));
    }

    #[test]
    fn test_category_icon_is_optional() {
        let category: Category = serde_json::from_str(r#"{"id": 2, "name": "Minuman"}"#).unwrap();
        assert_eq!(category.icon, "");
    }
}
