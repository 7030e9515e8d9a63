//! Display data for templates.
//!
//! Everything here is pre-formatted so templates only print strings.

use kasir_core::{CartItem, Category, Order, OrderLine, Product};

use crate::page::PageState;

/// Image shown when a product has none, or its image fails to load.
pub const DEFAULT_PRODUCT_IMAGE: &str = "/static/images/products/default.jpg";

/// Category filter button.
#[derive(Clone)]
pub struct CategoryView {
    /// Empty for the "all products" button.
    pub id: String,
    pub name: String,
    pub icon: String,
    pub selected: bool,
}

/// Product card.
#[derive(Clone)]
pub struct ProductView {
    pub id: String,
    pub name: String,
    pub code: String,
    pub price: String,
    pub image: String,
    pub category_name: String,
}

/// Category filter plus the product grid.
#[derive(Clone)]
pub struct CatalogView {
    pub categories: Vec<CategoryView>,
    pub products: Vec<ProductView>,
}

/// One cart record in the cart panel.
#[derive(Clone)]
pub struct CartItemView {
    pub id: String,
    pub name: String,
    pub quantity: u32,
    pub decrement: u32,
    pub increment: u32,
    pub price: String,
    pub line_price: String,
    pub note: String,
}

/// Cart panel data.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub total_items: u64,
    pub total_price: String,
}

/// Kind of feedback notice, mapped to a CSS class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Warning,
    Error,
}

/// Feedback shown after an action.
#[derive(Clone)]
pub struct Notice {
    pub class: &'static str,
    pub title: String,
    pub message: String,
}

/// Order line on the receipt.
#[derive(Clone)]
pub struct ReceiptLineView {
    pub name: String,
    pub quantity: u32,
    pub line_price: String,
    pub note: String,
}

/// Checkout receipt.
#[derive(Clone)]
pub struct ReceiptView {
    pub reference: String,
    pub customer_name: String,
    pub note: String,
    pub lines: Vec<ReceiptLineView>,
    pub total_items: u64,
    pub total_price: String,
    pub timestamp: String,
}

impl CatalogView {
    #[must_use]
    pub fn from_state(state: &PageState) -> Self {
        let all = CategoryView {
            id: String::new(),
            name: "Semua".to_string(),
            icon: "fas fa-th-large".to_string(),
            selected: state.selected_category.is_none(),
        };

        let categories = std::iter::once(all)
            .chain(state.categories.iter().map(|category| CategoryView {
                selected: state.selected_category.as_ref() == Some(&category.id),
                ..CategoryView::from(category)
            }))
            .collect();

        let products = state
            .products
            .iter()
            .map(|product| ProductView::new(product, state.category_name(&product.category_id)))
            .collect();

        Self {
            categories,
            products,
        }
    }
}

impl From<&Category> for CategoryView {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id.to_string(),
            name: category.name.clone(),
            icon: category.icon.clone(),
            selected: false,
        }
    }
}

impl ProductView {
    #[must_use]
    pub fn new(product: &Product, category_name: &str) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            code: product.code.clone(),
            price: product.price.to_string(),
            image: image_url(&product.image),
            category_name: category_name.to_string(),
        }
    }
}

/// Map a backend image path onto the static root. Absolute URLs pass through.
fn image_url(image: &str) -> String {
    let image = image.trim();
    if image.is_empty() {
        DEFAULT_PRODUCT_IMAGE.to_string()
    } else if image.starts_with("http://")
        || image.starts_with("https://")
        || image.starts_with("/static/")
    {
        image.to_string()
    } else {
        format!("/static/{}", image.trim_start_matches('/'))
    }
}

impl CartView {
    #[must_use]
    pub fn from_state(state: &PageState) -> Self {
        let summary = state.summary();
        Self {
            items: state.cart.iter().map(CartItemView::from).collect(),
            total_items: summary.total_items,
            total_price: summary.total_price.to_string(),
        }
    }
}

impl From<&CartItem> for CartItemView {
    fn from(item: &CartItem) -> Self {
        Self {
            id: item.id.to_string(),
            name: item.name.clone(),
            quantity: item.quantity,
            decrement: item.quantity.saturating_sub(1),
            increment: item.quantity.saturating_add(1),
            price: item.price.to_string(),
            line_price: item.line_total().to_string(),
            note: item.note.clone().unwrap_or_default(),
        }
    }
}

impl Notice {
    #[must_use]
    pub fn new(kind: NoticeKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        let class = match kind {
            NoticeKind::Success => "notice notice-success",
            NoticeKind::Warning => "notice notice-warning",
            NoticeKind::Error => "notice notice-error",
        };
        Self {
            class,
            title: title.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NoticeKind::Success, title, message)
    }

    #[must_use]
    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NoticeKind::Warning, title, message)
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeKind::Error, "Error", message)
    }
}

impl From<&Order> for ReceiptView {
    fn from(order: &Order) -> Self {
        Self {
            reference: order.reference.to_string(),
            customer_name: order.customer_name.to_string(),
            note: order.note.clone().unwrap_or_default(),
            lines: order.items.iter().map(ReceiptLineView::from).collect(),
            total_items: order.total_items,
            total_price: order.total_price.to_string(),
            timestamp: order.timestamp.format("%d/%m/%Y %H:%M").to_string(),
        }
    }
}

impl From<&OrderLine> for ReceiptLineView {
    fn from(line: &OrderLine) -> Self {
        Self {
            name: line.name.clone(),
            quantity: line.quantity,
            line_price: line.line_total.to_string(),
            note: line.note.clone().unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kasir_core::{CartItemId, CategoryId, ProductId, Rupiah};

    fn state() -> PageState {
        PageState {
            categories: vec![Category {
                id: CategoryId::new(1),
                name: "Makanan".to_string(),
                icon: "fas fa-utensils".to_string(),
            }],
            products: vec![Product {
                id: ProductId::new(1),
                name: "Nasi Goreng".to_string(),
                price: Rupiah::new(15_000),
                code: "MKN-001".to_string(),
                image: String::new(),
                category_id: CategoryId::new(2),
            }],
            cart: vec![CartItem {
                id: CartItemId::new(3),
                product_id: Some(ProductId::new(1)),
                name: "Nasi Goreng".to_string(),
                price: Rupiah::new(15_000),
                quantity: 1,
                note: None,
            }],
            selected_category: Some(CategoryId::new(1)),
            ..PageState::default()
        }
    }

    #[test]
    fn test_catalog_marks_selection() {
        let catalog = CatalogView::from_state(&state());
        assert_eq!(catalog.categories.len(), 2);
        assert!(!catalog.categories[0].selected);
        assert!(catalog.categories[1].selected);
        assert_eq!(catalog.categories[0].name, "Semua");
    }

    #[test]
    fn test_product_view_fallbacks() {
        let catalog = CatalogView::from_state(&state());
        let product = &catalog.products[0];
        assert_eq!(product.image, DEFAULT_PRODUCT_IMAGE);
        assert_eq!(product.category_name, "Unknown");
        assert_eq!(product.price, "Rp 15.000");
    }

    #[test]
    fn test_image_url() {
        assert_eq!(
            image_url("/images/products/nasi-goreng.jpg"),
            "/static/images/products/nasi-goreng.jpg"
        );
        assert_eq!(image_url("https://cdn.test/a.jpg"), "https://cdn.test/a.jpg");
        assert_eq!(image_url("  "), DEFAULT_PRODUCT_IMAGE);
    }

    #[test]
    fn test_cart_view_buttons() {
        let cart = CartView::from_state(&state());
        assert_eq!(cart.items[0].decrement, 0);
        assert_eq!(cart.items[0].increment, 2);
        assert_eq!(cart.total_price, "Rp 15.000");
        assert_eq!(cart.total_items, 1);
    }
}
