//! Integration tests for the cashier screen controller.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::time::Duration;

use axum::http::Method;
use kasir_core::{CartItemId, CategoryId, ProductId, Rupiah};
use kasir_integration_tests::{MockBackend, dead_api_config};
use kasir_web::api::{CONNECTION_FAILED_MESSAGE, KasirApi};
use kasir_web::page::{CheckoutRequest, KasirPage, PageError, Phase, QuantityChange};
use serde_json::json;

async fn loaded_page(backend: &MockBackend) -> KasirPage {
    let page = KasirPage::new(KasirApi::new(&backend.api_config()).unwrap());
    page.load_initial().await.unwrap();
    page
}

fn seed_item(backend: &MockBackend, product_id: i64, nama: &str, harga: i64, jumlah: u32) -> i64 {
    backend.seed_cart(json!({
        "productId": product_id,
        "nama": nama,
        "harga": harga,
        "jumlah": jumlah,
        "keterangan": ""
    }))
}

// ============================================================================
// Loading
// ============================================================================

#[tokio::test]
async fn test_load_initial() {
    let backend = MockBackend::start().await;
    seed_item(&backend, 1, "Nasi Goreng", 25_000, 3);

    let page = KasirPage::new(KasirApi::new(&backend.api_config()).unwrap());
    assert!(page.needs_load().await);

    page.load_initial().await.unwrap();
    let state = page.snapshot().await;

    assert_eq!(state.phase, Phase::Ready);
    assert!(!page.needs_load().await);
    assert_eq!(state.categories.len(), 2);
    assert_eq!(state.products.len(), 3);
    assert_eq!(state.cart.len(), 1);
    assert_eq!(state.summary().total_items, 3);
    assert_eq!(state.summary().total_price, Rupiah::new(75_000));
    assert_eq!(state.summary().total_price.to_string(), "Rp 75.000");
}

#[tokio::test]
async fn test_load_failure_sets_error_phase() {
    let page = KasirPage::new(KasirApi::new(&dead_api_config().await).unwrap());

    let err = page.load_initial().await.unwrap_err();

    assert!(matches!(err, PageError::Api(ref api) if api.is_unreachable()));
    assert_eq!(
        page.snapshot().await.phase,
        Phase::Error(CONNECTION_FAILED_MESSAGE.to_string())
    );
}

// ============================================================================
// Categories
// ============================================================================

#[tokio::test]
async fn test_select_category() {
    let backend = MockBackend::start().await;
    let page = loaded_page(&backend).await;

    assert!(page.select_category(Some(CategoryId::new(2))).await.unwrap());
    let state = page.snapshot().await;
    assert_eq!(state.selected_category, Some(CategoryId::new(2)));
    assert_eq!(state.products.len(), 1);
    assert_eq!(state.products[0].name, "Es Teh");

    assert!(page.select_category(None).await.unwrap());
    assert_eq!(page.snapshot().await.products.len(), 3);
}

#[tokio::test]
async fn test_stale_category_response_is_discarded() {
    let backend = MockBackend::start().await;
    let page = loaded_page(&backend).await;
    backend.delay_products(Some(1), Duration::from_millis(300));

    // The slow request starts first, so the fast one is newer
    let (slow, fast) = tokio::join!(
        page.select_category(Some(CategoryId::new(1))),
        page.select_category(Some(CategoryId::new(2))),
    );

    assert!(!slow.unwrap());
    assert!(fast.unwrap());

    let state = page.snapshot().await;
    assert_eq!(state.selected_category, Some(CategoryId::new(2)));
    assert!(
        state
            .products
            .iter()
            .all(|p| p.category_id == CategoryId::new(2))
    );
}

// ============================================================================
// Cart
// ============================================================================

#[tokio::test]
async fn test_add_same_product_twice_increments() {
    let backend = MockBackend::start().await;
    let page = loaded_page(&backend).await;

    let product = page.add_product(ProductId::new(1)).await.unwrap();
    assert_eq!(product.name, "Nasi Goreng");
    page.add_product(ProductId::new(1)).await.unwrap();

    let state = page.snapshot().await;
    assert_eq!(state.cart.len(), 1);
    assert_eq!(state.cart[0].quantity, 2);
    assert_eq!(state.summary().total_price, Rupiah::new(50_000));

    let id = &state.cart[0].id;
    assert_eq!(backend.count(&Method::POST, "/cart"), 1);
    assert_eq!(backend.count(&Method::PUT, &format!("/cart/{id}")), 1);
    assert_eq!(backend.cart()[0]["jumlah"], json!(2));
}

#[tokio::test]
async fn test_add_same_product_twice_with_string_ids() {
    let backend = MockBackend::start().await;
    backend.use_string_ids();
    let page = loaded_page(&backend).await;

    page.add_product(ProductId::new(3)).await.unwrap();
    page.add_product(ProductId::new(3)).await.unwrap();

    let state = page.snapshot().await;
    assert_eq!(state.cart.len(), 1);
    assert_eq!(state.cart[0].id, CartItemId::new("9f31"));
    assert_eq!(state.cart[0].quantity, 2);
    assert_eq!(backend.count(&Method::PUT, "/cart/9f31"), 1);
    assert_eq!(page.snapshot().await.phase, Phase::Ready);
}

#[tokio::test]
async fn test_records_without_quantity_are_ignored() {
    let backend = MockBackend::start().await;
    seed_item(&backend, 1, "Nasi Goreng", 25_000, 2);
    backend.seed_cart(json!({
        "productId": 3,
        "nama": "Es Teh",
        "harga": 5000,
        "jumlah": -1,
        "keterangan": ""
    }));

    let page = loaded_page(&backend).await;
    let state = page.snapshot().await;

    assert_eq!(state.phase, Phase::Ready);
    assert_eq!(state.cart.len(), 1);
    assert_eq!(state.cart[0].name, "Nasi Goreng");
    assert_eq!(state.summary().total_items, 2);

    // Clearing still deletes the ignored record on the backend
    let outcome = page.clear_cart().await.unwrap();
    assert_eq!(outcome.requested, 2);
    assert!(backend.cart().is_empty());
}

#[tokio::test]
async fn test_add_unknown_product() {
    let backend = MockBackend::start().await;
    let page = loaded_page(&backend).await;
    page.select_category(Some(CategoryId::new(2))).await.unwrap();
    backend.clear_requests();

    // Product 1 exists but is not in the visible list
    let err = page.add_product(ProductId::new(1)).await.unwrap_err();

    assert!(matches!(&err, PageError::ProductNotFound(id) if *id == ProductId::new(1)));
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_change_quantity() {
    let backend = MockBackend::start().await;
    let id = seed_item(&backend, 1, "Nasi Goreng", 25_000, 1);
    let page = loaded_page(&backend).await;

    let change = page
        .change_quantity(CartItemId::new(id), 4)
        .await
        .unwrap();

    assert_eq!(change, QuantityChange::Updated(4));
    assert_eq!(backend.cart()[0]["jumlah"], json!(4));
    assert_eq!(page.snapshot().await.cart[0].quantity, 4);
}

#[tokio::test]
async fn test_quantity_below_one_removes() {
    let backend = MockBackend::start().await;
    let id = seed_item(&backend, 1, "Nasi Goreng", 25_000, 1);
    let page = loaded_page(&backend).await;

    let change = page
        .change_quantity(CartItemId::new(id), 0)
        .await
        .unwrap();

    assert_eq!(change, QuantityChange::Removed);
    assert_eq!(backend.count(&Method::DELETE, &format!("/cart/{id}")), 1);
    assert!(backend.cart().is_empty());
    assert!(page.snapshot().await.cart.is_empty());
}

#[tokio::test]
async fn test_change_quantity_unknown_item() {
    let backend = MockBackend::start().await;
    let page = loaded_page(&backend).await;

    let err = page
        .change_quantity(CartItemId::new(42), 2)
        .await
        .unwrap_err();

    assert!(matches!(err, PageError::ItemNotFound(_)));
    assert_eq!(backend.count(&Method::PUT, "/cart/42"), 0);
}

#[tokio::test]
async fn test_remove_item() {
    let backend = MockBackend::start().await;
    let keep = seed_item(&backend, 1, "Nasi Goreng", 25_000, 1);
    let gone = seed_item(&backend, 3, "Es Teh", 5_000, 2);
    let page = loaded_page(&backend).await;

    page.remove_item(CartItemId::new(gone)).await.unwrap();

    let cart = page.snapshot().await.cart;
    assert_eq!(cart.len(), 1);
    assert_eq!(cart[0].id, CartItemId::new(keep));
}

#[tokio::test]
async fn test_clear_empty_cart() {
    let backend = MockBackend::start().await;
    let page = loaded_page(&backend).await;

    let outcome = page.clear_cart().await.unwrap();

    assert_eq!(outcome.requested, 0);
    assert!(outcome.is_complete());
    assert!(
        backend
            .requests()
            .iter()
            .all(|r| r.method != Method::DELETE)
    );
}

#[tokio::test]
async fn test_partial_clear_keeps_remaining_items() {
    let backend = MockBackend::start().await;
    seed_item(&backend, 1, "Nasi Goreng", 25_000, 1);
    let stuck = seed_item(&backend, 2, "Mie Ayam", 20_000, 1);
    backend.fail_delete(stuck);
    let page = loaded_page(&backend).await;

    let outcome = page.clear_cart().await.unwrap();

    assert_eq!(outcome.deleted(), 1);
    let cart = page.snapshot().await.cart;
    assert_eq!(cart.len(), 1);
    assert_eq!(cart[0].id, CartItemId::new(stuck));
}

// ============================================================================
// Checkout
// ============================================================================

#[tokio::test]
async fn test_checkout_empty_cart_makes_no_requests() {
    let backend = MockBackend::start().await;
    let page = loaded_page(&backend).await;
    backend.clear_requests();

    let err = page
        .checkout(CheckoutRequest {
            customer_name: "Budi".to_string(),
            ..CheckoutRequest::default()
        })
        .await
        .unwrap_err();

    assert!(matches!(err, PageError::EmptyCart));
    assert!(err.is_validation());
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_checkout_blank_name_makes_no_requests() {
    let backend = MockBackend::start().await;
    seed_item(&backend, 1, "Nasi Goreng", 25_000, 1);
    let page = loaded_page(&backend).await;
    backend.clear_requests();

    let err = page
        .checkout(CheckoutRequest {
            customer_name: "   ".to_string(),
            ..CheckoutRequest::default()
        })
        .await
        .unwrap_err();

    assert!(matches!(err, PageError::MissingCustomerName));
    assert!(backend.requests().is_empty());
    assert_eq!(backend.cart().len(), 1);
}

#[tokio::test]
async fn test_checkout_builds_order_and_empties_cart() {
    let backend = MockBackend::start().await;
    let nasi = seed_item(&backend, 1, "Nasi Goreng", 25_000, 2);
    seed_item(&backend, 3, "Es Teh", 5_000, 1);
    let page = loaded_page(&backend).await;

    let request = CheckoutRequest {
        customer_name: "  Budi  ".to_string(),
        note: Some("Bungkus".to_string()),
        item_notes: [(CartItemId::new(nasi), "Pedas".to_string())]
            .into_iter()
            .collect(),
    };
    let order = page.checkout(request).await.unwrap();

    assert_eq!(order.customer_name.as_str(), "Budi");
    assert_eq!(order.note.as_deref(), Some("Bungkus"));
    assert_eq!(order.total_items, 3);
    assert_eq!(order.total_price, Rupiah::new(55_000));
    assert_eq!(order.items.len(), 2);
    assert_eq!(order.items[0].note.as_deref(), Some("Pedas"));
    assert_eq!(order.items[0].line_total, Rupiah::new(50_000));
    assert_eq!(order.items[1].note, None);

    assert!(backend.cart().is_empty());
    assert!(page.snapshot().await.cart.is_empty());
}

#[tokio::test]
async fn test_checkout_fails_when_items_survive() {
    let backend = MockBackend::start().await;
    seed_item(&backend, 1, "Nasi Goreng", 25_000, 1);
    let stuck = seed_item(&backend, 3, "Es Teh", 5_000, 1);
    backend.fail_delete(stuck);
    let page = loaded_page(&backend).await;

    let err = page
        .checkout(CheckoutRequest {
            customer_name: "Budi".to_string(),
            ..CheckoutRequest::default()
        })
        .await
        .unwrap_err();

    assert!(matches!(err, PageError::CartNotCleared { remaining: 1 }));
    assert_eq!(
        err.to_string(),
        "Gagal memproses checkout: 1 item masih ada di keranjang."
    );
    assert_eq!(page.snapshot().await.cart.len(), 1);
}
