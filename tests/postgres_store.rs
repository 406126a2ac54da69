//! Runs against a real database: `DATABASE_URL=... cargo test -- --ignored`.

use std::num::NonZeroU32;
use std::sync::Arc;

use rust_decimal_macros::dec;
use sqlx::PgPool;
use storefront::domain::aggregates::{Client, Product, Role};
use storefront::domain::value_objects::{ClientId, Money, ProductId, MAX_QUANTITY};
use storefront::publisher::NoopPublisher;
use storefront::store::{CartStore, PgCartStore, PgStore, Store};
use storefront::{CartBackend, CheckoutError, Storefront, StoreError};
use testresult::TestResult;

fn qty(n: u32) -> NonZeroU32 { NonZeroU32::new(n).unwrap() }

async fn seed(store: &PgStore, stock: u32) -> (Vec<ClientId>, ProductId) {
    let product = Product::create("Headphones", Money::new(dec!(59.99)), stock);
    store.insert_product(&product).await.unwrap();
    let mut clients = Vec::new();
    for name in ["Alla", "Boris"] {
        let client = Client::register(name, "555-0150", Role::User);
        store.insert_client(&client).await.unwrap();
        clients.push(client.id);
    }
    (clients, product.id)
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a Postgres database"]
async fn cart_rows_merge_and_update(pool: PgPool) -> TestResult {
    let carts = PgCartStore::new(pool);
    let client = ClientId::generate();
    let product = ProductId::generate();

    assert!(carts.get_cart(client).await?.is_empty());
    carts.add(client, product, qty(2)).await?;
    carts.add(client, product, qty(3)).await?;
    assert_eq!(carts.get_cart(client).await?[0].quantity, 5);

    assert!(carts.update_quantity(client, product, 1).await?);
    assert_eq!(carts.get_cart(client).await?[0].quantity, 1);
    assert!(carts.update_quantity(client, product, -4).await?);
    assert!(carts.get_cart(client).await?.is_empty());
    assert!(!carts.remove(client, product).await?);
    carts.clear(client).await?;
    Ok(())
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a Postgres database"]
async fn cart_quantities_saturate_like_the_in_memory_cart(pool: PgPool) -> TestResult {
    let carts = PgCartStore::new(pool);
    let client = ClientId::generate();
    let product = ProductId::generate();

    carts.add(client, product, qty(u32::MAX)).await?;
    carts.add(client, product, qty(1)).await?;
    assert_eq!(carts.get_cart(client).await?[0].quantity, MAX_QUANTITY);

    assert!(carts.update_quantity(client, product, i64::MAX).await?);
    assert_eq!(carts.get_cart(client).await?[0].quantity, MAX_QUANTITY);
    Ok(())
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a Postgres database"]
async fn duplicate_email_is_a_unique_violation(pool: PgPool) -> TestResult {
    let store = PgStore::new(pool);
    store.insert_client(&Client::register("A", "1", Role::User).with_email("same@example.com")).await?;
    let second = store.insert_client(&Client::register("B", "2", Role::Admin).with_email("same@example.com")).await;
    assert!(matches!(second, Err(StoreError::UniqueViolation)), "got {second:?}");
    Ok(())
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a Postgres database"]
async fn decrement_refuses_to_go_negative(pool: PgPool) -> TestResult {
    let store = PgStore::new(pool);
    let (_, product) = seed(&store, 2).await;

    let mut tx = store.begin().await?;
    assert_eq!(tx.decrement_stock(product, 2).await?, 0);
    let underflow = tx.decrement_stock(product, 1).await;
    assert!(matches!(underflow, Err(StoreError::StockUnderflow(id)) if id == product), "got {underflow:?}");
    tx.rollback().await?;

    assert_eq!(store.get_product(product).await?.map(|p| p.available_quantity), Some(2));
    Ok(())
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a Postgres database"]
async fn concurrent_checkouts_do_not_oversell(pool: PgPool) -> TestResult {
    let store = PgStore::new(pool.clone());
    let (clients, product) = seed(&store, 5).await;
    let shop = Storefront::postgres(pool, CartBackend::Postgres, Arc::new(NoopPublisher));
    for client in &clients {
        shop.carts.add(*client, product, qty(3)).await?;
    }

    let handles: Vec<_> = clients
        .iter()
        .map(|&client| {
            let checkout = shop.checkout.clone();
            tokio::spawn(async move { checkout.checkout(client).await })
        })
        .collect();
    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await?);
    }

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1, "results: {results:?}");
    assert!(results
        .iter()
        .any(|r| matches!(r, Err(CheckoutError::InsufficientStock { available: 2, requested: 3, .. }))));
    assert_eq!(shop.catalog.get_product(product).await?.available_quantity, 2);

    let orders = shop.orders.list_all_orders().await?;
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].total, Money::new(dec!(179.97)));
    assert_eq!(orders[0].items[0].product_name.as_deref(), Some("Headphones"));
    Ok(())
}
