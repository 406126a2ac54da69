use std::num::NonZeroU32;

use rust_decimal_macros::dec;
use storefront::domain::aggregates::{OrderStatus, Role};
use storefront::domain::value_objects::{ClientId, Money};
use storefront::services::{NewCategory, NewClient, NewProduct};
use storefront::{CheckoutError, Storefront, StorefrontError};
use testresult::TestResult;

fn qty(n: u32) -> NonZeroU32 { NonZeroU32::new(n).unwrap() }

fn product(name: &str, price: Money, quantity: u32) -> NewProduct {
    NewProduct { name: name.into(), price, quantity, category_id: None, warranty_months: None, supplier_id: None }
}

async fn register(shop: &Storefront, name: &str) -> ClientId {
    let new = NewClient { full_name: name.into(), phone: "555-0111".into(), email: None, address: None, role: Role::User };
    shop.clients.register(new).await.unwrap().id
}

#[tokio::test]
async fn browse_fill_cart_and_check_out() -> TestResult {
    let shop = Storefront::in_memory();
    let laptops = shop.catalog.create_category(NewCategory { name: "Laptops".into(), description: None }).await?;
    let mut laptop = product("Laptop", Money::new(dec!(999.99)), 3);
    laptop.category_id = Some(laptops.id);
    let laptop = shop.catalog.create_product(laptop).await?;
    let bag = shop.catalog.create_product(product("Bag", Money::new(dec!(35.50)), 10)).await?;
    let client = register(&shop, "Roman").await;

    let listings = shop.catalog.list_products(Some(laptops.id)).await?;
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0].category_name.as_deref(), Some("Laptops"));

    shop.carts.add(client, laptop.id, qty(1)).await?;
    shop.carts.add(client, bag.id, qty(1)).await?;
    shop.carts.add(client, bag.id, qty(1)).await?;
    assert_eq!(shop.carts.view(client).await?.total, Money::new(dec!(1070.99)));

    let order_id = shop.checkout.checkout(client).await?;

    let orders = shop.orders.list_orders(client).await?;
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].id, order_id);
    assert_eq!(orders[0].status, OrderStatus::Created);
    assert_eq!(orders[0].items.len(), 2);
    assert_eq!(orders[0].total, Money::new(dec!(1070.99)));
    assert!(shop.carts.get(client).await?.is_empty());
    assert_eq!(shop.catalog.get_product(laptop.id).await?.available_quantity, 2);
    assert_eq!(shop.catalog.get_product(bag.id).await?.available_quantity, 8);

    let again = shop.checkout.checkout(client).await;
    assert!(matches!(again, Err(CheckoutError::EmptyCart)), "got {again:?}");
    Ok(())
}

#[tokio::test]
async fn later_price_changes_do_not_touch_placed_orders() -> TestResult {
    let shop = Storefront::in_memory();
    let client = register(&shop, "Sofia").await;
    let first = shop.catalog.create_product(product("Tea", Money::new(dec!(4.20)), 5)).await?;
    shop.carts.add(client, first.id, qty(2)).await?;
    shop.checkout.checkout(client).await?;

    let second = shop.catalog.create_product(product("Tea", Money::new(dec!(5.00)), 5)).await?;
    shop.carts.add(client, second.id, qty(1)).await?;
    shop.checkout.checkout(client).await?;

    let orders = shop.orders.list_orders(client).await?;
    let totals: Vec<Money> = orders.iter().map(|o| o.total).collect();
    assert!(totals.contains(&Money::new(dec!(8.40))));
    assert!(totals.contains(&Money::new(dec!(5.00))));
    Ok(())
}

#[tokio::test]
async fn stock_drained_after_adding_fails_checkout_cleanly() -> TestResult {
    let shop = Storefront::in_memory();
    let item = shop.catalog.create_product(product("Console", Money::new(dec!(300)), 2)).await?;
    let early = register(&shop, "Early").await;
    let late = register(&shop, "Late").await;

    shop.carts.add(late, item.id, qty(2)).await?;
    shop.carts.add(early, item.id, qty(1)).await?;
    shop.checkout.checkout(early).await?;

    let result = shop.checkout.checkout(late).await;
    assert!(
        matches!(result, Err(CheckoutError::InsufficientStock { available: 1, requested: 2, .. })),
        "got {result:?}"
    );
    assert_eq!(shop.carts.get(late).await?.len(), 1);
    assert_eq!(shop.catalog.get_product(item.id).await?.available_quantity, 1);
    assert!(shop.orders.list_orders(late).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn admin_deletes_respect_order_references() -> TestResult {
    let shop = Storefront::in_memory();
    let client = register(&shop, "Gleb").await;
    let item = shop.catalog.create_product(product("Chair", Money::new(dec!(80)), 4)).await?;
    shop.carts.add(client, item.id, qty(1)).await?;
    let order = shop.checkout.checkout(client).await?;

    assert!(matches!(shop.catalog.delete_product(item.id).await, Err(StorefrontError::InUse { what: "product", .. })));
    assert!(matches!(shop.clients.delete_client(client).await, Err(StorefrontError::InUse { what: "client", .. })));

    shop.orders.delete_order(order).await?;
    assert_eq!(shop.catalog.get_product(item.id).await?.available_quantity, 3);
    shop.catalog.delete_product(item.id).await?;
    shop.clients.delete_client(client).await?;
    assert!(shop.clients.list_clients().await?.is_empty());
    Ok(())
}
