//! Persistence ports and their implementations.
//!
//! [`Store`] is the transactional catalog/order store, [`CartStore`] holds
//! per-client carts. Both come in a Postgres flavour and an in-memory flavour.

use std::num::NonZeroU32;

use async_trait::async_trait;

use crate::domain::aggregates::{
    CartLine, Category, Client, ClientSummary, Order, OrderRecord, Product, ProductListing, Supplier,
};
use crate::domain::value_objects::{CategoryId, ClientId, OrderId, ProductId};
use crate::error::StoreError;

pub mod memory;
pub mod postgres;

pub use memory::{MemoryCartStore, MemoryStore};
pub use postgres::{PgCartStore, PgStore};

#[async_trait]
pub trait Store: Send + Sync {
    /// Opens a unit of work. Nothing it does is visible until
    /// [`StoreTx::commit`]; dropping it without committing rolls back.
    async fn begin(&self) -> Result<Box<dyn StoreTx>, StoreError>;

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError>;

    async fn list_products(&self, category: Option<CategoryId>) -> Result<Vec<ProductListing>, StoreError>;

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, StoreError>;

    /// Listings for the given products; unknown ids are skipped.
    async fn products_by_ids(&self, ids: &[ProductId]) -> Result<Vec<ProductListing>, StoreError>;

    /// Orders newest first, optionally restricted to one client.
    async fn list_orders(&self, client: Option<ClientId>) -> Result<Vec<OrderRecord>, StoreError>;

    async fn list_clients(&self) -> Result<Vec<ClientSummary>, StoreError>;

    async fn insert_category(&self, category: &Category) -> Result<(), StoreError>;

    async fn insert_supplier(&self, supplier: &Supplier) -> Result<(), StoreError>;

    async fn insert_product(&self, product: &Product) -> Result<(), StoreError>;

    /// Fails with [`StoreError::UniqueViolation`] when the email is taken.
    async fn insert_client(&self, client: &Client) -> Result<(), StoreError>;
}

#[async_trait]
pub trait StoreTx: Send {
    /// Reads the current rows of `ids` and holds them locked until the
    /// transaction ends. Missing products are absent from the result.
    async fn lock_products(&mut self, ids: &[ProductId]) -> Result<Vec<Product>, StoreError>;

    /// Inserts the order header and all of its lines.
    async fn insert_order(&mut self, order: &Order) -> Result<(), StoreError>;

    /// Takes `by` units from the product's stock and returns what remains.
    async fn decrement_stock(&mut self, id: ProductId, by: u32) -> Result<u32, StoreError>;

    async fn count_orders_for_client(&mut self, client: ClientId) -> Result<u64, StoreError>;

    async fn count_order_lines_for_product(&mut self, product: ProductId) -> Result<u64, StoreError>;

    async fn delete_client(&mut self, client: ClientId) -> Result<bool, StoreError>;

    async fn delete_product(&mut self, product: ProductId) -> Result<bool, StoreError>;

    /// Deletes the order together with its lines.
    async fn delete_order(&mut self, order: OrderId) -> Result<bool, StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;

    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}

/// Per-client carts.
///
/// A client's cart is created on first access; operations on an unknown
/// client behave as on an empty cart.
#[async_trait]
pub trait CartStore: Send + Sync {
    async fn get_cart(&self, client: ClientId) -> Result<Vec<CartLine>, StoreError>;

    async fn add(&self, client: ClientId, product: ProductId, quantity: NonZeroU32) -> Result<(), StoreError>;

    async fn remove(&self, client: ClientId, product: ProductId) -> Result<bool, StoreError>;

    /// A quantity of zero or less removes the line.
    async fn update_quantity(&self, client: ClientId, product: ProductId, quantity: i64) -> Result<bool, StoreError>;

    async fn clear(&self, client: ClientId) -> Result<(), StoreError>;
}
