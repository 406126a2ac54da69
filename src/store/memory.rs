//! In-memory store and cart store.
//!
//! Transactions are serialized: [`MemoryStore::begin`] takes an owned lock
//! over every table and works on a staged copy that replaces the tables
//! only on commit. That gives the same no-oversell guarantee as row locks,
//! at the cost of concurrency, which is fine for tests and single-instance
//! development.

use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::domain::aggregates::{
    Cart, CartLine, Category, Client, ClientSummary, Order, OrderRecord, Product, ProductListing, Supplier,
};
use crate::domain::value_objects::{CategoryId, ClientId, OrderId, ProductId, SupplierId};
use crate::error::StoreError;
use crate::store::{CartStore, Store, StoreTx};

#[derive(Debug, Default, Clone)]
struct Tables {
    categories: HashMap<CategoryId, Category>,
    suppliers: HashMap<SupplierId, Supplier>,
    products: HashMap<ProductId, Product>,
    clients: HashMap<ClientId, Client>,
    orders: HashMap<OrderId, Order>,
}

impl Tables {
    fn listing(&self, product: &Product) -> ProductListing {
        let category_name = product.category_id.and_then(|id| self.categories.get(&id)).map(|c| c.name.clone());
        ProductListing { product: product.clone(), category_name }
    }

    fn orders_for_client(&self, client: ClientId) -> u64 {
        self.orders.values().filter(|o| o.client_id == client).count() as u64
    }

    fn lines_for_product(&self, product: ProductId) -> u64 {
        self.orders.values().flat_map(|o| &o.lines).filter(|l| l.product_id == product).count() as u64
    }

    fn record(&self, order: &Order) -> OrderRecord {
        let product_names = order
            .lines
            .iter()
            .filter_map(|l| self.products.get(&l.product_id).map(|p| (p.id, p.name.clone())))
            .collect();
        OrderRecord {
            order: order.clone(),
            client: self.clients.get(&order.client_id).map(Client::contact),
            product_names,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<AsyncMutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn StoreTx>, StoreError> {
        let guard = Arc::clone(&self.tables).lock_owned().await;
        let staged = guard.clone();
        Ok(Box::new(MemoryTx { guard, staged }))
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        let tables = self.tables.lock().await;
        let mut categories: Vec<_> = tables.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn list_products(&self, category: Option<CategoryId>) -> Result<Vec<ProductListing>, StoreError> {
        let tables = self.tables.lock().await;
        let mut listings: Vec<_> = tables
            .products
            .values()
            .filter(|p| category.is_none() || p.category_id == category)
            .map(|p| tables.listing(p))
            .collect();
        listings.sort_by(|a, b| a.product.name.cmp(&b.product.name));
        Ok(listings)
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        Ok(self.tables.lock().await.products.get(&id).cloned())
    }

    async fn products_by_ids(&self, ids: &[ProductId]) -> Result<Vec<ProductListing>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(ids.iter().filter_map(|id| tables.products.get(id)).map(|p| tables.listing(p)).collect())
    }

    async fn list_orders(&self, client: Option<ClientId>) -> Result<Vec<OrderRecord>, StoreError> {
        let tables = self.tables.lock().await;
        let mut orders: Vec<&Order> =
            tables.orders.values().filter(|o| client.map_or(true, |c| o.client_id == c)).collect();
        orders.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(orders.into_iter().map(|o| tables.record(o)).collect())
    }

    async fn list_clients(&self) -> Result<Vec<ClientSummary>, StoreError> {
        let tables = self.tables.lock().await;
        let mut clients: Vec<_> = tables
            .clients
            .values()
            .map(|c| ClientSummary { client: c.clone(), orders_count: tables.orders_for_client(c.id) })
            .collect();
        clients.sort_by(|a, b| a.client.full_name.cmp(&b.client.full_name));
        Ok(clients)
    }

    async fn insert_category(&self, category: &Category) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().await;
        if tables.categories.contains_key(&category.id) {
            return Err(StoreError::UniqueViolation);
        }
        tables.categories.insert(category.id, category.clone());
        Ok(())
    }

    async fn insert_supplier(&self, supplier: &Supplier) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().await;
        if tables.suppliers.contains_key(&supplier.id) {
            return Err(StoreError::UniqueViolation);
        }
        tables.suppliers.insert(supplier.id, supplier.clone());
        Ok(())
    }

    async fn insert_product(&self, product: &Product) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().await;
        if tables.products.contains_key(&product.id) {
            return Err(StoreError::UniqueViolation);
        }
        let category_ok = product.category_id.map_or(true, |id| tables.categories.contains_key(&id));
        let supplier_ok = product.supplier_id.map_or(true, |id| tables.suppliers.contains_key(&id));
        if !category_ok || !supplier_ok {
            return Err(StoreError::InvalidReference);
        }
        tables.products.insert(product.id, product.clone());
        Ok(())
    }

    async fn insert_client(&self, client: &Client) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().await;
        let email_taken =
            client.email.is_some() && tables.clients.values().any(|existing| existing.email == client.email);
        if email_taken || tables.clients.contains_key(&client.id) {
            return Err(StoreError::UniqueViolation);
        }
        tables.clients.insert(client.id, client.clone());
        Ok(())
    }
}

struct MemoryTx {
    guard: OwnedMutexGuard<Tables>,
    staged: Tables,
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn lock_products(&mut self, ids: &[ProductId]) -> Result<Vec<Product>, StoreError> {
        Ok(ids.iter().filter_map(|id| self.staged.products.get(id).cloned()).collect())
    }

    async fn insert_order(&mut self, order: &Order) -> Result<(), StoreError> {
        if self.staged.orders.contains_key(&order.id) {
            return Err(StoreError::UniqueViolation);
        }
        if !self.staged.clients.contains_key(&order.client_id)
            || order.lines.iter().any(|l| !self.staged.products.contains_key(&l.product_id))
        {
            return Err(StoreError::InvalidReference);
        }
        for (i, line) in order.lines.iter().enumerate() {
            if order.lines[..i].iter().any(|earlier| earlier.product_id == line.product_id) {
                return Err(StoreError::UniqueViolation);
            }
        }
        self.staged.orders.insert(order.id, order.clone());
        Ok(())
    }

    async fn decrement_stock(&mut self, id: ProductId, by: u32) -> Result<u32, StoreError> {
        let product = self.staged.products.get_mut(&id).ok_or(StoreError::InvalidReference)?;
        product.remove_inventory(by).map_err(|_| StoreError::StockUnderflow(id))?;
        Ok(product.available_quantity)
    }

    async fn count_orders_for_client(&mut self, client: ClientId) -> Result<u64, StoreError> {
        Ok(self.staged.orders_for_client(client))
    }

    async fn count_order_lines_for_product(&mut self, product: ProductId) -> Result<u64, StoreError> {
        Ok(self.staged.lines_for_product(product))
    }

    async fn delete_client(&mut self, client: ClientId) -> Result<bool, StoreError> {
        if self.staged.orders_for_client(client) > 0 {
            return Err(StoreError::InvalidReference);
        }
        Ok(self.staged.clients.remove(&client).is_some())
    }

    async fn delete_product(&mut self, product: ProductId) -> Result<bool, StoreError> {
        if self.staged.lines_for_product(product) > 0 {
            return Err(StoreError::InvalidReference);
        }
        Ok(self.staged.products.remove(&product).is_some())
    }

    async fn delete_order(&mut self, order: OrderId) -> Result<bool, StoreError> {
        Ok(self.staged.orders.remove(&order).is_some())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let MemoryTx { mut guard, staged } = *self;
        *guard = staged;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Process-local carts keyed by client.
#[derive(Debug, Default)]
pub struct MemoryCartStore {
    carts: RwLock<HashMap<ClientId, Arc<Mutex<Cart>>>>,
}

impl MemoryCartStore {
    pub fn new() -> Self { Self::default() }

    /// Returns the client's cart, creating it atomically on first access.
    fn cart(&self, client: ClientId) -> Arc<Mutex<Cart>> {
        if let Some(cart) = self.carts.read().get(&client) {
            return Arc::clone(cart);
        }
        let mut carts = self.carts.write();
        Arc::clone(carts.entry(client).or_default())
    }
}

#[async_trait]
impl CartStore for MemoryCartStore {
    async fn get_cart(&self, client: ClientId) -> Result<Vec<CartLine>, StoreError> {
        Ok(self.cart(client).lock().lines().to_vec())
    }

    async fn add(&self, client: ClientId, product: ProductId, quantity: NonZeroU32) -> Result<(), StoreError> {
        self.cart(client).lock().add(product, quantity);
        Ok(())
    }

    async fn remove(&self, client: ClientId, product: ProductId) -> Result<bool, StoreError> {
        Ok(self.cart(client).lock().remove(product))
    }

    async fn update_quantity(&self, client: ClientId, product: ProductId, quantity: i64) -> Result<bool, StoreError> {
        Ok(self.cart(client).lock().update_quantity(product, quantity))
    }

    async fn clear(&self, client: ClientId) -> Result<(), StoreError> {
        self.cart(client).lock().clear();
        Ok(())
    }
}
