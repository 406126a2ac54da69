//! Wiring of stores, publisher and services into one handle.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::CartBackend;
use crate::publisher::{EventPublisher, NoopPublisher};
use crate::services::{CartService, CatalogService, CheckoutService, ClientService, OrderService};
use crate::store::{CartStore, MemoryCartStore, MemoryStore, PgCartStore, PgStore, Store};

/// Every storefront service, sharing one store and one cart store.
#[derive(Clone)]
pub struct Storefront {
    pub catalog: CatalogService,
    pub carts: CartService,
    pub checkout: CheckoutService,
    pub orders: OrderService,
    pub clients: ClientService,
}

impl Storefront {
    pub fn new(store: Arc<dyn Store>, cart_store: Arc<dyn CartStore>, publisher: Arc<dyn EventPublisher>) -> Self {
        Self {
            catalog: CatalogService::new(store.clone()),
            carts: CartService::new(cart_store.clone(), store.clone()),
            checkout: CheckoutService::new(store.clone(), cart_store, publisher),
            orders: OrderService::new(store.clone()),
            clients: ClientService::new(store),
        }
    }

    /// A self-contained storefront with nothing persisted.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), Arc::new(MemoryCartStore::new()), Arc::new(NoopPublisher))
    }

    pub fn postgres(pool: PgPool, carts: CartBackend, publisher: Arc<dyn EventPublisher>) -> Self {
        let cart_store: Arc<dyn CartStore> = match carts {
            CartBackend::Postgres => Arc::new(PgCartStore::new(pool.clone())),
            CartBackend::Memory => Arc::new(MemoryCartStore::new()),
        };
        Self::new(Arc::new(PgStore::new(pool)), cart_store, publisher)
    }
}
