//! Client registration and administration.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::domain::aggregates::{Client, ClientSummary, Role};
use crate::domain::value_objects::ClientId;
use crate::error::{Result, StoreError, StorefrontError};
use crate::store::Store;

#[derive(Debug, Clone)]
pub struct NewClient {
    pub full_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub role: Role,
}

#[derive(Clone)]
pub struct ClientService {
    store: Arc<dyn Store>,
}

impl ClientService {
    pub fn new(store: Arc<dyn Store>) -> Self { Self { store } }

    #[instrument(skip(self, new), fields(role = new.role.as_token()))]
    pub async fn register(&self, new: NewClient) -> Result<Client> {
        let full_name = new.full_name.trim();
        let phone = new.phone.trim();
        if full_name.is_empty() {
            return Err(StorefrontError::Invalid("full name"));
        }
        if phone.is_empty() {
            return Err(StorefrontError::Invalid("phone"));
        }

        let mut client = Client::register(full_name, phone, new.role);
        if let Some(email) = new.email.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
            client = client.with_email(email);
        }
        if let Some(address) = new.address.filter(|a| !a.trim().is_empty()) {
            client = client.with_address(address);
        }

        self.store.insert_client(&client).await.map_err(|e| match e {
            StoreError::UniqueViolation => StorefrontError::AlreadyExists("client"),
            other => other.into(),
        })?;
        info!(client_id = %client.id, "client registered");
        Ok(client)
    }

    /// Every client with the number of orders they have placed.
    #[instrument(skip(self))]
    pub async fn list_clients(&self) -> Result<Vec<ClientSummary>> {
        Ok(self.store.list_clients().await?)
    }

    /// Deletes a client that has no orders.
    #[instrument(skip(self))]
    pub async fn delete_client(&self, id: ClientId) -> Result<()> {
        let mut tx = self.store.begin().await?;
        let count = tx.count_orders_for_client(id).await?;
        if count > 0 {
            tx.rollback().await?;
            return Err(StorefrontError::InUse { what: "client", count });
        }
        if !tx.delete_client(id).await? {
            tx.rollback().await?;
            return Err(StorefrontError::NotFound("client"));
        }
        tx.commit().await?;
        info!(client_id = %id, "client deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use testresult::TestResult;

    use super::*;
    use crate::domain::aggregates::{Order, OrderLine, Product};
    use crate::domain::value_objects::Money;
    use crate::store::MemoryStore;

    fn new_client(name: &str, email: Option<&str>) -> NewClient {
        NewClient {
            full_name: name.into(),
            phone: "555-0123".into(),
            email: email.map(Into::into),
            address: None,
            role: Role::User,
        }
    }

    #[tokio::test]
    async fn register_validates_and_rejects_duplicate_email() -> TestResult {
        let clients = ClientService::new(Arc::new(MemoryStore::new()));
        let mut mila = new_client(" Mila ", Some(" mila@example.com "));
        mila.address = Some("12 Garden Row".into());
        let first = clients.register(mila).await?;
        assert_eq!(first.full_name, "Mila");
        assert_eq!(first.email.as_deref(), Some("mila@example.com"));
        assert_eq!(first.address.as_deref(), Some("12 Garden Row"));
        assert_eq!(clients.register(new_client("Blank", Some("  "))).await?.email, None);

        let duplicate = clients.register(new_client("Other", Some("mila@example.com"))).await;
        assert!(matches!(duplicate, Err(StorefrontError::AlreadyExists("client"))), "got {duplicate:?}");

        let nameless = clients.register(new_client("   ", None)).await;
        assert!(matches!(nameless, Err(StorefrontError::Invalid("full name"))), "got {nameless:?}");

        let mut phoneless = new_client("Lev", None);
        phoneless.phone = String::new();
        assert!(matches!(clients.register(phoneless).await, Err(StorefrontError::Invalid("phone"))));

        assert_eq!(clients.list_clients().await?.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn delete_client_refuses_clients_with_orders() -> TestResult {
        let store = Arc::new(MemoryStore::new());
        let clients = ClientService::new(store.clone());
        let buyer = clients.register(new_client("Buyer", None)).await?;
        let idle = clients.register(new_client("Idle", None)).await?;

        let item = Product::create("Mug", Money::new(dec!(6)), 5);
        store.insert_product(&item).await?;
        let order = Order::place(buyer.id, vec![OrderLine { product_id: item.id, quantity: 1, unit_price: item.price }]);
        let mut tx = store.begin().await?;
        tx.insert_order(&order).await?;
        tx.commit().await?;

        let listed = clients.list_clients().await?;
        let buyer_summary = listed.iter().find(|s| s.client.id == buyer.id).expect("buyer listed");
        assert_eq!(buyer_summary.orders_count, 1);

        let refused = clients.delete_client(buyer.id).await;
        assert!(matches!(refused, Err(StorefrontError::InUse { what: "client", count: 1 })), "got {refused:?}");

        clients.delete_client(idle.id).await?;
        let missing = clients.delete_client(idle.id).await;
        assert!(matches!(missing, Err(StorefrontError::NotFound("client"))), "got {missing:?}");
        Ok(())
    }
}
