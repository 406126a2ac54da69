//! Catalog service: product and category reads, plus catalog administration.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{info, instrument};

use crate::domain::aggregates::{Category, Product, ProductListing, Supplier};
use crate::domain::value_objects::{CategoryId, Money, ProductId, SupplierId, MAX_QUANTITY};
use crate::error::{Result, StoreError, StorefrontError};
use crate::store::Store;

#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewSupplier {
    pub name: String,
    pub contacts: String,
    pub rating: Option<Decimal>,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub price: Money,
    pub quantity: u32,
    pub category_id: Option<CategoryId>,
    pub warranty_months: Option<u32>,
    pub supplier_id: Option<SupplierId>,
}

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn Store>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn Store>) -> Self { Self { store } }

    /// All products, or only those of `category`, each with its category name.
    #[instrument(skip(self))]
    pub async fn list_products(&self, category: Option<CategoryId>) -> Result<Vec<ProductListing>> {
        Ok(self.store.list_products(category).await?)
    }

    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<Category>> {
        Ok(self.store.list_categories().await?)
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product> {
        self.store.get_product(id).await?.ok_or(StorefrontError::NotFound("product"))
    }

    #[instrument(skip(self))]
    pub async fn create_category(&self, new: NewCategory) -> Result<Category> {
        if new.name.trim().is_empty() {
            return Err(StorefrontError::Invalid("category name"));
        }
        let category = Category::create(new.name.trim(), new.description);
        self.store.insert_category(&category).await?;
        info!(category_id = %category.id, "category created");
        Ok(category)
    }

    #[instrument(skip(self))]
    pub async fn create_supplier(&self, new: NewSupplier) -> Result<Supplier> {
        if new.name.trim().is_empty() {
            return Err(StorefrontError::Invalid("supplier name"));
        }
        if new.rating.is_some_and(|r| r.is_sign_negative() || r.normalize().scale() > 2 || r >= Decimal::TEN) {
            return Err(StorefrontError::Invalid("rating"));
        }
        let supplier = Supplier::create(new.name.trim(), new.contacts, new.rating);
        self.store.insert_supplier(&supplier).await?;
        info!(supplier_id = %supplier.id, "supplier created");
        Ok(supplier)
    }

    /// Prices are non-negative with at most two decimal places and no more
    /// than [`Money::MAX_PRICE`]; quantities fit [`MAX_QUANTITY`].
    #[instrument(skip(self))]
    pub async fn create_product(&self, new: NewProduct) -> Result<Product> {
        if new.name.trim().is_empty() {
            return Err(StorefrontError::Invalid("product name"));
        }
        if !new.price.is_valid_price() {
            return Err(StorefrontError::Invalid("price"));
        }
        if new.quantity > MAX_QUANTITY {
            return Err(StorefrontError::Invalid("quantity"));
        }
        if new.warranty_months.is_some_and(|m| m > MAX_QUANTITY) {
            return Err(StorefrontError::Invalid("warranty"));
        }
        let mut product = Product::create(new.name.trim(), new.price, new.quantity);
        if let Some(category) = new.category_id {
            product = product.in_category(category);
        }
        if let Some(months) = new.warranty_months {
            product = product.with_warranty(months);
        }
        if let Some(supplier) = new.supplier_id {
            product = product.from_supplier(supplier);
        }

        self.store.insert_product(&product).await.map_err(|e| match e {
            StoreError::InvalidReference => StorefrontError::NotFound("category or supplier"),
            other => other.into(),
        })?;
        info!(product_id = %product.id, quantity = product.available_quantity, "product created");
        Ok(product)
    }

    /// Deletes a product that no order references.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: ProductId) -> Result<()> {
        let mut tx = self.store.begin().await?;
        let count = tx.count_order_lines_for_product(id).await?;
        if count > 0 {
            tx.rollback().await?;
            return Err(StorefrontError::InUse { what: "product", count });
        }
        if !tx.delete_product(id).await? {
            tx.rollback().await?;
            return Err(StorefrontError::NotFound("product"));
        }
        tx.commit().await?;
        info!(product_id = %id, "product deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use rust_decimal_macros::dec;
    use testresult::TestResult;

    fn service() -> CatalogService { CatalogService::new(Arc::new(MemoryStore::new())) }

    fn new_product(name: &str, category_id: Option<CategoryId>) -> NewProduct {
        NewProduct {
            name: name.into(),
            price: Money::new(dec!(15.00)),
            quantity: 3,
            category_id,
            warranty_months: Some(12),
            supplier_id: None,
        }
    }

    #[tokio::test]
    async fn products_filter_by_category() -> TestResult {
        let catalog = service();
        let phones = catalog.create_category(NewCategory { name: "Phones".into(), description: None }).await?;
        catalog.create_product(new_product("Phone", Some(phones.id))).await?;
        catalog.create_product(new_product("Charger", None)).await?;

        assert_eq!(catalog.list_products(None).await?.len(), 2);
        let phones_only = catalog.list_products(Some(phones.id)).await?;
        assert_eq!(phones_only.len(), 1);
        assert_eq!(phones_only[0].product.name, "Phone");
        assert_eq!(phones_only[0].category_name.as_deref(), Some("Phones"));
        assert_eq!(catalog.list_categories().await?, vec![phones]);
        Ok(())
    }

    #[tokio::test]
    async fn get_unknown_product_is_not_found() {
        let result = service().get_product(ProductId::generate()).await;
        assert!(matches!(result, Err(StorefrontError::NotFound("product"))), "got {result:?}");
    }

    #[tokio::test]
    async fn create_product_rejects_bad_input() {
        let catalog = service();
        let mut negative = new_product("Broken", None);
        negative.price = Money::new(dec!(-1));
        assert!(matches!(catalog.create_product(negative).await, Err(StorefrontError::Invalid("price"))));

        let dangling = new_product("Orphan", Some(CategoryId::generate()));
        assert!(matches!(catalog.create_product(dangling).await, Err(StorefrontError::NotFound(_))));

        assert!(matches!(catalog.create_product(new_product("  ", None)).await, Err(StorefrontError::Invalid(_))));
    }

    #[tokio::test]
    async fn create_product_enforces_price_range_and_precision() -> TestResult {
        let catalog = service();
        for price in [Decimal::MAX, dec!(100000000.00), dec!(1.005)] {
            let mut product = new_product("Gadget", None);
            product.price = Money::new(price);
            let result = catalog.create_product(product).await;
            assert!(matches!(result, Err(StorefrontError::Invalid("price"))), "{price}: got {result:?}");
        }

        let mut too_many = new_product("Gadget", None);
        too_many.quantity = MAX_QUANTITY + 1;
        assert!(matches!(catalog.create_product(too_many).await, Err(StorefrontError::Invalid("quantity"))));
        assert!(catalog.list_products(None).await?.is_empty());

        let mut top = new_product("Gadget", None);
        top.price = Money::MAX_PRICE;
        top.quantity = MAX_QUANTITY;
        let created = catalog.create_product(top).await?;
        assert_eq!(created.price, Money::new(dec!(99999999.99)));
        assert_eq!(created.warranty_months, Some(12));
        Ok(())
    }

    #[tokio::test]
    async fn create_supplier_checks_rating_precision() -> TestResult {
        let catalog = service();
        let supplier = |rating| NewSupplier { name: "Acme".into(), contacts: "acme@example.com".into(), rating };
        for rating in [dec!(10), dec!(4.125), dec!(-1)] {
            let result = catalog.create_supplier(supplier(Some(rating))).await;
            assert!(matches!(result, Err(StorefrontError::Invalid("rating"))), "{rating}: got {result:?}");
        }
        let rated = catalog.create_supplier(supplier(Some(dec!(4.50)))).await?;
        let anvil = NewProduct { supplier_id: Some(rated.id), ..new_product("Anvil", None) };
        let product = catalog.create_product(anvil).await?;
        assert_eq!(product.supplier_id, Some(rated.id));
        Ok(())
    }

    #[tokio::test]
    async fn delete_product_removes_unreferenced_product() -> TestResult {
        let catalog = service();
        let product = catalog.create_product(new_product("Stylus", None)).await?;
        catalog.delete_product(product.id).await?;
        assert!(matches!(catalog.get_product(product.id).await, Err(StorefrontError::NotFound(_))));
        assert!(matches!(catalog.delete_product(product.id).await, Err(StorefrontError::NotFound(_))));
        Ok(())
    }
}
