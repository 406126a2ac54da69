//! Postgres store and cart store.
//!
//! Checkout rows are locked with `SELECT ... FOR UPDATE` in ascending id
//! order so concurrent checkouts over overlapping products queue up instead
//! of deadlocking.

use std::collections::HashMap;
use std::num::NonZeroU32;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::aggregates::{
    CartLine, Category, Client, ClientContact, ClientSummary, Order, OrderLine, OrderRecord, OrderStatus, Product,
    ProductListing, Role, Supplier,
};
use crate::domain::value_objects::{CategoryId, ClientId, Money, OrderId, ProductId, MAX_QUANTITY};
use crate::error::StoreError;
use crate::store::{CartStore, Store, StoreTx};

const PRODUCT_COLUMNS: &str = "p.id, p.name, p.price, p.quantity, p.warranty_months, p.category_id, p.supplier_id";

const LIST_CATEGORIES_SQL: &str = "SELECT id, name, description FROM categories ORDER BY name";
const INSERT_CATEGORY_SQL: &str = "INSERT INTO categories (id, name, description) VALUES ($1, $2, $3)";
const INSERT_SUPPLIER_SQL: &str = "INSERT INTO suppliers (id, name, contacts, rating) VALUES ($1, $2, $3, $4)";
const INSERT_PRODUCT_SQL: &str = "INSERT INTO products (id, name, price, quantity, warranty_months, category_id, supplier_id) VALUES ($1, $2, $3, $4, $5, $6, $7)";
const INSERT_CLIENT_SQL: &str = "INSERT INTO clients (id, full_name, phone, email, address, role) VALUES ($1, $2, $3, $4, $5, $6)";
const LIST_CLIENTS_SQL: &str = "SELECT c.id, c.full_name, c.phone, c.email, c.address, c.role, COUNT(o.id) AS orders_count FROM clients c LEFT JOIN orders o ON o.client_id = c.id GROUP BY c.id ORDER BY c.full_name";
const LIST_ORDERS_SQL: &str = "SELECT o.id, o.client_id, o.created_at, o.status, c.full_name AS client_name, c.phone AS client_phone FROM orders o LEFT JOIN clients c ON c.id = o.client_id WHERE ($1::UUID IS NULL OR o.client_id = $1) ORDER BY o.created_at DESC, o.id DESC";
const LIST_ORDER_LINES_SQL: &str = "SELECT l.order_id, l.product_id, l.quantity, l.unit_price, p.name AS product_name FROM order_lines l JOIN products p ON p.id = l.product_id WHERE l.order_id = ANY($1) ORDER BY l.order_id, l.position";
const INSERT_ORDER_SQL: &str = "INSERT INTO orders (id, client_id, created_at, status) VALUES ($1, $2, $3, $4)";
const INSERT_ORDER_LINE_SQL: &str = "INSERT INTO order_lines (order_id, product_id, position, quantity, unit_price) VALUES ($1, $2, $3, $4, $5)";
const DECREMENT_STOCK_SQL: &str = "UPDATE products SET quantity = quantity - $2 WHERE id = $1 AND quantity >= $2 RETURNING quantity";
const COUNT_CLIENT_ORDERS_SQL: &str = "SELECT COUNT(*) FROM orders WHERE client_id = $1";
const COUNT_PRODUCT_LINES_SQL: &str = "SELECT COUNT(*) FROM order_lines WHERE product_id = $1";
const DELETE_CLIENT_SQL: &str = "DELETE FROM clients WHERE id = $1";
const DELETE_PRODUCT_SQL: &str = "DELETE FROM products WHERE id = $1";
const DELETE_ORDER_SQL: &str = "DELETE FROM orders WHERE id = $1";

const GET_CART_SQL: &str = "SELECT product_id, quantity FROM cart_items WHERE client_id = $1 ORDER BY created_at, product_id";
const ADD_CART_ITEM_SQL: &str = "INSERT INTO cart_items (client_id, product_id, quantity) VALUES ($1, $2, $3) ON CONFLICT (client_id, product_id) DO UPDATE SET quantity = LEAST(cart_items.quantity::BIGINT + EXCLUDED.quantity, $4)::INTEGER";
const UPDATE_CART_ITEM_SQL: &str = "UPDATE cart_items SET quantity = $3 WHERE client_id = $1 AND product_id = $2";
const DELETE_CART_ITEM_SQL: &str = "DELETE FROM cart_items WHERE client_id = $1 AND product_id = $2";
const CLEAR_CART_SQL: &str = "DELETE FROM cart_items WHERE client_id = $1";

#[derive(FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    price: Decimal,
    quantity: i32,
    warranty_months: Option<i32>,
    category_id: Option<Uuid>,
    supplier_id: Option<Uuid>,
}

#[derive(FromRow)]
struct ListingRow {
    id: Uuid,
    name: String,
    price: Decimal,
    quantity: i32,
    warranty_months: Option<i32>,
    category_id: Option<Uuid>,
    supplier_id: Option<Uuid>,
    category_name: Option<String>,
}

#[derive(FromRow)]
struct CategoryRow {
    id: Uuid,
    name: String,
    description: Option<String>,
}

#[derive(FromRow)]
struct ClientRow {
    id: Uuid,
    full_name: String,
    phone: String,
    email: Option<String>,
    address: Option<String>,
    role: String,
    orders_count: i64,
}

#[derive(FromRow)]
struct OrderRow {
    id: Uuid,
    client_id: Uuid,
    created_at: DateTime<Utc>,
    status: String,
    client_name: Option<String>,
    client_phone: Option<String>,
}

#[derive(FromRow)]
struct OrderLineRow {
    order_id: Uuid,
    product_id: Uuid,
    quantity: i32,
    unit_price: Decimal,
    product_name: String,
}

#[derive(FromRow)]
struct CartItemRow {
    product_id: Uuid,
    quantity: i32,
}

fn to_u32(value: i32, column: &'static str) -> Result<u32, StoreError> {
    u32::try_from(value).map_err(|_| StoreError::Decode(column))
}

fn to_i32(value: u32, column: &'static str) -> Result<i32, StoreError> {
    i32::try_from(value).map_err(|_| StoreError::Decode(column))
}

/// Cart quantities saturate at [`MAX_QUANTITY`], matching [`Cart`](crate::domain::aggregates::Cart).
fn cart_quantity(quantity: i64) -> Result<i32, StoreError> {
    i32::try_from(quantity.min(i64::from(MAX_QUANTITY))).map_err(|_| StoreError::Decode("quantity"))
}

impl ProductRow {
    fn into_product(self) -> Result<Product, StoreError> {
        Ok(Product {
            id: self.id.into(),
            name: self.name,
            price: Money::new(self.price),
            available_quantity: to_u32(self.quantity, "quantity")?,
            category_id: self.category_id.map(Into::into),
            warranty_months: self.warranty_months.map(|m| to_u32(m, "warranty_months")).transpose()?,
            supplier_id: self.supplier_id.map(Into::into),
        })
    }
}

impl ListingRow {
    fn into_listing(self) -> Result<ProductListing, StoreError> {
        let ListingRow { id, name, price, quantity, warranty_months, category_id, supplier_id, category_name } = self;
        let product = ProductRow { id, name, price, quantity, warranty_months, category_id, supplier_id }.into_product()?;
        Ok(ProductListing { product, category_name })
    }
}

impl ClientRow {
    fn into_summary(self) -> Result<ClientSummary, StoreError> {
        let role = Role::from_token(&self.role).ok_or(StoreError::Decode("role"))?;
        Ok(ClientSummary {
            client: Client {
                id: self.id.into(),
                full_name: self.full_name,
                phone: self.phone,
                email: self.email,
                address: self.address,
                role,
            },
            orders_count: u64::try_from(self.orders_count).map_err(|_| StoreError::Decode("orders_count"))?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self { Self { pool } }

    async fn listings(&self, filter: &str, ids: Option<Vec<Uuid>>, category: Option<Uuid>) -> Result<Vec<ProductListing>, StoreError> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS}, c.name AS category_name FROM products p LEFT JOIN categories c ON c.id = p.category_id {filter} ORDER BY p.name"
        );
        let mut query = sqlx::query_as::<_, ListingRow>(&sql);
        if let Some(ids) = ids {
            query = query.bind(ids);
        }
        if let Some(category) = category {
            query = query.bind(category);
        }
        query.fetch_all(&self.pool).await?.into_iter().map(ListingRow::into_listing).collect()
    }
}

#[async_trait]
impl Store for PgStore {
    async fn begin(&self) -> Result<Box<dyn StoreTx>, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgTx { tx }))
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        let rows = sqlx::query_as::<_, CategoryRow>(LIST_CATEGORIES_SQL).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(|r| Category { id: r.id.into(), name: r.name, description: r.description }).collect())
    }

    async fn list_products(&self, category: Option<CategoryId>) -> Result<Vec<ProductListing>, StoreError> {
        match category {
            Some(category) => self.listings("WHERE p.category_id = $1", None, Some(category.into_uuid())).await,
            None => self.listings("", None, None).await,
        }
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products p WHERE p.id = $1");
        sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id.into_uuid())
            .fetch_optional(&self.pool)
            .await?
            .map(ProductRow::into_product)
            .transpose()
    }

    async fn products_by_ids(&self, ids: &[ProductId]) -> Result<Vec<ProductListing>, StoreError> {
        let uuids: Vec<Uuid> = ids.iter().map(|id| id.into_uuid()).collect();
        let mut listings = self.listings("WHERE p.id = ANY($1)", Some(uuids), None).await?;
        listings.sort_by_key(|l| ids.iter().position(|id| *id == l.product.id));
        Ok(listings)
    }

    async fn list_orders(&self, client: Option<ClientId>) -> Result<Vec<OrderRecord>, StoreError> {
        let orders = sqlx::query_as::<_, OrderRow>(LIST_ORDERS_SQL)
            .bind(client.map(ClientId::into_uuid))
            .fetch_all(&self.pool)
            .await?;
        let ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
        let lines = sqlx::query_as::<_, OrderLineRow>(LIST_ORDER_LINES_SQL).bind(&ids).fetch_all(&self.pool).await?;

        let mut lines_by_order: HashMap<Uuid, Vec<OrderLineRow>> = HashMap::new();
        for line in lines {
            lines_by_order.entry(line.order_id).or_default().push(line);
        }

        orders
            .into_iter()
            .map(|row| {
                let status = row.status.parse::<OrderStatus>().map_err(|_| StoreError::Decode("status"))?;
                let mut product_names = HashMap::new();
                let mut order_lines = Vec::new();
                for line in lines_by_order.remove(&row.id).unwrap_or_default() {
                    let product_id = ProductId::from_uuid(line.product_id);
                    product_names.insert(product_id, line.product_name);
                    order_lines.push(OrderLine {
                        product_id,
                        quantity: to_u32(line.quantity, "quantity")?,
                        unit_price: Money::new(line.unit_price),
                    });
                }
                let client = match (row.client_name, row.client_phone) {
                    (Some(full_name), Some(phone)) => Some(ClientContact { id: row.client_id.into(), full_name, phone }),
                    _ => None,
                };
                Ok(OrderRecord {
                    order: Order {
                        id: row.id.into(),
                        client_id: row.client_id.into(),
                        created_at: row.created_at,
                        status,
                        lines: order_lines,
                    },
                    client,
                    product_names,
                })
            })
            .collect()
    }

    async fn list_clients(&self) -> Result<Vec<ClientSummary>, StoreError> {
        let rows = sqlx::query_as::<_, ClientRow>(LIST_CLIENTS_SQL).fetch_all(&self.pool).await?;
        rows.into_iter().map(ClientRow::into_summary).collect()
    }

    async fn insert_category(&self, category: &Category) -> Result<(), StoreError> {
        sqlx::query(INSERT_CATEGORY_SQL)
            .bind(category.id.into_uuid())
            .bind(&category.name)
            .bind(&category.description)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn insert_supplier(&self, supplier: &Supplier) -> Result<(), StoreError> {
        sqlx::query(INSERT_SUPPLIER_SQL)
            .bind(supplier.id.into_uuid())
            .bind(&supplier.name)
            .bind(&supplier.contacts)
            .bind(supplier.rating)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn insert_product(&self, product: &Product) -> Result<(), StoreError> {
        sqlx::query(INSERT_PRODUCT_SQL)
            .bind(product.id.into_uuid())
            .bind(&product.name)
            .bind(product.price.amount())
            .bind(to_i32(product.available_quantity, "quantity")?)
            .bind(product.warranty_months.map(|m| to_i32(m, "warranty_months")).transpose()?)
            .bind(product.category_id.map(CategoryId::into_uuid))
            .bind(product.supplier_id.map(Into::<Uuid>::into))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn insert_client(&self, client: &Client) -> Result<(), StoreError> {
        sqlx::query(INSERT_CLIENT_SQL)
            .bind(client.id.into_uuid())
            .bind(&client.full_name)
            .bind(&client.phone)
            .bind(&client.email)
            .bind(&client.address)
            .bind(client.role.as_token())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

struct PgTx {
    tx: Transaction<'static, Postgres>,
}

impl PgTx {
    async fn count(&mut self, sql: &str, id: Uuid) -> Result<u64, StoreError> {
        let (count,): (i64,) = sqlx::query_as(sql).bind(id).fetch_one(&mut *self.tx).await?;
        u64::try_from(count).map_err(|_| StoreError::Decode("count"))
    }

    async fn delete(&mut self, sql: &str, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query(sql).bind(id).execute(&mut *self.tx).await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl StoreTx for PgTx {
    async fn lock_products(&mut self, ids: &[ProductId]) -> Result<Vec<Product>, StoreError> {
        let mut uuids: Vec<Uuid> = ids.iter().map(|id| id.into_uuid()).collect();
        uuids.sort_unstable();
        uuids.dedup();
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products p WHERE p.id = ANY($1) ORDER BY p.id FOR UPDATE");
        let rows = sqlx::query_as::<_, ProductRow>(&sql).bind(&uuids).fetch_all(&mut *self.tx).await?;
        rows.into_iter().map(ProductRow::into_product).collect()
    }

    async fn insert_order(&mut self, order: &Order) -> Result<(), StoreError> {
        sqlx::query(INSERT_ORDER_SQL)
            .bind(order.id.into_uuid())
            .bind(order.client_id.into_uuid())
            .bind(order.created_at)
            .bind(order.status.as_token())
            .execute(&mut *self.tx)
            .await?;

        for (position, line) in order.lines.iter().enumerate() {
            sqlx::query(INSERT_ORDER_LINE_SQL)
                .bind(order.id.into_uuid())
                .bind(line.product_id.into_uuid())
                .bind(i32::try_from(position).map_err(|_| StoreError::Decode("position"))?)
                .bind(to_i32(line.quantity, "quantity")?)
                .bind(line.unit_price.amount())
                .execute(&mut *self.tx)
                .await?;
        }
        Ok(())
    }

    async fn decrement_stock(&mut self, id: ProductId, by: u32) -> Result<u32, StoreError> {
        let remaining: Option<(i32,)> = sqlx::query_as(DECREMENT_STOCK_SQL)
            .bind(id.into_uuid())
            .bind(to_i32(by, "quantity")?)
            .fetch_optional(&mut *self.tx)
            .await?;
        let (remaining,) = remaining.ok_or(StoreError::StockUnderflow(id))?;
        to_u32(remaining, "quantity")
    }

    async fn count_orders_for_client(&mut self, client: ClientId) -> Result<u64, StoreError> {
        self.count(COUNT_CLIENT_ORDERS_SQL, client.into_uuid()).await
    }

    async fn count_order_lines_for_product(&mut self, product: ProductId) -> Result<u64, StoreError> {
        self.count(COUNT_PRODUCT_LINES_SQL, product.into_uuid()).await
    }

    async fn delete_client(&mut self, client: ClientId) -> Result<bool, StoreError> {
        self.delete(DELETE_CLIENT_SQL, client.into_uuid()).await
    }

    async fn delete_product(&mut self, product: ProductId) -> Result<bool, StoreError> {
        self.delete(DELETE_PRODUCT_SQL, product.into_uuid()).await
    }

    async fn delete_order(&mut self, order: OrderId) -> Result<bool, StoreError> {
        self.delete(DELETE_ORDER_SQL, order.into_uuid()).await
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.rollback().await?;
        Ok(())
    }
}

/// Carts persisted as one `cart_items` row per (client, product).
#[derive(Debug, Clone)]
pub struct PgCartStore {
    pool: PgPool,
}

impl PgCartStore {
    pub fn new(pool: PgPool) -> Self { Self { pool } }

    async fn delete_item(&self, client: ClientId, product: ProductId) -> Result<bool, StoreError> {
        let result = sqlx::query(DELETE_CART_ITEM_SQL)
            .bind(client.into_uuid())
            .bind(product.into_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl CartStore for PgCartStore {
    async fn get_cart(&self, client: ClientId) -> Result<Vec<CartLine>, StoreError> {
        let rows = sqlx::query_as::<_, CartItemRow>(GET_CART_SQL).bind(client.into_uuid()).fetch_all(&self.pool).await?;
        rows.into_iter()
            .map(|r| Ok(CartLine { product_id: r.product_id.into(), quantity: to_u32(r.quantity, "quantity")? }))
            .collect()
    }

    async fn add(&self, client: ClientId, product: ProductId, quantity: NonZeroU32) -> Result<(), StoreError> {
        sqlx::query(ADD_CART_ITEM_SQL)
            .bind(client.into_uuid())
            .bind(product.into_uuid())
            .bind(cart_quantity(i64::from(quantity.get()))?)
            .bind(i64::from(MAX_QUANTITY))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn remove(&self, client: ClientId, product: ProductId) -> Result<bool, StoreError> {
        self.delete_item(client, product).await
    }

    async fn update_quantity(&self, client: ClientId, product: ProductId, quantity: i64) -> Result<bool, StoreError> {
        if quantity <= 0 {
            return self.delete_item(client, product).await;
        }
        let result = sqlx::query(UPDATE_CART_ITEM_SQL)
            .bind(client.into_uuid())
            .bind(product.into_uuid())
            .bind(cart_quantity(quantity)?)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn clear(&self, client: ClientId) -> Result<(), StoreError> {
        sqlx::query(CLEAR_CART_SQL).bind(client.into_uuid()).execute(&self.pool).await?;
        Ok(())
    }
}
