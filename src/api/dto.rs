//! Request and response bodies. Prices and status labels are formatted here
//! and nowhere else.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::aggregates::{
    Category, Client, ClientSummary, OrderItemSummary, OrderStatus, OrderSummary, Product, ProductListing, Role, Supplier,
};
use crate::domain::value_objects::{CategoryId, ClientId, Money, OrderId, ProductId, SupplierId};
use crate::services::{CartEntry, CartView, NewCategory, NewClient, NewProduct, NewSupplier};

/// Renders an amount as `$12.34`.
pub fn format_price(money: Money) -> String {
    let amount = money.amount().round_dp(2);
    if amount.is_sign_negative() && !amount.is_zero() {
        format!("-${:.2}", amount.abs())
    } else {
        format!("${:.2}", amount.abs())
    }
}

pub fn status_label(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Created => "Created",
        OrderStatus::Confirmed => "Confirmed",
        OrderStatus::InProgress => "In progress",
        OrderStatus::Assembled => "Assembled",
        OrderStatus::Shipped => "Shipped",
        OrderStatus::Delivered => "Delivered",
        OrderStatus::Cancelled => "Cancelled",
        OrderStatus::Returned => "Returned",
    }
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub category: Option<CategoryId>,
}

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub id: ProductId,
    pub name: String,
    pub price: String,
    pub available_quantity: u32,
    pub category_id: Option<CategoryId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
    pub warranty_months: Option<u32>,
    pub supplier_id: Option<SupplierId>,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            name: p.name,
            price: format_price(p.price),
            available_quantity: p.available_quantity,
            category_id: p.category_id,
            category_name: None,
            warranty_months: p.warranty_months,
            supplier_id: p.supplier_id,
        }
    }
}

impl From<ProductListing> for ProductResponse {
    fn from(listing: ProductListing) -> Self {
        Self { category_name: listing.category_name, ..Self::from(listing.product) }
    }
}

#[derive(Debug, Serialize)]
pub struct CartItemResponse {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: String,
    pub quantity: u32,
    pub subtotal: String,
}

#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub items: Vec<CartItemResponse>,
    pub total: String,
}

impl From<CartView> for CartResponse {
    fn from(view: CartView) -> Self {
        let items = view
            .entries
            .into_iter()
            .map(|CartEntry { listing, quantity, subtotal }| CartItemResponse {
                product_id: listing.product.id,
                name: listing.product.name,
                unit_price: format_price(listing.product.price),
                quantity,
                subtotal: format_price(subtotal),
            })
            .collect();
        Self { items, total: format_price(view.total) }
    }
}

#[derive(Debug, Serialize)]
pub struct OrderItemResponse {
    pub product_id: ProductId,
    pub product_name: Option<String>,
    pub quantity: u32,
    pub unit_price: String,
    pub subtotal: String,
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: OrderId,
    pub client_id: ClientId,
    pub client_name: Option<String>,
    pub client_phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub status: OrderStatus,
    pub status_label: &'static str,
    pub items: Vec<OrderItemResponse>,
    pub total: String,
}

impl From<OrderSummary> for OrderResponse {
    fn from(summary: OrderSummary) -> Self {
        let (client_name, client_phone) = match summary.client {
            Some(contact) => (Some(contact.full_name), Some(contact.phone)),
            None => (None, None),
        };
        let items = summary
            .items
            .into_iter()
            .map(|item: OrderItemSummary| OrderItemResponse {
                product_id: item.product_id,
                product_name: item.product_name,
                quantity: item.quantity,
                unit_price: format_price(item.unit_price),
                subtotal: format_price(item.subtotal),
            })
            .collect();
        Self {
            id: summary.id,
            client_id: summary.client_id,
            client_name,
            client_phone,
            created_at: summary.created_at,
            status: summary.status,
            status_label: status_label(summary.status),
            items,
            total: format_price(summary.total),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub order_id: OrderId,
}

#[derive(Debug, Serialize)]
pub struct ClientResponse {
    #[serde(flatten)]
    pub client: Client,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orders_count: Option<u64>,
}

impl From<Client> for ClientResponse {
    fn from(client: Client) -> Self { Self { client, orders_count: None } }
}

impl From<ClientSummary> for ClientResponse {
    fn from(summary: ClientSummary) -> Self { Self { client: summary.client, orders_count: Some(summary.orders_count) } }
}

#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    #[serde(flatten)]
    pub category: Category,
}

#[derive(Debug, Serialize)]
pub struct SupplierResponse {
    #[serde(flatten)]
    pub supplier: Supplier,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    #[validate(range(min = 1))]
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateClientRequest {
    #[validate(length(min = 1, max = 200))]
    pub full_name: String,
    #[validate(length(min = 1, max = 50))]
    pub phone: String,
    #[validate(email)]
    pub email: Option<String>,
    pub address: Option<String>,
    #[serde(default)]
    pub role: Role,
}

impl From<CreateClientRequest> for NewClient {
    fn from(r: CreateClientRequest) -> Self {
        Self { full_name: r.full_name, phone: r.phone, email: r.email, address: r.address, role: r.role }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub description: Option<String>,
}

impl From<CreateCategoryRequest> for NewCategory {
    fn from(r: CreateCategoryRequest) -> Self { Self { name: r.name, description: r.description } }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSupplierRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    pub contacts: String,
    pub rating: Option<Decimal>,
}

impl From<CreateSupplierRequest> for NewSupplier {
    fn from(r: CreateSupplierRequest) -> Self { Self { name: r.name, contacts: r.contacts, rating: r.rating } }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub quantity: u32,
    pub category_id: Option<CategoryId>,
    pub warranty_months: Option<u32>,
    pub supplier_id: Option<SupplierId>,
}

impl From<CreateProductRequest> for NewProduct {
    fn from(r: CreateProductRequest) -> Self {
        Self {
            name: r.name,
            price: Money::new(r.price),
            quantity: r.quantity,
            category_id: r.category_id,
            warranty_months: r.warranty_months,
            supplier_id: r.supplier_id,
        }
    }
}
