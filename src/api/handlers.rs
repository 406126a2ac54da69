use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use std::num::NonZeroU32;
use validator::Validate;

use crate::api::dto::*;
use crate::api::error::ApiError;
use crate::api::AppState;
use crate::domain::aggregates::Category;
use crate::domain::value_objects::{ClientId, OrderId, ProductId};
use crate::error::StorefrontError;

type ApiResult<T> = Result<T, ApiError>;

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "healthy", "service": "storefront" }))
}

pub async fn list_categories(State(s): State<AppState>) -> ApiResult<Json<Vec<Category>>> {
    Ok(Json(s.storefront.catalog.list_categories().await?))
}

pub async fn list_products(State(s): State<AppState>, Query(p): Query<ListParams>) -> ApiResult<Json<Vec<ProductResponse>>> {
    let listings = s.storefront.catalog.list_products(p.category).await?;
    Ok(Json(listings.into_iter().map(ProductResponse::from).collect()))
}

pub async fn get_product(State(s): State<AppState>, Path(id): Path<ProductId>) -> ApiResult<Json<ProductResponse>> {
    Ok(Json(s.storefront.catalog.get_product(id).await?.into()))
}

pub async fn get_cart(State(s): State<AppState>, Path(client): Path<ClientId>) -> ApiResult<Json<CartResponse>> {
    Ok(Json(s.storefront.carts.view(client).await?.into()))
}

pub async fn add_to_cart(
    State(s): State<AppState>,
    Path(client): Path<ClientId>,
    Json(r): Json<AddToCartRequest>,
) -> ApiResult<(StatusCode, Json<CartResponse>)> {
    r.validate()?;
    let Some(quantity) = NonZeroU32::new(r.quantity) else {
        return Err(StorefrontError::Invalid("quantity").into());
    };
    s.storefront.carts.add(client, r.product_id, quantity).await?;
    Ok((StatusCode::CREATED, Json(s.storefront.carts.view(client).await?.into())))
}

pub async fn update_cart_item(
    State(s): State<AppState>,
    Path((client, product)): Path<(ClientId, ProductId)>,
    Json(r): Json<UpdateQuantityRequest>,
) -> ApiResult<Json<CartResponse>> {
    if !s.storefront.carts.update_quantity(client, product, r.quantity).await? {
        return Err(StorefrontError::NotFound("cart item").into());
    }
    Ok(Json(s.storefront.carts.view(client).await?.into()))
}

pub async fn remove_cart_item(
    State(s): State<AppState>,
    Path((client, product)): Path<(ClientId, ProductId)>,
) -> ApiResult<StatusCode> {
    if !s.storefront.carts.remove(client, product).await? {
        return Err(StorefrontError::NotFound("cart item").into());
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn clear_cart(State(s): State<AppState>, Path(client): Path<ClientId>) -> ApiResult<StatusCode> {
    s.storefront.carts.clear(client).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn checkout(
    State(s): State<AppState>,
    Path(client): Path<ClientId>,
) -> ApiResult<(StatusCode, Json<CheckoutResponse>)> {
    let order_id = s.storefront.checkout.checkout(client).await?;
    Ok((StatusCode::CREATED, Json(CheckoutResponse { order_id })))
}

pub async fn list_orders(State(s): State<AppState>, Path(client): Path<ClientId>) -> ApiResult<Json<Vec<OrderResponse>>> {
    let orders = s.storefront.orders.list_orders(client).await?;
    Ok(Json(orders.into_iter().map(OrderResponse::from).collect()))
}

pub async fn list_all_orders(State(s): State<AppState>) -> ApiResult<Json<Vec<OrderResponse>>> {
    let orders = s.storefront.orders.list_all_orders().await?;
    Ok(Json(orders.into_iter().map(OrderResponse::from).collect()))
}

pub async fn delete_order(State(s): State<AppState>, Path(id): Path<OrderId>) -> ApiResult<StatusCode> {
    s.storefront.orders.delete_order(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_clients(State(s): State<AppState>) -> ApiResult<Json<Vec<ClientResponse>>> {
    let clients = s.storefront.clients.list_clients().await?;
    Ok(Json(clients.into_iter().map(ClientResponse::from).collect()))
}

pub async fn create_client(
    State(s): State<AppState>,
    Json(r): Json<CreateClientRequest>,
) -> ApiResult<(StatusCode, Json<ClientResponse>)> {
    r.validate()?;
    let client = s.storefront.clients.register(r.into()).await?;
    Ok((StatusCode::CREATED, Json(client.into())))
}

pub async fn delete_client(State(s): State<AppState>, Path(id): Path<ClientId>) -> ApiResult<StatusCode> {
    s.storefront.clients.delete_client(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_category(
    State(s): State<AppState>,
    Json(r): Json<CreateCategoryRequest>,
) -> ApiResult<(StatusCode, Json<CategoryResponse>)> {
    r.validate()?;
    let category = s.storefront.catalog.create_category(r.into()).await?;
    Ok((StatusCode::CREATED, Json(CategoryResponse { category })))
}

pub async fn create_supplier(
    State(s): State<AppState>,
    Json(r): Json<CreateSupplierRequest>,
) -> ApiResult<(StatusCode, Json<SupplierResponse>)> {
    r.validate()?;
    let supplier = s.storefront.catalog.create_supplier(r.into()).await?;
    Ok((StatusCode::CREATED, Json(SupplierResponse { supplier })))
}

pub async fn create_product(
    State(s): State<AppState>,
    Json(r): Json<CreateProductRequest>,
) -> ApiResult<(StatusCode, Json<ProductResponse>)> {
    r.validate()?;
    let product = s.storefront.catalog.create_product(r.into()).await?;
    Ok((StatusCode::CREATED, Json(product.into())))
}

pub async fn delete_product(State(s): State<AppState>, Path(id): Path<ProductId>) -> ApiResult<StatusCode> {
    s.storefront.catalog.delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
