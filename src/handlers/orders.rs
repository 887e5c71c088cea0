use std::str::FromStr;

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::order::{
    Order, OrderLineInput, OrderStatus, PageRequest, PlaceOrder, ShippingAddress,
};
use crate::errors::AppError;
use crate::handlers::auth::Authenticated;
use crate::state::AppState;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderItemRequest {
    pub product_id: Uuid,
    pub quantity: i32,
    pub size: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddressDto {
    pub full_name: String,
    pub line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    pub postal_code: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl From<ShippingAddressDto> for ShippingAddress {
    fn from(a: ShippingAddressDto) -> Self {
        ShippingAddress {
            full_name: a.full_name,
            line1: a.line1,
            line2: a.line2,
            city: a.city,
            state: a.state,
            postal_code: a.postal_code,
            country: a.country,
            phone: a.phone,
        }
    }
}

impl From<ShippingAddress> for ShippingAddressDto {
    fn from(a: ShippingAddress) -> Self {
        ShippingAddressDto {
            full_name: a.full_name,
            line1: a.line1,
            line2: a.line2,
            city: a.city,
            state: a.state,
            postal_code: a.postal_code,
            country: a.country,
            phone: a.phone,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub items: Vec<CreateOrderItemRequest>,
    pub shipping_address: ShippingAddressDto,
    /// Defaults to the configured payment gateway. "cod" adds a flat surcharge.
    pub payment_method: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CancelOrderRequest {
    pub reason: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    /// One of pending, processing, shipped, delivered, cancelled.
    pub status: String,
    /// Used when the new status is cancelled.
    pub reason: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemResponse {
    pub product_id: Uuid,
    pub quantity: i32,
    pub price: String,
    pub size: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInfoResponse {
    pub method: String,
    pub id: Option<String>,
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub items: Vec<OrderItemResponse>,
    pub total_amount: String,
    pub shipping_address: ShippingAddressDto,
    pub payment_info: PaymentInfoResponse,
    pub status: String,
    pub cancellation_reason: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Order> for OrderResponse {
    fn from(o: Order) -> Self {
        OrderResponse {
            id: o.id,
            user_id: o.user_id,
            items: o
                .items
                .into_iter()
                .map(|i| OrderItemResponse {
                    product_id: i.product_id,
                    quantity: i.quantity,
                    price: i.price.to_string(),
                    size: i.size,
                    color: i.color,
                })
                .collect(),
            total_amount: o.total_amount.to_string(),
            shipping_address: o.shipping_address.into(),
            payment_info: PaymentInfoResponse {
                method: o.payment_info.method,
                id: o.payment_info.id,
                status: o.payment_info.status.as_str().to_string(),
            },
            status: o.status.to_string(),
            cancellation_reason: o.cancellation_reason,
            created_at: o.created_at.to_rfc3339(),
            updated_at: o.updated_at.to_rfc3339(),
        }
    }
}

// ── Pagination ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListOrdersParams {
    /// Only orders in this status.
    pub status: Option<String>,
    /// Page number (1-based). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: i64,
    /// Number of items per page. Defaults to 20, maximum 100.
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    20
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListOrdersResponse {
    pub items: Vec<OrderResponse>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

fn orders_response(orders: Vec<Order>) -> Vec<OrderResponse> {
    orders.into_iter().map(OrderResponse::from).collect()
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /orders
///
/// Reserves stock for every item and creates the order in one transaction:
/// either every product is decremented and the order exists, or nothing
/// changed.
#[utoipa::path(
    post,
    path = "/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created successfully", body = OrderResponse),
        (status = 400, description = "Invalid order"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "A product does not exist"),
        (status = 409, description = "Insufficient stock"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer" = [])),
    tag = "orders"
)]
pub async fn create_order(
    state: web::Data<AppState>,
    Authenticated(requester): Authenticated,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let request = PlaceOrder {
        lines: body
            .items
            .into_iter()
            .map(|i| OrderLineInput {
                product_id: i.product_id,
                quantity: i.quantity,
                size: i.size,
                color: i.color,
            })
            .collect(),
        shipping_address: body.shipping_address.into(),
        payment_method: body.payment_method,
    };

    let orders = state.orders.clone();
    let order = web::block(move || orders.place_order(&requester, request)).await??;
    Ok(HttpResponse::Created().json(OrderResponse::from(order)))
}

/// GET /orders/mine
#[utoipa::path(
    get,
    path = "/orders/mine",
    responses(
        (status = 200, description = "The caller's orders, newest first", body = [OrderResponse]),
        (status = 401, description = "Not authenticated"),
    ),
    security(("bearer" = [])),
    tag = "orders"
)]
pub async fn list_my_orders(
    state: web::Data<AppState>,
    Authenticated(requester): Authenticated,
) -> Result<HttpResponse, AppError> {
    let orders = state.orders.clone();
    let result = web::block(move || orders.list_my_orders(&requester)).await??;
    Ok(HttpResponse::Ok().json(orders_response(result)))
}

/// GET /orders
///
/// Returns a paginated list of all orders, optionally filtered by status.
/// Admin only.
#[utoipa::path(
    get,
    path = "/orders",
    params(ListOrdersParams),
    responses(
        (status = 200, description = "Paginated list of orders", body = ListOrdersResponse),
        (status = 400, description = "Unknown status or page out of range"),
        (status = 403, description = "Admin only"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer" = [])),
    tag = "orders"
)]
pub async fn list_orders(
    state: web::Data<AppState>,
    Authenticated(requester): Authenticated,
    query: web::Query<ListOrdersParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let page = PageRequest::new(params.page, params.limit)?;
    let status = params
        .status
        .as_deref()
        .map(OrderStatus::from_str)
        .transpose()?;

    let orders = state.orders.clone();
    let result = web::block(move || orders.list_orders(&requester, status, page)).await??;

    Ok(HttpResponse::Ok().json(ListOrdersResponse {
        items: orders_response(result.orders),
        total: result.total,
        page: result.page.page(),
        limit: result.page.limit(),
    }))
}

/// GET /orders/{id}
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(("id" = Uuid, Path, description = "Order UUID")),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer" = [])),
    tag = "orders"
)]
pub async fn get_order(
    state: web::Data<AppState>,
    Authenticated(requester): Authenticated,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let orders = state.orders.clone();
    let order = web::block(move || orders.get_order(&requester, id)).await??;
    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// POST /orders/{id}/cancel
///
/// Cancels the order and puts its items back in stock. Owner or admin.
#[utoipa::path(
    post,
    path = "/orders/{id}/cancel",
    params(("id" = Uuid, Path, description = "Order UUID")),
    request_body = CancelOrderRequest,
    responses(
        (status = 200, description = "Order cancelled", body = OrderResponse),
        (status = 400, description = "Missing reason"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Order already delivered or cancelled"),
    ),
    security(("bearer" = [])),
    tag = "orders"
)]
pub async fn cancel_order(
    state: web::Data<AppState>,
    Authenticated(requester): Authenticated,
    path: web::Path<Uuid>,
    body: web::Json<CancelOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let reason = body.into_inner().reason;
    let orders = state.orders.clone();
    let order = web::block(move || orders.cancel_order(&requester, id, &reason)).await??;
    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// PUT /orders/{id}/status
#[utoipa::path(
    put,
    path = "/orders/{id}/status",
    params(("id" = Uuid, Path, description = "Order UUID")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = OrderResponse),
        (status = 400, description = "Unknown status"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Illegal transition"),
    ),
    security(("bearer" = [])),
    tag = "orders"
)]
pub async fn update_order_status(
    state: web::Data<AppState>,
    Authenticated(requester): Authenticated,
    path: web::Path<Uuid>,
    body: web::Json<UpdateStatusRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let body = body.into_inner();
    let status = OrderStatus::from_str(&body.status)?;
    let orders = state.orders.clone();
    let order = web::block(move || {
        orders.update_status(&requester, id, status, body.reason.as_deref())
    })
    .await??;
    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}
