use std::str::FromStr;

use actix_web::http::header::CONTENT_TYPE;
use actix_web::{web, HttpRequest, HttpResponse};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::product::{ImageUpload, NewProduct, Product, ProductFilter, ProductUpdate};
use crate::errors::AppError;
use crate::handlers::auth::Authenticated;
use crate::state::AppState;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListProductsParams {
    /// Exact category match.
    pub category: Option<String>,
    pub featured: Option<bool>,
    /// Case-insensitive substring of the product name.
    pub search: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: String,
    pub description: Option<String>,
    /// Decimal price as a string to avoid floating-point issues, e.g. "499.00"
    pub price: String,
    pub stock: i32,
    pub category: String,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub featured: bool,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub stock: Option<i32>,
    pub category: Option<String>,
    pub sizes: Option<Vec<String>>,
    pub colors: Option<Vec<String>>,
    pub featured: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: String,
    pub stock: i32,
    pub category: String,
    pub image_url: Option<String>,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub featured: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        ProductResponse {
            id: p.id,
            name: p.name,
            description: p.description,
            price: p.price.to_string(),
            stock: p.stock,
            category: p.category,
            image_url: p.image_url,
            sizes: p.sizes,
            colors: p.colors,
            featured: p.featured,
            created_at: p.created_at.to_rfc3339(),
            updated_at: p.updated_at.to_rfc3339(),
        }
    }
}

fn parse_price(raw: &str) -> Result<BigDecimal, AppError> {
    BigDecimal::from_str(raw.trim())
        .map_err(|e| AppError::BadRequest(format!("Invalid price '{raw}': {e}")))
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /products
#[utoipa::path(
    get,
    path = "/products",
    params(ListProductsParams),
    responses(
        (status = 200, description = "Matching products, newest first", body = [ProductResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "products"
)]
pub async fn list_products(
    state: web::Data<AppState>,
    query: web::Query<ListProductsParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let filter = ProductFilter {
        category: params.category.filter(|c| !c.trim().is_empty()),
        featured: params.featured,
        search: params.search.filter(|s| !s.trim().is_empty()),
    };

    let catalog = state.catalog.clone();
    let products = web::block(move || catalog.list_products(&filter)).await??;

    Ok(HttpResponse::Ok().json(
        products
            .into_iter()
            .map(ProductResponse::from)
            .collect::<Vec<_>>(),
    ))
}

/// GET /products/{id}
#[utoipa::path(
    get,
    path = "/products/{id}",
    params(("id" = Uuid, Path, description = "Product UUID")),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 404, description = "Product not found"),
    ),
    tag = "products"
)]
pub async fn get_product(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let catalog = state.catalog.clone();
    let product = web::block(move || catalog.get_product(id)).await??;
    Ok(HttpResponse::Ok().json(ProductResponse::from(product)))
}

/// POST /products
#[utoipa::path(
    post,
    path = "/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Invalid product"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Admin only"),
    ),
    security(("bearer" = [])),
    tag = "products"
)]
pub async fn create_product(
    state: web::Data<AppState>,
    Authenticated(requester): Authenticated,
    body: web::Json<CreateProductRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let product = NewProduct {
        price: parse_price(&body.price)?,
        name: body.name,
        description: body.description,
        stock: body.stock,
        category: body.category,
        sizes: body.sizes,
        colors: body.colors,
        featured: body.featured,
    };

    let catalog = state.catalog.clone();
    let created = web::block(move || catalog.create_product(&requester, product)).await??;
    Ok(HttpResponse::Created().json(ProductResponse::from(created)))
}

/// PUT /products/{id}
#[utoipa::path(
    put,
    path = "/products/{id}",
    params(("id" = Uuid, Path, description = "Product UUID")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 400, description = "Invalid update"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer" = [])),
    tag = "products"
)]
pub async fn update_product(
    state: web::Data<AppState>,
    Authenticated(requester): Authenticated,
    path: web::Path<Uuid>,
    body: web::Json<UpdateProductRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let body = body.into_inner();
    let update = ProductUpdate {
        price: body.price.as_deref().map(parse_price).transpose()?,
        name: body.name,
        description: body.description,
        stock: body.stock,
        category: body.category,
        sizes: body.sizes,
        colors: body.colors,
        featured: body.featured,
    };

    let catalog = state.catalog.clone();
    let updated = web::block(move || catalog.update_product(&requester, id, update)).await??;
    Ok(HttpResponse::Ok().json(ProductResponse::from(updated)))
}

/// PUT /products/{id}/image
///
/// The raw request body is the image; its `Content-Type` must be one of
/// `image/jpeg`, `image/jpg`, `image/png` or `image/webp`.
#[utoipa::path(
    put,
    path = "/products/{id}/image",
    params(("id" = Uuid, Path, description = "Product UUID")),
    request_body(content = String, content_type = "image/*", description = "Image bytes, at most 5MB"),
    responses(
        (status = 200, description = "Image replaced", body = ProductResponse),
        (status = 400, description = "Unsupported or empty image"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Product not found"),
        (status = 413, description = "Image larger than 5MB"),
    ),
    security(("bearer" = [])),
    tag = "products"
)]
pub async fn upload_product_image(
    state: web::Data<AppState>,
    Authenticated(requester): Authenticated,
    req: HttpRequest,
    path: web::Path<Uuid>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let upload = ImageUpload::new(content_type, body.to_vec())?;

    let catalog = state.catalog.clone();
    let product = web::block(move || catalog.replace_image(&requester, id, upload)).await??;
    Ok(HttpResponse::Ok().json(ProductResponse::from(product)))
}

/// DELETE /products/{id}
#[utoipa::path(
    delete,
    path = "/products/{id}",
    params(("id" = Uuid, Path, description = "Product UUID")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer" = [])),
    tag = "products"
)]
pub async fn delete_product(
    state: web::Data<AppState>,
    Authenticated(requester): Authenticated,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let catalog = state.catalog.clone();
    web::block(move || catalog.delete_product(&requester, id)).await??;
    Ok(HttpResponse::NoContent().finish())
}
