pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;
pub mod state;

#[cfg(test)]
mod test_support;

use actix_web::body::BoxBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::domain::product::MAX_IMAGE_BYTES;
use crate::handlers::{health, orders, payments, products};
use crate::state::AppState;

pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut conn = pool.get()?;
    let applied = conn.run_pending_migrations(MIGRATIONS)?;
    if !applied.is_empty() {
        log::info!("Applied {} database migration(s)", applied.len());
    }
    Ok(())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        products::list_products,
        products::get_product,
        products::create_product,
        products::update_product,
        products::upload_product_image,
        products::delete_product,
        orders::create_order,
        orders::list_my_orders,
        orders::list_orders,
        orders::get_order,
        orders::cancel_order,
        orders::update_order_status,
        payments::create_payment_order,
        payments::verify_payment,
    ),
    components(schemas(
        products::CreateProductRequest,
        products::UpdateProductRequest,
        products::ProductResponse,
        orders::CreateOrderRequest,
        orders::CreateOrderItemRequest,
        orders::ShippingAddressDto,
        orders::CancelOrderRequest,
        orders::UpdateStatusRequest,
        orders::OrderResponse,
        orders::OrderItemResponse,
        orders::PaymentInfoResponse,
        orders::ListOrdersResponse,
        payments::CreatePaymentOrderRequest,
        payments::PaymentOrderResponse,
        payments::VerifyPaymentRequest,
        payments::VerifyPaymentResponse,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "products", description = "Product catalog"),
        (name = "orders", description = "Checkout and order lifecycle"),
        (name = "payments", description = "Payment gateway orders and verification"),
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}

/// Registers every API route.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health))
        .service(
            web::scope("/products")
                .route("", web::get().to(products::list_products))
                .route("", web::post().to(products::create_product))
                .service(
                    web::resource("/{id}/image")
                        .app_data(web::PayloadConfig::new(MAX_IMAGE_BYTES))
                        .route(web::put().to(products::upload_product_image)),
                )
                .route("/{id}", web::get().to(products::get_product))
                .route("/{id}", web::put().to(products::update_product))
                .route("/{id}", web::delete().to(products::delete_product)),
        )
        .service(
            web::scope("/orders")
                .route("", web::post().to(orders::create_order))
                .route("", web::get().to(orders::list_orders))
                // Registered before `/{id}` so "mine" is not parsed as an id.
                .route("/mine", web::get().to(orders::list_my_orders))
                .route("/{id}", web::get().to(orders::get_order))
                .route("/{id}/cancel", web::post().to(orders::cancel_order))
                .route("/{id}/status", web::put().to(orders::update_order_status)),
        )
        .service(
            web::scope("/payments")
                .route("/orders", web::post().to(payments::create_payment_order))
                .route("/verify", web::post().to(payments::verify_payment)),
        );
}

/// The application without middleware, shared by the server and tests.
pub fn build_app(
    state: AppState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<BoxBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .configure(configure_routes)
        .service(
            SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
        )
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    state: AppState,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    Ok(HttpServer::new(move || build_app(state.clone()).wrap(Logger::default()))
        .bind((host.to_string(), port))?
        .run())
}
