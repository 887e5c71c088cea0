use std::io;
use std::sync::Arc;

use dotenvy::dotenv;
use storefront_service::config::AppConfig;
use storefront_service::infrastructure::gateway::HttpPaymentGateway;
use storefront_service::infrastructure::image_store::LocalImageStore;
use storefront_service::infrastructure::store::DieselStore;
use storefront_service::state::AppState;
use storefront_service::{build_server, create_pool, run_migrations};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    let pool = create_pool(&config.database_url).map_err(io::Error::other)?;
    run_migrations(&pool).map_err(io::Error::other)?;

    let gateway = HttpPaymentGateway::new(
        config.gateway_url.clone(),
        config.payment.key_id.clone(),
        config.payment.key_secret.clone(),
    );
    let state = AppState::new(
        Arc::new(DieselStore::new(pool)),
        Arc::new(LocalImageStore::new(config.upload_dir.clone())),
        Arc::new(gateway),
        config.payment.clone(),
    );

    log::info!("Starting server at http://{}:{}", config.host, config.port);

    build_server(state, &config.host, config.port)?.await
}
