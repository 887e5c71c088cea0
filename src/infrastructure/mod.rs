pub mod gateway;
pub mod image_store;
pub mod models;
pub mod order_repo;
pub mod product_repo;
pub mod store;
pub mod user_repo;
