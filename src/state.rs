use std::sync::Arc;

use crate::application::auth::Authenticator;
use crate::application::catalog_service::CatalogService;
use crate::application::order_service::OrderService;
use crate::application::payment_service::{PaymentService, PaymentSettings};
use crate::domain::ports::{ImageStore, PaymentGateway, Store};

/// Services shared by every worker.
#[derive(Clone)]
pub struct AppState {
    pub auth: Authenticator,
    pub catalog: CatalogService,
    pub orders: OrderService,
    pub payments: PaymentService,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        images: Arc<dyn ImageStore>,
        gateway: Arc<dyn PaymentGateway>,
        payment: PaymentSettings,
    ) -> Self {
        Self {
            auth: Authenticator::new(store.clone()),
            catalog: CatalogService::new(store.clone(), images),
            orders: OrderService::new(store.clone(), payment.gateway_name.clone()),
            payments: PaymentService::new(store, gateway, payment),
        }
    }
}
