//! In-memory `Store` for service and handler tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use actix_web::body::BoxBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::App;
use bigdecimal::BigDecimal;
use chrono::{Duration, Utc};
use tempfile::TempDir;
use uuid::Uuid;

use crate::application::auth::hash_token;
use crate::application::payment_service::PaymentSettings;
use crate::domain::access::{Requester, Role};
use crate::domain::errors::DomainError;
use crate::domain::order::{Order, OrderFilter, PageRequest, ShippingAddress};
use crate::domain::ports::{
    MockPaymentGateway, OrderRepository, ProductRepository, Store, UnitOfWork, UserRepository,
};
use crate::domain::product::{NewProduct, Product, ProductFilter};
use crate::infrastructure::image_store::LocalImageStore;
use crate::state::AppState;

#[derive(Debug, Clone, Default)]
pub struct MemoryState {
    products: HashMap<Uuid, Product>,
    orders: Vec<Order>,
    users: HashMap<String, Requester>,
}

impl ProductRepository for MemoryState {
    fn find_product(&mut self, id: Uuid) -> Result<Option<Product>, DomainError> {
        Ok(self.products.get(&id).cloned())
    }

    /// Transactions are already serialized by the store's mutex.
    fn find_product_for_update(&mut self, id: Uuid) -> Result<Option<Product>, DomainError> {
        self.find_product(id)
    }

    fn list_products(&mut self, filter: &ProductFilter) -> Result<Vec<Product>, DomainError> {
        let mut products: Vec<Product> = self
            .products
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(products)
    }

    fn insert_product(&mut self, product: NewProduct) -> Result<Product, DomainError> {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4(),
            name: product.name,
            description: product.description,
            price: product.price,
            stock: product.stock,
            category: product.category,
            image_url: None,
            sizes: product.sizes,
            colors: product.colors,
            featured: product.featured,
            created_at: now,
            updated_at: now,
        };
        self.products.insert(product.id, product.clone());
        Ok(product)
    }

    fn save_product(&mut self, product: &Product) -> Result<(), DomainError> {
        match self.products.get_mut(&product.id) {
            Some(existing) => {
                *existing = product.clone();
                Ok(())
            }
            None => Err(DomainError::NotFound("Product")),
        }
    }

    fn delete_product(&mut self, id: Uuid) -> Result<bool, DomainError> {
        Ok(self.products.remove(&id).is_some())
    }

    fn reserve_stock(&mut self, id: Uuid, quantity: i32) -> Result<bool, DomainError> {
        match self.products.get_mut(&id) {
            Some(p) if p.stock >= quantity => {
                p.stock -= quantity;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn restore_stock(&mut self, id: Uuid, quantity: i32) -> Result<bool, DomainError> {
        match self.products.get_mut(&id) {
            Some(p) => {
                p.stock += quantity;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl OrderRepository for MemoryState {
    fn insert_order(&mut self, order: &Order) -> Result<(), DomainError> {
        self.orders.push(order.clone());
        Ok(())
    }

    fn find_order(&mut self, id: Uuid) -> Result<Option<Order>, DomainError> {
        Ok(self.orders.iter().find(|o| o.id == id).cloned())
    }

    fn find_order_for_update(&mut self, id: Uuid) -> Result<Option<Order>, DomainError> {
        self.find_order(id)
    }

    fn list_orders(
        &mut self,
        filter: &OrderFilter,
        page: Option<PageRequest>,
    ) -> Result<Vec<Order>, DomainError> {
        let mut orders: Vec<Order> = self
            .orders
            .iter()
            .filter(|o| filter.matches(o))
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(page) = page {
            orders = orders
                .into_iter()
                .skip(page.offset() as usize)
                .take(page.limit() as usize)
                .collect();
        }
        Ok(orders)
    }

    fn count_orders(&mut self, filter: &OrderFilter) -> Result<i64, DomainError> {
        Ok(self.orders.iter().filter(|o| filter.matches(o)).count() as i64)
    }

    fn save_order(&mut self, order: &Order) -> Result<(), DomainError> {
        match self.orders.iter_mut().find(|o| o.id == order.id) {
            Some(existing) => {
                *existing = order.clone();
                Ok(())
            }
            None => Err(DomainError::NotFound("Order")),
        }
    }
}

impl UserRepository for MemoryState {
    fn find_requester_by_token_hash(
        &mut self,
        token_hash: &str,
    ) -> Result<Option<Requester>, DomainError> {
        Ok(self.users.get(token_hash).copied())
    }
}

/// Transactions run against a copy of the state that replaces the original
/// only when the work succeeds.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl Store for MemoryStore {
    fn transaction(
        &self,
        work: &mut dyn FnMut(&mut dyn UnitOfWork) -> Result<(), DomainError>,
    ) -> Result<(), DomainError> {
        let mut guard = self
            .state
            .lock()
            .map_err(|_| DomainError::Internal("memory store poisoned".to_string()))?;
        let mut draft = guard.clone();
        work(&mut draft)?;
        *guard = draft;
        Ok(())
    }
}

impl MemoryStore {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut MemoryState) -> T) -> T {
        let mut guard = self.state.lock().unwrap();
        f(&mut guard)
    }

    pub fn seed_product(&self, name: &str, price: i64, stock: i32) -> Product {
        self.with_state(|state| {
            let mut product = state
                .insert_product(NewProduct {
                    name: name.to_string(),
                    description: None,
                    price: BigDecimal::from(price),
                    stock,
                    category: "general".to_string(),
                    sizes: vec!["M".to_string()],
                    colors: vec!["black".to_string()],
                    featured: false,
                })
                .unwrap();
            // Keep creation order observable for newest-first listings.
            product.created_at = Utc::now() + Duration::milliseconds(state.products.len() as i64);
            state.products.insert(product.id, product.clone());
            product
        })
    }

    pub fn product(&self, id: Uuid) -> Option<Product> {
        self.with_state(|state| state.products.get(&id).cloned())
    }

    pub fn stock_of(&self, id: Uuid) -> i32 {
        self.product(id).map(|p| p.stock).unwrap()
    }

    pub fn remove_product(&self, id: Uuid) {
        self.with_state(|state| {
            state.products.remove(&id);
        });
    }

    pub fn order(&self, id: Uuid) -> Option<Order> {
        self.with_state(|state| state.orders.iter().find(|o| o.id == id).cloned())
    }

    pub fn order_count(&self) -> usize {
        self.with_state(|state| state.orders.len())
    }

    /// Registers a user and returns the bearer token that authenticates it.
    pub fn add_user(&self, role: Role) -> (String, Requester) {
        let requester = Requester {
            user_id: Uuid::new_v4(),
            role,
        };
        let token = format!("token-{}", Uuid::new_v4());
        self.with_state(|state| {
            state.users.insert(hash_token(&token), requester);
        });
        (token, requester)
    }
}

pub fn requester(role: Role) -> Requester {
    Requester {
        user_id: Uuid::new_v4(),
        role,
    }
}

pub fn shipping_address() -> ShippingAddress {
    ShippingAddress {
        full_name: "Grace Hopper".to_string(),
        line1: "1 Compiler Way".to_string(),
        line2: None,
        city: "Arlington".to_string(),
        state: Some("VA".to_string()),
        postal_code: "22201".to_string(),
        country: "US".to_string(),
        phone: None,
    }
}

pub fn payment_settings() -> PaymentSettings {
    PaymentSettings {
        gateway_name: "razorpay".to_string(),
        key_id: "rzp_test_key".to_string(),
        key_secret: "s3cret".to_string(),
        currency: "INR".to_string(),
    }
}

/// Full application wired to a `MemoryStore`, images in a temp dir and a
/// mocked gateway.
pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub state: AppState,
    _uploads: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_gateway(MockPaymentGateway::new())
    }

    pub fn with_gateway(gateway: MockPaymentGateway) -> Self {
        let store = MemoryStore::shared();
        let uploads = tempfile::tempdir().unwrap();
        let state = AppState::new(
            store.clone(),
            Arc::new(LocalImageStore::new(uploads.path())),
            Arc::new(gateway),
            payment_settings(),
        );
        Self {
            store,
            state,
            _uploads: uploads,
        }
    }

    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse<BoxBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        crate::build_app(self.state.clone())
    }
}
