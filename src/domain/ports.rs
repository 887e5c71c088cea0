use async_trait::async_trait;
use uuid::Uuid;

use super::access::Requester;
use super::errors::DomainError;
use super::order::{Order, OrderFilter, PageRequest};
use super::product::{ImageUpload, NewProduct, Product, ProductFilter};

pub trait ProductRepository {
    fn find_product(&mut self, id: Uuid) -> Result<Option<Product>, DomainError>;
    /// Like `find_product`, but locks the row until the unit of work ends so
    /// a read-modify-write cannot lose a concurrent stock change.
    fn find_product_for_update(&mut self, id: Uuid) -> Result<Option<Product>, DomainError>;
    fn list_products(&mut self, filter: &ProductFilter) -> Result<Vec<Product>, DomainError>;
    fn insert_product(&mut self, product: NewProduct) -> Result<Product, DomainError>;
    fn save_product(&mut self, product: &Product) -> Result<(), DomainError>;
    /// Returns `false` if there was nothing to delete.
    fn delete_product(&mut self, id: Uuid) -> Result<bool, DomainError>;
    /// Decrements stock by `quantity` only if at least that much is available,
    /// as one operation. Returns whether the decrement happened.
    fn reserve_stock(&mut self, id: Uuid, quantity: i32) -> Result<bool, DomainError>;
    /// Adds `quantity` back. Returns `false` if the product no longer exists.
    fn restore_stock(&mut self, id: Uuid, quantity: i32) -> Result<bool, DomainError>;
}

pub trait OrderRepository {
    fn insert_order(&mut self, order: &Order) -> Result<(), DomainError>;
    fn find_order(&mut self, id: Uuid) -> Result<Option<Order>, DomainError>;
    /// Locks the order row until the unit of work ends. Every status change
    /// reads through this so two writers cannot both act on the same status.
    fn find_order_for_update(&mut self, id: Uuid) -> Result<Option<Order>, DomainError>;
    /// Newest first; `page` limits the result to one page.
    fn list_orders(
        &mut self,
        filter: &OrderFilter,
        page: Option<PageRequest>,
    ) -> Result<Vec<Order>, DomainError>;
    fn count_orders(&mut self, filter: &OrderFilter) -> Result<i64, DomainError>;
    /// Persists status, payment info and cancellation reason. Items and the
    /// total are immutable after insert.
    fn save_order(&mut self, order: &Order) -> Result<(), DomainError>;
}

pub trait UserRepository {
    fn find_requester_by_token_hash(
        &mut self,
        token_hash: &str,
    ) -> Result<Option<Requester>, DomainError>;
}

/// Everything a single transaction can touch.
pub trait UnitOfWork: ProductRepository + OrderRepository + UserRepository {}

impl<T: ProductRepository + OrderRepository + UserRepository> UnitOfWork for T {}

pub trait Store: Send + Sync + 'static {
    /// Runs `work` inside one transaction: committed if it returns `Ok`,
    /// rolled back otherwise.
    fn transaction(
        &self,
        work: &mut dyn FnMut(&mut dyn UnitOfWork) -> Result<(), DomainError>,
    ) -> Result<(), DomainError>;
}

impl dyn Store {
    pub fn unit_of_work<T, F>(&self, work: F) -> Result<T, DomainError>
    where
        F: FnOnce(&mut dyn UnitOfWork) -> Result<T, DomainError>,
    {
        let mut work = Some(work);
        let mut output = None;
        self.transaction(&mut |uow: &mut dyn UnitOfWork| {
            let work = work
                .take()
                .ok_or_else(|| DomainError::Internal("unit of work ran twice".to_string()))?;
            output = Some(work(uow)?);
            Ok(())
        })?;
        output.ok_or_else(|| DomainError::Internal("unit of work produced no result".to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Creates the remote order a client pays against.
    async fn create_order(
        &self,
        amount_minor_units: i64,
        currency: &str,
        receipt: &str,
    ) -> Result<GatewayOrder, DomainError>;
}

#[cfg_attr(test, mockall::automock)]
pub trait ImageStore: Send + Sync {
    /// Persists the image and returns its stable relative URL.
    fn store(&self, upload: &ImageUpload) -> Result<String, DomainError>;
    /// Removes a stored image. Missing files are not an error.
    fn delete(&self, url: &str) -> Result<(), DomainError>;
}
