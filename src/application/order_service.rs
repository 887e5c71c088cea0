use std::sync::Arc;

use uuid::Uuid;

use crate::domain::access::{require_admin, require_owner_or_admin, Requester};
use crate::domain::errors::DomainError;
use crate::domain::order::{
    Order, OrderFilter, OrderItem, OrderPage, OrderStatus, PageRequest, PlaceOrder,
};
use crate::domain::ports::{Store, UnitOfWork};

const ADMIN_CANCELLATION_REASON: &str = "Cancelled by admin";

/// Order lifecycle: checkout with stock reservation, cancellation with stock
/// restoration, and admin status changes.
#[derive(Clone)]
pub struct OrderService {
    store: Arc<dyn Store>,
    default_payment_method: String,
}

impl OrderService {
    pub fn new(store: Arc<dyn Store>, default_payment_method: impl Into<String>) -> Self {
        Self {
            store,
            default_payment_method: default_payment_method.into(),
        }
    }

    /// Reserves stock for every line and creates the order in one unit of
    /// work. Any failure leaves all stock as it was.
    pub fn place_order(
        &self,
        requester: &Requester,
        request: PlaceOrder,
    ) -> Result<Order, DomainError> {
        request.validate()?;
        let payment_method = request
            .payment_method
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(&self.default_payment_method)
            .to_string();

        let order = self.store.unit_of_work(|uow| {
            let mut items = Vec::with_capacity(request.lines.len());
            for line in &request.lines {
                let product = uow
                    .find_product(line.product_id)?
                    .ok_or(DomainError::NotFound("Product"))?;
                // The conditional decrement also catches stock taken by a
                // concurrent checkout since the read.
                if product.stock < line.quantity
                    || !uow.reserve_stock(product.id, line.quantity)?
                {
                    return Err(DomainError::InsufficientStock {
                        product_id: product.id,
                        requested: line.quantity,
                        available: product.stock,
                    });
                }
                items.push(OrderItem {
                    product_id: product.id,
                    quantity: line.quantity,
                    price: product.price,
                    size: line.size.clone(),
                    color: line.color.clone(),
                });
            }

            let order = Order::new(
                requester.user_id,
                items,
                request.shipping_address.clone(),
                payment_method,
            );
            uow.insert_order(&order)?;
            Ok(order)
        })?;

        log::info!(
            "Order {} placed by user {} for {} ({} items)",
            order.id,
            order.user_id,
            order.total_amount,
            order.items.len()
        );
        Ok(order)
    }

    pub fn get_order(&self, requester: &Requester, id: Uuid) -> Result<Order, DomainError> {
        let order = self
            .store
            .unit_of_work(|uow| uow.find_order(id))?
            .ok_or(DomainError::NotFound("Order"))?;
        require_owner_or_admin(requester, order.user_id)?;
        Ok(order)
    }

    pub fn list_my_orders(&self, requester: &Requester) -> Result<Vec<Order>, DomainError> {
        let filter = OrderFilter {
            user_id: Some(requester.user_id),
            status: None,
        };
        self.store.unit_of_work(|uow| uow.list_orders(&filter, None))
    }

    pub fn list_orders(
        &self,
        requester: &Requester,
        status: Option<OrderStatus>,
        page: PageRequest,
    ) -> Result<OrderPage, DomainError> {
        require_admin(requester)?;
        let filter = OrderFilter {
            user_id: None,
            status,
        };
        self.store.unit_of_work(|uow| {
            Ok(OrderPage {
                total: uow.count_orders(&filter)?,
                orders: uow.list_orders(&filter, Some(page))?,
                page,
            })
        })
    }

    pub fn cancel_order(
        &self,
        requester: &Requester,
        id: Uuid,
        reason: &str,
    ) -> Result<Order, DomainError> {
        if reason.trim().is_empty() {
            return Err(DomainError::validation("cancellation reason is required"));
        }

        let order = self.store.unit_of_work(|uow| {
            let mut order = uow
                .find_order_for_update(id)?
                .ok_or(DomainError::NotFound("Order"))?;
            require_owner_or_admin(requester, order.user_id)?;
            cancel_and_restock(uow, &mut order, reason)?;
            Ok(order)
        })?;

        log::info!("Order {} cancelled by user {}", order.id, requester.user_id);
        Ok(order)
    }

    /// Admin status change. Every transition goes through the order state
    /// machine; moving to cancelled restocks like a regular cancellation.
    pub fn update_status(
        &self,
        requester: &Requester,
        id: Uuid,
        status: OrderStatus,
        reason: Option<&str>,
    ) -> Result<Order, DomainError> {
        require_admin(requester)?;

        let order = self.store.unit_of_work(|uow| {
            let mut order = uow
                .find_order_for_update(id)?
                .ok_or(DomainError::NotFound("Order"))?;
            if status == OrderStatus::Cancelled {
                let reason = reason
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .unwrap_or(ADMIN_CANCELLATION_REASON);
                cancel_and_restock(uow, &mut order, reason)?;
            } else {
                order.transition_to(status)?;
                uow.save_order(&order)?;
            }
            Ok(order)
        })?;

        log::info!("Order {} moved to {}", order.id, order.status);
        Ok(order)
    }
}

fn cancel_and_restock(
    uow: &mut dyn UnitOfWork,
    order: &mut Order,
    reason: &str,
) -> Result<(), DomainError> {
    order.cancel(reason)?;
    for item in &order.items {
        if !uow.restore_stock(item.product_id, item.quantity)? {
            log::warn!(
                "Product {} from order {} no longer exists; skipping restock of {}",
                item.product_id,
                order.id,
                item.quantity
            );
        }
    }
    uow.save_order(order)
}
