use diesel::pg::Pg;
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{Order, OrderFilter, PageRequest};
use crate::domain::ports::OrderRepository;
use crate::schema::{order_items, orders};

use super::models::{NewOrderItemRow, NewOrderRow, OrderChangeset, OrderItemRow, OrderRow};
use super::store::DieselUnitOfWork;

fn filtered(filter: &OrderFilter) -> orders::BoxedQuery<'static, Pg> {
    let mut query = orders::table.into_boxed();
    if let Some(user_id) = filter.user_id {
        query = query.filter(orders::user_id.eq(user_id));
    }
    if let Some(status) = filter.status {
        query = query.filter(orders::status.eq(status.as_str()));
    }
    query
}

impl DieselUnitOfWork<'_> {
    fn with_items(&mut self, order: OrderRow) -> Result<Order, DomainError> {
        let items = order_items::table
            .filter(order_items::order_id.eq(order.id))
            .select(OrderItemRow::as_select())
            .order(order_items::position.asc())
            .load(self.conn)?;
        order.into_order(items)
    }
}

impl OrderRepository for DieselUnitOfWork<'_> {
    fn insert_order(&mut self, order: &Order) -> Result<(), DomainError> {
        let shipping_address = serde_json::to_value(&order.shipping_address)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        // 1. Insert the order
        diesel::insert_into(orders::table)
            .values(&NewOrderRow {
                id: order.id,
                user_id: order.user_id,
                total_amount: &order.total_amount,
                shipping_address,
                payment_method: &order.payment_info.method,
                payment_id: order.payment_info.id.as_deref(),
                payment_status: order.payment_info.status.as_str(),
                status: order.status.as_str(),
                cancellation_reason: order.cancellation_reason.as_deref(),
                created_at: order.created_at,
                updated_at: order.updated_at,
            })
            .execute(self.conn)?;

        // 2. Insert its items, keeping their checkout order
        let items: Vec<NewOrderItemRow<'_>> = order
            .items
            .iter()
            .zip(0..)
            .map(|(item, position)| NewOrderItemRow {
                id: Uuid::new_v4(),
                order_id: order.id,
                position,
                product_id: item.product_id,
                quantity: item.quantity,
                unit_price: &item.price,
                size: item.size.as_deref(),
                color: item.color.as_deref(),
            })
            .collect();
        diesel::insert_into(order_items::table)
            .values(&items)
            .execute(self.conn)?;

        Ok(())
    }

    fn find_order(&mut self, id: Uuid) -> Result<Option<Order>, DomainError> {
        let order = orders::table
            .find(id)
            .select(OrderRow::as_select())
            .first(self.conn)
            .optional()?;

        let Some(order) = order else {
            return Ok(None);
        };
        self.with_items(order).map(Some)
    }

    fn find_order_for_update(&mut self, id: Uuid) -> Result<Option<Order>, DomainError> {
        let order = orders::table
            .find(id)
            .select(OrderRow::as_select())
            .for_update()
            .get_result(self.conn)
            .optional()?;

        let Some(order) = order else {
            return Ok(None);
        };
        self.with_items(order).map(Some)
    }

    fn list_orders(
        &mut self,
        filter: &OrderFilter,
        page: Option<PageRequest>,
    ) -> Result<Vec<Order>, DomainError> {
        let mut query = filtered(filter)
            .select(OrderRow::as_select())
            .order((orders::created_at.desc(), orders::id.desc()));
        if let Some(page) = page {
            query = query.limit(page.limit()).offset(page.offset());
        }
        let rows: Vec<OrderRow> = query.load(self.conn)?;

        let items: Vec<OrderItemRow> = OrderItemRow::belonging_to(&rows)
            .select(OrderItemRow::as_select())
            .order(order_items::position.asc())
            .load(self.conn)?;
        let grouped = items.grouped_by(&rows);

        rows.into_iter()
            .zip(grouped)
            .map(|(order, items)| order.into_order(items))
            .collect()
    }

    fn count_orders(&mut self, filter: &OrderFilter) -> Result<i64, DomainError> {
        Ok(filtered(filter).count().get_result(self.conn)?)
    }

    fn save_order(&mut self, order: &Order) -> Result<(), DomainError> {
        let updated = diesel::update(orders::table.find(order.id))
            .set(OrderChangeset::from(order))
            .execute(self.conn)?;
        if updated == 0 {
            return Err(DomainError::NotFound("Order"));
        }
        Ok(())
    }
}
