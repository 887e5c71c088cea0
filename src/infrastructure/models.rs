use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{Order, OrderItem, PaymentInfo};
use crate::domain::product::Product;
use crate::schema::{order_items, orders, products, users};

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProductRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: BigDecimal,
    pub stock: i32,
    pub category: String,
    pub image_url: Option<String>,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            stock: row.stock,
            category: row.category,
            image_url: row.image_url,
            sizes: row.sizes,
            colors: row.colors,
            featured: row.featured,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = products)]
pub struct NewProductRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: BigDecimal,
    pub stock: i32,
    pub category: String,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub featured: bool,
}

/// Full overwrite of the mutable product columns.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = products)]
#[diesel(treat_none_as_null = true)]
pub struct ProductChangeset<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub price: &'a BigDecimal,
    pub stock: i32,
    pub category: &'a str,
    pub image_url: Option<&'a str>,
    pub sizes: &'a [String],
    pub colors: &'a [String],
    pub featured: bool,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a Product> for ProductChangeset<'a> {
    fn from(p: &'a Product) -> Self {
        ProductChangeset {
            name: &p.name,
            description: p.description.as_deref(),
            price: &p.price,
            stock: p.stock,
            category: &p.category,
            image_url: p.image_url.as_deref(),
            sizes: &p.sizes,
            colors: &p.colors,
            featured: p.featured,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub total_amount: BigDecimal,
    pub shipping_address: Value,
    pub payment_method: String,
    pub payment_id: Option<String>,
    pub payment_status: String,
    pub status: String,
    pub cancellation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderRow {
    pub fn into_order(self, items: Vec<OrderItemRow>) -> Result<Order, DomainError> {
        let shipping_address = serde_json::from_value(self.shipping_address).map_err(|e| {
            DomainError::Internal(format!("corrupt shipping address on order {}: {e}", self.id))
        })?;
        Ok(Order {
            id: self.id,
            user_id: self.user_id,
            items: items.into_iter().map(OrderItem::from).collect(),
            total_amount: self.total_amount,
            shipping_address,
            payment_info: PaymentInfo {
                method: self.payment_method,
                id: self.payment_id,
                status: self.payment_status.parse()?,
            },
            status: self.status.parse()?,
            cancellation_reason: self.cancellation_reason,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrderRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub total_amount: &'a BigDecimal,
    pub shipping_address: Value,
    pub payment_method: &'a str,
    pub payment_id: Option<&'a str>,
    pub payment_status: &'a str,
    pub status: &'a str,
    pub cancellation_reason: Option<&'a str>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Columns that may change after an order is placed.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = orders)]
#[diesel(treat_none_as_null = true)]
pub struct OrderChangeset<'a> {
    pub payment_method: &'a str,
    pub payment_id: Option<&'a str>,
    pub payment_status: &'a str,
    pub status: &'a str,
    pub cancellation_reason: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a Order> for OrderChangeset<'a> {
    fn from(o: &'a Order) -> Self {
        OrderChangeset {
            payment_method: &o.payment_info.method,
            payment_id: o.payment_info.id.as_deref(),
            payment_status: o.payment_info.status.as_str(),
            status: o.status.as_str(),
            cancellation_reason: o.cancellation_reason.as_deref(),
            updated_at: o.updated_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = order_items)]
#[diesel(belongs_to(OrderRow, foreign_key = order_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderItemRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub position: i32,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub size: Option<String>,
    pub color: Option<String>,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        OrderItem {
            product_id: row.product_id,
            quantity: row.quantity,
            price: row.unit_price,
            size: row.size,
            color: row.color,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = order_items)]
pub struct NewOrderItemRow<'a> {
    pub id: Uuid,
    pub order_id: Uuid,
    pub position: i32,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: &'a BigDecimal,
    pub size: Option<&'a str>,
    pub color: Option<&'a str>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserIdentityRow {
    pub id: Uuid,
    pub role: String,
}
