use std::fmt;
use std::str::FromStr;

use bigdecimal::{BigDecimal, ToPrimitive};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::DomainError;

/// Flat fee added to cash-on-delivery orders.
pub const COD_SURCHARGE: i64 = 50;

pub const COD_METHOD: &str = "cod";

pub fn is_cash_on_delivery(method: &str) -> bool {
    method.trim().eq_ignore_ascii_case(COD_METHOD)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// The single source of truth for legal status changes.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Processing)
                | (Processing, Shipped)
                | (Shipped, Delivered)
                | (Pending | Processing | Shipped, Cancelled)
        )
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "processing" => Ok(OrderStatus::Processing),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(DomainError::validation(format!(
                "unknown order status '{other}'"
            ))),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
}

impl PaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "completed" => Ok(PaymentStatus::Completed),
            other => Err(DomainError::Internal(format!(
                "unknown payment status '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaymentInfo {
    pub method: String,
    /// Payment id assigned by the gateway once the payment is verified.
    pub id: Option<String>,
    pub status: PaymentStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub full_name: String,
    pub line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    pub postal_code: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl ShippingAddress {
    pub fn validate(&self) -> Result<(), DomainError> {
        let required = [
            ("fullName", &self.full_name),
            ("line1", &self.line1),
            ("city", &self.city),
            ("postalCode", &self.postal_code),
            ("country", &self.country),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(DomainError::validation(format!(
                    "shipping address {field} is required"
                )));
            }
        }
        Ok(())
    }
}

/// One requested line of a checkout.
#[derive(Debug, Clone)]
pub struct OrderLineInput {
    pub product_id: Uuid,
    pub quantity: i32,
    pub size: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PlaceOrder {
    pub lines: Vec<OrderLineInput>,
    pub shipping_address: ShippingAddress,
    pub payment_method: Option<String>,
}

impl PlaceOrder {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.lines.is_empty() {
            return Err(DomainError::validation("order must contain at least one item"));
        }
        if let Some(line) = self.lines.iter().find(|l| l.quantity <= 0) {
            return Err(DomainError::validation(format!(
                "quantity for product {} must be a positive integer",
                line.product_id
            )));
        }
        self.shipping_address.validate()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem {
    pub product_id: Uuid,
    pub quantity: i32,
    /// Unit price at the time the order was placed.
    pub price: BigDecimal,
    pub size: Option<String>,
    pub color: Option<String>,
}

impl OrderItem {
    pub fn line_total(&self) -> BigDecimal {
        &self.price * BigDecimal::from(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub items: Vec<OrderItem>,
    pub total_amount: BigDecimal,
    pub shipping_address: ShippingAddress,
    pub payment_info: PaymentInfo,
    pub status: OrderStatus,
    pub cancellation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Builds a pending order; the total is fixed here and never recomputed.
    pub fn new(
        user_id: Uuid,
        items: Vec<OrderItem>,
        shipping_address: ShippingAddress,
        payment_method: String,
    ) -> Self {
        let total_amount = order_total(&items, &payment_method);
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            items,
            total_amount,
            shipping_address,
            payment_info: PaymentInfo {
                method: payment_method,
                id: None,
                status: PaymentStatus::Pending,
            },
            status: OrderStatus::Pending,
            cancellation_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_cash_on_delivery(&self) -> bool {
        is_cash_on_delivery(&self.payment_info.method)
    }

    pub fn transition_to(&mut self, next: OrderStatus) -> Result<(), DomainError> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::invalid_state(format!(
                "cannot move order from {} to {}",
                self.status, next
            )));
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Marks the order cancelled. Restoring stock is the caller's job and
    /// must happen in the same unit of work.
    pub fn cancel(&mut self, reason: &str) -> Result<(), DomainError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(DomainError::validation("cancellation reason is required"));
        }
        if self.status.is_terminal() {
            return Err(DomainError::invalid_state(format!(
                "order is already {}",
                self.status
            )));
        }
        self.transition_to(OrderStatus::Cancelled)?;
        self.cancellation_reason = Some(reason.to_string());
        Ok(())
    }

    /// Records a verified gateway payment and moves the order to processing.
    /// Verifying the same payment twice is a no-op.
    pub fn record_payment(&mut self, payment_id: &str, gateway: &str) -> Result<(), DomainError> {
        if self.payment_info.status == PaymentStatus::Completed
            && self.payment_info.id.as_deref() == Some(payment_id)
        {
            return Ok(());
        }
        self.transition_to(OrderStatus::Processing)?;
        self.payment_info = PaymentInfo {
            method: gateway.to_string(),
            id: Some(payment_id.to_string()),
            status: PaymentStatus::Completed,
        };
        Ok(())
    }

    /// Total in the currency's minor unit, as payment gateways expect it.
    pub fn amount_minor_units(&self) -> Result<i64, DomainError> {
        (&self.total_amount * BigDecimal::from(100))
            .round(0)
            .to_i64()
            .ok_or_else(|| DomainError::Internal("order total out of range".to_string()))
    }
}

pub fn order_total(items: &[OrderItem], payment_method: &str) -> BigDecimal {
    let subtotal = items
        .iter()
        .fold(BigDecimal::from(0), |acc, item| acc + item.line_total());
    if is_cash_on_delivery(payment_method) {
        subtotal + BigDecimal::from(COD_SURCHARGE)
    } else {
        subtotal
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderFilter {
    pub user_id: Option<Uuid>,
    pub status: Option<OrderStatus>,
}

impl OrderFilter {
    pub fn matches(&self, order: &Order) -> bool {
        self.user_id.map_or(true, |id| order.user_id == id)
            && self.status.map_or(true, |status| order.status == status)
    }
}

/// One page of a listing. Page numbers are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: i64,
    limit: i64,
    offset: i64,
}

impl PageRequest {
    pub const MAX_LIMIT: i64 = 100;

    /// Clamps `page` to at least 1 and `limit` to `1..=MAX_LIMIT`. Fails if
    /// the page lies beyond any representable offset.
    pub fn new(page: i64, limit: i64) -> Result<Self, DomainError> {
        let page = page.max(1);
        let limit = limit.clamp(1, Self::MAX_LIMIT);
        let offset = (page - 1)
            .checked_mul(limit)
            .ok_or_else(|| DomainError::validation(format!("page {page} is out of range")))?;
        Ok(Self {
            page,
            limit,
            offset,
        })
    }

    pub fn page(self) -> i64 {
        self.page
    }

    pub fn limit(self) -> i64 {
        self.limit
    }

    pub fn offset(self) -> i64 {
        self.offset
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderPage {
    pub orders: Vec<Order>,
    /// Number of orders matching the filter across all pages.
    pub total: i64,
    pub page: PageRequest,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn address() -> ShippingAddress {
        ShippingAddress {
            full_name: "Ada Lovelace".into(),
            line1: "12 Analytical St".into(),
            line2: None,
            city: "London".into(),
            state: None,
            postal_code: "N1 9GU".into(),
            country: "UK".into(),
            phone: None,
        }
    }

    fn item(price: i64, quantity: i32) -> OrderItem {
        OrderItem {
            product_id: Uuid::new_v4(),
            quantity,
            price: BigDecimal::from(price),
            size: None,
            color: None,
        }
    }

    fn order_with_status(status: OrderStatus) -> Order {
        let mut order = Order::new(Uuid::new_v4(), vec![item(10, 1)], address(), "razorpay".into());
        order.status = status;
        order
    }

    #[test]
    fn cod_order_adds_surcharge() {
        let order = Order::new(Uuid::new_v4(), vec![item(100, 2)], address(), "COD".into());
        assert_eq!(order.total_amount, BigDecimal::from(250));
    }

    #[test]
    fn gateway_order_has_no_surcharge() {
        let total = order_total(&[item(100, 2), item(15, 3)], "razorpay");
        assert_eq!(total, BigDecimal::from(245));
    }

    #[test]
    fn decimal_prices_are_exact() {
        let mut line = item(0, 3);
        line.price = BigDecimal::from_str("19.99").unwrap();
        assert_eq!(
            order_total(&[line], "card"),
            BigDecimal::from_str("59.97").unwrap()
        );
    }

    #[test]
    fn canonical_transitions() {
        use OrderStatus::*;
        assert!(Pending.can_transition_to(Processing));
        assert!(Processing.can_transition_to(Shipped));
        assert!(Shipped.can_transition_to(Delivered));
        for from in [Pending, Processing, Shipped] {
            assert!(from.can_transition_to(Cancelled));
        }
        assert!(!Pending.can_transition_to(Delivered));
        assert!(!Shipped.can_transition_to(Processing));
        for to in [Pending, Processing, Shipped, Delivered, Cancelled] {
            assert!(!Delivered.can_transition_to(to));
            assert!(!Cancelled.can_transition_to(to));
        }
    }

    #[test]
    fn cancel_sets_reason() {
        let mut order = order_with_status(OrderStatus::Shipped);
        order.cancel("  changed my mind ").unwrap();
        assert_eq!(order.status, OrderStatus::Cancelled);
        assert_eq!(order.cancellation_reason.as_deref(), Some("changed my mind"));
    }

    #[test]
    fn cancel_requires_reason() {
        let mut order = order_with_status(OrderStatus::Pending);
        assert!(matches!(order.cancel("   "), Err(DomainError::Validation(_))));
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[test]
    fn cancel_rejects_terminal_orders() {
        for status in [OrderStatus::Delivered, OrderStatus::Cancelled] {
            let mut order = order_with_status(status);
            assert!(matches!(order.cancel("late"), Err(DomainError::InvalidState(_))));
        }
    }

    #[test]
    fn record_payment_moves_to_processing_once() {
        let mut order = order_with_status(OrderStatus::Pending);
        order.record_payment("pay_1", "razorpay").unwrap();
        assert_eq!(order.status, OrderStatus::Processing);
        assert_eq!(order.payment_info.status, PaymentStatus::Completed);
        assert_eq!(order.payment_info.id.as_deref(), Some("pay_1"));

        order.record_payment("pay_1", "razorpay").unwrap();
        assert_eq!(order.status, OrderStatus::Processing);
    }

    #[test]
    fn record_payment_rejects_cancelled_order() {
        let mut order = order_with_status(OrderStatus::Cancelled);
        assert!(matches!(
            order.record_payment("pay_1", "razorpay"),
            Err(DomainError::InvalidState(_))
        ));
    }

    #[test]
    fn amount_in_minor_units() {
        let mut order = order_with_status(OrderStatus::Pending);
        order.total_amount = BigDecimal::from_str("249.50").unwrap();
        assert_eq!(order.amount_minor_units().unwrap(), 24950);
    }

    #[test]
    fn place_order_requires_items_and_positive_quantities() {
        let empty = PlaceOrder {
            lines: vec![],
            shipping_address: address(),
            payment_method: None,
        };
        assert!(matches!(empty.validate(), Err(DomainError::Validation(_))));

        let zero = PlaceOrder {
            lines: vec![OrderLineInput {
                product_id: Uuid::new_v4(),
                quantity: 0,
                size: None,
                color: None,
            }],
            shipping_address: address(),
            payment_method: None,
        };
        assert!(matches!(zero.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("Shipped".parse::<OrderStatus>().unwrap(), OrderStatus::Shipped);
        assert!(matches!(
            "lost".parse::<OrderStatus>(),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn page_request_clamps_page_and_limit() {
        let page = PageRequest::new(0, 500).unwrap();
        assert_eq!((page.page(), page.limit(), page.offset()), (1, 100, 0));

        let page = PageRequest::new(3, 20).unwrap();
        assert_eq!(page.offset(), 40);
    }

    #[test]
    fn page_request_rejects_overflowing_offset() {
        let err = PageRequest::new(i64::MAX, 20).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
