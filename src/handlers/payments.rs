use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::payment_service::{PaymentCheckout, PaymentConfirmation, VerifiedPayment};
use crate::errors::AppError;
use crate::handlers::auth::Authenticated;
use crate::state::AppState;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentOrderRequest {
    pub order_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentOrderResponse {
    pub order_id: Uuid,
    pub gateway_order_id: String,
    /// Amount in the currency's minor unit.
    pub amount: i64,
    pub currency: String,
    /// Public key the client passes to the gateway checkout.
    pub key_id: String,
}

impl From<PaymentCheckout> for PaymentOrderResponse {
    fn from(c: PaymentCheckout) -> Self {
        PaymentOrderResponse {
            order_id: c.order_id,
            gateway_order_id: c.gateway_order.id,
            amount: c.gateway_order.amount,
            currency: c.gateway_order.currency,
            key_id: c.key_id,
        }
    }
}

/// Accepts both camelCase and the gateway's own callback field names.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequest {
    #[serde(alias = "razorpay_order_id")]
    pub gateway_order_id: String,
    #[serde(alias = "razorpay_payment_id")]
    pub gateway_payment_id: String,
    #[serde(alias = "razorpay_signature")]
    pub signature: String,
    pub order_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentResponse {
    pub verified: bool,
    pub gateway_order_id: String,
    pub gateway_payment_id: String,
    pub order_id: Option<Uuid>,
    /// False when the referenced local order could not be found.
    pub order_updated: bool,
}

impl From<VerifiedPayment> for VerifyPaymentResponse {
    fn from(v: VerifiedPayment) -> Self {
        VerifyPaymentResponse {
            verified: true,
            gateway_order_id: v.gateway_order_id,
            gateway_payment_id: v.gateway_payment_id,
            order_id: v.order_id,
            order_updated: v.order_updated,
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /payments/orders
///
/// Opens a gateway order for a pending, gateway-paid order of the caller.
#[utoipa::path(
    post,
    path = "/payments/orders",
    request_body = CreatePaymentOrderRequest,
    responses(
        (status = 201, description = "Gateway order created", body = PaymentOrderResponse),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Order is not payable"),
        (status = 502, description = "Payment gateway failed"),
    ),
    security(("bearer" = [])),
    tag = "payments"
)]
pub async fn create_payment_order(
    state: web::Data<AppState>,
    Authenticated(requester): Authenticated,
    body: web::Json<CreatePaymentOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let order_id = body.into_inner().order_id;

    let payments = state.payments.clone();
    let amount = web::block(move || payments.payable_amount(&requester, order_id)).await??;
    let checkout = state.payments.open_checkout(order_id, amount).await?;

    Ok(HttpResponse::Created().json(PaymentOrderResponse::from(checkout)))
}

/// POST /payments/verify
///
/// Checks the gateway signature and, if an order id is given, marks that
/// order paid.
#[utoipa::path(
    post,
    path = "/payments/verify",
    request_body = VerifyPaymentRequest,
    responses(
        (status = 200, description = "Signature valid", body = VerifyPaymentResponse),
        (status = 400, description = "Signature mismatch"),
        (status = 401, description = "Not authenticated"),
        (status = 409, description = "Order cannot be paid in its current status"),
    ),
    security(("bearer" = [])),
    tag = "payments"
)]
pub async fn verify_payment(
    state: web::Data<AppState>,
    _caller: Authenticated,
    body: web::Json<VerifyPaymentRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let confirmation = PaymentConfirmation {
        gateway_order_id: body.gateway_order_id,
        gateway_payment_id: body.gateway_payment_id,
        signature: body.signature,
        order_id: body.order_id,
    };

    let payments = state.payments.clone();
    let verified = web::block(move || payments.verify_payment(confirmation)).await??;
    Ok(HttpResponse::Ok().json(VerifyPaymentResponse::from(verified)))
}
