use std::sync::Arc;

use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

use crate::domain::access::{require_owner_or_admin, Requester};
use crate::domain::errors::DomainError;
use crate::domain::order::OrderStatus;
use crate::domain::ports::{GatewayOrder, PaymentGateway, Store};

type HmacSha256 = Hmac<Sha256>;

/// Settings the payment component needs, passed in explicitly.
#[derive(Debug, Clone)]
pub struct PaymentSettings {
    /// Recorded as the payment method of verified orders.
    pub gateway_name: String,
    /// Public key id a client needs to open the gateway checkout.
    pub key_id: String,
    /// Shared secret used to sign payment confirmations.
    pub key_secret: String,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentCheckout {
    pub order_id: Uuid,
    pub gateway_order: GatewayOrder,
    pub key_id: String,
}

#[derive(Debug, Clone)]
pub struct PaymentConfirmation {
    pub gateway_order_id: String,
    pub gateway_payment_id: String,
    pub signature: String,
    pub order_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedPayment {
    pub gateway_order_id: String,
    pub gateway_payment_id: String,
    pub order_id: Option<Uuid>,
    /// Whether a local order was found and updated.
    pub order_updated: bool,
}

#[derive(Clone)]
pub struct PaymentService {
    store: Arc<dyn Store>,
    gateway: Arc<dyn PaymentGateway>,
    settings: PaymentSettings,
}

impl PaymentService {
    pub fn new(
        store: Arc<dyn Store>,
        gateway: Arc<dyn PaymentGateway>,
        settings: PaymentSettings,
    ) -> Self {
        Self {
            store,
            gateway,
            settings,
        }
    }

    pub fn gateway_name(&self) -> &str {
        &self.settings.gateway_name
    }

    /// Amount (minor units) the gateway should collect for `order_id`.
    /// Blocking: touches the store.
    pub fn payable_amount(&self, requester: &Requester, order_id: Uuid) -> Result<i64, DomainError> {
        let order = self
            .store
            .unit_of_work(|uow| uow.find_order(order_id))?
            .ok_or(DomainError::NotFound("Order"))?;
        require_owner_or_admin(requester, order.user_id)?;
        if order.status != OrderStatus::Pending {
            return Err(DomainError::invalid_state(format!(
                "order is {}, only pending orders can be paid",
                order.status
            )));
        }
        if order.is_cash_on_delivery() {
            return Err(DomainError::invalid_state(
                "cash on delivery orders are paid on delivery",
            ));
        }
        order.amount_minor_units()
    }

    /// Creates the remote gateway order. Does not touch the store.
    pub async fn open_checkout(
        &self,
        order_id: Uuid,
        amount_minor_units: i64,
    ) -> Result<PaymentCheckout, DomainError> {
        let gateway_order = self
            .gateway
            .create_order(
                amount_minor_units,
                &self.settings.currency,
                &order_id.to_string(),
            )
            .await?;
        log::info!(
            "Gateway order {} opened for order {order_id}",
            gateway_order.id
        );
        Ok(PaymentCheckout {
            order_id,
            gateway_order,
            key_id: self.settings.key_id.clone(),
        })
    }

    pub fn expected_signature(
        &self,
        gateway_order_id: &str,
        gateway_payment_id: &str,
    ) -> Result<String, DomainError> {
        let mac = self.signing_mac(gateway_order_id, gateway_payment_id)?;
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// HMAC-SHA256 over `"{gateway_order_id}|{gateway_payment_id}"`.
    fn signing_mac(
        &self,
        gateway_order_id: &str,
        gateway_payment_id: &str,
    ) -> Result<HmacSha256, DomainError> {
        let mut mac = HmacSha256::new_from_slice(self.settings.key_secret.as_bytes())
            .map_err(|e| DomainError::Internal(format!("invalid payment secret: {e}")))?;
        mac.update(gateway_order_id.as_bytes());
        mac.update(b"|");
        mac.update(gateway_payment_id.as_bytes());
        Ok(mac)
    }

    /// Checks the gateway signature in constant time and, when a local order
    /// is referenced, marks it paid. Blocking: touches the store.
    pub fn verify_payment(
        &self,
        confirmation: PaymentConfirmation,
    ) -> Result<VerifiedPayment, DomainError> {
        let signature =
            hex::decode(confirmation.signature.trim()).map_err(|_| DomainError::VerificationFailed)?;
        self.signing_mac(
            &confirmation.gateway_order_id,
            &confirmation.gateway_payment_id,
        )?
        .verify_slice(&signature)
        .map_err(|_| {
            log::warn!(
                "Rejected payment {} for gateway order {}: bad signature",
                confirmation.gateway_payment_id,
                confirmation.gateway_order_id
            );
            DomainError::VerificationFailed
        })?;

        let mut order_updated = false;
        if let Some(order_id) = confirmation.order_id {
            let payment_id = confirmation.gateway_payment_id.as_str();
            let gateway = self.settings.gateway_name.as_str();
            order_updated = self.store.unit_of_work(|uow| {
                let Some(mut order) = uow.find_order_for_update(order_id)? else {
                    return Ok(false);
                };
                order.record_payment(payment_id, gateway)?;
                uow.save_order(&order)?;
                Ok(true)
            })?;
            if order_updated {
                log::info!("Order {order_id} paid with {payment_id}");
            } else {
                log::warn!("Verified payment {payment_id} references unknown order {order_id}");
            }
        }

        Ok(VerifiedPayment {
            gateway_order_id: confirmation.gateway_order_id,
            gateway_payment_id: confirmation.gateway_payment_id,
            order_id: confirmation.order_id,
            order_updated,
        })
    }
}
