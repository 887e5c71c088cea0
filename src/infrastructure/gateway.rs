use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;
use crate::domain::ports::{GatewayOrder, PaymentGateway};

#[derive(Debug, Serialize)]
struct CreateOrderBody<'a> {
    amount: i64,
    currency: &'a str,
    receipt: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreateOrderReply {
    id: String,
    amount: i64,
    currency: String,
}

/// Client for a Razorpay-compatible orders API (`POST {base_url}/orders`,
/// HTTP basic auth with the key id and secret).
#[derive(Clone)]
pub struct HttpPaymentGateway {
    client: reqwest::Client,
    base_url: String,
    key_id: String,
    key_secret: String,
}

impl HttpPaymentGateway {
    pub fn new(
        base_url: impl Into<String>,
        key_id: impl Into<String>,
        key_secret: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            key_id: key_id.into(),
            key_secret: key_secret.into(),
        }
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn create_order(
        &self,
        amount_minor_units: i64,
        currency: &str,
        receipt: &str,
    ) -> Result<GatewayOrder, DomainError> {
        let resp = self
            .client
            .post(format!("{}/orders", self.base_url))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&CreateOrderBody {
                amount: amount_minor_units,
                currency,
                receipt,
            })
            .send()
            .await
            .map_err(|e| DomainError::Gateway(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            log::error!("Payment gateway rejected order for receipt {receipt}: {status} {body}");
            return Err(DomainError::Gateway(format!("gateway responded with {status}")));
        }

        let reply: CreateOrderReply = resp
            .json()
            .await
            .map_err(|e| DomainError::Gateway(format!("unreadable gateway reply: {e}")))?;
        Ok(GatewayOrder {
            id: reply.id,
            amount: reply.amount,
            currency: reply.currency,
        })
    }
}
