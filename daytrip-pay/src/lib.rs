//! TapPay pay-by-prime client.
//!
//! Every failure mode (DNS/connect failure, timeout, non-2xx HTTP,
//! unparseable payload) is normalized into a [`ChargeOutcome`] rather than an
//! error: declines and unreachability are expected states the settlement
//! layer reports as a normal response.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::warn;

use daytrip_core::payment::{ChargeOutcome, ChargeRequest, PaymentGateway};

/// The charge call is bounded; exceeding this is treated exactly like a
/// connection failure.
const CHARGE_TIMEOUT: Duration = Duration::from_secs(30);

pub struct TapPayClient {
    http: reqwest::Client,
    url: String,
    partner_key: String,
    merchant_id: String,
}

impl TapPayClient {
    pub fn new(
        url: impl Into<String>,
        partner_key: impl Into<String>,
        merchant_id: impl Into<String>,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(CHARGE_TIMEOUT).build()?;
        Ok(Self {
            http,
            url: url.into(),
            partner_key: partner_key.into(),
            merchant_id: merchant_id.into(),
        })
    }

    fn payload(&self, request: &ChargeRequest) -> Value {
        json!({
            "prime": request.prime,
            "partner_key": self.partner_key,
            "merchant_id": self.merchant_id,
            "details": request.details,
            "amount": request.amount,
            "cardholder": {
                "phone_number": request.contact.phone,
                "name": request.contact.name,
                "email": request.contact.email,
            },
            "remember": true,
        })
    }
}

#[async_trait]
impl PaymentGateway for TapPayClient {
    async fn charge(&self, request: &ChargeRequest) -> ChargeOutcome {
        let response = self
            .http
            .post(&self.url)
            .header("x-api-key", &self.partner_key)
            .json(&self.payload(request))
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(err) => {
                warn!(%err, "payment gateway unreachable");
                return ChargeOutcome::Indeterminate {
                    message: "gateway connection failed".to_string(),
                };
            }
        };

        let status = response.status();
        if !status.is_success() {
            // The gateway answered; the charge was rejected at the HTTP layer.
            let code = status.as_u16() as i64;
            let message = format!("gateway returned HTTP {status}");
            return ChargeOutcome::Declined {
                status: code,
                raw: json!({"status": code, "msg": message}),
                message,
            };
        }

        match response.json::<Value>().await {
            Ok(body) => normalize_body(body),
            Err(err) => {
                // A 2xx arrived but the body is unreadable: the charge may
                // have been accepted, so the true state is unknown.
                warn!(%err, "payment gateway returned an unreadable body");
                ChargeOutcome::Indeterminate {
                    message: "gateway returned an unreadable response".to_string(),
                }
            }
        }
    }
}

/// Status 0 is the gateway's only success code; any other status is a
/// decline. A body without a status field tells us nothing.
fn normalize_body(body: Value) -> ChargeOutcome {
    match body.get("status").and_then(Value::as_i64) {
        Some(0) => ChargeOutcome::Approved { raw: body },
        Some(code) => {
            let message = body
                .get("msg")
                .and_then(Value::as_str)
                .unwrap_or("payment declined")
                .to_string();
            ChargeOutcome::Declined {
                status: code,
                message,
                raw: body,
            }
        }
        None => ChargeOutcome::Indeterminate {
            message: "gateway response had no status field".to_string(),
        },
    }
}
