use async_trait::async_trait;
use serde_json::Value;

use crate::order::Contact;

#[derive(Debug, Clone)]
pub struct ChargeRequest {
    /// One-time token for the card; consumed by exactly one charge attempt.
    pub prime: String,
    pub amount: i32,
    pub details: String,
    pub contact: Contact,
}

/// Normalized result of a single pay-by-prime call. Declined and
/// indeterminate outcomes are expected, frequent states that reach the caller
/// as a normal response, so none of these is an error.
#[derive(Debug, Clone)]
pub enum ChargeOutcome {
    /// Gateway status 0; `raw` is the verbatim response for audit.
    Approved { raw: Value },
    /// The gateway answered and rejected the charge.
    Declined {
        status: i64,
        message: String,
        raw: Value,
    },
    /// The gateway was unreachable or did not answer in time. The true charge
    /// state is unknown to this system.
    Indeterminate { message: String },
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// One outbound charge for one prime. Never retried: a second attempt on
    /// the same prime risks double-charging the card.
    async fn charge(&self, request: &ChargeRequest) -> ChargeOutcome;
}
