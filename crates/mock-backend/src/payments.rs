//! Push-payment gateway mock.

use std::sync::Mutex;

use async_trait::async_trait;
use roadmate_core::{BackendError, PaymentGateway, PaymentReceipt, PaymentRequest};

use crate::faults::{lock, Faults};

/// A payment gateway that answers every push with a scripted receipt.
#[derive(Debug)]
pub struct MockPayments {
    receipt: Mutex<PaymentReceipt>,
    pushes: Mutex<Vec<PaymentRequest>>,
    faults: Faults,
}

impl MockPayments {
    /// Gateway that accepts every push.
    pub fn accepting() -> Self {
        Self::with_description(Some("Success. Request accepted for processing"))
    }

    /// Gateway whose receipt carries no response description.
    pub fn declining() -> Self {
        Self::with_description(None)
    }

    pub fn with_description(description: Option<&str>) -> Self {
        Self {
            receipt: Mutex::new(PaymentReceipt {
                response_description: description.map(str::to_string),
                checkout_request_id: Some("ws_CO_000000000".to_string()),
            }),
            pushes: Mutex::new(Vec::new()),
            faults: Faults::new(),
        }
    }

    /// Replace the scripted receipt.
    pub fn set_receipt(&self, receipt: PaymentReceipt) {
        *lock(&self.receipt) = receipt;
    }

    /// Every push received so far.
    pub fn pushes(&self) -> Vec<PaymentRequest> {
        lock(&self.pushes).clone()
    }

    pub fn faults(&self) -> &Faults {
        &self.faults
    }
}

#[async_trait]
impl PaymentGateway for MockPayments {
    async fn stk_push(&self, request: &PaymentRequest) -> Result<PaymentReceipt, BackendError> {
        lock(&self.pushes).push(request.clone());
        self.faults.check("stk_push")?;
        Ok(lock(&self.receipt).clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_accepting_and_declining() {
        let request = PaymentRequest {
            phone: "254700000000".to_string(),
            amount: "500".to_string(),
            request_id: "R1".to_string(),
        };

        let gateway = MockPayments::accepting();
        assert!(gateway.stk_push(&request).await.unwrap().is_accepted());

        let gateway = MockPayments::declining();
        assert!(!gateway.stk_push(&request).await.unwrap().is_accepted());
        assert_eq!(gateway.pushes(), vec![request]);
    }
}
