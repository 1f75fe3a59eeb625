//! In-memory request collection.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use roadmate_core::{BackendError, RequestBackend, RequestStatus, ServiceRequest, StatusUpdate};

use crate::faults::{lock, Faults};

/// A call received by [`InMemoryRequests`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestCall {
    Fetch,
    UpdateStatus { id: String, update: StatusUpdate },
    UpdateComplete { id: String, update: StatusUpdate },
}

/// A request collection held in memory.
///
/// Status PUTs are applied to the stored record (status, servicer, and
/// `updated_at = now`). Unknown ids answer HTTP 404.
#[derive(Debug, Default)]
pub struct InMemoryRequests {
    requests: Mutex<Vec<ServiceRequest>>,
    calls: Mutex<Vec<RequestCall>>,
    faults: Faults,
}

impl InMemoryRequests {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a collection from the given records.
    pub fn with_requests(requests: impl IntoIterator<Item = ServiceRequest>) -> Self {
        let backend = Self::new();
        for request in requests {
            backend.insert(request);
        }
        backend
    }

    /// A minimal request record.
    pub fn request(id: &str, status: RequestStatus, serviced_by: Option<&str>) -> ServiceRequest {
        ServiceRequest {
            id: id.to_string(),
            request_type: "Flat Tire".to_string(),
            details: format!("Request {}", id),
            status,
            serviced_by: serviced_by.map(str::to_string),
            location: None,
            amount: None,
            updated_at: Some(Utc::now()),
        }
    }

    /// A completed record with a fixed timestamp and fee.
    pub fn completed(id: &str, serviced_by: &str, updated_at: DateTime<Utc>, amount: f64) -> ServiceRequest {
        ServiceRequest {
            amount: Some(amount),
            updated_at: Some(updated_at),
            ..Self::request(id, RequestStatus::Completed, Some(serviced_by))
        }
    }

    /// Add or replace a record.
    pub fn insert(&self, request: ServiceRequest) {
        let mut requests = lock(&self.requests);
        match requests.iter_mut().find(|r| r.id == request.id) {
            Some(existing) => *existing = request,
            None => requests.push(request),
        }
    }

    /// Current copy of one record.
    pub fn get(&self, id: &str) -> Option<ServiceRequest> {
        lock(&self.requests).iter().find(|r| r.id == id).cloned()
    }

    /// Every call received so far.
    pub fn calls(&self) -> Vec<RequestCall> {
        lock(&self.calls).clone()
    }

    /// Number of status PUTs (accept and complete) received.
    pub fn put_count(&self) -> usize {
        lock(&self.calls)
            .iter()
            .filter(|c| !matches!(c, RequestCall::Fetch))
            .count()
    }

    pub fn faults(&self) -> &Faults {
        &self.faults
    }

    fn apply(&self, id: &str, update: &StatusUpdate) -> Result<(), BackendError> {
        let mut requests = lock(&self.requests);
        let request = requests
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| BackendError::Status {
                status: 404,
                body: format!("request {} not found", id),
            })?;
        request.status = update.status;
        request.serviced_by = Some(update.serviced_by.clone());
        request.updated_at = Some(Utc::now());
        Ok(())
    }
}

#[async_trait]
impl RequestBackend for InMemoryRequests {
    async fn fetch_requests(&self) -> Result<Vec<ServiceRequest>, BackendError> {
        lock(&self.calls).push(RequestCall::Fetch);
        self.faults.check("fetch_requests")?;
        Ok(lock(&self.requests).clone())
    }

    async fn update_status(&self, request_id: &str, update: &StatusUpdate) -> Result<(), BackendError> {
        lock(&self.calls).push(RequestCall::UpdateStatus {
            id: request_id.to_string(),
            update: update.clone(),
        });
        self.faults.check("update_status")?;
        self.apply(request_id, update)
    }

    async fn update_complete(&self, request_id: &str, update: &StatusUpdate) -> Result<(), BackendError> {
        lock(&self.calls).push(RequestCall::UpdateComplete {
            id: request_id.to_string(),
            update: update.clone(),
        });
        self.faults.check("update_complete")?;
        self.apply(request_id, update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_update_applies_and_records() {
        let backend = InMemoryRequests::with_requests([InMemoryRequests::request("R1", RequestStatus::Pending, None)]);

        backend
            .update_status("R1", &StatusUpdate::new(RequestStatus::InProgress, "M1"))
            .await
            .unwrap();

        let stored = backend.get("R1").unwrap();
        assert_eq!(stored.status, RequestStatus::InProgress);
        assert_eq!(stored.serviced_by.as_deref(), Some("M1"));
        assert_eq!(backend.put_count(), 1);
    }

    #[tokio::test]
    async fn test_unknown_id_is_404() {
        let backend = InMemoryRequests::new();
        let err = backend
            .update_complete("nope", &StatusUpdate::new(RequestStatus::Completed, "M1"))
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Status { status: 404, .. }));
        assert_eq!(backend.put_count(), 1);
    }

    #[tokio::test]
    async fn test_fetch_fault_is_recorded() {
        let backend = InMemoryRequests::new();
        backend.faults().fail("fetch_requests", BackendError::Transport("offline".to_string()));
        assert!(backend.fetch_requests().await.is_err());
        assert_eq!(backend.calls(), vec![RequestCall::Fetch]);
    }
}
