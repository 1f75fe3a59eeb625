//! Per-mechanic views over the shared request collection.
//!
//! The backend offers a single endpoint returning every request. Each view
//! fetches the whole collection and filters it locally, so every call is a
//! full scan.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use roadmate_core::{
    bounded, BackendError, CallPolicy, RequestBackend, RequestStatus, ServiceRequest,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Requests any mechanic may accept.
pub fn pending(requests: &[ServiceRequest]) -> Vec<ServiceRequest> {
    requests
        .iter()
        .filter(|r| r.status == RequestStatus::Pending)
        .cloned()
        .collect()
}

/// Requests in progress and held by `mechanic_id`.
pub fn active_for(requests: &[ServiceRequest], mechanic_id: &str) -> Vec<ServiceRequest> {
    requests
        .iter()
        .filter(|r| r.is_active_for(mechanic_id))
        .cloned()
        .collect()
}

/// Requests completed by `mechanic_id`, optionally within `range`.
///
/// A request without a timestamp falls outside every range.
pub fn completed_for(
    requests: &[ServiceRequest],
    mechanic_id: &str,
    range: Option<&DateRange>,
) -> Vec<ServiceRequest> {
    requests
        .iter()
        .filter(|r| r.status == RequestStatus::Completed && r.is_serviced_by(mechanic_id))
        .filter(|r| {
            range.map_or(true, |range| r.updated_at.is_some_and(|at| range.contains(at)))
        })
        .cloned()
        .collect()
}

/// Inclusive time window. A window whose start is after its end is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at <= self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }
}

/// Result of a fail-soft listing: the items, or an empty list plus the error
/// that caused it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Listing {
    pub items: Vec<ServiceRequest>,
    pub error: Option<BackendError>,
}

impl Listing {
    fn loaded(items: Vec<ServiceRequest>) -> Self {
        Self { items, error: None }
    }

    fn failed(error: BackendError) -> Self {
        Self {
            items: Vec::new(),
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Counts shown on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardSummary {
    pub active: usize,
    pub completed: usize,
    pub pending: usize,
}

/// Completed jobs and the sum of their fees.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Earnings {
    pub jobs: usize,
    pub total: f64,
}

/// Client-side filtering over the request collection.
#[derive(Clone)]
pub struct RequestRepository {
    backend: Arc<dyn RequestBackend>,
    policy: CallPolicy,
    cancel: CancellationToken,
}

impl RequestRepository {
    pub fn new(backend: Arc<dyn RequestBackend>) -> Self {
        Self {
            backend,
            policy: CallPolicy::default(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_policy(mut self, policy: CallPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Tie fetches to a screen's lifetime.
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// The full collection; errors are returned.
    pub async fn fetch_all(&self) -> Result<Vec<ServiceRequest>, BackendError> {
        let requests = bounded(self.policy, &self.cancel, self.backend.fetch_requests()).await?;
        debug!("Fetched {} requests", requests.len());
        Ok(requests)
    }

    async fn listing(&self, view: &str, filter: impl FnOnce(&[ServiceRequest]) -> Vec<ServiceRequest>) -> Listing {
        match self.fetch_all().await {
            Ok(all) => Listing::loaded(filter(&all)),
            Err(e) => {
                warn!(view, error = %e, "Failed to load requests");
                Listing::failed(e)
            }
        }
    }

    pub async fn list_pending(&self) -> Listing {
        self.listing("pending", pending).await
    }

    pub async fn list_active(&self, mechanic_id: &str) -> Listing {
        self.listing("active", |all| active_for(all, mechanic_id)).await
    }

    pub async fn list_completed(&self, mechanic_id: &str, range: Option<&DateRange>) -> Listing {
        self.listing("completed", |all| completed_for(all, mechanic_id, range))
            .await
    }

    /// The request `mechanic_id` currently holds, if any.
    pub async fn find_active(&self, mechanic_id: &str) -> Result<Option<ServiceRequest>, BackendError> {
        let all = self.fetch_all().await?;
        Ok(all.into_iter().find(|r| r.is_active_for(mechanic_id)))
    }

    pub async fn dashboard(&self, mechanic_id: &str) -> Result<DashboardSummary, BackendError> {
        let all = self.fetch_all().await?;
        Ok(DashboardSummary {
            active: active_for(&all, mechanic_id).len(),
            completed: completed_for(&all, mechanic_id, None).len(),
            pending: pending(&all).len(),
        })
    }

    /// Jobs without a recorded fee count towards `jobs` but add nothing.
    pub async fn earnings(
        &self,
        mechanic_id: &str,
        range: Option<&DateRange>,
    ) -> Result<Earnings, BackendError> {
        let all = self.fetch_all().await?;
        let done = completed_for(&all, mechanic_id, range);
        Ok(Earnings {
            jobs: done.len(),
            total: done.iter().filter_map(|r| r.amount).sum(),
        })
    }
}

impl std::fmt::Debug for RequestRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestRepository")
            .field("policy", &self.policy)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, day, 12, 0, 0).unwrap()
    }

    fn request(id: &str, status: RequestStatus, by: Option<&str>, day: u32) -> ServiceRequest {
        ServiceRequest {
            id: id.to_string(),
            request_type: "Tow".to_string(),
            details: String::new(),
            status,
            serviced_by: by.map(str::to_string),
            location: None,
            amount: None,
            updated_at: Some(at(day)),
        }
    }

    fn sample() -> Vec<ServiceRequest> {
        vec![
            request("P1", RequestStatus::Pending, None, 1),
            request("P2", RequestStatus::Pending, None, 2),
            request("A1", RequestStatus::InProgress, Some("M1"), 3),
            request("A2", RequestStatus::InProgress, Some("M2"), 3),
            request("C1", RequestStatus::Completed, Some("M1"), 5),
            request("C2", RequestStatus::Completed, Some("M1"), 10),
            request("C3", RequestStatus::Completed, Some("M2"), 7),
        ]
    }

    fn ids(requests: &[ServiceRequest]) -> Vec<&str> {
        requests.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_pending_ignores_mechanic() {
        assert_eq!(ids(&pending(&sample())), vec!["P1", "P2"]);
    }

    #[test]
    fn test_active_for_mechanic() {
        assert_eq!(ids(&active_for(&sample(), "M1")), vec!["A1"]);
        assert!(active_for(&sample(), "M3").is_empty());
    }

    #[test]
    fn test_completed_range_is_inclusive() {
        let all = sample();
        assert_eq!(ids(&completed_for(&all, "M1", None)), vec!["C1", "C2"]);

        let range = DateRange::new(at(5), at(10));
        assert_eq!(ids(&completed_for(&all, "M1", Some(&range))), vec!["C1", "C2"]);

        let range = DateRange::new(at(6), at(10));
        assert_eq!(ids(&completed_for(&all, "M1", Some(&range))), vec!["C2"]);
    }

    #[test]
    fn test_inverted_range_is_empty() {
        let range = DateRange::new(at(10), at(1));
        assert!(range.is_empty());
        assert!(completed_for(&sample(), "M1", Some(&range)).is_empty());
    }

    #[test]
    fn test_range_filter_is_subset_of_unfiltered() {
        let all = sample();
        let everything = completed_for(&all, "M1", None);
        for (start, end) in [(1, 4), (4, 6), (5, 5), (9, 11), (1, 31)] {
            let range = DateRange::new(at(start), at(end));
            let filtered = completed_for(&all, "M1", Some(&range));
            let expected: Vec<_> = everything
                .iter()
                .filter(|r| r.updated_at.is_some_and(|at| range.contains(at)))
                .cloned()
                .collect();
            assert_eq!(filtered, expected);
        }
    }

    #[test]
    fn test_undated_request_only_counted_without_range() {
        let mut all = sample();
        let mut undated = request("C4", RequestStatus::Completed, Some("M1"), 1);
        undated.updated_at = None;
        all.push(undated);

        assert_eq!(ids(&completed_for(&all, "M1", None)), vec!["C1", "C2", "C4"]);
        let range = DateRange::new(at(1), at(31));
        assert_eq!(ids(&completed_for(&all, "M1", Some(&range))), vec!["C1", "C2"]);
    }
}
