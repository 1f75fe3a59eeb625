//! Export of completed jobs through a sink.

use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use report::{CompletedJobsReport, HtmlFileSink, ReportError, ReportSink};
use roadmate_core::{RequestStatus, ServiceRequest};
use tempfile::TempDir;

fn completed(id: &str, by: &str) -> ServiceRequest {
    ServiceRequest {
        id: id.to_string(),
        request_type: "Towing".to_string(),
        details: format!("Job {}", id),
        status: RequestStatus::Completed,
        serviced_by: Some(by.to_string()),
        location: None,
        amount: None,
        updated_at: Some(Utc::now()),
    }
}

/// Keeps delivered documents in memory.
#[derive(Default)]
struct CapturingSink {
    delivered: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl ReportSink for CapturingSink {
    async fn deliver(&self, file_name: &str, html: &str) -> Result<PathBuf, ReportError> {
        self.delivered
            .lock()
            .unwrap()
            .push((file_name.to_string(), html.to_string()));
        Ok(PathBuf::from(file_name))
    }
}

#[tokio::test]
async fn test_file_sink_writes_document() {
    let dir = TempDir::new().unwrap();
    let sink = HtmlFileSink::new(dir.path().join("exports"));
    let jobs = vec![completed("R1", "M1"), completed("R2", "M1")];

    let path = CompletedJobsReport::new(&jobs).export(&sink).await.unwrap();

    assert_eq!(path, dir.path().join("exports").join("mechanic-service-records.html"));
    let html = tokio::fs::read_to_string(&path).await.unwrap();
    assert!(html.contains("<td>Job R1</td>"));
    assert!(html.contains("<td>Job R2</td>"));
}

#[tokio::test]
async fn test_custom_sink_receives_rendered_html() {
    let sink = CapturingSink::default();
    let report = CompletedJobsReport::new(&[completed("R1", "M7")]).with_title("Weekly Jobs");

    let path = report.export(&sink).await.unwrap();

    assert_eq!(path, PathBuf::from("weekly-jobs.html"));
    let delivered = sink.delivered.lock().unwrap();
    assert_eq!(delivered.len(), 1);
    assert!(delivered[0].1.contains("<h1>Weekly Jobs</h1>"));
    assert!(delivered[0].1.contains("<td>M7</td>"));
}

#[tokio::test]
async fn test_unwritable_directory_is_io_error() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("not-a-dir");
    tokio::fs::write(&blocker, "x").await.unwrap();

    let sink = HtmlFileSink::new(&blocker);
    let err = CompletedJobsReport::new(&[]).export(&sink).await.unwrap_err();
    assert!(matches!(err, ReportError::Io(_)));
}
