//! The completed-jobs document.

use std::path::PathBuf;

use askama::Template;
use chrono::{DateTime, Utc};
use roadmate_core::ServiceRequest;
use tracing::debug;

use crate::error::ReportError;
use crate::sink::ReportSink;

pub const DEFAULT_TITLE: &str = "Mechanic Service Records";

const FALLBACK_FILE_STEM: &str = "completed-jobs";

/// One table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub serviced_by: String,
    pub request_type: String,
    pub details: String,
    pub status: String,
}

impl From<&ServiceRequest> for ReportRow {
    fn from(request: &ServiceRequest) -> Self {
        Self {
            serviced_by: request.serviced_by.clone().unwrap_or_default(),
            request_type: request.request_type.clone(),
            details: request.details.clone(),
            status: request.status.to_string(),
        }
    }
}

/// HTML table of completed jobs with a print header and footer.
#[derive(Debug, Template)]
#[template(path = "completed_jobs.html")]
pub struct CompletedJobsReport {
    title: String,
    /// Image source for the header; empty for none.
    logo: String,
    generated_at: String,
    rows: Vec<ReportRow>,
}

impl CompletedJobsReport {
    pub fn new(jobs: &[ServiceRequest]) -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            logo: String::new(),
            generated_at: String::new(),
            rows: jobs.iter().map(ReportRow::from).collect(),
        }
        .generated_at(Utc::now())
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Image shown in the header (URL or data URI).
    pub fn with_logo(mut self, logo: impl Into<String>) -> Self {
        self.logo = logo.into();
        self
    }

    /// Timestamp printed in the footer.
    pub fn generated_at(mut self, at: DateTime<Utc>) -> Self {
        self.generated_at = at.format("%Y-%m-%d %H:%M UTC").to_string();
        self
    }

    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    /// File name used by [`export`](Self::export).
    ///
    /// Titles with no ASCII letters or digits fall back to
    /// `completed-jobs.html`.
    pub fn file_name(&self) -> String {
        let stem: String = self
            .title
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
            .collect();
        match stem.trim_matches('-') {
            "" => format!("{FALLBACK_FILE_STEM}.html"),
            stem => format!("{stem}.html"),
        }
    }

    /// Render the document and hand it to `sink`.
    pub async fn export(&self, sink: &dyn ReportSink) -> Result<PathBuf, ReportError> {
        let html = self.render()?;
        debug!(rows = self.rows.len(), "Rendered completed-jobs report");
        sink.deliver(&self.file_name(), &html).await
    }
}
