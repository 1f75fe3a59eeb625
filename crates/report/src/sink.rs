//! Destinations for a rendered report.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::info;

use crate::error::ReportError;

/// Takes a rendered document and hands it on (file, print dialog, share).
#[async_trait]
pub trait ReportSink: Send + Sync {
    /// Deliver `html` under `file_name`, returning where it ended up.
    async fn deliver(&self, file_name: &str, html: &str) -> Result<PathBuf, ReportError>;
}

/// Writes reports into a directory, creating it if needed.
#[derive(Debug, Clone)]
pub struct HtmlFileSink {
    dir: PathBuf,
}

impl HtmlFileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl ReportSink for HtmlFileSink {
    async fn deliver(&self, file_name: &str, html: &str) -> Result<PathBuf, ReportError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(file_name);
        tokio::fs::write(&path, html).await?;
        info!(path = %path.display(), bytes = html.len(), "Report written");
        Ok(path)
    }
}
