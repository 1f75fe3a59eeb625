use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to render report: {0}")]
    Render(#[from] askama::Error),

    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),
}
