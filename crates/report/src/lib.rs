//! Completed-jobs export.
//!
//! [`CompletedJobsReport`] renders completed requests into a print-ready
//! HTML document; a [`ReportSink`] takes the document somewhere (a file, a
//! share sheet). Values are HTML-escaped by the template.
//!
//! ```rust,no_run
//! use report::{CompletedJobsReport, HtmlFileSink};
//!
//! # async fn run(jobs: Vec<roadmate_core::ServiceRequest>) -> Result<(), report::ReportError> {
//! let sink = HtmlFileSink::new("exports");
//! let path = CompletedJobsReport::new(&jobs).export(&sink).await?;
//! println!("Saved {}", path.display());
//! # Ok(())
//! # }
//! ```

mod error;
mod sink;
mod template;

pub use error::ReportError;
pub use sink::{HtmlFileSink, ReportSink};
pub use template::{CompletedJobsReport, ReportRow, DEFAULT_TITLE};
