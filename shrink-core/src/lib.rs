#![forbid(unsafe_code)]

pub mod error;
pub mod config;

pub mod util {
    pub mod hash_forward;
}

pub mod backend;

pub mod chain;
pub mod publish;
pub mod report;
pub mod selection;
pub mod validate;
pub mod workspace;

#[cfg(any(test, feature = "test-support"))]
#[doc(hidden)]
pub mod fixtures;

// Re-exports: stable API surface
pub use backend::{Backend, BackendError, BackendId};
pub use chain::{CompressionJob, Orchestrator};
pub use config::{PdfPreset, ShrinkConfig};
pub use error::{ErrorClass, Result, ShrinkError};
pub use report::{AttemptResult, JobReport};
pub use selection::CandidateSource;

use std::path::Path;

/// Runs the standard chain on one PDF. `is_ok()` is the upload layer's
/// success flag; on error nothing is left at `output`.
pub fn compress_pdf(input: &Path, output: &Path, config: &ShrinkConfig) -> Result<JobReport> {
    Orchestrator::from_config(config).run(input, output)
}
