use crate::backend::BackendId;
use crate::error::ErrorClass;
use crate::selection::CandidateSource;
use serde::Serialize;
use std::path::PathBuf;

/// Outcome of one backend run, kept for diagnostics only.
#[derive(Clone, Debug, Serialize)]
pub struct AttemptResult {
    pub backend: BackendId,
    pub name: String,
    pub success: bool,
    /// Bytes in the candidate file; 0 when nothing usable was written.
    pub produced_size: u64,
    pub error_kind: Option<ErrorClass>,
    pub detail: Option<String>,
    pub elapsed_ms: u64,
}

/// Summary of a job that published an output.
#[derive(Clone, Debug, Serialize)]
pub struct JobReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub original_size: u64,
    pub final_size: u64,
    pub chosen: CandidateSource,
    /// BLAKE3 of the published file, hex.
    pub digest: String,
    pub attempts: Vec<AttemptResult>,
    /// Backends not attempted because they were unavailable.
    pub skipped: Vec<String>,
    /// Unix seconds.
    pub started_at: i64,
    pub elapsed_ms: u64,
}

impl JobReport {
    pub fn saved_bytes(&self) -> u64 {
        self.original_size.saturating_sub(self.final_size)
    }

    /// final / original; 1.0 for an empty input.
    pub fn ratio(&self) -> f32 {
        if self.original_size == 0 {
            1.0
        } else {
            self.final_size as f32 / self.original_size as f32
        }
    }

    pub fn is_pass_through(&self) -> bool {
        self.chosen == CandidateSource::PassThrough
    }
}
