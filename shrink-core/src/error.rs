use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::report::AttemptResult;

/// Coarse failure taxonomy shared by job errors and attempt records.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// Input unreadable or workspace not creatable. Fatal.
    StageFailure,
    /// Capability missing; the backend is skipped.
    BackendUnavailable,
    /// Backend ran but failed, panicked or produced an invalid candidate.
    BackendFault,
    /// Every available backend was tried and none produced a candidate.
    Exhausted,
    /// Final output could not be written. Fatal.
    PublishFailure,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorClass::StageFailure => "stage failure",
            ErrorClass::BackendUnavailable => "backend unavailable",
            ErrorClass::BackendFault => "backend fault",
            ErrorClass::Exhausted => "all backends exhausted",
            ErrorClass::PublishFailure => "publish failure",
        };
        f.write_str(s)
    }
}

#[derive(Error, Debug)]
pub enum ShrinkError {
    #[error("cannot stage {}: {source}", path.display())]
    Stage {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("no backend produced a valid candidate ({} attempted)", attempts.len())]
    Exhausted { attempts: Vec<AttemptResult> },

    #[error("cannot publish {}: {source}", path.display())]
    Publish {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("output {} is the input file", path.display())]
    OutputIsInput { path: PathBuf },

    #[error("Config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ShrinkError {
    pub fn class(&self) -> Option<ErrorClass> {
        match self {
            ShrinkError::Stage { .. } | ShrinkError::OutputIsInput { .. } => {
                Some(ErrorClass::StageFailure)
            }
            ShrinkError::Exhausted { .. } => Some(ErrorClass::Exhausted),
            ShrinkError::Publish { .. } => Some(ErrorClass::PublishFailure),
            ShrinkError::Config(_) | ShrinkError::Io(_) => None,
        }
    }

    /// Per-backend diagnostics, when the failure happened after the chain ran.
    pub fn attempts(&self) -> &[AttemptResult] {
        match self {
            ShrinkError::Exhausted { attempts } => attempts,
            _ => &[],
        }
    }
}

// Convenient crate-wide result type
pub type Result<T> = std::result::Result<T, ShrinkError>;
