//! The fallback chain.
//!
//! Every available backend runs once, in priority order, against the same
//! staged input. Each valid candidate is offered to a [`SelectionState`]; the
//! smallest one (clamped to the original size) is published. Backend errors
//! and panics are contained per attempt; only staging, publishing and a chain
//! with no valid candidate fail the job. The workspace is released on every
//! path.

use crate::backend::Backend;
use crate::backend::factory::standard_chain;
use crate::config::ShrinkConfig;
use crate::error::{ErrorClass, Result, ShrinkError};
use crate::publish::{discard, overwrites_input, publish};
use crate::report::{AttemptResult, JobReport};
use crate::selection::{Candidate, CandidateSource, SelectionState};
use crate::validate::{Validator, is_readable_pdf};
use crate::workspace::Workspace;
use std::any::Any;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::time::Instant;
use time::OffsetDateTime;
use tracing::{debug, info, info_span, warn};

/// One invocation: fixed once the input is staged.
#[derive(Clone, Debug)]
pub struct CompressionJob {
    pub input: PathBuf,
    pub output: PathBuf,
    pub original_size: u64,
}

pub struct Orchestrator {
    backends: Vec<Box<dyn Backend>>,
    validator: Box<Validator>,
    workspace_root: Option<PathBuf>,
}

impl Orchestrator {
    /// `backends` in priority order.
    pub fn new(backends: Vec<Box<dyn Backend>>) -> Self {
        Self {
            backends,
            validator: Box::new(is_readable_pdf),
            workspace_root: None,
        }
    }

    pub fn from_config(config: &ShrinkConfig) -> Self {
        Self::new(standard_chain(config)).with_workspace_root(config.workspace_root.clone())
    }

    /// Replaces the readability check applied to every candidate.
    pub fn with_validator(mut self, validator: impl Fn(&Path) -> bool + Send + Sync + 'static) -> Self {
        self.validator = Box::new(validator);
        self
    }

    pub fn with_workspace_root(mut self, root: Option<PathBuf>) -> Self {
        self.workspace_root = root;
        self
    }

    pub fn backends(&self) -> &[Box<dyn Backend>] {
        &self.backends
    }

    /// Compresses `input` into `output`.
    ///
    /// On `Ok` a complete file exists at `output`, never larger than the
    /// input. On `Err` nothing exists at `output`.
    pub fn run(&self, input: &Path, output: &Path) -> Result<JobReport> {
        let span = info_span!("job", input = %input.display(), output = %output.display());
        let _enter = span.enter();
        let started_at = OffsetDateTime::now_utc().unix_timestamp();
        let clock = Instant::now();

        // Refused before anything runs: the failure path below removes `output`.
        if overwrites_input(input, output) {
            let err = ShrinkError::OutputIsInput {
                path: output.to_path_buf(),
            };
            warn!(error = %err, "compression refused");
            return Err(err);
        }

        let result = Workspace::stage(input, self.workspace_root.as_deref()).and_then(|workspace| {
            let job = CompressionJob {
                input: input.to_path_buf(),
                output: output.to_path_buf(),
                original_size: workspace.original_size(),
            };
            let outcome = self.drive(&job, &workspace);
            if let Err(e) = workspace.release() {
                warn!(error = %e, "workspace cleanup failed");
            }
            outcome
        });

        match result {
            Ok(mut report) => {
                report.started_at = started_at;
                report.elapsed_ms = clock.elapsed().as_millis() as u64;
                info!(
                    original = report.original_size,
                    size = report.final_size,
                    chosen = ?report.chosen,
                    "compression finished"
                );
                Ok(report)
            }
            Err(e) => {
                discard(output);
                warn!(error = %e, class = ?e.class(), "compression failed");
                Err(e)
            }
        }
    }

    fn drive(&self, job: &CompressionJob, workspace: &Workspace) -> Result<JobReport> {
        let staged = workspace.staged_input();
        let mut selection = SelectionState::new(staged, job.original_size);
        let mut attempts = Vec::with_capacity(self.backends.len());
        let mut skipped = Vec::new();

        // availability is resolved once, before anything runs
        let available: Vec<bool> = self.backends.iter().map(|b| b.is_available()).collect();

        for (ordinal, (backend, available)) in self.backends.iter().zip(available).enumerate() {
            if !available {
                debug!(backend = backend.name(), "unavailable, skipping");
                skipped.push(backend.name().to_string());
                attempts.push(AttemptResult {
                    backend: backend.id(),
                    name: backend.name().to_string(),
                    success: false,
                    produced_size: 0,
                    error_kind: Some(ErrorClass::BackendUnavailable),
                    detail: Some("unavailable".to_string()),
                    elapsed_ms: 0,
                });
                continue;
            }

            let candidate = workspace.candidate_path(ordinal, backend.name());
            let result = self.attempt(backend.as_ref(), staged, &candidate);
            if result.success {
                let offer = selection.offer(Candidate {
                    path: candidate,
                    size: result.produced_size,
                    source: CandidateSource::Backend(backend.id()),
                });
                info!(
                    backend = backend.name(),
                    size = result.produced_size,
                    original = job.original_size,
                    elapsed_ms = result.elapsed_ms,
                    ?offer,
                    "candidate produced"
                );
            } else {
                warn!(
                    backend = backend.name(),
                    elapsed_ms = result.elapsed_ms,
                    detail = result.detail.as_deref().unwrap_or(""),
                    "attempt failed"
                );
            }
            attempts.push(result);
        }

        let Some(best) = selection.into_best() else {
            return Err(ShrinkError::Exhausted { attempts });
        };

        let published = publish(&best.path, &job.output)?;
        Ok(JobReport {
            input: job.input.clone(),
            output: job.output.clone(),
            original_size: job.original_size,
            final_size: published.size,
            chosen: best.source,
            digest: published.digest,
            attempts,
            skipped,
            started_at: 0,
            elapsed_ms: 0,
        })
    }

    /// Runs one backend and checks what it wrote. Errors and panics, from
    /// the backend or the validator, become a failed attempt.
    fn attempt(&self, backend: &dyn Backend, input: &Path, candidate: &Path) -> AttemptResult {
        let clock = Instant::now();
        let ran = panic::catch_unwind(AssertUnwindSafe(|| {
            backend.attempt(input, candidate).map_err(|e| e.to_string())?;
            self.inspect(candidate)
        }));
        let verdict = match ran {
            Ok(verdict) => verdict,
            Err(payload) => Err(format!("backend panicked: {}", panic_message(payload.as_ref()))),
        };

        let (success, produced_size, detail) = match verdict {
            Ok(size) => (true, size, None),
            Err(detail) => (false, 0, Some(detail)),
        };
        AttemptResult {
            backend: backend.id(),
            name: backend.name().to_string(),
            success,
            produced_size,
            error_kind: (!success).then_some(ErrorClass::BackendFault),
            detail,
            elapsed_ms: clock.elapsed().as_millis() as u64,
        }
    }

    fn inspect(&self, candidate: &Path) -> std::result::Result<u64, String> {
        let size = fs::metadata(candidate)
            .map_err(|e| format!("no candidate written: {e}"))?
            .len();
        if size == 0 {
            return Err("candidate is empty".to_string());
        }
        if !(self.validator)(candidate) {
            return Err("candidate is not a readable document".to_string());
        }
        Ok(size)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
