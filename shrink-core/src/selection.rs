use crate::backend::BackendId;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Where the published bytes came from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "backend", rename_all = "snake_case")]
pub enum CandidateSource {
    Backend(BackendId),
    /// The staged input itself; nothing beat the original.
    PassThrough,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub path: PathBuf,
    pub size: u64,
    pub source: CandidateSource,
}

/// What `offer` did with a candidate.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Offer {
    /// Now the held candidate.
    Taken,
    /// Larger than the original; the original is held in its place.
    Clamped,
    /// Not strictly smaller than what is already held.
    Ignored,
}

/// Running best candidate across the chain.
///
/// Never regresses: the held size only goes down, and never exceeds the
/// original size once anything is held.
#[derive(Debug)]
pub struct SelectionState {
    original: Candidate,
    best: Option<Candidate>,
}

impl SelectionState {
    pub fn new(staged_input: &Path, original_size: u64) -> Self {
        Self {
            original: Candidate {
                path: staged_input.to_path_buf(),
                size: original_size,
                source: CandidateSource::PassThrough,
            },
            best: None,
        }
    }

    /// Considers a valid backend candidate.
    pub fn offer(&mut self, produced: Candidate) -> Offer {
        let (candidate, clamped) = if produced.size <= self.original.size {
            (produced, false)
        } else {
            (self.original.clone(), true)
        };

        let replace = match &self.best {
            None => true,
            Some(held) => candidate.size < held.size,
        };
        if !replace {
            return Offer::Ignored;
        }
        self.best = Some(candidate);
        if clamped { Offer::Clamped } else { Offer::Taken }
    }

    pub fn best(&self) -> Option<&Candidate> {
        self.best.as_ref()
    }

    pub fn into_best(self) -> Option<Candidate> {
        self.best
    }
}
