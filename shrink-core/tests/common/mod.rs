//! Shared helpers for the integration tests.
#![allow(dead_code)]

use std::path::Path;

/// Files and directories anywhere below `dir`; 0 if it does not exist.
pub fn entries(dir: &Path) -> usize {
    if !dir.exists() {
        return 0;
    }
    walkdir::WalkDir::new(dir).min_depth(1).into_iter().count()
}
