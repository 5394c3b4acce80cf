//! End-to-end runs of the standard chain on generated documents.

mod common;

use common::entries;
use shrink_core::fixtures::{encrypted_pdf, page_text, sample_pdf, write_bytes};
use shrink_core::validate::is_readable_pdf;
use shrink_core::{BackendId, CandidateSource, ErrorClass, Orchestrator, ShrinkConfig, ShrinkError, compress_pdf};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Config that never touches a real Ghostscript install.
fn offline_config(dir: &TempDir) -> ShrinkConfig {
    ShrinkConfig {
        disabled: vec![BackendId::Ghostscript],
        workspace_root: Some(dir.path().join("jobs")),
        ..Default::default()
    }
}

fn paths(dir: &TempDir) -> (PathBuf, PathBuf) {
    (dir.path().join("report.pdf"), dir.path().join("out/report_compressed.pdf"))
}

#[test]
fn library_backend_wins_on_uncompressed_document() {
    let dir = TempDir::new().unwrap();
    let (input, output) = paths(&dir);
    sample_pdf(&input, 5);
    let config = offline_config(&dir);

    let report = compress_pdf(&input, &output, &config).unwrap();

    assert_eq!(report.chosen, CandidateSource::Backend(BackendId::Library));
    assert!(report.final_size < report.original_size);
    assert_eq!(fs::metadata(&output).unwrap().len(), report.final_size);
    assert!(is_readable_pdf(&output));
    assert_eq!(report.skipped, vec!["ghostscript".to_string()]);
    assert_eq!(report.attempts.len(), 3);
    assert_eq!(report.attempts[1].error_kind, Some(ErrorClass::BackendUnavailable));
    assert_eq!(report.attempts.iter().filter(|a| a.success).count(), 2);
    assert_eq!(entries(&dir.path().join("jobs")), 0);
}

#[test]
fn rewrite_alone_still_produces_a_readable_document() {
    let dir = TempDir::new().unwrap();
    let (input, output) = paths(&dir);
    sample_pdf(&input, 2);
    let config = ShrinkConfig {
        disabled: vec![BackendId::Library, BackendId::Ghostscript],
        ..offline_config(&dir)
    };

    let report = compress_pdf(&input, &output, &config).unwrap();

    assert_eq!(report.chosen, CandidateSource::Backend(BackendId::Rewrite));
    assert!(report.final_size <= report.original_size);
    assert!(is_readable_pdf(&output));
}

#[test]
fn corrupt_input_fails_and_leaves_nothing_behind() {
    let dir = TempDir::new().unwrap();
    let (input, output) = paths(&dir);
    write_bytes(&input, b"%PDF-1.7\nthis file was truncated in transit");

    let err = compress_pdf(&input, &output, &offline_config(&dir)).unwrap_err();

    assert_eq!(err.class(), Some(ErrorClass::Exhausted));
    assert_eq!(err.attempts().len(), 3);
    assert!(err.attempts().iter().all(|a| !a.success));
    assert!(!output.exists());
    assert_eq!(entries(&dir.path().join("jobs")), 0);
}

#[test]
fn zero_byte_input_fails() {
    let dir = TempDir::new().unwrap();
    let (input, output) = paths(&dir);
    write_bytes(&input, b"");

    let err = compress_pdf(&input, &output, &offline_config(&dir)).unwrap_err();
    assert_eq!(err.class(), Some(ErrorClass::Exhausted));
    assert!(!output.exists());
}

#[test]
fn missing_input_is_a_stage_failure() {
    let dir = TempDir::new().unwrap();
    let (input, output) = paths(&dir);

    let err = compress_pdf(&input, &output, &offline_config(&dir)).unwrap_err();
    assert_eq!(err.class(), Some(ErrorClass::StageFailure));
    assert!(!output.exists());
}

#[test]
fn owner_locked_document_keeps_its_text() {
    let dir = TempDir::new().unwrap();
    let (input, output) = paths(&dir);
    encrypted_pdf(&input, "", "HELLO SECRET TEXT");

    let report = compress_pdf(&input, &output, &offline_config(&dir)).unwrap();

    assert!(report.attempts.iter().filter(|a| a.success).count() >= 1);
    assert!(!lopdf::Document::load(&output).unwrap().is_encrypted());
    let text = page_text(&output);
    assert!(text.windows(17).any(|w| w == b"HELLO SECRET TEXT"));
}

#[test]
fn owner_locked_document_through_rewrite_alone_keeps_its_text() {
    let dir = TempDir::new().unwrap();
    let (input, output) = paths(&dir);
    encrypted_pdf(&input, "", "HELLO SECRET TEXT");
    let config = ShrinkConfig {
        disabled: vec![BackendId::Library, BackendId::Ghostscript],
        ..offline_config(&dir)
    };

    let report = compress_pdf(&input, &output, &config).unwrap();

    assert_eq!(report.chosen, CandidateSource::Backend(BackendId::Rewrite));
    let text = page_text(&output);
    assert!(text.windows(17).any(|w| w == b"HELLO SECRET TEXT"));
}

#[test]
fn password_protected_document_exhausts_the_offline_chain() {
    let dir = TempDir::new().unwrap();
    let (input, output) = paths(&dir);
    encrypted_pdf(&input, "hunter2", "HELLO SECRET TEXT");

    let err = compress_pdf(&input, &output, &offline_config(&dir)).unwrap_err();

    assert_eq!(err.class(), Some(ErrorClass::Exhausted));
    let library = &err.attempts()[0];
    assert_eq!(library.backend, BackendId::Library);
    assert!(library.detail.as_deref().unwrap().contains("password"));
    assert!(!output.exists());
    assert!(input.exists());
}

#[test]
fn failed_job_never_deletes_an_aliased_input() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("scan.pdf");
    write_bytes(&input, b"%PDF-1.7\ncorrupt");

    let err = compress_pdf(&input, &dir.path().join("./scan.pdf"), &offline_config(&dir)).unwrap_err();

    assert!(matches!(err, ShrinkError::OutputIsInput { .. }));
    assert_eq!(fs::read(&input).unwrap(), b"%PDF-1.7\ncorrupt");
}

#[test]
fn same_input_same_size() {
    let dir = TempDir::new().unwrap();
    let (input, output) = paths(&dir);
    sample_pdf(&input, 3);
    let orchestrator = Orchestrator::from_config(&offline_config(&dir));

    let first = orchestrator.run(&input, &output).unwrap();
    let second = orchestrator.run(&input, &output).unwrap();

    assert_eq!(first.final_size, second.final_size);
    assert_eq!(first.chosen, second.chosen);
}

#[test]
fn report_serializes_for_operators() {
    let dir = TempDir::new().unwrap();
    let (input, output) = paths(&dir);
    sample_pdf(&input, 1);

    let report = compress_pdf(&input, &output, &offline_config(&dir)).unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["chosen"]["kind"], "backend");
    assert_eq!(json["chosen"]["backend"], "library");
    assert_eq!(json["skipped"][0], "ghostscript");
    assert_eq!(json["attempts"][0]["name"], "lopdf-optimize");
    assert_eq!(json["digest"].as_str().unwrap().len(), 64);
}

#[cfg(unix)]
mod external_tool {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;

    fn script(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("fake-gs");
        let text = format!(
            "#!/bin/sh\nfor a in \"$@\"; do\n  case \"$a\" in\n    -sOutputFile=*) out=\"${{a#-sOutputFile=}}\" ;;\n  esac\n  last=\"$a\"\ndone\n{body}\n"
        );
        fs::write(&path, text).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn with_tool(dir: &TempDir, tool: PathBuf) -> ShrinkConfig {
        ShrinkConfig {
            tool_path: Some(tool),
            tool_timeout_secs: 10,
            workspace_root: Some(dir.path().join("jobs")),
            ..Default::default()
        }
    }

    #[test]
    fn truncated_tool_output_is_rejected() {
        let dir = TempDir::new().unwrap();
        let (input, output) = paths(&dir);
        sample_pdf(&input, 2);
        let tool = script(dir.path(), "head -c 64 \"$last\" > \"$out\"");

        let report = compress_pdf(&input, &output, &with_tool(&dir, tool)).unwrap();

        let gs = &report.attempts[1];
        assert_eq!(gs.backend, BackendId::Ghostscript);
        assert!(!gs.success);
        assert_eq!(gs.error_kind, Some(ErrorClass::BackendFault));
        assert_eq!(report.chosen, CandidateSource::Backend(BackendId::Library));
        assert_eq!(report.attempts.len(), 3);
    }

    #[test]
    fn failing_tool_does_not_abort_the_chain() {
        let dir = TempDir::new().unwrap();
        let (input, output) = paths(&dir);
        sample_pdf(&input, 2);
        let tool = script(dir.path(), "exit 1");

        let report = compress_pdf(&input, &output, &with_tool(&dir, tool)).unwrap();

        assert!(!report.attempts[1].success);
        assert!(report.attempts[2].success);
        assert!(is_readable_pdf(&output));
        assert_eq!(entries(&dir.path().join("jobs")), 0);
    }

    #[test]
    fn tool_copy_of_input_is_valid_but_not_smaller() {
        let dir = TempDir::new().unwrap();
        let (input, output) = paths(&dir);
        sample_pdf(&input, 2);
        let tool = script(dir.path(), "cp \"$last\" \"$out\"");

        let report = compress_pdf(&input, &output, &with_tool(&dir, tool)).unwrap();

        let gs = &report.attempts[1];
        assert!(gs.success);
        assert_eq!(gs.produced_size, report.original_size);
        assert!(report.final_size < report.original_size);
    }
}
