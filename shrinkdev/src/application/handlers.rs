use std::path::{Path, PathBuf};

use shrink_core::backend::factory::standard_chain;
use shrink_core::error::Result;
use shrink_core::{BackendId, JobReport, PdfPreset, ShrinkConfig, compress_pdf};

/// `<dir>/<stem>_compressed.<ext>`, keeping the input's extension.
pub fn default_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let ext = input
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "pdf".to_string());
    input.with_file_name(format!("{stem}_compressed.{ext}"))
}

#[allow(clippy::too_many_arguments)]
pub fn handle_compress(
    mut config: ShrinkConfig,
    input: PathBuf,
    out: Option<PathBuf>,
    preset: Option<PdfPreset>,
    timeout: Option<u64>,
    tool: Option<PathBuf>,
    skip: Vec<BackendId>,
    workspace_root: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    if let Some(p) = preset {
        config.preset = p;
    }
    if let Some(t) = timeout {
        config.tool_timeout_secs = t;
    }
    if tool.is_some() {
        config.tool_path = tool;
    }
    if workspace_root.is_some() {
        config.workspace_root = workspace_root;
    }
    for id in skip {
        if !config.disabled.contains(&id) {
            config.disabled.push(id);
        }
    }

    tracing::debug!(?config, "effective configuration");

    // compress_pdf refuses an output that aliases the input.
    let out = out.unwrap_or_else(|| default_output(&input));
    let report = compress_pdf(&input, &out, &config)?;
    if json {
        let text = serde_json::to_string_pretty(&report).map_err(std::io::Error::from)?;
        println!("{text}");
    } else {
        println!("{}", summary(&report));
    }
    Ok(())
}

pub fn handle_backends(config: ShrinkConfig) -> Result<()> {
    for (rank, backend) in standard_chain(&config).iter().enumerate() {
        let state = if backend.is_available() {
            "available"
        } else if !config.is_enabled(backend.id()) {
            "disabled"
        } else {
            "not found"
        };
        match backend.executable() {
            Some(exe) => println!("{}. {:<16} {} ({})", rank + 1, backend.name(), state, exe.display()),
            None => println!("{}. {:<16} {}", rank + 1, backend.name(), state),
        }
    }
    Ok(())
}

fn summary(report: &JobReport) -> String {
    let via = match report.chosen {
        shrink_core::CandidateSource::Backend(id) => id.to_string(),
        shrink_core::CandidateSource::PassThrough => "pass-through".to_string(),
    };
    format!(
        "{} -> {}  {} -> {} bytes ({:.1}%) via {}",
        report.input.display(),
        report.output.display(),
        report.original_size,
        report.final_size,
        report.ratio() * 100.0,
        via
    )
}
