use crate::backend::BackendId;
use crate::backend::ghostscript::DEFAULT_TOOL_NAMES;
use crate::error::{Result, ShrinkError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Ghostscript `-dPDFSETTINGS` presets, smallest output first.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PdfPreset {
    Screen,
    #[default]
    Ebook,
    Printer,
    Prepress,
    Default,
}

impl PdfPreset {
    pub fn as_arg(&self) -> &'static str {
        match self {
            PdfPreset::Screen => "/screen",
            PdfPreset::Ebook => "/ebook",
            PdfPreset::Printer => "/printer",
            PdfPreset::Prepress => "/prepress",
            PdfPreset::Default => "/default",
        }
    }
}

impl fmt::Display for PdfPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_arg().trim_start_matches('/'))
    }
}

impl FromStr for PdfPreset {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().trim_start_matches('/').to_ascii_lowercase().as_str() {
            "screen" => Ok(PdfPreset::Screen),
            "ebook" => Ok(PdfPreset::Ebook),
            "printer" => Ok(PdfPreset::Printer),
            "prepress" => Ok(PdfPreset::Prepress),
            "default" => Ok(PdfPreset::Default),
            other => Err(format!(
                "unknown preset '{other}' (expected screen, ebook, printer, prepress or default)"
            )),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ShrinkConfig {
    /// Quality preset handed to the external tool.
    pub preset: PdfPreset,
    /// Upper bound on one external tool run; 0 waits forever.
    pub tool_timeout_secs: u64,
    /// Explicit tool executable; skips the `PATH` search.
    pub tool_path: Option<PathBuf>,
    /// Names searched on `PATH` when `tool_path` is unset.
    pub tool_names: Vec<String>,
    /// Backends switched off for every job.
    pub disabled: Vec<BackendId>,
    /// Parent directory for job workspaces; system temp dir when unset.
    pub workspace_root: Option<PathBuf>,
}

impl Default for ShrinkConfig {
    fn default() -> Self {
        Self {
            preset: PdfPreset::default(),
            tool_timeout_secs: 120,
            tool_path: None,
            tool_names: DEFAULT_TOOL_NAMES.iter().map(|s| s.to_string()).collect(),
            disabled: Vec::new(),
            workspace_root: None,
        }
    }
}

impl ShrinkConfig {
    /// Reads a TOML file; missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| ShrinkError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| ShrinkError::Config(e.to_string()))
    }

    pub fn tool_timeout(&self) -> Option<Duration> {
        (self.tool_timeout_secs > 0).then(|| Duration::from_secs(self.tool_timeout_secs))
    }

    pub fn is_enabled(&self, id: BackendId) -> bool {
        !self.disabled.contains(&id)
    }
}
