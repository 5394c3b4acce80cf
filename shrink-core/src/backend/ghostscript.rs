use super::{Backend, BackendError, BackendId};
use crate::config::PdfPreset;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

/// Executable names probed on `PATH`, first hit wins.
pub const DEFAULT_TOOL_NAMES: [&str; 3] = ["gswin64c", "gswin32c", "gs"];

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Ghostscript `pdfwrite` re-distillation.
pub struct Ghostscript {
    exe: Option<PathBuf>,
    preset: PdfPreset,
    timeout: Option<Duration>,
}

impl Ghostscript {
    /// Resolves the first of `names` found on `PATH`.
    pub fn discover<S: AsRef<str>>(names: &[S], preset: PdfPreset, timeout: Option<Duration>) -> Self {
        let exe = names
            .iter()
            .find_map(|name| which::which(name.as_ref()).ok());
        Self {
            exe,
            preset,
            timeout,
        }
    }

    /// Uses an explicit executable; unavailable if it does not exist.
    pub fn with_executable(path: impl Into<PathBuf>, preset: PdfPreset, timeout: Option<Duration>) -> Self {
        let path = path.into();
        let exe = path.is_file().then_some(path);
        Self {
            exe,
            preset,
            timeout,
        }
    }

    fn command(&self, exe: &Path, input: &Path, output: &Path) -> Command {
        let mut cmd = Command::new(exe);
        cmd.arg("-sDEVICE=pdfwrite")
            .arg("-dCompatibilityLevel=1.4")
            .arg(format!("-dPDFSETTINGS={}", self.preset.as_arg()))
            .arg("-dNOPAUSE")
            .arg("-dQUIET")
            .arg("-dBATCH")
            .arg(format!("-sOutputFile={}", output.display()))
            .arg(input)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        cmd
    }
}

impl Backend for Ghostscript {
    fn id(&self) -> BackendId {
        BackendId::Ghostscript
    }

    fn name(&self) -> &str {
        "ghostscript"
    }

    fn is_available(&self) -> bool {
        self.exe.is_some()
    }

    fn executable(&self) -> Option<&Path> {
        self.exe.as_deref()
    }

    fn attempt(&self, input: &Path, output: &Path) -> Result<(), BackendError> {
        let exe = self.exe.as_deref().ok_or(BackendError::Unavailable)?;
        let program = exe.display().to_string();
        debug!(%program, preset = self.preset.as_arg(), "running external tool");

        let mut child = spawn(&mut self.command(exe, input, output))?;
        let status = wait_bounded(&mut child, &program, self.timeout)?;
        if !status.success() {
            return Err(BackendError::ToolExit { program, status });
        }
        // A zero-length file here is caught by candidate inspection; only a
        // missing one is the tool's fault.
        fs::metadata(output)?;
        Ok(())
    }
}

/// A freshly written executable can briefly report ETXTBSY while another
/// thread's fork still holds its write handle.
#[cfg(unix)]
fn spawn(cmd: &mut Command) -> std::io::Result<Child> {
    // Same value on Linux and the BSDs.
    const ETXTBSY: i32 = 26;
    let mut tries = 0;
    loop {
        match cmd.spawn() {
            Err(e) if e.raw_os_error() == Some(ETXTBSY) && tries < 5 => {
                tries += 1;
                thread::sleep(POLL_INTERVAL);
            }
            other => return other,
        }
    }
}

#[cfg(not(unix))]
fn spawn(cmd: &mut Command) -> std::io::Result<Child> {
    cmd.spawn()
}

/// Waits for `child`, killing and reaping it once `limit` elapses.
fn wait_bounded(
    child: &mut Child,
    program: &str,
    limit: Option<Duration>,
) -> Result<ExitStatus, BackendError> {
    let Some(limit) = limit else {
        return Ok(child.wait()?);
    };
    let deadline = Instant::now() + limit;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Err(BackendError::TimedOut {
                program: program.to_string(),
                limit,
            });
        }
        thread::sleep(POLL_INTERVAL);
    }
}
