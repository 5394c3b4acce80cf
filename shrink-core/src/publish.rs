use crate::error::{Result, ShrinkError};
use crate::util::hash_forward::HashingForward;
use std::fs::{self, File};
use std::io;
use std::path::Path;
use tracing::debug;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Published {
    pub size: u64,
    /// BLAKE3 of the published bytes, hex.
    pub digest: String,
}

/// Copies `candidate` to `output`, creating parent directories.
///
/// Bytes go to a temp file next to `output` which is then renamed into
/// place, so `output` never holds a partial file.
pub fn publish(candidate: &Path, output: &Path) -> Result<Published> {
    let publish_err = |source| ShrinkError::Publish {
        path: output.to_path_buf(),
        source,
    };

    let parent = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(publish_err)?;

    let mut tmp = tempfile::Builder::new()
        .prefix(".shrink-")
        .suffix(".part")
        .tempfile_in(parent)
        .map_err(publish_err)?;
    let mut src = File::open(candidate).map_err(publish_err)?;

    let mut hasher = blake3::Hasher::new();
    let size = {
        let mut fwd = HashingForward::new(tmp.as_file_mut(), &mut hasher);
        io::copy(&mut src, &mut fwd).map_err(publish_err)?;
        fwd.counted
    };
    tmp.as_file().sync_all().map_err(publish_err)?;
    tmp.persist(output).map_err(|e| publish_err(e.error))?;

    let digest = hex::encode(hasher.finalize().as_bytes());
    debug!(output = %output.display(), size, %digest, "published");
    Ok(Published { size, digest })
}

/// True if `output` is the existing file at `input` under any alias:
/// `./x.pdf`, a symlink or a hard link.
pub fn overwrites_input(input: &Path, output: &Path) -> bool {
    same_file::is_same_file(input, output).unwrap_or(false)
}

/// Removes whatever sits at `output`; used when a job fails.
pub(crate) fn discard(output: &Path) {
    match fs::remove_file(output) {
        Ok(()) => debug!(output = %output.display(), "removed stale output"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(output = %output.display(), error = %e, "could not remove output"),
    }
}
