use lopdf::{Document, Object, ObjectId, encryption};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::process::ExitStatus;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Backends in chain priority order.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendId {
    Library = 0,
    Ghostscript = 1,
    Rewrite = 2,
}

impl BackendId {
    pub const ALL: [BackendId; 3] = [BackendId::Library, BackendId::Ghostscript, BackendId::Rewrite];

    pub fn as_str(&self) -> &'static str {
        match self {
            BackendId::Library => "library",
            BackendId::Ghostscript => "ghostscript",
            BackendId::Rewrite => "rewrite",
        }
    }
}

impl fmt::Display for BackendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "library" | "lopdf" => Ok(BackendId::Library),
            "ghostscript" | "gs" => Ok(BackendId::Ghostscript),
            "rewrite" => Ok(BackendId::Rewrite),
            other => Err(format!(
                "unknown backend '{other}' (expected library, ghostscript or rewrite)"
            )),
        }
    }
}

/// Why a single attempt failed. Never escapes the chain.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("backend unavailable")]
    Unavailable,

    #[error("input is password-protected")]
    Protected,

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{program} exited with {status}")]
    ToolExit { program: String, status: ExitStatus },

    #[error("{program} did not finish within {limit:?}")]
    TimedOut { program: String, limit: Duration },

    #[error("document has no pages")]
    NoPages,
}

/// One compression strategy.
///
/// `attempt` reads `input` and writes a candidate to `output`; both live in
/// the job workspace. The orchestrator decides whether the candidate is kept.
pub trait Backend: Send + Sync {
    fn id(&self) -> BackendId;
    fn name(&self) -> &str;
    fn is_available(&self) -> bool;
    fn attempt(&self, input: &Path, output: &Path) -> Result<(), BackendError>;

    /// External program this backend runs, once resolved.
    fn executable(&self) -> Option<&Path> {
        None
    }
}

/// Loads `path` for an in-process rewrite, returning a plaintext document.
///
/// Files encrypted only with an owner password open with the empty user
/// password and are decrypted here; anything that needs a real password is
/// `Protected`. Object keys depend on object numbers, so a document must not
/// be renumbered while `/Encrypt` is still in force.
pub(crate) fn load_plaintext(path: &Path) -> Result<Document, BackendError> {
    let mut doc = match Document::load(path) {
        Ok(doc) => doc,
        Err(e) if looks_encrypted(path) => {
            debug!(error = %e, "unparseable encrypted input");
            return Err(BackendError::Protected);
        }
        Err(e) => return Err(e.into()),
    };
    if doc.is_encrypted() {
        decrypt_with_empty_password(&mut doc)?;
        debug!("decrypted with the empty user password");
    }
    Ok(doc)
}

fn decrypt_with_empty_password(doc: &mut Document) -> Result<(), BackendError> {
    let encrypt_id = doc
        .trailer
        .get(b"Encrypt")
        .and_then(Object::as_reference)
        .map_err(|_| BackendError::Protected)?;
    let metadata_encrypted = doc
        .get_encrypted()
        .and_then(|dict| dict.get(b"EncryptMetadata"))
        .and_then(Object::as_bool)
        .unwrap_or(true);
    let key = encryption::get_encryption_key(doc, "", true).map_err(|_| BackendError::Protected)?;

    for (&id, obj) in doc.objects.iter_mut() {
        if id == encrypt_id {
            continue;
        }
        if !metadata_encrypted && obj.type_name().ok() == Some("Metadata") {
            continue;
        }
        decrypt_in_place(&key, id, obj);
    }
    doc.trailer.remove(b"Encrypt");
    doc.objects.remove(&encrypt_id);
    Ok(())
}

/// Every string and stream of an indirect object, nested ones included, is
/// encrypted with that object's key.
fn decrypt_in_place(key: &[u8], id: ObjectId, obj: &mut Object) {
    if let Ok(plain) = encryption::decrypt_object(key, id, &*obj) {
        match obj {
            Object::String(bytes, _) => *bytes = plain,
            Object::Stream(stream) => stream.set_content(plain),
            _ => {}
        }
    }
    match obj {
        Object::Array(items) => {
            for item in items.iter_mut() {
                decrypt_in_place(key, id, item);
            }
        }
        Object::Dictionary(dict) => {
            for (_, value) in dict.iter_mut() {
                decrypt_in_place(key, id, value);
            }
        }
        Object::Stream(stream) => {
            for (_, value) in stream.dict.iter_mut() {
                decrypt_in_place(key, id, value);
            }
        }
        _ => {}
    }
}

/// Loader errors on protected files are not distinguishable by kind, so fall
/// back to looking for an `/Encrypt` entry in the raw bytes.
fn looks_encrypted(path: &Path) -> bool {
    fs::read(path)
        .map(|bytes| bytes.windows(8).any(|w| w == b"/Encrypt"))
        .unwrap_or(false)
}

pub mod factory;
pub mod ghostscript;
pub mod library;
pub mod rewrite;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{encrypted_pdf, page_text, write_bytes};
    use tempfile::TempDir;

    #[test]
    fn owner_only_encryption_is_removed_on_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("locked.pdf");
        encrypted_pdf(&path, "", "QUARTERLY FIGURES");

        let mut doc = load_plaintext(&path).unwrap();

        assert!(!doc.is_encrypted());
        let out = dir.path().join("plain.pdf");
        doc.save(&out).unwrap();
        let text = page_text(&out);
        assert!(text.windows(17).any(|w| w == b"QUARTERLY FIGURES"));
    }

    #[test]
    fn user_password_means_protected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("locked.pdf");
        encrypted_pdf(&path, "hunter2", "QUARTERLY FIGURES");

        assert!(matches!(load_plaintext(&path), Err(BackendError::Protected)));
    }

    #[test]
    fn encrypt_marker_on_unparseable_input_reads_as_protected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("in.pdf");
        write_bytes(&path, b"%PDF-1.4\ntrailer << /Encrypt 5 0 R >>\n%%EOF");

        assert!(matches!(load_plaintext(&path), Err(BackendError::Protected)));
    }

    #[test]
    fn garbage_is_a_parse_error_not_protected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("in.pdf");
        write_bytes(&path, b"this is not a pdf at all");

        assert!(matches!(load_plaintext(&path), Err(BackendError::Pdf(_))));
    }
}
