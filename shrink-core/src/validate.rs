use lopdf::Document;
use std::path::Path;

/// Candidate check applied after every attempt.
pub type Validator = dyn Fn(&Path) -> bool + Send + Sync;

/// True if `path` parses as a PDF with at least one page.
pub fn is_readable_pdf(path: &Path) -> bool {
    match Document::load(path) {
        Ok(doc) => !doc.get_pages().is_empty(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{sample_pdf, write_bytes};
    use tempfile::TempDir;

    #[test]
    fn accepts_a_real_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.pdf");
        sample_pdf(&path, 1);
        assert!(is_readable_pdf(&path));
    }

    #[test]
    fn rejects_garbage_and_missing_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.pdf");
        write_bytes(&path, b"%PDF-1.4\n%%EOF\n");
        assert!(!is_readable_pdf(&path));
        assert!(!is_readable_pdf(&dir.path().join("absent.pdf")));
    }
}
