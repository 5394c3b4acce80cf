use super::{Backend, BackendError, BackendId, load_plaintext};
use std::path::Path;
use tracing::debug;

/// In-process optimize pass over the whole object graph.
#[derive(Default)]
pub struct LibraryOptimize;

impl Backend for LibraryOptimize {
    fn id(&self) -> BackendId {
        BackendId::Library
    }

    fn name(&self) -> &str {
        "lopdf-optimize"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn attempt(&self, input: &Path, output: &Path) -> Result<(), BackendError> {
        let mut doc = load_plaintext(input)?;
        let empty = doc.delete_zero_length_streams();
        let pruned = doc.prune_objects();
        doc.renumber_objects();
        doc.compress();
        debug!(
            empty_streams = empty.len(),
            pruned = pruned.len(),
            "optimized object graph"
        );

        doc.save(output)?;
        Ok(())
    }
}
