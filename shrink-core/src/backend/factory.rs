use super::Backend;
use super::BackendId;
use super::ghostscript::Ghostscript;
use super::library::LibraryOptimize;
use super::rewrite::PageRewrite;
use crate::config::ShrinkConfig;

pub fn build_backend(id: BackendId, config: &ShrinkConfig) -> Box<dyn Backend> {
    match id {
        BackendId::Library => Box::new(LibraryOptimize),
        BackendId::Ghostscript => {
            let timeout = config.tool_timeout();
            match &config.tool_path {
                Some(path) => Box::new(Ghostscript::with_executable(path, config.preset, timeout)),
                None => Box::new(Ghostscript::discover(config.tool_names.as_slice(), config.preset, timeout)),
            }
        }
        BackendId::Rewrite => Box::new(PageRewrite),
    }
}

/// The full chain in priority order: library, external tool, rewrite.
///
/// Backends listed in `config.disabled` stay in the chain but report
/// unavailable, so they show up as skipped rather than vanishing.
pub fn standard_chain(config: &ShrinkConfig) -> Vec<Box<dyn Backend>> {
    BackendId::ALL
        .iter()
        .map(|&id| -> Box<dyn Backend> {
            let backend = build_backend(id, config);
            if config.is_enabled(id) {
                backend
            } else {
                Box::new(Disabled(backend))
            }
        })
        .collect()
}

/// Wraps a backend switched off by configuration.
struct Disabled(Box<dyn Backend>);

impl Backend for Disabled {
    fn id(&self) -> BackendId {
        self.0.id()
    }

    fn name(&self) -> &str {
        self.0.name()
    }

    fn is_available(&self) -> bool {
        false
    }

    fn executable(&self) -> Option<&std::path::Path> {
        self.0.executable()
    }

    fn attempt(
        &self,
        _input: &std::path::Path,
        _output: &std::path::Path,
    ) -> Result<(), super::BackendError> {
        Err(super::BackendError::Unavailable)
    }
}
