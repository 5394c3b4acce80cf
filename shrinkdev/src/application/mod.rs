pub mod handlers;

use crate::presentation::cli::{Cli, Commands};
use shrink_core::{Result, ShrinkConfig};

pub fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => ShrinkConfig::load(path)?,
        None => ShrinkConfig::default(),
    };
    match cli.command {
        Commands::Compress {
            input,
            out,
            preset,
            timeout,
            tool,
            skip,
            workspace_root,
            json,
        } => handlers::handle_compress(
            config,
            input,
            out,
            preset,
            timeout,
            tool,
            skip,
            workspace_root,
            json,
        ),
        Commands::Backends => handlers::handle_backends(config),
    }
}
