use clap::{Parser, Subcommand};
use shrink_core::{BackendId, PdfPreset};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "shrink: PDF compression with a fallback chain", long_about = None)]
pub struct Cli {
    /// TOML config; flags override its values
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compress one PDF
    Compress {
        input: PathBuf,
        /// defaults to <stem>_compressed.<ext> next to the input
        out: Option<PathBuf>,

        /// Ghostscript preset: screen, ebook, printer, prepress, default
        #[arg(long)]
        preset: Option<PdfPreset>,

        /// seconds before a hung external tool is killed (0 = wait forever)
        #[arg(long)]
        timeout: Option<u64>,

        /// explicit Ghostscript executable instead of searching PATH
        #[arg(long)]
        tool: Option<PathBuf>,

        /// backend to leave out (repeatable): library, ghostscript, rewrite
        #[arg(long = "skip")]
        skip: Vec<BackendId>,

        /// parent directory for the job workspace
        #[arg(long)]
        workspace_root: Option<PathBuf>,

        /// print the job report as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// Show the chain and which backends are available here
    Backends,
}
