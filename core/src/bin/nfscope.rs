//! nfscope CLI
//!
//! Inspects the same process, workflow and channel information the language
//! server shows in completions and hovers. Useful for checking how a file is
//! scanned and for filling the index caches outside the editor.

use nfscope_core::cli;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = cli::run_cli() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
