//! Language server for Nextflow pipelines.
//!
//! Speaks LSP over stdin/stdout with full document sync. Completion covers
//! `NAME.out.` channels, `params.`, `label`, `include`, `conda` and
//! `container` lines; hover describes processes, workflows, their channels
//! and params. The conda and container indexes are cached per workspace and
//! refreshed through the `nfscope.fetchCondaIndex` and
//! `nfscope.fetchContainerIndex` commands.
//!
//! Logs go to stderr and follow `RUST_LOG`.

use clap::Parser;
use tower_lsp::{LspService, Server};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod backend;
mod context;
mod error;
mod indexes;
mod providers;

#[cfg(test)]
mod tests;

use backend::NfscopeBackend;

#[derive(Parser, Debug)]
#[command(name = "nfscope-lsp", version, about = "Nextflow language server")]
pub(crate) struct Cli {
    /// Talk to the client over stdin/stdout
    #[arg(long, required = true)]
    pub stdio: bool,
}

#[tokio::main]
async fn main() {
    let _cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    info!(version = env!("CARGO_PKG_VERSION"), "starting nfscope-lsp");

    let (service, socket) = LspService::new(NfscopeBackend::new);
    Server::new(tokio::io::stdin(), tokio::io::stdout(), socket)
        .serve(service)
        .await;
}
