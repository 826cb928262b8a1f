use std::path::{Path, PathBuf};

use clap::Parser;
use tower_lsp::{LspService, Server};
use tracing::info;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crossref_analyzer::CrossrefLanguageServer;

const LOG_FILE_NAME: &str = "crossref-analyzer.log";

#[derive(Parser, Debug)]
#[command(name = "crossref-analyzer", version, about)]
struct Args {
    /// Debug-level logs for link passes and the LSP transport.
    #[arg(long, short)]
    verbose: bool,

    /// Log file path. Defaults to `~/.crossref-analyzer/crossref-analyzer.log`.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

/// `~/.crossref-analyzer`, or the temp dir when it cannot be created.
fn log_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(|home| PathBuf::from(home).join(".crossref-analyzer"))
        .filter(|dir| std::fs::create_dir_all(dir).is_ok())
        .unwrap_or_else(std::env::temp_dir)
}

/// Directives for the stderr and file layers. Consistency events of the
/// linker stay in the file at `warn` even when everything else is quiet.
fn filters(verbose: bool) -> (EnvFilter, EnvFilter) {
    if verbose {
        (
            EnvFilter::new("crossref_analyzer=debug,tower_lsp=debug"),
            EnvFilter::new("crossref_analyzer=debug,tower_lsp=info"),
        )
    } else {
        (
            EnvFilter::new("crossref_analyzer=info,tower_lsp=warn"),
            EnvFilter::new("crossref_analyzer=info,crossref_analyzer::consistency=warn,tower_lsp=warn"),
        )
    }
}

fn init_tracing(args: &Args) -> PathBuf {
    let log_path = args.log_file.clone().unwrap_or_else(|| log_dir().join(LOG_FILE_NAME));
    let directory = log_path.parent().filter(|dir| !dir.as_os_str().is_empty()).unwrap_or(Path::new("."));
    let file_name = log_path.file_name().map(PathBuf::from).unwrap_or_else(|| PathBuf::from(LOG_FILE_NAME));

    let (stderr_filter, file_filter) = filters(args.verbose);
    let file_layer = fmt::layer()
        .with_writer(tracing_appender::rolling::never(directory, file_name))
        .with_ansi(false)
        .with_target(true)
        .with_filter(file_filter);
    let stderr_layer =
        fmt::layer().with_writer(std::io::stderr).with_ansi(false).with_target(false).with_filter(stderr_filter);

    tracing_subscriber::registry().with(file_layer).with(stderr_layer).init();
    log_path
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let log_path = init_tracing(&args);

    info!("Starting crossref-analyzer v{}", env!("CARGO_PKG_VERSION"));
    info!("Log file: {}", log_path.display());

    let (service, socket) = LspService::new(CrossrefLanguageServer::new);
    Server::new(tokio::io::stdin(), tokio::io::stdout(), socket).serve(service).await;

    info!("crossref-analyzer stopped");
}
