//! Quiver - Main Entry Point
//!
//! Wires the layers together for one invocation: load definitions,
//! resolve the named request, fire it, print the response, record the
//! exchange.

mod cli;

use std::error::Error;
use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use quiver_application::{RequestCatalog, RunRequest, build_request, resolve_globals};
use quiver_infrastructure::output::{print_request, print_response};
use quiver_infrastructure::{DiskCache, ReqwestHttpClient, load_dir};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{}", e.to_string().red());
        std::process::exit(1);
    }
}

/// Initializes stderr logging; `QUIVER_LOG` overrides the default
/// filter, `--verbose` raises it to debug.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env("QUIVER_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let Some(id) = cli.request.strip_prefix('@') else {
        return Err(format!("request '{}' must begin with '@'", cli.request).into());
    };

    let files = load_dir(&cli.dir).await?;
    let globals = resolve_globals(&files)?;
    let catalog = RequestCatalog::from_files(&files)?;
    let args = positional_args(&cli.args);

    let Some(def) = catalog.find(id) else {
        return Err(not_found_message(id, &catalog).into());
    };

    let cache = DiskCache::load_default().await?;
    if cli.verbose {
        // Building is pure, so previewing it here costs one extra pass.
        let spec = build_request(def, &globals, &args, &cache)?;
        print_request(&spec);
    }

    let http = Arc::new(ReqwestHttpClient::new()?);
    let mut use_case = RunRequest::new(http, cache);

    let cancel = async {
        let _ = tokio::signal::ctrl_c().await;
    };
    let response = use_case
        .run_until(&catalog, &globals, id, &args, cancel)
        .await?;

    print_response(&response);
    use_case.finish().await?;
    Ok(())
}

/// The argument vector handed to reference resolution: index 0 is the
/// program name by convention, user values start at `@1`.
fn positional_args(values: &[String]) -> Vec<String> {
    std::iter::once("quiver".to_string())
        .chain(values.iter().cloned())
        .collect()
}

fn not_found_message(id: &str, catalog: &RequestCatalog) -> String {
    if catalog.is_empty() {
        return format!("request '@{id}' not found: no definitions loaded");
    }
    let available = catalog
        .ids()
        .map(|known| format!("@{known}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("request '@{id}' not found; available: {available}")
}
