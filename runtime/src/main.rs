// Copyright 2026 API Inspector Contributors
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use api_inspector::cli;
use api_inspector::cli::analyze_cmd::AnalyzeOptions;
use api_inspector::cli::try_cmd::TryOptions;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "api-inspector",
    about = "API Inspector: discover and try the endpoints of any web API",
    version,
    after_help = "Run 'api-inspector <command> --help' for details on each command."
)]
struct Cli {
    /// Output results as JSON (machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover the endpoints of an API
    Analyze {
        /// Base URL of the API (e.g. "https://petstore3.swagger.io/api/v3")
        base_url: String,
        /// Skip the headless-browser pass over documentation pages
        #[arg(long)]
        no_render: bool,
        /// Ignore cached stage results (fresh results are still cached)
        #[arg(long)]
        fresh: bool,
        /// Neither read nor write the stage cache
        #[arg(long)]
        no_cache: bool,
        /// Generate AI notes for the discovered endpoints
        #[arg(long)]
        summarize: bool,
        /// Write api_report.md and endpoints.json into this directory
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Send one live request to an endpoint
    Try {
        /// Base URL of the API
        base_url: String,
        /// HTTP method (GET, POST, PUT, PATCH, DELETE)
        method: String,
        /// Endpoint path (e.g. "/pets/{id}" with the id filled in)
        path: String,
        /// Bearer token sent as the Authorization header
        #[arg(long)]
        token: Option<String>,
        /// JSON request body (defaults to the spec's example)
        #[arg(long)]
        body: Option<String>,
        /// Query parameters as a JSON object (defaults to the spec's examples)
        #[arg(long)]
        query: Option<String>,
        /// Request timeout in milliseconds
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Check environment and diagnose issues
    Doctor,
    /// Manage cached stage results
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Clear cached results (all or for a specific base URL)
    Clear {
        /// Base URL to clear (omit to clear all)
        base_url: Option<String>,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "api_inspector=debug"
    } else {
        "api_inspector=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global flags via environment variables so all modules can check them
    if cli.json {
        std::env::set_var("INSPECTOR_JSON", "1");
    }
    if cli.quiet {
        std::env::set_var("INSPECTOR_QUIET", "1");
    }
    if cli.verbose {
        std::env::set_var("INSPECTOR_VERBOSE", "1");
    }
    if cli.no_color {
        std::env::set_var("INSPECTOR_NO_COLOR", "1");
    }

    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Analyze {
            base_url,
            no_render,
            fresh,
            no_cache,
            summarize,
            out,
        } => {
            let opts = AnalyzeOptions {
                no_render,
                fresh,
                no_cache,
                summarize,
                out,
            };
            cli::analyze_cmd::run(&base_url, opts).await
        }
        Commands::Try {
            base_url,
            method,
            path,
            token,
            body,
            query,
            timeout,
        } => {
            let opts = TryOptions {
                token,
                body,
                query,
                timeout_ms: timeout,
            };
            cli::try_cmd::run(&base_url, &method, &path, opts).await
        }
        Commands::Doctor => cli::doctor::run().await,
        Commands::Cache { action } => match action {
            CacheAction::Clear { base_url } => cli::cache_cmd::run_clear(base_url.as_deref()).await,
        },
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "api-inspector", &mut std::io::stdout());
            Ok(())
        }
    };

    // Consistent exit codes: 0=success, 1=error
    if let Err(e) = &result {
        if !cli::output::is_quiet() && !cli::output::is_json() {
            eprintln!("  Error: {e:#}");
        }
        if cli::output::is_json() {
            cli::output::print_json(&serde_json::json!({
                "error": true,
                "message": format!("{e:#}"),
            }));
        }
        std::process::exit(1);
    }

    result
}
