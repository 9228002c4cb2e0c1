//! CLI handler for `api-inspector try <base_url> <METHOD> <path>`.

use crate::cli::output::{self, Styled};
use crate::config::InspectorConfig;
use crate::live::try_request::{self, TryRequest};
use crate::pipeline::Inspector;
use crate::renderer::NoopRenderer;
use anyhow::Result;
use std::sync::Arc;

/// Arguments accepted by `try`.
#[derive(Debug, Clone, Default)]
pub struct TryOptions {
    pub token: Option<String>,
    pub body: Option<String>,
    pub query: Option<String>,
    pub timeout_ms: Option<u64>,
}

/// Run the try command.
pub async fn run(base_url: &str, method: &str, path: &str, opts: TryOptions) -> Result<()> {
    let mut config = InspectorConfig::from_env();
    if let Some(ms) = opts.timeout_ms {
        config.timeouts.try_ms = ms;
    }
    let timeout_ms = config.timeouts.try_ms;
    let s = Styled::new();

    // Examples are only needed when the user left body or query unset.
    let mut inspector = Inspector::new(config, Arc::new(NoopRenderer));
    let spec = if opts.body.is_none() || opts.query.is_none() {
        crate::error::validate_base_url(base_url)?;
        inspector.fetch_spec(base_url.trim()).await
    } else {
        None
    };

    let request = TryRequest::build(
        base_url,
        method,
        path,
        opts.token.as_deref(),
        opts.body.as_deref(),
        opts.query.as_deref(),
        spec.as_ref(),
    )?;

    if !output::is_quiet() && !output::is_json() {
        println!();
        println!("  {} {}{}", s.bold(request.method.as_str()), request.base_url, request.path);
        if !request.query.is_empty() {
            let q: Vec<String> = request.query.iter().map(|(k, v)| format!("{k}={v}")).collect();
            println!("  {}", s.dim(&format!("query: {}", q.join("&"))));
        }
        if let Some(body) = &request.body {
            println!("  {}", s.dim(&format!("body: {body}")));
        }
    }

    let spinner = output::spinner("Sending request");
    let result = try_request::send(inspector.client(), &request, timeout_ms).await;
    spinner.finish_and_clear();
    let result = result?;

    if output::is_json() {
        output::print_json(&serde_json::to_value(&result)?);
        return Ok(());
    }

    let body = match &result.json {
        Some(v) => serde_json::to_string_pretty(v)?,
        None => result.body.clone(),
    };

    if output::is_quiet() {
        println!("{body}");
        return Ok(());
    }

    println!();
    println!(
        "  Status: {}  ({} ms)  {}",
        s.status(result.status),
        result.elapsed_ms,
        s.dim(&result.content_type)
    );
    if output::is_verbose() {
        for (k, v) in &result.headers {
            println!("  {}", s.dim(&format!("{k}: {v}")));
        }
    }
    println!();
    for line in body.lines() {
        println!("  {line}");
    }
    println!();

    Ok(())
}
