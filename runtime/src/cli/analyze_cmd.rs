//! CLI handler for `api-inspector analyze <base_url>`.

use crate::cli::output::{self, Styled};
use crate::config::InspectorConfig;
use crate::endpoint::EndpointDescriptor;
use crate::pipeline::{Analysis, Inspector};
use crate::renderer::chromium::ChromiumRenderer;
use crate::renderer::{NoopRenderer, Renderer};
use crate::report;
use crate::summarizer::{ChatCompletionsSummarizer, Summarizer};
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

/// Flags accepted by `analyze`.
#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    pub no_render: bool,
    pub fresh: bool,
    pub no_cache: bool,
    pub summarize: bool,
    pub out: Option<PathBuf>,
}

impl AnalyzeOptions {
    /// Overlay the flags onto an environment-derived config.
    pub fn apply(&self, config: &mut InspectorConfig) {
        if self.no_render {
            config.render = false;
        }
        if self.fresh {
            config.cache.fresh = true;
        }
        if self.no_cache {
            config.cache.enabled = false;
        }
    }
}

/// Chromium when rendering is allowed and a binary exists, otherwise HTTP only.
fn pick_renderer(config: &InspectorConfig) -> Arc<dyn Renderer> {
    if !config.render {
        return Arc::new(NoopRenderer);
    }
    match ChromiumRenderer::new() {
        Ok(r) => Arc::new(r),
        Err(e) => {
            warn!("JS-rendered documentation pages will be skipped: {e}");
            Arc::new(NoopRenderer)
        }
    }
}

/// Run the analyze command.
pub async fn run(base_url: &str, opts: AnalyzeOptions) -> Result<()> {
    let mut config = InspectorConfig::from_env();
    opts.apply(&mut config);

    let s = Styled::new();
    let spinner = output::spinner("Starting analysis");
    let progress = spinner.clone();

    let renderer = pick_renderer(&config);
    let summarizer_settings = config.summarizer.clone();
    let mut inspector =
        Inspector::new(config, renderer).with_progress(move |step| progress.set_message(step.label()));

    let analysis = inspector.analyze(base_url).await;
    spinner.finish_and_clear();
    let analysis = analysis?;

    let notes = if opts.summarize && !analysis.is_empty() {
        match ChatCompletionsSummarizer::from_settings(&summarizer_settings) {
            Some(summarizer) => {
                let spinner = output::spinner("Generating AI summary");
                let result = summarizer.summarize(&analysis.endpoints).await;
                spinner.finish_and_clear();
                match result {
                    Ok(md) => Some(md),
                    Err(e) => {
                        warn!("summary failed: {e}");
                        None
                    }
                }
            }
            None => {
                warn!("no API key configured (GROQ_API_KEY); skipping summary");
                None
            }
        }
    } else {
        None
    };

    let written = match &opts.out {
        Some(dir) => Some(report::write_report(dir, &analysis, notes.as_deref())?),
        None => None,
    };

    if output::is_json() {
        let mut value = serde_json::to_value(&analysis)?;
        if let Some(obj) = value.as_object_mut() {
            // The full document is large; the endpoint list is what callers want.
            obj.remove("spec");
            if let Some(notes) = &notes {
                obj.insert("notes".to_string(), serde_json::Value::String(notes.clone()));
            }
            if let Some(w) = &written {
                obj.insert(
                    "report".to_string(),
                    serde_json::json!({
                        "markdown": w.markdown.display().to_string(),
                        "json": w.json.display().to_string(),
                    }),
                );
            }
        }
        output::print_json(&value);
        return Ok(());
    }

    if output::is_quiet() {
        for ep in &analysis.endpoints {
            println!("{} {}", ep.method, ep.path);
        }
        return Ok(());
    }

    print_analysis(&s, &analysis);

    if let Some(notes) = &notes {
        println!("  {}", s.bold("AI Notes"));
        println!();
        for line in notes.lines() {
            println!("  {line}");
        }
        println!();
    }

    if let Some(w) = &written {
        println!("  {} Report written:", s.ok_sym());
        println!("    {}", w.markdown.display());
        println!("    {}", w.json.display());
    }

    Ok(())
}

fn print_analysis(s: &Styled, analysis: &Analysis) {
    println!();
    if analysis.is_empty() {
        println!(
            "  {} Could not find any endpoints on {}",
            s.warn_sym(),
            analysis.base_url
        );
        println!();
        return;
    }

    println!(
        "  {} Found {} endpoints via {}",
        s.ok_sym(),
        analysis.endpoints.len(),
        analysis.source.describe()
    );
    if let Some(title) = analysis.spec.as_ref().and_then(|d| d.title()) {
        println!("  {}", s.dim(title));
    }
    println!();
    print_table(s, &analysis.endpoints);
    println!();
}

fn print_table(s: &Styled, endpoints: &[EndpointDescriptor]) {
    let method_w = endpoints
        .iter()
        .map(|e| e.method.as_str().len())
        .max()
        .unwrap_or(6)
        .max(6);
    let path_w = endpoints.iter().map(|e| e.path.len()).max().unwrap_or(4).max(4);

    println!(
        "  {}",
        s.bold(&format!("{:<method_w$}  {:<path_w$}  Note", "Method", "Path"))
    );
    for ep in endpoints {
        println!("  {:<method_w$}  {:<path_w$}  {}", ep.method.as_str(), ep.path, ep.summary);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_overlay_config() {
        let mut config = InspectorConfig::default();
        AnalyzeOptions {
            no_render: true,
            fresh: true,
            no_cache: false,
            ..Default::default()
        }
        .apply(&mut config);
        assert!(!config.render);
        assert!(config.cache.fresh);
        assert!(config.cache.enabled);

        AnalyzeOptions {
            no_cache: true,
            ..Default::default()
        }
        .apply(&mut config);
        assert!(!config.cache.enabled);
    }

    #[test]
    fn test_no_render_uses_noop() {
        let config = InspectorConfig {
            render: false,
            ..Default::default()
        };
        assert!(!pick_renderer(&config).is_available());
    }
}
