//! Discovery orchestration.
//!
//! Runs the stages in their fallback order and surfaces the first usable
//! result. Results are never merged across stages.

use crate::acquisition::html_scanner::{self, ScanTimeouts};
use crate::acquisition::http_client::HttpClient;
use crate::acquisition::spec_fetcher::{self, SpecDocument};
use crate::acquisition::{liveness, prober, spec_extractor};
use crate::cache::{Stage, StageCache};
use crate::config::InspectorConfig;
use crate::endpoint::EndpointDescriptor;
use crate::error::{validate_base_url, InspectorResult};
use crate::renderer::Renderer;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Which stage produced the final endpoint list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoverySource {
    Spec,
    HtmlFallback,
    CommonPaths,
    NotFound,
}

impl DiscoverySource {
    pub fn describe(self) -> &'static str {
        match self {
            DiscoverySource::Spec => "OpenAPI specification",
            DiscoverySource::HtmlFallback => "HTML documentation scan",
            DiscoverySource::CommonPaths => "common-path JSON probe",
            DiscoverySource::NotFound => "nothing found",
        }
    }
}

/// A step of the pipeline, reported to progress observers as it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStep {
    FetchSpec,
    ScanHtml,
    Verify,
    ProbeCommonPaths,
}

impl PipelineStep {
    pub fn label(self) -> &'static str {
        match self {
            PipelineStep::FetchSpec => "Fetching OpenAPI spec",
            PipelineStep::ScanHtml => "No spec found, scanning documentation pages",
            PipelineStep::Verify => "Verifying discovered endpoints",
            PipelineStep::ProbeCommonPaths => "Probing common JSON endpoints",
        }
    }
}

/// Outcome of one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analysis {
    pub base_url: String,
    pub source: DiscoverySource,
    pub endpoints: Vec<EndpointDescriptor>,
    /// Kept for example lookups by the live tester.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spec: Option<SpecDocument>,
}

impl Analysis {
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

type ProgressFn = Box<dyn Fn(PipelineStep) + Send + Sync>;

/// Drives the discovery stages for one base URL at a time.
pub struct Inspector {
    config: InspectorConfig,
    client: HttpClient,
    renderer: Arc<dyn Renderer>,
    cache: Option<StageCache>,
    progress: Option<ProgressFn>,
}

impl Inspector {
    /// Build an inspector; the cache is opened when enabled, and skipped with a
    /// warning if it cannot be.
    pub fn new(config: InspectorConfig, renderer: Arc<dyn Renderer>) -> Self {
        let cache = if config.cache.enabled {
            match StageCache::from_settings(&config.cache) {
                Ok(mut cache) => {
                    cache.cleanup_expired();
                    Some(cache)
                }
                Err(e) => {
                    warn!("stage cache disabled: {e:#}");
                    None
                }
            }
        } else {
            None
        };

        Self {
            client: HttpClient::new(config.timeouts.try_ms),
            config,
            renderer,
            cache,
            progress: None,
        }
    }

    /// Report each step to `f` as it starts.
    pub fn with_progress(mut self, f: impl Fn(PipelineStep) + Send + Sync + 'static) -> Self {
        self.progress = Some(Box::new(f));
        self
    }

    pub fn config(&self) -> &InspectorConfig {
        &self.config
    }

    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    fn report(&self, step: PipelineStep) {
        if let Some(f) = &self.progress {
            f(step);
        }
    }

    fn cached<T: DeserializeOwned>(&mut self, stage: Stage, base_url: &str) -> Option<T> {
        if self.config.cache.fresh {
            return None;
        }
        let hit = self.cache.as_mut()?.get(stage, base_url);
        if hit.is_some() {
            info!("using cached {} result for {base_url}", stage.as_str());
        }
        hit
    }

    fn remember<T: Serialize>(&mut self, stage: Stage, base_url: &str, value: &T) {
        if let Some(cache) = self.cache.as_mut() {
            if let Err(e) = cache.put(stage, base_url, value) {
                warn!("failed to cache {} result: {e:#}", stage.as_str());
            }
        }
    }

    /// Structured specification at a well-known path, memoized.
    pub async fn fetch_spec(&mut self, base_url: &str) -> Option<SpecDocument> {
        if let Some(hit) = self.cached::<Option<SpecDocument>>(Stage::Spec, base_url) {
            return hit;
        }
        let spec = spec_fetcher::fetch_spec(base_url, &self.client, self.config.timeouts.spec_ms).await;
        self.remember(Stage::Spec, base_url, &spec);
        spec
    }

    /// Documentation-page scan (before liveness verification), memoized.
    pub async fn scan_html(&mut self, base_url: &str) -> Vec<EndpointDescriptor> {
        if let Some(hit) = self.cached::<Vec<EndpointDescriptor>>(Stage::HtmlFallback, base_url) {
            return hit;
        }
        let timeouts = ScanTimeouts {
            page_ms: self.config.timeouts.page_ms,
            render_ms: self.config.timeouts.render_ms,
        };
        let found = html_scanner::scan(base_url, &self.client, self.renderer.as_ref(), timeouts).await;
        // An empty scan without a renderer may hide script-built pages; let a
        // later run with a browser retry them.
        if found.is_empty() && !self.renderer.is_available() {
            debug!("not caching empty HTML scan for {base_url} (no renderer)");
        } else {
            self.remember(Stage::HtmlFallback, base_url, &found);
        }
        found
    }

    /// Keep only candidates that answer like an API. Never cached.
    pub async fn verify(&self, base_url: &str, candidates: Vec<EndpointDescriptor>) -> Vec<EndpointDescriptor> {
        liveness::verify(base_url, candidates, &self.client, self.config.timeouts.verify_ms).await
    }

    /// Common-path JSON probe, memoized.
    pub async fn probe(&mut self, base_url: &str) -> Vec<EndpointDescriptor> {
        if let Some(hit) = self.cached::<Vec<EndpointDescriptor>>(Stage::CommonPaths, base_url) {
            return hit;
        }
        let found = prober::probe(base_url, &self.client, self.config.timeouts.probe_ms).await;
        self.remember(Stage::CommonPaths, base_url, &found);
        found
    }

    /// Run the full fallback sequence for `base_url`.
    ///
    /// A present specification is final for the HTML stage: its extraction is
    /// used even when empty, and only an empty list falls through to probing.
    /// Total failure is an empty list with `DiscoverySource::NotFound`.
    pub async fn analyze(&mut self, base_url: &str) -> InspectorResult<Analysis> {
        validate_base_url(base_url)?;
        let base_url = base_url.trim();

        self.report(PipelineStep::FetchSpec);
        let spec = self.fetch_spec(base_url).await;

        let (mut source, mut endpoints) = match &spec {
            Some(doc) => {
                let eps = spec_extractor::extract_endpoints(doc);
                info!("specification lists {} endpoints", eps.len());
                (DiscoverySource::Spec, eps)
            }
            None => {
                self.report(PipelineStep::ScanHtml);
                let candidates = self.scan_html(base_url).await;
                self.report(PipelineStep::Verify);
                let live = self.verify(base_url, candidates).await;
                info!("HTML fallback kept {} live endpoints", live.len());
                (DiscoverySource::HtmlFallback, live)
            }
        };

        if endpoints.is_empty() {
            self.report(PipelineStep::ProbeCommonPaths);
            endpoints = self.probe(base_url).await;
            source = DiscoverySource::CommonPaths;
        }

        if endpoints.is_empty() {
            warn!("could not find any endpoints on {base_url}");
            source = DiscoverySource::NotFound;
        }

        Ok(Analysis {
            base_url: base_url.to_string(),
            source,
            endpoints,
            spec,
        })
    }
}
