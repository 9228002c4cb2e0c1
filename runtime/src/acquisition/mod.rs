//! Layered HTTP-based endpoint discovery.
//!
//! Each stage is a fallback for the one before it: structured specification,
//! documentation-page heuristics (plain HTTP, then a headless browser),
//! liveness verification, and finally common-path probing.

pub mod html_scanner;
pub mod http_client;
pub mod liveness;
pub mod prober;
pub mod spec_extractor;
pub mod spec_fetcher;
