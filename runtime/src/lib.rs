// Copyright 2026 API Inspector Contributors
// SPDX-License-Identifier: Apache-2.0

//! API Inspector library: discover the HTTP surface of a web API.
//!
//! Discovery runs a fallback chain (OpenAPI spec, documentation-page scan with
//! liveness check, common-path probe) and returns the first usable endpoint
//! list. This library crate exposes the core modules for integration testing.

#![allow(clippy::new_without_default)]

pub mod acquisition;
pub mod cache;
pub mod cli;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod live;
pub mod pipeline;
pub mod renderer;
pub mod report;
pub mod summarizer;
