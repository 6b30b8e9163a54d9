//! # LlamaSearch
//!
//! A TUI client for an LLM-backed search service.
//!
//! ## Features
//!
//! - **Typed Answers**: Untyped backend payloads are validated once and turned into a summary plus classified points
//! - **Linkified Text**: URLs in answers are split out so they can be styled as links
//! - **Single Search Lifecycle**: One in-flight search at a time, with stale answers dropped after a reset

pub mod client;
pub mod config;
pub mod content;
pub mod controller;
pub mod linkify;
pub mod logging;
pub mod render;
pub mod ui;

pub use client::{HttpBackend, SearchBackend, SearchError};
pub use config::Config;
pub use content::{FormattedContent, RawApiResponse};
pub use controller::{DisplayResponse, SearchController, SearchState};
