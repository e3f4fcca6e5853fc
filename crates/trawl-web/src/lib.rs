//! trawl-web - Web search client for trawl.
//!
//! Provides [`SerperClient`], a Serper.dev-backed implementation of the
//! web-search trait with rate limiting and mock fallback.

pub mod serper;

pub use serper::{mock_results, strip_html, summarize_results, SerperClient};
