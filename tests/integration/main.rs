//! Integration tests for the crawl engine
//!
//! `crawl_tests` drives whole crawls over in-memory directories;
//! `http_tests` runs the HTTP backend against a wiremock directory.

mod common;
mod crawl_tests;
mod http_tests;
