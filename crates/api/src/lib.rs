//! HTTP implementation of the medialift upload transport.
//!
//! Async `reqwest` client with Bearer token authentication, speaking the
//! upload service's `{code, data, msg}` JSON envelope and multipart upload
//! endpoints.

pub mod client;

pub use client::HttpTransport;
