//! HTTP API: server, routing, and request/response mapping.
//!
//! This layer extracts bearer tokens, calls the authorization gate, and maps
//! its rejections to status codes. It holds no authorization logic of its
//! own.

pub mod app;
pub mod errors;
pub mod middleware;
