//! HTTP gateway in front of a YouTube to MP3 conversion API.
//!
//! Requests to `/dl` pass a per-client sliding window rate limiter, then go
//! upstream with a rotating API key and a bounded number of attempts.

pub mod audit_log;
pub mod compression;
pub mod config;
pub mod error;
pub mod handlers;
pub mod key_rotator;
pub mod metrics;
pub mod models;
pub mod rate_limit;
pub mod resolver;
pub mod state;
pub mod upstream;
