//! Turnstile - Per-Client Fixed-Window Rate Limiting Service
//!
//! This crate implements an HTTP service that gates incoming requests per
//! caller identity using fixed-window request counters. Client limits and
//! windows can be (re)configured at runtime through the HTTP API; unseen
//! clients are seeded with process-wide defaults on their first request.

pub mod config;
pub mod error;
pub mod http;
pub mod limiter;
