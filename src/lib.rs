//! Core library for the `pkiload` CLI.
//!
//! Drives concurrent request workers against a certificate authority for a
//! fixed duration, either issuing certificates back-to-back or querying OCSP
//! status at a target rate, and reduces the outcomes into success counts,
//! steady and peak rates, and latency percentiles. The `pkiload` binary is the
//! primary interface; library APIs may change with it.
pub mod app;
pub mod args;
pub mod config;
pub mod domain;
pub mod error;
pub mod http;
pub mod metrics;
pub mod payload;
