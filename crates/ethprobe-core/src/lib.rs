//! ethprobe-core — shared types and configuration for ethprobe.
//!
//! Holds everything the health checker and the CLI agree on: the
//! validated [`RpcEndpoint`], the decoded [`ChainStatus`], the
//! well-known [`Network`] table, the [`RetryPolicy`], and the
//! `ethprobe.toml` parser that produces a [`ProbeTarget`].

pub mod config;
pub mod endpoint;
pub mod error;
pub mod types;

pub use config::{ProbeConfig, ProbeTarget, parse_duration};
pub use endpoint::RpcEndpoint;
pub use error::{ConfigError, ConfigResult};
pub use types::*;
