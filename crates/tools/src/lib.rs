//! Kibble Tools Library
//!
//! Provides Flow account configuration and Cadence path resolution for the
//! token scripts and transactions.

pub mod config;
pub mod env;
pub mod paths;

pub use config::{Config, ConfigError, EnvKey};
pub use env::{EnvSource, MapEnv, ProcessEnv};
pub use paths::{resolve_path, PathEntry, PathKind, PathTable};
