//! Environment sources the configuration is read from
//!
//! Dotenv files are parsed by `dotenvy`, which expands `$VAR` and `${VAR}` in
//! unquoted and double-quoted values, from earlier lines of the file or from
//! the process environment. Single-quoted values are taken literally, so
//! secrets containing `$` should be written as `KEY='...'`.

use std::collections::HashMap;
use std::env::VarError;
use std::path::Path;

use tracing::{debug, warn};

use crate::config::ConfigError;

/// Somewhere named string variables can be looked up
pub trait EnvSource {
    /// Value of `key`, or `None` when it is not set
    fn var(&self, key: &str) -> Option<String>;
}

impl<T: EnvSource + ?Sized> EnvSource for &T {
    fn var(&self, key: &str) -> Option<String> {
        (**self).var(key)
    }
}

/// The process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl ProcessEnv {
    /// Read the process environment as-is
    pub fn new() -> Self {
        ProcessEnv
    }

    /// Load `.env` from the working directory first, if there is one.
    ///
    /// Variables already set in the process are never overridden. A missing
    /// file is not an error. Values in the file are expanded as described in
    /// the module docs.
    pub fn with_dotenv() -> Self {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "loaded .env file"),
            Err(e) if e.not_found() => debug!("no .env file found"),
            Err(e) => warn!(error = %e, "ignoring unreadable .env file"),
        }
        ProcessEnv
    }

    /// Load an explicit env file into the process environment.
    ///
    /// Library-only: the `kibble` binary reads `--env-file` through
    /// [`MapEnv::from_env_file`] instead.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Dotenv` if the file cannot be read or parsed.
    pub fn with_env_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        dotenvy::from_path(path)?;
        debug!(path = %path.display(), "loaded env file");
        Ok(ProcessEnv)
    }
}

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        match std::env::var(key) {
            Ok(value) => Some(value),
            Err(VarError::NotPresent) => None,
            Err(VarError::NotUnicode(_)) => {
                warn!(key, "environment variable is not valid UTF-8, treating as unset");
                None
            }
        }
    }
}

/// In-memory variables, independent of the process environment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapEnv {
    vars: HashMap<String, String>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`, replacing any previous value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    /// Parse a dotenv file without writing to the process environment.
    ///
    /// Later definitions of the same key win. `$VAR` references in unquoted or
    /// double-quoted values are still expanded, and may read the process
    /// environment; single-quoted values are kept verbatim.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Dotenv` if the file cannot be read or a line
    /// fails to parse.
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let mut vars = HashMap::new();
        for item in dotenvy::from_path_iter(path.as_ref())? {
            let (key, value) = item?;
            vars.insert(key, value);
        }
        Ok(MapEnv { vars })
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl EnvSource for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

impl<K, V> FromIterator<(K, V)> for MapEnv
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        MapEnv {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
