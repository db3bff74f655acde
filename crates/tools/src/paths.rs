//! Cadence script and transaction path table
//!
//! Every path is computed from fixed filename constants, so the table is the
//! same on every construction and never depends on the environment.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

use crate::config::ConfigError;

/// Base directory for read-only Cadence scripts
pub const SCRIPTS_DIR: &str = "../cadence/scripts";

/// Base directory for Cadence transactions
pub const TRANSACTIONS_DIR: &str = "../cadence/transactions";

/// Kind of Cadence definition a path points to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PathKind {
    /// Read-only query executed against network state
    Script,
    /// State-mutating operation submitted to the network
    #[default]
    Transaction,
}

impl PathKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PathKind::Script => "script",
            PathKind::Transaction => "transaction",
        }
    }

    /// Directory the definitions of this kind live in
    pub fn base_dir(&self) -> &'static str {
        match self {
            PathKind::Script => SCRIPTS_DIR,
            PathKind::Transaction => TRANSACTIONS_DIR,
        }
    }
}

impl fmt::Display for PathKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for PathKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "script" => Ok(PathKind::Script),
            "transaction" => Ok(PathKind::Transaction),
            other => Err(ConfigError::InvalidPathKind(other.to_string())),
        }
    }
}

/// A resolved `<base-dir>/<filename>` path string
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PathEntry(String);

impl PathEntry {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Join this entry onto `root`, e.g. the directory the table is relative to
    pub fn resolve_against(&self, root: &Path) -> PathBuf {
        root.join(&self.0)
    }
}

impl fmt::Display for PathEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PathEntry {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<&str> for PathEntry {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Build the path of `file_name` under the directory for `kind`.
///
/// A missing kind resolves to [`PathKind::Transaction`].
pub fn resolve_path(file_name: &str, kind: Option<PathKind>) -> PathEntry {
    let kind = kind.unwrap_or_default();
    PathEntry(format!("{}/{}", kind.base_dir(), file_name))
}

/// Script group of the path table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptPaths {
    #[serde(rename = "getFLOW")]
    pub get_flow: PathEntry,
    #[serde(rename = "getKIBBLE")]
    pub get_kibble: PathEntry,
    #[serde(rename = "getFUSD")]
    pub get_fusd: PathEntry,
    #[serde(rename = "getTimestamp")]
    pub get_timestamp: PathEntry,
}

/// Transaction group of the path table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionPaths {
    #[serde(rename = "initTokens")]
    pub init_tokens: PathEntry,
    #[serde(rename = "mintFLOW")]
    pub mint_flow: PathEntry,
    #[serde(rename = "mintFUSD")]
    pub mint_fusd: PathEntry,
    #[serde(rename = "mintKIBBLE")]
    pub mint_kibble: PathEntry,
    #[serde(rename = "transferFLOW")]
    pub transfer_flow: PathEntry,
    #[serde(rename = "transferFUSD")]
    pub transfer_fusd: PathEntry,
    #[serde(rename = "transferKibble")]
    pub transfer_kibble: PathEntry,
}

/// Fixed table of every Cadence definition the tooling refers to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathTable {
    pub scripts: ScriptPaths,
    pub transactions: TransactionPaths,
}

impl PathTable {
    pub fn new() -> Self {
        let script = |name| resolve_path(name, Some(PathKind::Script));
        let transaction = |name| resolve_path(name, None);

        PathTable {
            scripts: ScriptPaths {
                get_flow: script("get_flow_balance.cdc"),
                get_kibble: script("get_kibble_balance.cdc"),
                get_fusd: script("get_fusd_balance.cdc"),
                get_timestamp: script("get_block_timestamp.cdc"),
            },
            transactions: TransactionPaths {
                init_tokens: transaction("init_tokens.cdc"),
                mint_flow: transaction("mint_flow_token.cdc"),
                mint_fusd: transaction("mint_fusd.cdc"),
                mint_kibble: transaction("mint_kibble.cdc"),
                transfer_flow: transaction("transfer_flow.cdc"),
                transfer_fusd: transaction("transfer_fusd.cdc"),
                transfer_kibble: transaction("transfer_kibble.cdc"),
            },
        }
    }

    /// Script entries in declaration order, keyed by logical name
    pub fn scripts(&self) -> [(&'static str, &PathEntry); 4] {
        let s = &self.scripts;
        [
            ("getFLOW", &s.get_flow),
            ("getKIBBLE", &s.get_kibble),
            ("getFUSD", &s.get_fusd),
            ("getTimestamp", &s.get_timestamp),
        ]
    }

    /// Transaction entries in declaration order, keyed by logical name
    pub fn transactions(&self) -> [(&'static str, &PathEntry); 7] {
        let t = &self.transactions;
        [
            ("initTokens", &t.init_tokens),
            ("mintFLOW", &t.mint_flow),
            ("mintFUSD", &t.mint_fusd),
            ("mintKIBBLE", &t.mint_kibble),
            ("transferFLOW", &t.transfer_flow),
            ("transferFUSD", &t.transfer_fusd),
            ("transferKibble", &t.transfer_kibble),
        ]
    }

    /// All entries as `(kind, logical name, entry)`, scripts first
    pub fn entries(&self) -> impl Iterator<Item = (PathKind, &'static str, &PathEntry)> + '_ {
        let scripts = self
            .scripts()
            .into_iter()
            .map(|(name, entry)| (PathKind::Script, name, entry));
        let transactions = self
            .transactions()
            .into_iter()
            .map(|(name, entry)| (PathKind::Transaction, name, entry));
        scripts.chain(transactions)
    }
}

impl Default for PathTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Entries of `table` with no file at their path under `root`.
///
/// # Errors
///
/// Returns `ConfigError::Io` if existence cannot be determined, e.g. on a
/// permission error.
pub async fn missing_files<'a>(
    table: &'a PathTable,
    root: &Path,
) -> Result<Vec<(&'static str, &'a PathEntry)>, ConfigError> {
    let mut missing = Vec::new();
    for (_, name, entry) in table.entries() {
        let path = entry.resolve_against(root);
        if !tokio::fs::try_exists(&path).await? {
            debug!(name, path = %path.display(), "cadence file not found");
            missing.push((name, entry));
        }
    }
    Ok(missing)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_script_path() {
        assert_eq!(
            resolve_path("get_flow_balance.cdc", Some(PathKind::Script)),
            "../cadence/scripts/get_flow_balance.cdc"
        );
    }

    #[test]
    fn test_resolve_defaults_to_transaction() {
        assert_eq!(
            resolve_path("init_tokens.cdc", None),
            "../cadence/transactions/init_tokens.cdc"
        );
        assert_eq!(
            resolve_path("init_tokens.cdc", Some(PathKind::Transaction)),
            resolve_path("init_tokens.cdc", None)
        );
    }

    #[test]
    fn test_path_kind_from_str() {
        assert_eq!("script".parse::<PathKind>().unwrap(), PathKind::Script);
        assert_eq!("SCRIPT".parse::<PathKind>().unwrap(), PathKind::Script);
        assert_eq!(
            "transaction".parse::<PathKind>().unwrap(),
            PathKind::Transaction
        );
    }

    #[test]
    fn test_path_kind_display_honours_width() {
        assert_eq!(format!("[{:<12}]", PathKind::Script), "[script      ]");
        assert_eq!(format!("[{:>12}]", PathKind::Transaction), "[ transaction]");
        assert_eq!(PathKind::Script.to_string(), "script");
    }

    #[test]
    fn test_path_kind_rejects_typos() {
        let err = "scirpt".parse::<PathKind>().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPathKind(ref s) if s == "scirpt"));
    }

    #[test]
    fn test_table_is_deterministic() {
        assert_eq!(PathTable::new(), PathTable::new());
        assert_eq!(PathTable::new(), PathTable::default());
    }

    #[test]
    fn test_table_shape() {
        let table = PathTable::new();

        let scripts: Vec<_> = table.scripts().iter().map(|(name, _)| *name).collect();
        assert_eq!(scripts, ["getFLOW", "getKIBBLE", "getFUSD", "getTimestamp"]);

        let transactions: Vec<_> = table.transactions().iter().map(|(name, _)| *name).collect();
        assert_eq!(
            transactions,
            [
                "initTokens",
                "mintFLOW",
                "mintFUSD",
                "mintKIBBLE",
                "transferFLOW",
                "transferFUSD",
                "transferKibble",
            ]
        );

        assert_eq!(table.entries().count(), 11);
    }

    #[test]
    fn test_entries_live_under_their_base_dir() {
        for (kind, name, entry) in PathTable::new().entries() {
            let prefix = format!("{}/", kind.base_dir());
            assert!(
                entry.as_str().starts_with(&prefix),
                "{name} -> {entry} is not under {prefix}"
            );
            assert!(entry.as_str().ends_with(".cdc"));
        }
    }

    #[test]
    fn test_known_filenames() {
        let table = PathTable::new();
        assert_eq!(
            table.scripts.get_timestamp,
            "../cadence/scripts/get_block_timestamp.cdc"
        );
        assert_eq!(
            table.transactions.mint_flow,
            "../cadence/transactions/mint_flow_token.cdc"
        );
        assert_eq!(
            table.transactions.transfer_kibble,
            "../cadence/transactions/transfer_kibble.cdc"
        );
    }

    #[test]
    fn test_serialized_names_are_literal() {
        let json = serde_json::to_value(PathTable::new()).unwrap();
        assert_eq!(
            json["scripts"]["getFLOW"],
            "../cadence/scripts/get_flow_balance.cdc"
        );
        assert_eq!(
            json["transactions"]["transferKibble"],
            "../cadence/transactions/transfer_kibble.cdc"
        );
        assert_eq!(json["scripts"].as_object().unwrap().len(), 4);
        assert_eq!(json["transactions"].as_object().unwrap().len(), 7);
    }

    #[test]
    fn test_resolve_against_root() {
        let entry = resolve_path("mint_fusd.cdc", None);
        assert_eq!(
            entry.resolve_against(Path::new("/srv/app/api")),
            PathBuf::from("/srv/app/api/../cadence/transactions/mint_fusd.cdc")
        );
    }

    #[tokio::test]
    async fn test_missing_files_reports_absent_entries() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("api");
        let table = PathTable::new();
        std::fs::create_dir_all(&root).unwrap();

        for (_, _, entry) in table.entries() {
            let path = entry.resolve_against(&root);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            if entry != &table.transactions.mint_kibble {
                std::fs::write(&path, "// cadence").unwrap();
            }
        }

        let missing = missing_files(&table, &root).await.unwrap();
        assert_eq!(missing, vec![("mintKIBBLE", &table.transactions.mint_kibble)]);
    }

    #[tokio::test]
    async fn test_missing_files_empty_root() {
        let dir = tempfile::tempdir().unwrap();
        let table = PathTable::new();
        let missing = missing_files(&table, &dir.path().join("api")).await.unwrap();
        assert_eq!(missing.len(), 11);
    }
}
