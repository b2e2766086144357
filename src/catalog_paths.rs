//! Purpose: Catalog file path resolution shared by every command.
//! Exports: `resolve_catalog_path`, `CATALOG_FILE_ENV`, `DEFAULT_CATALOG_FILE`.
//! Role: Keep `--file`, environment, and default precedence in one place.
//! Invariants: `--file` beats `BOOKSHELF_FILE`, which beats `./library.json`.
//! Invariants: An empty environment value counts as unset.

use std::ffi::OsString;
use std::path::PathBuf;

pub(crate) const CATALOG_FILE_ENV: &str = "BOOKSHELF_FILE";
pub(crate) const DEFAULT_CATALOG_FILE: &str = "library.json";

pub(crate) fn resolve_catalog_path(flag: Option<PathBuf>) -> PathBuf {
    resolve_with_env(flag, std::env::var_os(CATALOG_FILE_ENV))
}

fn resolve_with_env(flag: Option<PathBuf>, env_value: Option<OsString>) -> PathBuf {
    flag.or_else(|| {
        env_value
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
    })
    .unwrap_or_else(|| PathBuf::from(DEFAULT_CATALOG_FILE))
}
