//! Data directory resolution and tilde expansion.
//!
//! The data directory holds the trace file and, unless configured otherwise,
//! the catalog file. Resolution order:
//!
//! 1. `data_dir` from the config, with `~` expanded
//! 2. `$HOME/.local/share/pokedex-sync`
//! 3. `.pokedex-sync` relative to the working directory

use crate::Config;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "pokedex-sync";

#[must_use]
pub fn data_dir(config: &Config) -> PathBuf {
    if let Some(dir) = &config.data_dir {
        return expand_tilde(dir);
    }
    resolve_default(std::env::var_os("HOME").map(PathBuf::from))
}

fn resolve_default(home: Option<PathBuf>) -> PathBuf {
    home.filter(|h| !h.as_os_str().is_empty()).map_or_else(
        || PathBuf::from(format!(".{APP_DIR}")),
        |h| h.join(".local").join("share").join(APP_DIR),
    )
}

/// Default catalog file: `<data_dir>/catalog.json`.
#[must_use]
pub fn catalog_path(config: &Config) -> PathBuf {
    config
        .catalog_path
        .as_deref()
        .map_or_else(|| data_dir(config).join("catalog.json"), expand_tilde)
}

/// Expands a leading `~` to `$HOME`.
///
/// Paths without a leading `~`, or any path when `HOME` is unset, come back
/// unchanged.
#[must_use]
pub fn expand_tilde(path: &Path) -> PathBuf {
    expand_with(path, std::env::var_os("HOME").map(PathBuf::from).as_deref())
}

fn expand_with(path: &Path, home: Option<&Path>) -> PathBuf {
    let Some(home) = home else {
        return path.to_path_buf();
    };
    match path.strip_prefix("~") {
        Ok(rest) if rest.as_os_str().is_empty() => home.to_path_buf(),
        Ok(rest) => home.join(rest),
        Err(_) => path.to_path_buf(),
    }
}
