//! View and paging mode types for the session.
//!
//! This module defines the small state enums the rest of the application
//! layer pattern-matches on: how the list is laid out, and where a page key
//! sits in its fetch lifecycle.
//!
//! # State Machine
//!
//! Each page key moves through [`ScrollPhase`]:
//!
//! ```text
//! Initial ──reset──▶ LoadingFirstPage ──ok──▶ Ready ──sentinel──▶ LoadingMore
//!                          │                    ▲                     │
//!                          │ err                └────────ok───────────┘
//!                          ▼                                          │ err
//!                        Error ◀──────────────────────────────────────┘
//! ```
//!
//! Any filter change sends the newly active key back to `LoadingFirstPage`.
//! `Error` is left only through that path.

use crate::domain::PokedexError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Layout the rendering collaborator uses for the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// One item per row.
    List,

    /// Items tiled in columns. Session default.
    #[default]
    Grid,
}

impl FromStr for ViewMode {
    type Err = PokedexError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "list" => Ok(Self::List),
            "grid" => Ok(Self::Grid),
            other => Err(PokedexError::InvalidView(other.to_string())),
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List => f.write_str("list"),
            Self::Grid => f.write_str("grid"),
        }
    }
}

/// Fetch lifecycle of a single page key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollPhase {
    /// No fetch has been issued for this key yet.
    #[default]
    Initial,

    /// A reset (offset 0) fetch is outstanding.
    LoadingFirstPage,

    /// The entry is settled and may be extended.
    Ready,

    /// A fetch-more is outstanding.
    LoadingMore,

    /// The last fetch failed. Terminal until the next filter-triggered reset.
    Error,
}

impl ScrollPhase {
    /// Whether a fetch for this key is outstanding.
    #[must_use]
    pub const fn is_loading(self) -> bool {
        matches!(self, Self::LoadingFirstPage | Self::LoadingMore)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_mode_parses_known_values() {
        assert_eq!("list".parse::<ViewMode>().unwrap(), ViewMode::List);
        assert_eq!("grid".parse::<ViewMode>().unwrap(), ViewMode::Grid);
        assert_eq!(ViewMode::default(), ViewMode::Grid);
    }

    #[test]
    fn view_mode_rejects_unknown_values() {
        let err = "table".parse::<ViewMode>().unwrap_err();
        assert!(matches!(err, PokedexError::InvalidView(ref v) if v == "table"));
        assert!("Grid".parse::<ViewMode>().is_err());
    }

    #[test]
    fn loading_phases() {
        assert!(ScrollPhase::LoadingFirstPage.is_loading());
        assert!(ScrollPhase::LoadingMore.is_loading());
        assert!(!ScrollPhase::Ready.is_loading());
        assert!(!ScrollPhase::Error.is_loading());
    }
}
