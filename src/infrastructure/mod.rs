//! Filesystem and environment helpers.

pub mod paths;

pub use paths::{catalog_path, data_dir, expand_tilde};
