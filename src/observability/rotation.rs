//! Size-bounded trace file with numbered backups.
//!
//! When the active file grows past `max_bytes`, backups shift up by one
//! (`<file>.1` → `<file>.2`, ...), the active file becomes `<file>.1`, and the
//! oldest backup beyond `backups` is deleted. Writing then resumes on a fresh
//! file.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Rotation thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationPolicy {
    pub max_bytes: u64,
    pub backups: usize,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            max_bytes: 10 * 1024 * 1024,
            backups: 3,
        }
    }
}

/// Append-only line writer that rotates by size.
pub struct RotatingFile {
    path: PathBuf,
    policy: RotationPolicy,
    /// Opened lazily so construction never touches the filesystem.
    file: Option<File>,
}

impl RotatingFile {
    #[must_use]
    pub const fn new(path: PathBuf, policy: RotationPolicy) -> Self {
        Self {
            path,
            policy,
            file: None,
        }
    }

    /// Appends `line` plus a newline, rotating first if the file is full.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from rotating, opening or writing the file.
    pub fn write_line(&mut self, line: &str) -> io::Result<()> {
        if self.is_full() {
            self.file = None;
            self.rotate()?;
        }

        let file = match self.file.as_mut() {
            Some(file) => file,
            None => self.file.insert(
                OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&self.path)?,
            ),
        };

        writeln!(file, "{line}")?;
        file.flush()
    }

    fn is_full(&self) -> bool {
        fs::metadata(&self.path).is_ok_and(|meta| meta.len() > self.policy.max_bytes)
    }

    fn rotate(&self) -> io::Result<()> {
        if self.policy.backups == 0 {
            return remove_if_exists(&self.path);
        }

        remove_if_exists(&backup_path(&self.path, self.policy.backups))?;
        for index in (1..self.policy.backups).rev() {
            let from = backup_path(&self.path, index);
            if from.exists() {
                fs::rename(&from, backup_path(&self.path, index + 1))?;
            }
        }

        if self.path.exists() {
            fs::rename(&self.path, backup_path(&self.path, 1))?;
        }
        Ok(())
    }
}

/// `<path>.<index>`
fn backup_path(path: &Path, index: usize) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(format!(".{index}"));
    PathBuf::from(name)
}

fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

impl std::fmt::Debug for RotatingFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RotatingFile")
            .field("path", &self.path)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
