use crate::error::AssemblyError;
use log::{debug, warn};
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Per-run scratch directory, removed when the guard goes out of scope.
///
/// Removal happens on every exit path, including early `?` returns and a
/// dropped future. A failed removal is logged and never replaces the result
/// of the run.
pub struct ScratchDir {
    dir: Option<TempDir>,
    path: PathBuf,
}

impl ScratchDir {
    pub fn new() -> io::Result<Self> {
        Self::from_builder(None)
    }

    /// Creates the scratch directory below `root` instead of the system temp dir.
    pub fn new_in(root: impl AsRef<Path>) -> io::Result<Self> {
        Self::from_builder(Some(root.as_ref()))
    }

    fn from_builder(root: Option<&Path>) -> io::Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("dialogcast-");
        let dir = match root {
            Some(root) => builder.tempdir_in(root)?,
            None => builder.tempdir()?,
        };
        let path = dir.path().to_path_buf();
        debug!("Created scratch directory {}", path.display());
        Ok(Self {
            dir: Some(dir),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }

    /// Removes the directory now rather than at drop.
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        let Some(dir) = self.dir.take() else {
            return;
        };
        if let Err(source) = dir.close() {
            let err = AssemblyError::TempResourceCleanupFailed {
                path: self.path.clone(),
                source,
            };
            warn!("{err}");
        }
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        self.release();
    }
}

/// Renders an ordered concat-demuxer manifest, one `file '<path>'` per line.
pub fn concat_list(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|path| {
            let escaped = path.to_string_lossy().replace('\'', "'\\''");
            format!("file '{escaped}'\n")
        })
        .collect()
}
