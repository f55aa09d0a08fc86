use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use relay_logging::{relay_debug, relay_warn};
use sha2::{Digest, Sha256};
use tempfile::{NamedTempFile, TempPath};
use thiserror::Error;

/// Random characters appended to every staged name.
const RANDOM_SUFFIX_LEN: usize = 12;

#[derive(Debug, Error)]
pub enum StagingError {
    #[error("work directory missing or not writable: {0}")]
    WorkDir(String),
    #[error("could not create staged file: {0}")]
    Io(#[from] io::Error),
}

/// Ensure the work directory exists; create if missing.
pub fn ensure_work_dir(dir: &Path) -> Result<(), StagingError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| StagingError::WorkDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(StagingError::WorkDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| StagingError::WorkDir(e.to_string()))?;
    }
    // Basic writability probe: try creating a temp file.
    NamedTempFile::new_in(dir).map_err(|e| StagingError::WorkDir(e.to_string()))?;
    Ok(())
}

/// Allocates run-scoped files under a dedicated working directory.
#[derive(Debug, Clone)]
pub struct StagingArea {
    dir: PathBuf,
}

impl StagingArea {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Creates `{hash(file_id)}-{random}{extension}` exclusively in the work
    /// directory. The random part keeps concurrent runs for the same file apart.
    pub fn acquire(&self, file_id: &str, extension: &str) -> Result<StagedFile, StagingError> {
        let prefix = format!("{}-", short_hash(file_id));
        let file = tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(extension)
            .rand_bytes(RANDOM_SUFFIX_LEN)
            .tempfile_in(&self.dir)?;
        let staged = StagedFile {
            path: file.into_temp_path(),
        };
        relay_debug!("Staged {:?}", staged.path());
        Ok(staged)
    }

    /// Deletes the staged file. A file that is already gone is fine; any other
    /// failure is logged and swallowed.
    pub fn release(&self, staged: StagedFile) {
        let path = staged.path().to_path_buf();
        match staged.path.close() {
            Ok(()) => relay_debug!("Released {:?}", path),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => relay_warn!("Failed to delete staged file {:?}: {}", path, err),
        }
    }
}

/// A local file owned by exactly one run. Dropping it also deletes the file, so
/// an abandoned run never leaves anything behind.
#[derive(Debug)]
pub struct StagedFile {
    path: TempPath,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

fn short_hash(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(8);
    for byte in digest.iter().take(4) {
        use std::fmt::Write;
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}
