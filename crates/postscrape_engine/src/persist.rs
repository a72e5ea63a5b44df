use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output path {} exists and is not a directory", .0.display())]
    NotADirectory(PathBuf),
    #[error("cannot create output directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Create the output directory on first use; reject a plain file in its place.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.is_dir() {
        return Ok(());
    }
    if dir.exists() {
        return Err(PersistError::NotADirectory(dir.to_path_buf()));
    }
    fs::create_dir_all(dir).map_err(|source| PersistError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}

/// Result files appear under their final name only once fully written: the
/// bytes go to a sibling temp file which is then renamed over the target.
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn write(&self, filename: &str, content: &[u8]) -> Result<PathBuf, PersistError> {
        ensure_output_dir(&self.dir)?;
        let target = self.dir.join(filename);
        let failed = |source: io::Error| PersistError::Write {
            path: target.clone(),
            source,
        };

        let mut staged = NamedTempFile::new_in(&self.dir).map_err(failed)?;
        staged.write_all(content).map_err(failed)?;
        staged.as_file().sync_all().map_err(failed)?;
        staged
            .persist(&target)
            .map_err(|err| failed(err.error))?;
        Ok(target)
    }
}
