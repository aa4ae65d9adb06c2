//! File I/O for whole plain-text documents.
//!
//! Documents are read in full as UTF-8 and written back verbatim under
//! their input base name.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during I/O operations.
#[derive(Error, Debug)]
pub enum IoError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not valid UTF-8 (at byte {valid_up_to})")]
    Decode { path: PathBuf, valid_up_to: usize },

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} has no file name")]
    NoFileName { path: PathBuf },

    #[error("output name {name} is already taken by {first}")]
    NameCollision { name: String, first: PathBuf },
}

/// Result type for I/O operations.
pub type Result<T> = std::result::Result<T, IoError>;

/// A per-file failure recorded while the run continues.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FileFailure {
    /// File the failure refers to.
    pub path: PathBuf,
    /// Human-readable reason.
    pub reason: String,
}

impl FileFailure {
    pub(crate) fn new(path: impl Into<PathBuf>, err: &IoError) -> Self {
        Self {
            path: path.into(),
            reason: err.to_string(),
        }
    }
}

/// Read a whole document as UTF-8 text.
pub fn read_document<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| IoError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    decode(path, bytes)
}

/// Decode raw bytes read from `path`.
pub(crate) fn decode(path: &Path, bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes).map_err(|e| IoError::Decode {
        path: path.to_path_buf(),
        valid_up_to: e.utf8_error().valid_up_to(),
    })
}

/// Create the output directory (and parents) if it does not exist.
pub fn ensure_output_dir<P: AsRef<Path>>(dir: P) -> Result<()> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).map_err(|source| IoError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}

/// Output path for `input` inside `output_dir`, keeping the base name.
pub fn output_path_for<P: AsRef<Path>, Q: AsRef<Path>>(input: P, output_dir: Q) -> Result<PathBuf> {
    let input = input.as_ref();
    let name = input.file_name().ok_or_else(|| IoError::NoFileName {
        path: input.to_path_buf(),
    })?;
    Ok(output_dir.as_ref().join(name))
}

/// Write a document verbatim.
pub fn write_document<P: AsRef<Path>>(path: P, contents: &[u8]) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, contents).map_err(|source| IoError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Hands out output paths, refusing a base name already used in this run.
#[derive(Debug)]
pub(crate) struct OutputNames {
    dir: PathBuf,
    taken: std::collections::HashMap<std::ffi::OsString, PathBuf>,
}

impl OutputNames {
    pub(crate) fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
            taken: std::collections::HashMap::new(),
        }
    }

    pub(crate) fn claim(&mut self, input: &Path) -> Result<PathBuf> {
        let out = output_path_for(input, &self.dir)?;
        let name = out.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        if let Some(first) = self.taken.get(&name) {
            return Err(IoError::NameCollision {
                name: name.to_string_lossy().into_owned(),
                first: first.clone(),
            });
        }
        self.taken.insert(name, input.to_path_buf());
        Ok(out)
    }
}
