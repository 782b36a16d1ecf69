// Source file loading. The whole file is buffered in memory once; large
// files are not streamed.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, UploadError};

/// A local file loaded into memory, ready to be compressed and sent.
#[derive(Debug, Clone)]
pub struct SourceFile {
    path: PathBuf,
    bytes: Vec<u8>,
}

impl SourceFile {
    /// Read `path` fully. Missing or unreadable files fail here, so nothing
    /// downstream ever touches the network for them.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let bytes = fs::read(&path).map_err(|source| UploadError::Read {
            path: path.clone(),
            source,
        })?;
        log::debug!("loaded {} ({} bytes)", path.display(), bytes.len());
        Ok(SourceFile { path, bytes })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Final path segment, or an empty string when there is none.
    pub fn basename(&self) -> String {
        basename(&self.path)
    }
}

pub(crate) fn basename(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
