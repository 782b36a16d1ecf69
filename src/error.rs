// Error type shared by the upload pipeline. Only the fatal classes live
// here: a non-200 reply from the server is a normal `UploadOutcome`, not
// an error.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, UploadError>;

#[derive(Error, Debug)]
pub enum UploadError {
    /// The source file could not be read. Raised before any network call.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("gzip compression failed: {0}")]
    Compress(#[source] std::io::Error),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Connection refused, DNS failure, timeout and the like.
    #[error("upload request failed: {0}")]
    Transport(#[source] reqwest::Error),
}
