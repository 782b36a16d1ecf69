// Library root
// -----------
// Uploads one local file to the data lake: read it, gzip it, checksum the
// gzip output, derive the canonical remote name and POST everything as a
// multipart form. The binary (`main.rs`) is a thin shell over `ui`.
//
// Module responsibilities:
// - `source`: loads the file into memory.
// - `codec`: gzip compression and the MD5 digest of the compressed bytes.
// - `naming`: canonical `<name>_<timestamp>.csv.gz` filenames.
// - `api`: the blocking upload client and outcome interpretation.
// - `ui`: command-line arguments and the printed status line.
pub mod api;
pub mod codec;
pub mod error;
pub mod naming;
pub mod source;
pub mod ui;

pub use api::{upload_file, Credentials, UploadClient, UploadOutcome, UploadRequest};
pub use error::{Result, UploadError};
pub use source::SourceFile;
