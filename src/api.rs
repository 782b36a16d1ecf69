// API client module: a small blocking HTTP client that posts one gzipped
// file to the data lake upload endpoint and interprets the reply.

use std::fmt;
use std::path::Path;

use chrono::{Local, NaiveDateTime};
use reqwest::blocking::{multipart, Client};
use serde::Serialize;

use crate::codec::CompressedPayload;
use crate::error::{Result, UploadError};
use crate::naming;
use crate::source::SourceFile;

/// Endpoint used when neither `--endpoint` nor the environment names one.
pub const DEFAULT_ENDPOINT: &str = "https://datalakecadg.mprj.mp.br/api/upload/";

/// Environment variable that overrides [`DEFAULT_ENDPOINT`].
pub const ENDPOINT_ENV: &str = "DATALAKE_UPLOAD_URL";

/// Blocking client bound to a single upload endpoint.
#[derive(Clone)]
pub struct UploadClient {
    client: Client,
    endpoint: String,
}

/// The user-supplied authentication fields sent with every upload.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub method: String,
    pub secret: String,
}

impl Credentials {
    pub fn new(
        username: impl Into<String>,
        method: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Credentials {
            username: username.into(),
            method: method.into(),
            secret: secret.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("method", &self.method)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Everything one POST carries. The multipart file part is always named
/// with the canonical name, while the `filename` form field carries the
/// override when there is one. Both are computed from a single timestamp.
#[derive(Debug)]
pub struct UploadRequest {
    canonical_name: String,
    filename: String,
    payload: CompressedPayload,
    credentials: Credentials,
}

impl UploadRequest {
    pub fn prepare(
        source: &SourceFile,
        credentials: &Credentials,
        override_name: Option<&str>,
        now: &NaiveDateTime,
    ) -> Result<Self> {
        let payload = CompressedPayload::from_source(source)?;
        let canonical_name = naming::derive(source.path(), now);
        let filename = naming::resolve(override_name, &canonical_name);
        Ok(UploadRequest {
            canonical_name,
            filename,
            payload,
            credentials: credentials.clone(),
        })
    }

    pub fn canonical_name(&self) -> &str {
        &self.canonical_name
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn digest(&self) -> &str {
        self.payload.digest()
    }

    pub fn payload(&self) -> &CompressedPayload {
        &self.payload
    }

    /// Build the multipart body. Consumes the request so the compressed
    /// buffer moves into the form instead of being copied.
    pub fn into_form(self) -> multipart::Form {
        let digest = self.payload.digest().to_string();
        let file =
            multipart::Part::bytes(self.payload.into_bytes()).file_name(self.canonical_name);
        multipart::Form::new()
            .text("filename", self.filename)
            .text("nome", self.credentials.username)
            .text("md5", digest)
            .text("method", self.credentials.method)
            .text("SECRET", self.credentials.secret)
            .part("file", file)
    }
}

/// Terminal result of one upload attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum UploadOutcome {
    Success,
    Failure { status: u16, message: String },
}

impl UploadOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, UploadOutcome::Success)
    }

    fn from_response(status: u16, body: &[u8]) -> Self {
        if status == 200 {
            UploadOutcome::Success
        } else {
            let message = extract_message(&String::from_utf8_lossy(body));
            UploadOutcome::Failure { status, message }
        }
    }
}

impl fmt::Display for UploadOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadOutcome::Success => write!(f, "File uploaded successfully!"),
            UploadOutcome::Failure { status, message } => {
                write!(f, "Status: {} {}", status, message)
            }
        }
    }
}

/// Best-effort text from an error page: everything up to and including the
/// first `<...>` tag is dropped, along with any tags directly after it, then
/// the trailing run of tags is stripped. Nested or malformed markup gives an
/// unspecified string, never a panic.
pub fn extract_message(body: &str) -> String {
    let mut text = body.trim();

    if let Some(open) = text.find('<') {
        if let Some(close) = text[open..].find('>') {
            text = text[open + close + 1..].trim_start();
        }
    }
    while text.starts_with('<') {
        match text.find('>') {
            Some(end) => text = text[end + 1..].trim_start(),
            None => break,
        }
    }
    while text.ends_with('>') {
        match text.rfind('<') {
            Some(start) => text = text[..start].trim_end(),
            None => break,
        }
    }

    text.to_string()
}

impl UploadClient {
    /// Create a client posting to `endpoint`.
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let client = Client::builder().build().map_err(UploadError::Client)?;
        Ok(UploadClient {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// Create a client configured from the environment variable
    /// `DATALAKE_UPLOAD_URL`, or fall back to [`DEFAULT_ENDPOINT`].
    pub fn from_env() -> Result<Self> {
        Self::new(endpoint_or_default(std::env::var(ENDPOINT_ENV).ok()))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POST a prepared request. Only transport failures are errors; any
    /// status code from the server ends up in the returned outcome.
    pub fn send(&self, request: UploadRequest) -> Result<UploadOutcome> {
        log::info!(
            "uploading {} as {} ({} bytes gzipped, md5 {}) to {}",
            request.canonical_name(),
            request.filename(),
            request.payload().len(),
            request.digest(),
            self.endpoint
        );

        let res = self
            .client
            .post(&self.endpoint)
            .multipart(request.into_form())
            .send()
            .map_err(UploadError::Transport)?;

        let status = res.status().as_u16();
        let body = if status == 200 {
            Vec::new()
        } else {
            res.bytes().map_err(UploadError::Transport)?.to_vec()
        };

        let outcome = UploadOutcome::from_response(status, &body);
        match &outcome {
            UploadOutcome::Success => log::info!("server accepted the upload"),
            UploadOutcome::Failure { status, .. } => {
                log::warn!("server rejected the upload with status {}", status)
            }
        }
        Ok(outcome)
    }

    /// Compress, name and send `source` using the current local time.
    pub fn post(
        &self,
        source: &SourceFile,
        credentials: &Credentials,
        override_name: Option<&str>,
    ) -> Result<UploadOutcome> {
        let now = Local::now().naive_local();
        let request = UploadRequest::prepare(source, credentials, override_name, &now)?;
        self.send(request)
    }
}

/// The configured endpoint, or [`DEFAULT_ENDPOINT`] when unset or blank.
fn endpoint_or_default(configured: Option<String>) -> String {
    configured
        .filter(|endpoint| !endpoint.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_ENDPOINT.into())
}

/// The whole pipeline for one file. A file that cannot be read fails before
/// any request is built.
pub fn upload_file(
    client: &UploadClient,
    path: impl AsRef<Path>,
    credentials: &Credentials,
    override_name: Option<&str>,
) -> Result<UploadOutcome> {
    let source = SourceFile::open(path)?;
    client.post(&source, credentials, override_name)
}
