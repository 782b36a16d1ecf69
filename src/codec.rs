// Compression and checksum. The digest is always taken over the gzip
// output, since that is what the server receives and verifies.

use std::io::Write;

use flate2::write::GzEncoder;
use flate2::Compression;
use md5::{Digest, Md5};

use crate::error::{Result, UploadError};
use crate::source::SourceFile;

/// Gzip `bytes` in one shot with the default compression level.
pub fn compress(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(bytes.len() / 2), Compression::default());
    encoder.write_all(bytes).map_err(UploadError::Compress)?;
    encoder.finish().map_err(UploadError::Compress)
}

/// MD5 of `bytes` as 32 lowercase hex characters.
pub fn digest(bytes: &[u8]) -> String {
    hex::encode(Md5::digest(bytes))
}

/// Compressed file contents together with their digest.
#[derive(Debug, Clone)]
pub struct CompressedPayload {
    bytes: Vec<u8>,
    digest: String,
}

impl CompressedPayload {
    pub fn from_source(source: &SourceFile) -> Result<Self> {
        let bytes = compress(source.bytes())?;
        let digest = digest(&bytes);
        log::debug!(
            "compressed {} bytes to {} bytes, md5 {}",
            source.len(),
            bytes.len(),
            digest
        );
        Ok(CompressedPayload { bytes, digest })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn digest(&self) -> &str {
        &self.digest
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use rstest::rstest;
    use std::io::Read;

    fn gunzip(bytes: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        GzDecoder::new(bytes).read_to_end(&mut out).unwrap();
        out
    }

    #[rstest]
    #[case::empty(b"".to_vec())]
    #[case::csv(b"id;name\n1;ana\n2;bruno\n".to_vec())]
    #[case::binary((0..=255u8).cycle().take(10_000).collect())]
    fn compress_round_trips(#[case] input: Vec<u8>) {
        let compressed = compress(&input).unwrap();
        assert_eq!(gunzip(&compressed), input);
    }

    #[test]
    fn digest_is_stable_over_compressed_bytes() {
        let input = b"a;b;c\n1;2;3\n".repeat(100);
        let first = digest(&compress(&input).unwrap());
        let second = digest(&compress(&input).unwrap());
        assert_eq!(first, second);
    }

    #[rstest]
    #[case(b"", "d41d8cd98f00b204e9800998ecf8427e")]
    #[case(b"abc", "900150983cd24fb0d6963f7d28e17f72")]
    fn digest_known_vectors(#[case] input: &[u8], #[case] expected: &str) {
        assert_eq!(digest(input), expected);
    }

    #[test]
    fn empty_file_still_has_gzip_payload() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let source = SourceFile::open(file.path()).unwrap();
        assert!(source.is_empty());

        let payload = CompressedPayload::from_source(&source).unwrap();
        assert!(!payload.is_empty());
        assert!(gunzip(payload.bytes()).is_empty());
        assert_eq!(payload.digest(), digest(payload.bytes()));
    }

    #[test]
    fn payload_digest_covers_compressed_not_raw() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"x;y\n1;2\n").unwrap();
        let source = SourceFile::open(file.path()).unwrap();

        let payload = CompressedPayload::from_source(&source).unwrap();
        assert!(!payload.is_empty());
        assert_eq!(payload.digest(), digest(payload.bytes()));
        assert_ne!(payload.digest(), digest(source.bytes()));
        assert_eq!(payload.digest().len(), 32);
        assert!(payload
            .digest()
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }
}
