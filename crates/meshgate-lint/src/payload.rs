//! Payload size resolution for `uri`-backed buffers.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use base64::Engine;
use thiserror::Error;

/// Errors returned by a [`PayloadResolver`].
#[derive(Debug, Error)]
pub enum PayloadError {
    /// Nothing exists at the URI.
    #[error("file not found: {0}")]
    NotFound(String),

    /// The payload exists but could not be measured.
    #[error("failed to read {uri}: {source}")]
    Io {
        uri: String,
        #[source]
        source: std::io::Error,
    },

    /// A `data:` URI whose body could not be decoded.
    #[error("invalid data URI: {0}")]
    InvalidDataUri(String),
}

/// Measures external payloads referenced by a document.
///
/// Lookups may block. They are called from the rayon pool, one buffer per
/// call, so implementations must be thread-safe.
pub trait PayloadResolver: Send + Sync {
    /// Byte size of the payload at `uri`.
    fn payload_size(&self, uri: &str) -> Result<u64, PayloadError>;
}

/// Resolves URIs relative to a directory on disk.
///
/// `data:` URIs are measured by decoding them in memory.
#[derive(Debug, Clone)]
pub struct FsPayloadResolver {
    base_dir: PathBuf,
}

impl FsPayloadResolver {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

impl PayloadResolver for FsPayloadResolver {
    fn payload_size(&self, uri: &str) -> Result<u64, PayloadError> {
        if uri.starts_with("data:") {
            return data_uri_size(uri);
        }

        // URIs are percent-encoded; file names on disk are not.
        let decoded = urlencoding::decode(uri).map_err(|_| PayloadError::NotFound(uri.to_string()))?;
        let path = self.base_dir.join(decoded.as_ref());

        match std::fs::metadata(&path) {
            Ok(metadata) if metadata.is_file() => Ok(metadata.len()),
            Ok(_) => Err(PayloadError::NotFound(uri.to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(PayloadError::NotFound(uri.to_string()))
            }
            Err(source) => Err(PayloadError::Io {
                uri: uri.to_string(),
                source,
            }),
        }
    }
}

/// Decoded length of a `data:` URI body.
pub fn data_uri_size(uri: &str) -> Result<u64, PayloadError> {
    let invalid = || PayloadError::InvalidDataUri(truncate(uri));
    let (header, body) = uri
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(','))
        .ok_or_else(invalid)?;

    if header.ends_with(";base64") {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(body.trim())
            .map_err(|_| invalid())?;
        Ok(bytes.len() as u64)
    } else {
        let text = urlencoding::decode_binary(body.as_bytes());
        Ok(text.len() as u64)
    }
}

fn truncate(uri: &str) -> String {
    const MAX: usize = 48;
    match uri.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &uri[..cut]),
        None => uri.to_string(),
    }
}

/// In-memory resolver, for documents whose payloads are already loaded.
#[derive(Debug, Clone, Default)]
pub struct MemoryPayloadResolver {
    sizes: HashMap<String, u64>,
}

impl MemoryPayloadResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a payload size for `uri`.
    pub fn with_payload(mut self, uri: impl Into<String>, size: u64) -> Self {
        self.sizes.insert(uri.into(), size);
        self
    }
}

impl PayloadResolver for MemoryPayloadResolver {
    fn payload_size(&self, uri: &str) -> Result<u64, PayloadError> {
        if uri.starts_with("data:") {
            return data_uri_size(uri);
        }
        self.sizes
            .get(uri)
            .copied()
            .ok_or_else(|| PayloadError::NotFound(uri.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fs_resolver_measures_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("mesh.bin"), vec![0u8; 512]).unwrap();
        std::fs::write(dir.path().join("my mesh.bin"), vec![0u8; 8]).unwrap();

        let resolver = FsPayloadResolver::new(dir.path());
        assert_eq!(resolver.payload_size("mesh.bin").unwrap(), 512);
        assert_eq!(resolver.payload_size("my%20mesh.bin").unwrap(), 8);
    }

    #[test]
    fn test_fs_resolver_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = FsPayloadResolver::new(dir.path());
        let err = resolver.payload_size("missing.bin").unwrap_err();
        assert!(matches!(err, PayloadError::NotFound(ref uri) if uri == "missing.bin"));
    }

    #[test]
    fn test_directory_is_not_a_payload() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        let resolver = FsPayloadResolver::new(dir.path());
        assert!(matches!(
            resolver.payload_size("sub"),
            Err(PayloadError::NotFound(_))
        ));
    }

    #[test]
    fn test_base64_data_uri() {
        // "hello world" is 11 bytes
        let uri = "data:application/octet-stream;base64,aGVsbG8gd29ybGQ=";
        assert_eq!(data_uri_size(uri).unwrap(), 11);
    }

    #[test]
    fn test_plain_data_uri() {
        assert_eq!(data_uri_size("data:text/plain,a%20b").unwrap(), 3);
    }

    #[test]
    fn test_malformed_data_uri() {
        assert!(matches!(
            data_uri_size("data:application/octet-stream;base64"),
            Err(PayloadError::InvalidDataUri(_))
        ));
        assert!(data_uri_size("data:;base64,@@@").is_err());
    }

    #[test]
    fn test_memory_resolver() {
        let resolver = MemoryPayloadResolver::new().with_payload("a.bin", 64);
        assert_eq!(resolver.payload_size("a.bin").unwrap(), 64);
        assert!(resolver.payload_size("b.bin").is_err());
    }
}
