//! Filesystem loader for `.gltf` and `.glb` documents, and write-back of
//! fixed documents.

use std::path::{Path, PathBuf};

use meshgate_model::{Document, DocumentError};
use thiserror::Error;
use tracing::debug;

use crate::payload::FsPayloadResolver;

const GLB_MAGIC: &[u8; 4] = b"glTF";
const GLB_VERSION: u32 = 2;
const HEADER_SIZE: usize = 12;
const CHUNK_HEADER_SIZE: usize = 8;
const JSON_CHUNK_TYPE: u32 = 0x4E4F534A; // "JSON" in little-endian
const BIN_CHUNK_TYPE: u32 = 0x004E4942; // "BIN\0" in little-endian

/// Errors that abort a run before any pass.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Document {
        path: PathBuf,
        #[source]
        source: DocumentError,
    },

    #[error("invalid GLB container {path}: {reason}")]
    Glb { path: PathBuf, reason: String },

    #[error("unsupported file extension: {0} (expected .gltf or .glb)")]
    UnsupportedExtension(PathBuf),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// How the document was stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Container {
    /// Plain JSON `.gltf`.
    Json,
    /// Binary `.glb`; the BIN chunk is kept verbatim for write-back.
    Glb { bin_chunk: Option<Vec<u8>> },
}

/// Where a document came from, and how to put it back.
#[derive(Debug, Clone)]
pub struct AssetSource {
    pub path: PathBuf,
    pub container: Container,
}

/// A parsed document together with its source.
#[derive(Debug, Clone)]
pub struct LoadedAsset {
    pub source: AssetSource,
    pub document: Document,
}

/// True for paths the loader accepts.
pub fn is_supported(path: &Path) -> bool {
    matches!(extension(path).as_deref(), Some("gltf" | "glb"))
}

fn extension(path: &Path) -> Option<String> {
    Some(path.extension()?.to_str()?.to_lowercase())
}

impl LoadedAsset {
    /// Reads and parses a `.gltf` or `.glb` file.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        match extension(path).as_deref() {
            Some("gltf") => Self::from_gltf_bytes(path, &bytes),
            Some("glb") => Self::from_glb_bytes(path, &bytes),
            _ => Err(LoadError::UnsupportedExtension(path.to_path_buf())),
        }
    }

    pub fn from_gltf_bytes(path: &Path, bytes: &[u8]) -> Result<Self, LoadError> {
        let document = parse_document(path, bytes)?;
        Ok(Self {
            source: AssetSource {
                path: path.to_path_buf(),
                container: Container::Json,
            },
            document,
        })
    }

    pub fn from_glb_bytes(path: &Path, bytes: &[u8]) -> Result<Self, LoadError> {
        let chunks = split_glb(bytes).map_err(|reason| LoadError::Glb {
            path: path.to_path_buf(),
            reason,
        })?;
        debug!(
            path = %path.display(),
            json_bytes = chunks.json.len(),
            bin_bytes = chunks.bin.map_or(0, <[u8]>::len),
            "parsed GLB container"
        );
        let document = parse_document(path, chunks.json)?;
        Ok(Self {
            source: AssetSource {
                path: path.to_path_buf(),
                container: Container::Glb {
                    bin_chunk: chunks.bin.map(<[u8]>::to_vec),
                },
            },
            document,
        })
    }

    pub fn into_parts(self) -> (AssetSource, Document) {
        (self.source, self.document)
    }
}

fn parse_document(path: &Path, bytes: &[u8]) -> Result<Document, LoadError> {
    Document::from_slice(bytes).map_err(|source| LoadError::Document {
        path: path.to_path_buf(),
        source,
    })
}

impl AssetSource {
    /// Resolver for buffer URIs, relative to the document's directory.
    pub fn resolver(&self) -> FsPayloadResolver {
        let base = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        FsPayloadResolver::new(base)
    }

    /// Serializes `document` in this source's container format.
    pub fn encode(&self, document: &Document) -> Result<Vec<u8>, DocumentError> {
        match &self.container {
            Container::Json => Ok(document.to_json_pretty()?.into_bytes()),
            Container::Glb { bin_chunk } => {
                let json = document.to_json_vec()?;
                Ok(build_glb(&json, bin_chunk.as_deref()))
            }
        }
    }

    /// Writes `document` back over the source file.
    pub fn save(&self, document: &Document) -> Result<(), LoadError> {
        let bytes = self.encode(document).map_err(|source| LoadError::Document {
            path: self.path.clone(),
            source,
        })?;
        std::fs::write(&self.path, bytes).map_err(|source| LoadError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

struct GlbChunks<'a> {
    json: &'a [u8],
    bin: Option<&'a [u8]>,
}

fn read_u32(data: &[u8], offset: usize) -> Option<u32> {
    let bytes = data.get(offset..offset + 4)?;
    Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

fn split_glb(data: &[u8]) -> Result<GlbChunks<'_>, String> {
    if data.len() < HEADER_SIZE {
        return Err(format!(
            "file too short: {} bytes (minimum {} required)",
            data.len(),
            HEADER_SIZE
        ));
    }
    if &data[0..4] != GLB_MAGIC {
        return Err(format!("invalid magic: expected 'glTF', got {:?}", &data[0..4]));
    }
    let version = read_u32(data, 4).unwrap_or_default();
    if version != GLB_VERSION {
        return Err(format!("unsupported version: {} (expected 2)", version));
    }
    let length = read_u32(data, 8).unwrap_or_default() as usize;
    if length > data.len() {
        return Err(format!(
            "declared length {} exceeds actual file size {}",
            length,
            data.len()
        ));
    }
    let data = &data[..length];

    let mut offset = HEADER_SIZE;
    let mut json = None;
    let mut bin = None;
    let mut index = 0;
    while offset + CHUNK_HEADER_SIZE <= data.len() {
        let (Some(chunk_length), Some(chunk_type)) = (read_u32(data, offset), read_u32(data, offset + 4)) else {
            break;
        };
        let start = offset + CHUNK_HEADER_SIZE;
        let end = start + chunk_length as usize;
        let Some(body) = data.get(start..end) else {
            return Err(format!(
                "chunk {} at offset {} extends past end of file",
                index, offset
            ));
        };
        match (index, chunk_type) {
            (0, JSON_CHUNK_TYPE) => json = Some(body),
            (0, other) => return Err(format!("first chunk must be JSON, got type 0x{:08X}", other)),
            (1, BIN_CHUNK_TYPE) => bin = Some(body),
            // Unknown chunks must be ignored.
            _ => {}
        }
        offset = end;
        index += 1;
    }

    let json = json.ok_or_else(|| "missing JSON chunk".to_string())?;
    // Trailing padding is spaces by spec, but some writers use NULs.
    let trimmed = match json.iter().rposition(|b| *b != b' ' && *b != 0) {
        Some(last) => &json[..=last],
        None => &json[..0],
    };
    Ok(GlbChunks { json: trimmed, bin })
}

/// Assembles a GLB container from a JSON chunk and an optional BIN chunk.
pub fn build_glb(json: &[u8], bin: Option<&[u8]>) -> Vec<u8> {
    let json_padding = (4 - json.len() % 4) % 4;
    let json_len = json.len() + json_padding;
    let bin_len = bin.map(|b| b.len() + (4 - b.len() % 4) % 4);
    let total = HEADER_SIZE + CHUNK_HEADER_SIZE + json_len + bin_len.map_or(0, |l| CHUNK_HEADER_SIZE + l);

    let mut glb = Vec::with_capacity(total);
    glb.extend_from_slice(GLB_MAGIC);
    glb.extend_from_slice(&GLB_VERSION.to_le_bytes());
    glb.extend_from_slice(&(total as u32).to_le_bytes());

    glb.extend_from_slice(&(json_len as u32).to_le_bytes());
    glb.extend_from_slice(&JSON_CHUNK_TYPE.to_le_bytes());
    glb.extend_from_slice(json);
    glb.resize(glb.len() + json_padding, b' ');

    if let (Some(bin), Some(bin_len)) = (bin, bin_len) {
        glb.extend_from_slice(&(bin_len as u32).to_le_bytes());
        glb.extend_from_slice(&BIN_CHUNK_TYPE.to_le_bytes());
        glb.extend_from_slice(bin);
        glb.resize(glb.len() + (bin_len - bin.len()), 0);
    }
    glb
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshgate_model::Field;
    use pretty_assertions::assert_eq;

    const JSON: &str = r#"{"asset":{"version":"2.0"},"buffers":[{"byteLength":8}]}"#;

    #[test]
    fn test_glb_round_trip_keeps_bin_chunk() {
        let bin = [1u8, 2, 3, 4, 5, 6, 7, 8];
        let glb = build_glb(JSON.as_bytes(), Some(&bin));
        assert_eq!(glb.len() % 4, 0);

        let asset = LoadedAsset::from_glb_bytes(Path::new("a.glb"), &glb).unwrap();
        assert_eq!(
            asset.source.container,
            Container::Glb {
                bin_chunk: Some(bin.to_vec())
            }
        );
        assert_eq!(
            asset.document.buffers.resolve(0).unwrap().byte_length,
            Field::Present(8)
        );
    }

    #[test]
    fn test_glb_without_bin_chunk() {
        let glb = build_glb(JSON.as_bytes(), None);
        let asset = LoadedAsset::from_glb_bytes(Path::new("a.glb"), &glb).unwrap();
        assert_eq!(asset.source.container, Container::Glb { bin_chunk: None });
    }

    #[test]
    fn test_glb_header_errors() {
        let short = LoadedAsset::from_glb_bytes(Path::new("a.glb"), b"glTF");
        assert!(matches!(short, Err(LoadError::Glb { .. })));

        let mut glb = build_glb(JSON.as_bytes(), None);
        glb[0] = b'x';
        let err = LoadedAsset::from_glb_bytes(Path::new("a.glb"), &glb).unwrap_err();
        assert!(err.to_string().contains("invalid magic"));

        let mut glb = build_glb(JSON.as_bytes(), None);
        glb[4] = 1;
        let err = LoadedAsset::from_glb_bytes(Path::new("a.glb"), &glb).unwrap_err();
        assert!(err.to_string().contains("unsupported version"));
    }

    #[test]
    fn test_truncated_chunk() {
        let mut glb = build_glb(JSON.as_bytes(), Some(&[0u8; 8]));
        glb.truncate(glb.len() - 4);
        let len = glb.len() as u32;
        glb[8..12].copy_from_slice(&len.to_le_bytes());
        let err = LoadedAsset::from_glb_bytes(Path::new("a.glb"), &glb).unwrap_err();
        assert!(err.to_string().contains("extends past end of file"));
    }

    #[test]
    fn test_malformed_json_is_load_error() {
        let err = LoadedAsset::from_gltf_bytes(Path::new("a.gltf"), b"{ not json").unwrap_err();
        assert!(matches!(err, LoadError::Document { .. }));

        let err = LoadedAsset::from_gltf_bytes(Path::new("a.gltf"), b"[1, 2]").unwrap_err();
        assert!(matches!(
            err,
            LoadError::Document {
                source: DocumentError::MalformedRoot("array"),
                ..
            }
        ));
    }

    #[test]
    fn test_load_and_save_gltf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.gltf");
        std::fs::write(&path, JSON).unwrap();

        let (source, mut document) = LoadedAsset::load(&path).unwrap().into_parts();
        assert_eq!(source.resolver().base_dir(), dir.path());

        document.set_buffer_byte_length(0, 16).unwrap();
        source.save(&document).unwrap();

        let reloaded = LoadedAsset::load(&path).unwrap();
        assert_eq!(
            reloaded.document.buffers.resolve(0).unwrap().byte_length,
            Field::Present(16)
        );
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.obj");
        std::fs::write(&path, "o cube").unwrap();
        assert!(matches!(
            LoadedAsset::load(&path),
            Err(LoadError::UnsupportedExtension(_))
        ));
        assert!(!is_supported(&path));
        assert!(is_supported(Path::new("a.GLB")));
    }

    #[test]
    fn test_relative_path_resolves_from_cwd() {
        let source = AssetSource {
            path: PathBuf::from("scene.gltf"),
            container: Container::Json,
        };
        assert_eq!(source.resolver().base_dir(), Path::new("."));
    }
}
