/// Error types shared by the catalog, mesh readers and renderer
use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong between the disk and the gallery grid
#[derive(Error, Debug)]
pub enum GalleryError {
    /// The metadata file exists but could not be parsed.
    /// This is fatal at startup: falling back to an empty catalog would orphan files.
    #[error("catalog file {path} is corrupt: {source}")]
    CatalogCorrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize catalog: {0}")]
    CatalogEncode(#[from] serde_json::Error),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported mesh format: {path}")]
    UnsupportedFormat { path: PathBuf },

    #[error("{path}:{line}: {message}")]
    MeshParse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("mesh {path} contains no triangles")]
    EmptyMesh { path: PathBuf },

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

impl GalleryError {
    /// Wrap an I/O error with a short description of what was being attempted
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        GalleryError::Io {
            context: context.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, GalleryError>;
