//! Startup configuration
//!
//! The storage root is taken from, in order:
//! 1. the first command-line argument
//! 2. the `MESH_GALLERY_STORAGE` environment variable
//! 3. `gallery_storage` in the working directory

use std::path::PathBuf;

use crate::render::RenderSettings;

pub const STORAGE_ENV: &str = "MESH_GALLERY_STORAGE";
pub const DEFAULT_STORAGE_DIR: &str = "gallery_storage";

#[derive(Debug, Clone, PartialEq)]
pub struct GalleryConfig {
    pub storage_root: PathBuf,
    pub render: RenderSettings,
}

impl GalleryConfig {
    /// Resolve from the process arguments and environment
    pub fn from_env() -> Self {
        Self::resolve(std::env::args().nth(1), std::env::var(STORAGE_ENV).ok())
    }

    fn resolve(arg: Option<String>, env: Option<String>) -> Self {
        let storage_root = arg
            .filter(|a| !a.trim().is_empty())
            .or_else(|| env.filter(|e| !e.trim().is_empty()))
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_DIR));

        Self {
            storage_root,
            render: RenderSettings::default(),
        }
    }
}
