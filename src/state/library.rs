use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::data::ModelRecord;
use crate::error::{GalleryError, Result};

const MODELS_DIR: &str = "models";
const PREVIEWS_DIR: &str = "previews";
const METADATA_FILE: &str = "metadata.json";
const SEQUENCE_FILE: &str = "sequence.json";

/// Highest identifier ever handed out, kept beside the catalog so deleting the
/// newest model and restarting cannot recycle its id.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy)]
struct Sequence {
    last_id: u64,
}

/// The Library manages the JSON catalog of meshes.
/// It owns the record list together with the copied mesh files and preview images.
///
/// Layout under the storage root:
/// - `models/<id>_<name>` - copies of the user's mesh files
/// - `previews/<id>.png` - rendered thumbnails (written lazily)
/// - `metadata.json` - the full record list
pub struct Library {
    root: PathBuf,
    models: Vec<ModelRecord>,
    last_id: u64,
}

impl Library {
    /// Open (or create) the catalog rooted at `storage_path`.
    ///
    /// Fails if `metadata.json` exists but is not a valid catalog; the caller is
    /// expected to treat that as fatal.
    pub fn new(storage_path: impl Into<PathBuf>) -> Result<Self> {
        let root = storage_path.into();

        for dir in [root.join(MODELS_DIR), root.join(PREVIEWS_DIR)] {
            fs::create_dir_all(&dir).map_err(|e| {
                GalleryError::io(format!("failed to create {}", dir.display()), e)
            })?;
        }

        let models = Self::load_metadata(&root.join(METADATA_FILE))?;
        let sequence = Self::load_sequence(&root.join(SEQUENCE_FILE))?;

        let highest_in_use = models
            .iter()
            .filter_map(|m| m.id.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        let last_id = sequence
            .last_id
            .max(highest_in_use)
            .max(models.len() as u64);

        log::info!(
            "Catalog opened at {} with {} models",
            root.display(),
            models.len()
        );

        Ok(Library {
            root,
            models,
            last_id,
        })
    }

    fn load_metadata(path: &Path) -> Result<Vec<ModelRecord>> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(GalleryError::io(
                    format!("failed to read {}", path.display()),
                    e,
                ))
            }
        };

        serde_json::from_str(&text).map_err(|source| GalleryError::CatalogCorrupt {
            path: path.to_path_buf(),
            source,
        })
    }

    fn load_sequence(path: &Path) -> Result<Sequence> {
        match fs::read_to_string(path) {
            Ok(text) => serde_json::from_str(&text).map_err(|source| {
                GalleryError::CatalogCorrupt {
                    path: path.to_path_buf(),
                    source,
                }
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Sequence::default()),
            Err(e) => Err(GalleryError::io(
                format!("failed to read {}", path.display()),
                e,
            )),
        }
    }

    /// Rewrite the whole catalog. Goes through a temporary file and a rename so a
    /// crash mid-write never leaves a truncated `metadata.json` behind.
    fn save_metadata(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.models)?;
        write_atomically(&self.metadata_path(), json.as_bytes())
    }

    fn save_sequence(&self) -> Result<()> {
        let json = serde_json::to_string(&Sequence {
            last_id: self.last_id,
        })?;
        write_atomically(&self.root.join(SEQUENCE_FILE), json.as_bytes())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn models_dir(&self) -> PathBuf {
        self.root.join(MODELS_DIR)
    }

    pub fn previews_dir(&self) -> PathBuf {
        self.root.join(PREVIEWS_DIR)
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.root.join(METADATA_FILE)
    }

    /// All records in insertion order
    pub fn models(&self) -> &[ModelRecord] {
        &self.models
    }

    pub fn get(&self, id: &str) -> Option<&ModelRecord> {
        self.models.iter().find(|m| m.id == id)
    }

    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    /// Copy `source_path` into managed storage and append a record for it.
    ///
    /// The user's file is copied, never moved. If the copy or the catalog write
    /// fails, nothing is added and any partial copy is removed.
    pub fn add_model(&mut self, source_path: &Path, tags: Vec<String>) -> Result<ModelRecord> {
        let next = (self.models.len() as u64 + 1).max(self.last_id + 1);
        let id = next.to_string();

        let name = source_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| {
                GalleryError::io(
                    format!("{} has no file name", source_path.display()),
                    ErrorKind::InvalidInput.into(),
                )
            })?;

        let file_path = self.models_dir().join(format!("{}_{}", id, name));
        let preview_path = self.previews_dir().join(format!("{}.png", id));

        if let Err(e) = fs::copy(source_path, &file_path) {
            // The destination may already exist if the copy failed mid-stream
            remove_if_present(&file_path);
            return Err(GalleryError::io(
                format!("failed to copy {}", source_path.display()),
                e,
            ));
        }

        let model = ModelRecord {
            id,
            name,
            file_path,
            upload_date: Local::now().naive_local(),
            tags,
            preview_path,
        };

        let previous_last_id = self.last_id;
        self.last_id = next;
        self.models.push(model.clone());

        if let Err(e) = self.save_sequence().and_then(|_| self.save_metadata()) {
            self.models.pop();
            self.last_id = previous_last_id;
            remove_if_present(&model.file_path);
            return Err(e);
        }

        log::info!("Added model {} as id {}", model.name, model.id);
        Ok(model)
    }

    /// Remove a record together with its stored mesh and preview.
    /// Unknown ids are ignored; files that are already gone are not an error.
    pub fn delete_model(&mut self, id: &str) -> Result<()> {
        let Some(index) = self.models.iter().position(|m| m.id == id) else {
            return Ok(());
        };

        let model = self.models.remove(index);
        if let Err(e) = self.save_metadata() {
            self.models.insert(index, model);
            return Err(e);
        }

        remove_if_present(&model.file_path);
        remove_if_present(&model.preview_path);
        log::info!("Deleted model {} ({})", model.id, model.name);
        Ok(())
    }

    /// Replace the tag list of a record. Unknown ids are ignored.
    pub fn update_tags(&mut self, id: &str, tags: Vec<String>) -> Result<()> {
        let Some(index) = self.models.iter().position(|m| m.id == id) else {
            return Ok(());
        };

        let previous = std::mem::replace(&mut self.models[index].tags, tags);
        if let Err(e) = self.save_metadata() {
            self.models[index].tags = previous;
            return Err(e);
        }
        log::info!("Updated tags for model {}", id);
        Ok(())
    }

    /// Raw bytes of the stored mesh, if both the record and the file exist
    pub fn read_model_content(&self, id: &str) -> Option<Vec<u8>> {
        let model = self.get(id)?;
        match fs::read(&model.file_path) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                log::warn!("Could not read {}: {}", model.file_path.display(), e);
                None
            }
        }
    }
}

/// Best-effort removal used on delete: a missing file already satisfies the goal
fn remove_if_present(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => log::debug!("Removed {}", path.display()),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            log::debug!("{} was already gone", path.display())
        }
        Err(e) => log::warn!("Failed to remove {}: {}", path.display(), e),
    }
}

fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, bytes)
        .map_err(|e| GalleryError::io(format!("failed to write {}", tmp.display()), e))?;
    fs::rename(&tmp, path)
        .map_err(|e| GalleryError::io(format!("failed to replace {}", path.display()), e))
}

// Implement Debug for better error messages
impl std::fmt::Debug for Library {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Library")
            .field("root", &self.root)
            .field("models", &self.models.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_source(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    fn persisted(library: &Library) -> Vec<ModelRecord> {
        let text = fs::read_to_string(library.metadata_path()).unwrap();
        serde_json::from_str(&text).unwrap()
    }

    #[test]
    fn test_new_creates_layout() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("gallery_storage");

        let library = Library::new(&root).unwrap();

        assert!(root.join("models").is_dir());
        assert!(root.join("previews").is_dir());
        assert_eq!(library.model_count(), 0);
    }

    #[test]
    fn test_corrupt_metadata_is_fatal() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("metadata.json"), "{ not json").unwrap();

        let err = Library::new(dir.path()).unwrap_err();
        assert!(matches!(err, GalleryError::CatalogCorrupt { .. }));
    }

    #[test]
    fn test_add_then_delete_end_to_end() {
        let dir = tempdir().unwrap();
        let src = tempdir().unwrap();
        let cube = write_source(src.path(), "cube.obj", "v 0 0 0\n");
        let mut library = Library::new(dir.path()).unwrap();

        let model = library.add_model(&cube, vec!["default".into()]).unwrap();

        assert_eq!(model.id, "1");
        assert_eq!(model.name, "cube.obj");
        assert_eq!(model.file_path, dir.path().join("models").join("1_cube.obj"));
        assert_eq!(model.preview_path, dir.path().join("previews").join("1.png"));
        assert!(model.file_path.exists());
        assert!(!model.preview_path.exists());
        // The user's file is untouched
        assert_eq!(fs::read_to_string(&cube).unwrap(), "v 0 0 0\n");

        fs::write(&model.preview_path, b"png").unwrap();
        library.delete_model("1").unwrap();

        assert!(!model.file_path.exists());
        assert!(!model.preview_path.exists());
        assert_eq!(library.model_count(), 0);
        assert!(persisted(&library).is_empty());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_copy_failing_mid_read_leaves_no_file() {
        let dir = tempdir().unwrap();
        let mut library = Library::new(dir.path()).unwrap();

        // Opens fine but fails with EIO on the first read
        let err = library
            .add_model(Path::new("/proc/self/mem"), vec![])
            .unwrap_err();

        assert!(matches!(err, GalleryError::Io { .. }));
        assert_eq!(library.model_count(), 0);
        assert_eq!(fs::read_dir(library.models_dir()).unwrap().count(), 0);
    }

    #[test]
    fn test_failed_save_keeps_memory_and_disk_in_step() {
        let dir = tempdir().unwrap();
        let src = tempdir().unwrap();
        let mut library = Library::new(dir.path()).unwrap();
        let model = library
            .add_model(&write_source(src.path(), "a.obj", "v 0 0 0\n"), vec!["a".into()])
            .unwrap();

        // A directory where the temp file should go makes every catalog write fail
        fs::create_dir(dir.path().join("metadata.json.tmp")).unwrap();

        assert!(library.update_tags(&model.id, vec!["b".into()]).is_err());
        assert_eq!(library.models()[0].tags, vec!["a"]);

        assert!(library.delete_model(&model.id).is_err());
        assert_eq!(library.model_count(), 1);
        assert!(model.file_path.exists());

        assert_eq!(persisted(&library), library.models());
    }

    #[test]
    fn test_unknown_ids_are_ignored() {
        let dir = tempdir().unwrap();
        let src = tempdir().unwrap();
        let mut library = Library::new(dir.path()).unwrap();
        library
            .add_model(&write_source(src.path(), "a.obj", "v 0 0 0\n"), vec![])
            .unwrap();

        library.delete_model("7").unwrap();
        library.update_tags("7", vec!["x".into()]).unwrap();

        assert_eq!(library.model_count(), 1);
        assert!(library.models()[0].tags.is_empty());
    }

    #[test]
    fn test_persisted_file_tracks_every_mutation() {
        let dir = tempdir().unwrap();
        let src = tempdir().unwrap();
        let mut library = Library::new(dir.path()).unwrap();

        for name in ["a.obj", "b.stl", "c.obj"] {
            let path = write_source(src.path(), name, "solid x\n");
            library.add_model(&path, vec![]).unwrap();
            assert_eq!(persisted(&library), library.models());
        }

        library.delete_model("2").unwrap();
        assert_eq!(persisted(&library), library.models());

        library.delete_model("missing").unwrap();
        assert_eq!(persisted(&library), library.models());
        assert_eq!(library.model_count(), 2);
    }

    #[test]
    fn test_ids_are_not_reused() {
        let dir = tempdir().unwrap();
        let src = tempdir().unwrap();
        let path = write_source(src.path(), "m.obj", "");
        let mut library = Library::new(dir.path()).unwrap();

        library.add_model(&path, vec![]).unwrap();
        library.add_model(&path, vec![]).unwrap();
        library.delete_model("2").unwrap();

        let next = library.add_model(&path, vec![]).unwrap();
        assert_eq!(next.id, "3");

        // Also after a restart with the newest record deleted
        library.delete_model("3").unwrap();
        drop(library);
        let mut reopened = Library::new(dir.path()).unwrap();
        let after_restart = reopened.add_model(&path, vec![]).unwrap();
        assert_eq!(after_restart.id, "4");
    }

    #[test]
    fn test_copy_failure_adds_nothing() {
        let dir = tempdir().unwrap();
        let mut library = Library::new(dir.path()).unwrap();

        let err = library
            .add_model(&dir.path().join("does-not-exist.obj"), vec![])
            .unwrap_err();

        assert!(matches!(err, GalleryError::Io { .. }));
        assert_eq!(library.model_count(), 0);
        assert!(!library.metadata_path().exists());
    }

    #[test]
    fn test_tag_update_round_trip() {
        let dir = tempdir().unwrap();
        let src = tempdir().unwrap();
        let path = write_source(src.path(), "chair.obj", "");
        let mut library = Library::new(dir.path()).unwrap();

        let model = library
            .add_model(&path, vec!["a".into(), "b".into()])
            .unwrap();
        library.update_tags(&model.id, vec!["c".into()]).unwrap();
        drop(library);

        let reopened = Library::new(dir.path()).unwrap();
        assert_eq!(reopened.get(&model.id).unwrap().tags, vec!["c"]);

        let raw = fs::read_to_string(reopened.metadata_path()).unwrap();
        assert!(!raw.contains("\"a\""));
        assert!(!raw.contains("\"b\""));
    }

    #[test]
    fn test_read_model_content() {
        let dir = tempdir().unwrap();
        let src = tempdir().unwrap();
        let path = write_source(src.path(), "tri.obj", "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n");
        let mut library = Library::new(dir.path()).unwrap();
        let model = library.add_model(&path, vec![]).unwrap();

        let bytes = library.read_model_content(&model.id).unwrap();
        assert!(bytes.starts_with(b"v 0 0 0"));

        assert!(library.read_model_content("42").is_none());

        fs::remove_file(&model.file_path).unwrap();
        assert!(library.read_model_content(&model.id).is_none());
    }
}
