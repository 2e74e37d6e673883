use crate::{BlueprintEntity, BlueprintStore, StoreError, StoreResult, ensure_storable_name, io_error};
use std::{
    fmt,
    fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;

const ENTITY_EXT: &str = "json";

/// Filesystem-backed store rooted at `<root>/.blueprints`, one JSON file per blueprint.
#[derive(Clone)]
pub struct FsStore {
    dir: PathBuf,
}

impl fmt::Debug for FsStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FsStore").field("dir", &self.dir).finish()
    }
}

impl FsStore {
    pub fn open(root: impl AsRef<Path>) -> StoreResult<Self> {
        let dir = root.as_ref().join(".blueprints");
        fs::create_dir_all(&dir).map_err(|e| io_error(&dir, e))?;
        Ok(Self { dir })
    }

    fn entity_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.{ENTITY_EXT}"))
    }

    /// Writes through a uniquely named temp file in the store directory and
    /// renames it into place, so readers and concurrent writers of the same
    /// name only ever observe whole entities.
    fn write_replace(&self, path: &Path, bytes: &[u8]) -> StoreResult<()> {
        let mut file = NamedTempFile::new_in(&self.dir).map_err(|e| io_error(&self.dir, e))?;
        let tmp = file.path().to_path_buf();
        file.write_all(bytes).map_err(|e| io_error(&tmp, e))?;
        file.as_file().sync_all().map_err(|e| io_error(&tmp, e))?;
        file.persist(path).map_err(|e| io_error(path, e.error))?;
        Ok(())
    }
}

impl BlueprintStore for FsStore {
    fn find_by_name(&self, name: &str) -> StoreResult<Option<BlueprintEntity>> {
        if ensure_storable_name(name).is_err() {
            return Ok(None);
        }
        let path = self.entity_path(name);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(io_error(path, err)),
        };
        let entity = serde_json::from_slice(&bytes)
            .map_err(|source| StoreError::Json { path, source })?;
        Ok(Some(entity))
    }

    fn put(&self, entity: BlueprintEntity) -> StoreResult<()> {
        ensure_storable_name(&entity.blueprint_name)?;
        let path = self.entity_path(&entity.blueprint_name);
        let bytes = serde_json::to_vec_pretty(&entity).map_err(|source| StoreError::Json {
            path: path.clone(),
            source,
        })?;
        self.write_replace(&path, &bytes)?;
        tracing::debug!(blueprint = %entity.blueprint_name, path = %path.display(), "stored blueprint entity");
        Ok(())
    }

    fn remove(&self, name: &str) -> StoreResult<bool> {
        if ensure_storable_name(name).is_err() {
            return Ok(false);
        }
        let path = self.entity_path(name);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(io_error(path, err)),
        }
    }

    fn names(&self) -> StoreResult<Vec<String>> {
        let entries = fs::read_dir(&self.dir).map_err(|e| io_error(&self.dir, e))?;
        let mut names = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| io_error(&self.dir, e))?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(ENTITY_EXT) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}
