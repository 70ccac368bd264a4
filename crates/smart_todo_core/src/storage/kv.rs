use crate::error::AppError;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

const DATA_DIR_ENV_VAR: &str = "SMART_TODO_DATA_DIR";
const APP_DIR_NAME: &str = "smart_todo";

/// String-keyed persistence collaborator. Absence of a key is `Ok(None)`,
/// never an error.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppError>;

    fn set(&self, key: &str, value: &str) -> Result<(), AppError>;

    fn remove(&self, key: &str) -> Result<(), AppError>;
}

pub fn data_dir() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(DATA_DIR_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    app_dir()
}

/// Per-user application directory, ignoring any override.
pub fn app_dir() -> Result<PathBuf, AppError> {
    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata).join(APP_DIR_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home).join(".config").join(APP_DIR_NAME))
    }
}

/// One file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileKvStore {
    dir: PathBuf,
}

impl FileKvStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self::new(data_dir()?))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn key_path(&self, key: &str) -> Result<PathBuf, AppError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_');
        if !valid {
            return Err(AppError::invalid_input(format!("invalid storage key '{key}'")));
        }
        Ok(self.dir.join(key))
    }
}

impl KeyValueStore for FileKvStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let path = self.key_path(key)?;
        if !path.exists() {
            return Ok(None);
        }

        let content =
            std::fs::read_to_string(&path).map_err(|err| AppError::io(err.to_string()))?;
        Ok(Some(content))
    }

    /// Writes a staging file next to the key and renames it into place. A
    /// failed write leaves the previous value in place.
    fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        let path = self.key_path(key)?;
        std::fs::create_dir_all(&self.dir).map_err(|err| AppError::io(err.to_string()))?;

        let staging = self.dir.join(format!(".{key}.tmp"));
        if let Err(err) = write_staging(&staging, value) {
            if staging.is_file() {
                std::fs::remove_file(&staging).ok();
            }
            return Err(err);
        }

        std::fs::rename(&staging, &path).map_err(|err| AppError::io(err.to_string()))
    }

    fn remove(&self, key: &str) -> Result<(), AppError> {
        let path = self.key_path(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(AppError::io(err.to_string())),
        }
    }
}

fn write_staging(path: &Path, value: &str) -> Result<(), AppError> {
    let mut file = std::fs::File::create(path).map_err(|err| AppError::io(err.to_string()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        file.set_permissions(permissions)
            .map_err(|err| AppError::io(err.to_string()))?;
    }

    file.write_all(value.as_bytes())
        .map_err(|err| AppError::io(err.to_string()))?;
    file.sync_all().map_err(|err| AppError::io(err.to_string()))
}

/// In-memory store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryKvStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, AppError> {
        self.entries
            .lock()
            .map_err(|_| AppError::io("memory store lock poisoned"))
    }
}

impl KeyValueStore for MemoryKvStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), AppError> {
        self.lock()?.remove(key);
        Ok(())
    }
}
