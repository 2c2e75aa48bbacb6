//! JSON-file backed key-value store

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use proxylock_core::KeyValueStore;

#[derive(Debug, thiserror::Error)]
pub enum FileStoreError {
    #[error("settings file i/o: {0}")]
    Io(#[from] io::Error),
    #[error("settings file is not a JSON object of strings: {0}")]
    Json(#[from] serde_json::Error),
}

/// All keys live in one JSON object file. Every `get` re-reads the file, and
/// every write goes to a uniquely named temp file in the same directory that
/// is renamed over the original, so a reader never sees a half-written file
/// and concurrent writers never share a temp path.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `settings.json` inside the given home directory
    pub fn in_home(home: &Path) -> Self {
        Self::new(home.join(crate::home::SETTINGS_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, FileStoreError> {
        match fs::read_to_string(&self.path) {
            Ok(data) if data.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(data) => Ok(serde_json::from_str(&data)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, values: &BTreeMap<String, String>) -> Result<(), FileStoreError> {
        let data = serde_json::to_string_pretty(values)?;
        let dir = self.path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(data.as_bytes())?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    type Error = FileStoreError;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.load()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), Self::Error> {
        let mut values = self.load()?;
        values.insert(key.to_string(), value.to_string());
        self.save(&values)
    }

    fn remove(&mut self, key: &str) -> Result<(), Self::Error> {
        let mut values = self.load()?;
        if values.remove(key).is_some() {
            self.save(&values)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proxylock_core::{GeoPoint, HomeStore};

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::in_home(dir.path());
        assert_eq!(store.get("home_location").unwrap(), None);
        assert!(!store.path().exists());
    }

    #[test]
    fn values_survive_a_new_handle() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::in_home(dir.path());
        store.set("a", "1").unwrap();
        store.set("b", "two").unwrap();
        store.set("a", "3").unwrap();

        let reopened = FileStore::in_home(dir.path());
        assert_eq!(reopened.get("a").unwrap().as_deref(), Some("3"));
        assert_eq!(reopened.get("b").unwrap().as_deref(), Some("two"));

        store.remove("a").unwrap();
        store.remove("never-set").unwrap();
        assert_eq!(reopened.get("a").unwrap(), None);
    }

    #[test]
    fn no_caching_between_handles() {
        let dir = tempfile::tempdir().unwrap();
        let reader = HomeStore::new(FileStore::in_home(dir.path()));
        let mut writer = HomeStore::new(FileStore::in_home(dir.path()));

        assert!(reader.get_home().unwrap().is_none());
        writer.set_home(GeoPoint::new(37.0, -122.0).unwrap(), 100.0).unwrap();
        assert_eq!(reader.get_home().unwrap().unwrap().radius_meters(), 100.0);
    }

    #[test]
    fn garbage_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::in_home(dir.path());
        fs::write(store.path(), "[1, 2, 3]").unwrap();
        assert!(matches!(store.get("x"), Err(FileStoreError::Json(_))));

        // the home-radius store propagates it for the geofence and fails open for the flag
        let home = HomeStore::new(store);
        assert!(home.get_home().is_err());
        assert!(!home.is_auto_unlock_enabled());
    }

    #[test]
    fn no_temp_file_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::in_home(dir.path());
        store.set("k", "v").unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec![crate::home::SETTINGS_FILE.to_string()]);
    }

    #[test]
    fn concurrent_writers_leave_a_valid_file() {
        let dir = tempfile::tempdir().unwrap();

        let writers: Vec<_> = (0..4)
            .map(|n| {
                let mut store = FileStore::in_home(dir.path());
                std::thread::spawn(move || {
                    for i in 0..25 {
                        store.set(&format!("writer{n}"), &i.to_string()).unwrap();
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }

        let raw = fs::read_to_string(dir.path().join(crate::home::SETTINGS_FILE)).unwrap();
        let parsed: BTreeMap<String, String> = serde_json::from_str(&raw).unwrap();
        assert!(!parsed.is_empty());

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec![crate::home::SETTINGS_FILE.to_string()]);
    }
}
