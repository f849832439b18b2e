// JSON flat-file backend. Every write loads the document, changes a copy,
// and swaps the file in with a rename so readers only ever see a complete
// document.

use super::{normalize_poster, normalize_title, Catalog, MovieInfo, MovieStore, StoreError, StoreResult};
use log::{debug, info};
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Catalog stored as a single JSON object mapping titles to attributes.
///
/// Duplicate detection is a read-then-write inside one process; two
/// processes writing the same file at once are not coordinated.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        }
    }

    fn load(&self) -> StoreResult<Catalog> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Catalog::new()),
            Err(e) => return Err(StoreError::unavailable(&self.path, e)),
        };
        if raw.trim().is_empty() {
            return Ok(Catalog::new());
        }
        serde_json::from_str(&raw).map_err(|e| StoreError::unavailable(&self.path, e))
    }

    /// Write the whole catalog to a temp file next to the target, sync it,
    /// then rename it over the target.
    fn save(&self, catalog: &Catalog) -> StoreResult<()> {
        let write_failed = |e: io::Error| StoreError::write_failed(&self.path, e);

        // serde_json would quietly turn these into `null`, which no longer
        // reads back as a rating.
        if let Some((title, _)) = catalog.iter().find(|(_, info)| !info.rating.is_finite()) {
            return Err(write_failed(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("rating of '{title}' is not a finite number"),
            )));
        }

        // Sorted keys keep the file stable across rewrites.
        let sorted: BTreeMap<&String, &MovieInfo> = catalog.iter().collect();
        let body = serde_json::to_vec_pretty(&sorted)
            .map_err(|e| StoreError::write_failed(&self.path, e))?;

        let mut tmp = NamedTempFile::new_in(self.parent_dir()).map_err(write_failed)?;
        tmp.write_all(&body).map_err(write_failed)?;
        tmp.write_all(b"\n").map_err(write_failed)?;
        tmp.as_file().sync_all().map_err(write_failed)?;
        tmp.persist(&self.path).map_err(|e| write_failed(e.error))?;
        Ok(())
    }
}

impl MovieStore for JsonFileStore {
    fn initialize(&self) -> StoreResult<()> {
        fs::create_dir_all(self.parent_dir()).map_err(|e| StoreError::unavailable(&self.path, e))?;
        if self.path.exists() {
            // Reject a corrupt document up front instead of on first write.
            let catalog = self.load()?;
            info!("catalog ready at {} ({} movies)", self.path.display(), catalog.len());
            return Ok(());
        }
        self.save(&Catalog::new()).map_err(|e| match e {
            StoreError::StorageWriteFailed { path, source } => StoreError::StorageUnavailable { path, source },
            other => other,
        })?;
        info!("created empty catalog at {}", self.path.display());
        Ok(())
    }

    fn list(&self) -> StoreResult<Catalog> {
        self.load()
    }

    fn add(&self, title: &str, year: i32, rating: f64, poster: Option<&str>) -> StoreResult<bool> {
        let title = normalize_title(title);
        let mut catalog = self.load()?;
        if catalog.contains_key(&title) {
            debug!("movie '{}' already in catalog", title);
            return Ok(false);
        }
        let info = MovieInfo {
            year,
            rating,
            poster: normalize_poster(poster),
        };
        catalog.insert(title.clone(), info);
        self.save(&catalog)?;
        debug!("added movie '{}'", title);
        Ok(true)
    }

    fn update(&self, title: &str, rating: f64) -> StoreResult<bool> {
        let title = normalize_title(title);
        let mut catalog = self.load()?;
        match catalog.get_mut(&title) {
            Some(info) => info.rating = rating,
            None => return Ok(false),
        }
        self.save(&catalog)?;
        debug!("updated rating of '{}'", title);
        Ok(true)
    }

    fn delete(&self, title: &str) -> StoreResult<bool> {
        let title = normalize_title(title);
        let mut catalog = self.load()?;
        if catalog.remove(&title).is_none() {
            return Ok(false);
        }
        self.save(&catalog)?;
        debug!("deleted movie '{}'", title);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn reads_catalog_written_by_hand() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("movies.json");
        fs::write(
            &path,
            r#"{"Titanic": {"rating": 9, "year": 1999}, "Heat": {"year": 1995, "rating": 8.3, "poster": "h.jpg"}}"#,
        )
        .unwrap();

        let catalog = JsonFileStore::new(&path).list().unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog["Titanic"].poster, None);
        assert_eq!(catalog["Heat"].poster.as_deref(), Some("h.jpg"));
    }

    #[test]
    fn empty_file_reads_as_empty_catalog() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("movies.json");
        fs::write(&path, "  \n").unwrap();
        assert!(JsonFileStore::new(path).list().unwrap().is_empty());
    }

    #[test]
    fn absent_poster_is_written_as_null() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("movies.json"));
        store.initialize().unwrap();
        store.add("Heat", 1995, 8.3, Some("N/A")).unwrap();

        let raw = fs::read_to_string(store.path()).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(doc["Heat"]["poster"], serde_json::Value::Null);
        assert_eq!(doc["Heat"]["year"], 1995);
    }

    #[test]
    fn failed_write_keeps_previous_document() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("movies.json"));
        store.initialize().unwrap();
        store.add("Heat", 1995, 8.3, None).unwrap();

        // NaN has no JSON representation, so the write is refused before
        // anything touches the file.
        let err = store.add("Ronin", 1998, f64::NAN, None).unwrap_err();
        assert!(matches!(err, StoreError::StorageWriteFailed { .. }));

        let catalog = store.list().unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(catalog.contains_key("Heat"));
    }
}
