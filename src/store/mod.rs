// Catalog store: the durable record set behind every menu action.
//
// Two backends implement the same `MovieStore` contract:
// - `sqlite`: a single `movies` table; the UNIQUE constraint on `title`
//   is what rejects duplicates.
// - `json`: a pretty-printed document rewritten atomically on each write.
//
// Titles are always normalized before they reach a backend, so both agree
// on what counts as "the same movie".

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod json;
pub mod sqlite;

pub use json::JsonFileStore;
pub use sqlite::SqliteStore;

/// Poster value OMDb reports when it has no image.
pub const POSTER_NOT_AVAILABLE: &str = "N/A";

/// Attributes stored for one movie. The title is the key of the
/// surrounding `Catalog` map.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MovieInfo {
    pub year: i32,
    pub rating: f64,
    /// `None` is the absent marker. Older catalog files without the field
    /// read as absent; writes always include it.
    #[serde(default)]
    pub poster: Option<String>,
}

/// Full catalog keyed by normalized title. No ordering is implied.
pub type Catalog = HashMap<String, MovieInfo>;

pub type StoreResult<T> = Result<T, StoreError>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failures of the backing medium. Duplicates and missing titles are not
/// errors; they come back as `Ok(false)`.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("catalog storage unavailable at {}", .path.display())]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: BoxError,
    },
    #[error("failed to write catalog at {}", .path.display())]
    StorageWriteFailed {
        path: PathBuf,
        #[source]
        source: BoxError,
    },
}

impl StoreError {
    pub fn unavailable(path: &Path, source: impl Into<BoxError>) -> Self {
        StoreError::StorageUnavailable {
            path: path.to_path_buf(),
            source: source.into(),
        }
    }

    pub fn write_failed(path: &Path, source: impl Into<BoxError>) -> Self {
        StoreError::StorageWriteFailed {
            path: path.to_path_buf(),
            source: source.into(),
        }
    }
}

/// Operations every catalog backend provides.
///
/// Each call acquires its own handle to the medium and releases it before
/// returning, on success and on error alike.
pub trait MovieStore {
    /// Create the backing structure if it does not exist yet. Existing data
    /// is never touched; calling this twice is harmless.
    fn initialize(&self) -> StoreResult<()>;

    /// Return the whole catalog. A missing structure reads as empty.
    fn list(&self) -> StoreResult<Catalog>;

    /// Insert a movie. Returns `false` without writing anything when the
    /// normalized title is already present.
    fn add(&self, title: &str, year: i32, rating: f64, poster: Option<&str>) -> StoreResult<bool>;

    /// Replace the rating of an existing movie. Returns `false` when no
    /// movie matches the normalized title.
    fn update(&self, title: &str, rating: f64) -> StoreResult<bool>;

    /// Remove a movie. Returns `false` when no movie matches the normalized
    /// title.
    fn delete(&self, title: &str) -> StoreResult<bool>;
}

/// Canonical form of a title: outer whitespace trimmed, then every letter
/// that follows a non-letter upper-cased and every other letter
/// lower-cased ("  the DARK knight " -> "The Dark Knight").
///
/// Every char maps to exactly one char and letters stay letters, so word
/// boundaries are the same on a second pass and the result is a fixed point.
pub fn normalize_title(title: &str) -> String {
    let mut prev_is_letter = false;
    title
        .trim()
        .chars()
        .map(|ch| {
            let folded = if !ch.is_alphabetic() {
                ch
            } else if prev_is_letter {
                stable_case(ch, char::to_lowercase)
            } else {
                stable_case(ch, char::to_uppercase)
            };
            prev_is_letter = folded.is_alphabetic();
            folded
        })
        .collect()
}

/// `map(ch)` when it is a single letter that `map` leaves alone; otherwise
/// `ch` unchanged ("ß" has no one-char capital, "İ" lower-cases to two).
fn stable_case<F, I>(ch: char, map: F) -> char
where
    F: Fn(char) -> I,
    I: Iterator<Item = char>,
{
    let single = |c: char| {
        let mut mapped = map(c);
        match (mapped.next(), mapped.next()) {
            (Some(m), None) => Some(m),
            _ => None,
        }
    };
    match single(ch) {
        Some(m) if m.is_alphabetic() && single(m) == Some(m) => m,
        _ => ch,
    }
}

/// Map the upstream "no poster" sentinel (and blank values) to `None`.
pub fn normalize_poster(poster: Option<&str>) -> Option<String> {
    match poster.map(str::trim) {
        None | Some("") | Some(POSTER_NOT_AVAILABLE) => None,
        Some(_) => poster.map(str::to_string),
    }
}

/// Which backend holds the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Backend {
    Sqlite,
    Json,
}

impl Backend {
    /// File name of the catalog inside the data directory.
    pub fn file_name(self) -> &'static str {
        match self {
            Backend::Sqlite => "movies.db",
            Backend::Json => "movies.json",
        }
    }
}

impl std::str::FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" | "sql" | "db" => Ok(Backend::Sqlite),
            "json" => Ok(Backend::Json),
            other => Err(format!("unknown storage backend '{other}' (expected sqlite or json)")),
        }
    }
}

/// Build the store for `backend` with its file inside `data_dir`.
/// Nothing is touched on disk until `initialize` or a write is called.
pub fn open_store(backend: Backend, data_dir: &Path) -> Box<dyn MovieStore> {
    let path = data_dir.join(backend.file_name());
    match backend {
        Backend::Sqlite => Box::new(SqliteStore::new(path)),
        Backend::Json => Box::new(JsonFileStore::new(path)),
    }
}
