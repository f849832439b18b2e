// Runtime configuration: environment variables (optionally loaded from a
// `.env` file by `main`) with defaults, then command-line overrides.

use crate::store::Backend;
use std::path::PathBuf;

pub const DEFAULT_OMDB_URL: &str = "http://www.omdbapi.com/";
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Snapshot of every setting the CLI needs.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_key: Option<String>,
    pub omdb_url: String,
    pub backend: Backend,
    pub data_dir: PathBuf,
    /// Page template on disk; the bundled template is used when `None`.
    pub template: Option<PathBuf>,
    pub output: PathBuf,
    pub log_level: String,
}

/// Values given on the command line. `None` keeps the environment value.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub backend: Option<Backend>,
    pub data_dir: Option<PathBuf>,
    pub template: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub log_level: Option<String>,
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from any key lookup. Empty values count as
    /// unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let backend = match get("MOVIEDB_BACKEND") {
            Some(raw) => raw.parse()?,
            None => Backend::Sqlite,
        };
        let data_dir = get("MOVIEDB_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);
        let output = get("MOVIEDB_OUTPUT")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("index.html"));

        Ok(AppConfig {
            api_key: get("OMDB_API_KEY").or_else(|| get("API_KEY")),
            omdb_url: get("OMDB_URL").unwrap_or_else(|| DEFAULT_OMDB_URL.to_string()),
            backend,
            data_dir,
            template: get("MOVIEDB_TEMPLATE").map(PathBuf::from),
            output,
            log_level: get("MOVIEDB_LOG").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        })
    }

    /// Apply command-line values on top. A new data directory also moves
    /// the default output page unless an output path was set explicitly.
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(backend) = overrides.backend {
            self.backend = backend;
        }
        if let Some(dir) = overrides.data_dir {
            if self.output == self.data_dir.join("index.html") {
                self.output = dir.join("index.html");
            }
            self.data_dir = dir;
        }
        if let Some(template) = overrides.template {
            self.template = Some(template);
        }
        if let Some(output) = overrides.output {
            self.output = output;
        }
        if let Some(level) = overrides.log_level {
            self.log_level = level;
        }
        self
    }

    /// Path of the catalog file for the selected backend.
    pub fn catalog_path(&self) -> PathBuf {
        self.data_dir.join(self.backend.file_name())
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("moviedb"))
        .unwrap_or_else(|| PathBuf::from("data"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let cfg = config_from(&[]).unwrap();
        assert_eq!(cfg.backend, Backend::Sqlite);
        assert_eq!(cfg.omdb_url, DEFAULT_OMDB_URL);
        assert_eq!(cfg.api_key, None);
        assert_eq!(cfg.template, None);
        assert_eq!(cfg.log_level, "warn");
        assert_eq!(cfg.output, cfg.data_dir.join("index.html"));
    }

    #[test]
    fn reads_environment_values() {
        let cfg = config_from(&[
            ("OMDB_API_KEY", "abc123"),
            ("MOVIEDB_BACKEND", "json"),
            ("MOVIEDB_DATA_DIR", "/tmp/movies"),
            ("MOVIEDB_LOG", "debug"),
        ])
        .unwrap();
        assert_eq!(cfg.api_key.as_deref(), Some("abc123"));
        assert_eq!(cfg.backend, Backend::Json);
        assert_eq!(cfg.catalog_path(), PathBuf::from("/tmp/movies/movies.json"));
        assert_eq!(cfg.output, PathBuf::from("/tmp/movies/index.html"));
        assert_eq!(cfg.log_level, "debug");
    }

    #[test]
    fn legacy_api_key_variable_is_accepted() {
        let cfg = config_from(&[("API_KEY", "legacy"), ("OMDB_API_KEY", "  ")]).unwrap();
        assert_eq!(cfg.api_key.as_deref(), Some("legacy"));
    }

    #[test]
    fn unknown_backend_is_an_error() {
        assert!(config_from(&[("MOVIEDB_BACKEND", "xml")]).is_err());
    }

    #[test]
    fn overrides_win_and_move_default_output() {
        let cfg = config_from(&[("MOVIEDB_DATA_DIR", "/a")])
            .unwrap()
            .with_overrides(Overrides {
                backend: Some(Backend::Json),
                data_dir: Some(PathBuf::from("/b")),
                ..Overrides::default()
            });
        assert_eq!(cfg.backend, Backend::Json);
        assert_eq!(cfg.data_dir, PathBuf::from("/b"));
        assert_eq!(cfg.output, PathBuf::from("/b/index.html"));
    }

    #[test]
    fn explicit_output_survives_data_dir_override() {
        let cfg = config_from(&[("MOVIEDB_OUTPUT", "/site/index.html")])
            .unwrap()
            .with_overrides(Overrides {
                data_dir: Some(PathBuf::from("/b")),
                ..Overrides::default()
            });
        assert_eq!(cfg.output, PathBuf::from("/site/index.html"));
    }
}
