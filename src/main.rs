// Entrypoint for the CLI application.
// - Loads `.env`, reads configuration and applies command-line overrides.
// - Creates the catalog store explicitly and initializes it before the
//   menu starts; a store that cannot be opened aborts the program.

use anyhow::{anyhow, Context};
use clap::Parser;
use moviedb_cli::api::OmdbClient;
use moviedb_cli::config::{AppConfig, Overrides};
use moviedb_cli::store::{open_store, Backend};
use moviedb_cli::ui::{main_menu, Session};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(name = "moviedb", version, about = "Personal movie catalog with OMDb lookups")]
struct Cli {
    /// Storage backend for the catalog
    #[clap(long, value_enum)]
    backend: Option<Backend>,

    /// Directory holding the catalog file
    #[clap(long)]
    data_dir: Option<PathBuf>,

    /// HTML template used by "Generate website"
    #[clap(long)]
    template: Option<PathBuf>,

    /// Where the generated page is written
    #[clap(long)]
    output: Option<PathBuf>,

    /// Log filter (error, warn, info, debug, trace)
    #[clap(long, short)]
    log_level: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()
        .map_err(|e| anyhow!(e))?
        .with_overrides(Overrides {
            backend: cli.backend,
            data_dir: cli.data_dir,
            template: cli.template,
            output: cli.output,
            log_level: cli.log_level,
        });

    env_logger::Builder::new()
        .parse_filters(&config.log_level)
        .init();
    log::debug!("using {:?} catalog at {}", config.backend, config.catalog_path().display());

    let store = open_store(config.backend, &config.data_dir);
    store
        .initialize()
        .with_context(|| format!("Cannot open movie catalog at {}", config.catalog_path().display()))?;

    let omdb = OmdbClient::from_config(&config).context("Failed to build HTTP client")?;
    if config.api_key.is_none() {
        log::warn!("OMDB_API_KEY is not set; adding movies will fail");
    }

    let session = Session {
        store: store.as_ref(),
        omdb: &omdb,
        config: &config,
    };
    main_menu(&session)?;
    Ok(())
}
