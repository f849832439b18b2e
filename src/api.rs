// API client module: a small blocking HTTP client for the OMDb movie
// database. The shell calls it before adding a movie; the store never
// does.

use crate::config::AppConfig;
use log::{debug, warn};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Blocking OMDb client holding the reqwest client, the endpoint and the
/// API key.
#[derive(Clone)]
pub struct OmdbClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

/// Metadata returned for a title found on OMDb.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieMetadata {
    pub title: String,
    pub year: i32,
    /// `None` when OMDb has no IMDb rating for the title yet.
    pub rating: Option<f64>,
    /// Raw poster value, possibly the "N/A" sentinel.
    pub poster: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    Found(MovieMetadata),
    NotFound,
}

/// Every way a lookup can fail. To the shell they all mean "unavailable".
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("no OMDb API key configured (set OMDB_API_KEY)")]
    MissingApiKey,
    #[error("OMDb request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("OMDb returned HTTP {0}")]
    Status(reqwest::StatusCode),
    #[error("unexpected OMDb response: {0}")]
    Decode(String),
}

/// Wire shape of an OMDb `?t=` response. Only the fields we use.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct OmdbResponse {
    response: String,
    title: Option<String>,
    year: Option<String>,
    #[serde(rename = "imdbRating")]
    imdb_rating: Option<String>,
    poster: Option<String>,
    error: Option<String>,
}

impl OmdbClient {
    /// Create a client from the loaded configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(OmdbClient {
            client,
            base_url: config.omdb_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    /// Look a title up by exact name.
    pub fn lookup(&self, title: &str) -> Result<Lookup, FetchError> {
        let api_key = self.api_key.as_deref().ok_or(FetchError::MissingApiKey)?;
        debug!("OMDb lookup for '{}'", title);
        let res = self
            .client
            .get(&self.base_url)
            .query(&[("t", title), ("apikey", api_key)])
            .send()?;
        if !res.status().is_success() {
            warn!("OMDb answered {} for '{}'", res.status(), title);
            return Err(FetchError::Status(res.status()));
        }
        let resp = res
            .json::<OmdbResponse>()
            .map_err(|e| FetchError::Decode(e.to_string()))?;
        into_lookup(resp)
    }
}

/// Turn an OMDb response body into a lookup outcome.
pub fn parse_response(body: &str) -> Result<Lookup, FetchError> {
    let resp: OmdbResponse =
        serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))?;
    into_lookup(resp)
}

fn into_lookup(resp: OmdbResponse) -> Result<Lookup, FetchError> {
    if resp.response.eq_ignore_ascii_case("false") {
        debug!("OMDb: {}", resp.error.as_deref().unwrap_or("not found"));
        return Ok(Lookup::NotFound);
    }

    let title = resp
        .title
        .ok_or_else(|| FetchError::Decode("missing Title".into()))?;
    let year_raw = resp
        .year
        .ok_or_else(|| FetchError::Decode("missing Year".into()))?;
    let year = parse_year(&year_raw)
        .ok_or_else(|| FetchError::Decode(format!("invalid Year '{year_raw}'")))?;
    let rating = match resp.imdb_rating.as_deref().map(str::trim) {
        None | Some("N/A") | Some("") => None,
        Some(raw) => Some(
            raw.parse::<f64>()
                .map_err(|_| FetchError::Decode(format!("invalid imdbRating '{raw}'")))?,
        ),
    };

    Ok(Lookup::Found(MovieMetadata {
        title,
        year,
        rating,
        poster: resp.poster.unwrap_or_default(),
    }))
}

/// Leading year of an OMDb `Year` field; series report ranges such as
/// "2010–2014".
fn parse_year(raw: &str) -> Option<i32> {
    let digits: String = raw
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}
