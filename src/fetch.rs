//! Fetching work-package documents from the project API.
//!
//! All sources are requested at once and awaited together. A source that
//! fails contributes no rows; its error is recorded in the [`FetchReport`] and
//! the other sources are unaffected. Nothing is retried.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use futures_util::future::join_all;
use reqwest::{Client as HttpClient, StatusCode};
use serde_json::Value;
use thiserror::Error;

use crate::parser::{ParseError, load_payload, parse_payload_value};
use crate::payload::Payload;
use crate::query::process_payload;
use crate::record::NormalizedRecord;

/// Message shown once to the user when any source failed
pub const LOAD_FAILURE_BANNER: &str = "Failed to load data. Please try again later.";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP error! status: {0}")]
    Status(StatusCode),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Where a document comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Url(String),
    File(PathBuf),
}

impl Source {
    /// `http(s)://...` is fetched, anything else is read from disk
    pub fn parse(spec: &str) -> Self {
        let trimmed = spec.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            Source::Url(trimmed.to_string())
        } else {
            Source::File(PathBuf::from(trimmed))
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Url(url) => write!(f, "{}", url),
            Source::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Debug)]
pub struct SourceFailure {
    pub source: Source,
    pub error: FetchError,
}

/// Combined outcome of loading every source
#[derive(Debug, Default)]
pub struct FetchReport {
    /// Root rows of all successful sources, in source order
    pub records: Vec<NormalizedRecord>,
    pub failures: Vec<SourceFailure>,
}

impl FetchReport {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

pub struct Fetcher {
    http: HttpClient,
}

impl Fetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let http = HttpClient::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }

    /// GET a document and check its structure
    pub async fn fetch_payload(&self, url: &str) -> Result<Payload, FetchError> {
        let resp = self.http.get(url).send().await?;
        if !resp.status().is_success() {
            return Err(FetchError::Status(resp.status()));
        }
        let value: Value = resp.json().await?;
        Ok(parse_payload_value(value)?)
    }

    /// Load one source and reshape it into root rows
    pub async fn load(&self, source: &Source) -> Result<Vec<NormalizedRecord>, FetchError> {
        let payload = match source {
            Source::Url(url) => self.fetch_payload(url).await?,
            Source::File(path) => load_payload(path)?,
        };
        Ok(process_payload(&payload))
    }

    /// Load every source concurrently, isolating failures
    pub async fn fetch_all(&self, sources: &[Source]) -> FetchReport {
        let results = join_all(sources.iter().map(|source| self.load(source))).await;

        let mut report = FetchReport::default();
        for (source, result) in sources.iter().zip(results) {
            match result {
                Ok(records) => {
                    tracing::info!(%source, roots = records.len(), "loaded work packages");
                    report.records.extend(records);
                }
                Err(error) => {
                    tracing::error!(%source, %error, "error fetching or processing data");
                    report.failures.push(SourceFailure {
                        source: source.clone(),
                        error,
                    });
                }
            }
        }
        report
    }
}
