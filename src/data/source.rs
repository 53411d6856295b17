//! Remote price sheet retrieval.

use std::path::PathBuf;

use reqwest::blocking::Client;

use crate::error::PipelineError;

/// Public gold price workbook (24K/22K/18K per gram, one row per day).
pub const DEFAULT_DATA_URL: &str =
    "https://raw.githubusercontent.com/karthick-lab/NewsReader/main/src/test/resources/Data/GoldData.xlsx";

/// Transport seam for the loader. Production uses [`HttpSource`]; tests use
/// in-memory stubs.
pub trait Fetch {
    /// Retrieve the raw payload bytes.
    fn fetch(&self) -> Result<Vec<u8>, PipelineError>;

    /// Where the payload comes from (for logs and status lines).
    fn describe(&self) -> String;
}

impl<T: Fetch + ?Sized> Fetch for Box<T> {
    fn fetch(&self) -> Result<Vec<u8>, PipelineError> {
        (**self).fetch()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Blocking HTTP GET of a fixed URL.
pub struct HttpSource {
    client: Client,
    url: String,
}

impl HttpSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }
}

impl Fetch for HttpSource {
    fn fetch(&self) -> Result<Vec<u8>, PipelineError> {
        tracing::info!(url = %self.url, "fetching price sheet");

        let resp = self
            .client
            .get(&self.url)
            .send()
            .map_err(|e| PipelineError::Fetch(format!("request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(PipelineError::Fetch(format!(
                "request failed with status {}.",
                resp.status()
            )));
        }

        let body = resp
            .bytes()
            .map_err(|e| PipelineError::Fetch(format!("failed to read response body: {e}")))?;

        tracing::debug!(bytes = body.len(), "price sheet downloaded");
        Ok(body.to_vec())
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// A price sheet on the local filesystem, read on every fetch.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Fetch for FileSource {
    fn fetch(&self) -> Result<Vec<u8>, PipelineError> {
        tracing::info!(path = %self.path.display(), "reading price sheet");
        std::fs::read(&self.path)
            .map_err(|e| PipelineError::Fetch(format!("failed to read '{}': {e}", self.path.display())))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
