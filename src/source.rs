use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use reqwest::Url;
use reqwest::blocking::Client;
use tracing::debug;

const USER_AGENT: &str = concat!("iam-actions/", env!("CARGO_PKG_VERSION"));

/// Supplies raw HTML for a URL.
pub trait DocumentSource {
    fn fetch(&self, url: &str) -> Result<String>;
}

pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .context("failed to build http client")?;
        Ok(Self { client })
    }
}

impl DocumentSource for HttpSource {
    fn fetch(&self, url: &str) -> Result<String> {
        debug!(url, "fetching document");
        let response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("request failed: {url}"))?;

        let status = response.status();
        if !status.is_success() {
            bail!("unexpected status {status} for {url}");
        }

        response
            .text()
            .with_context(|| format!("failed to read response body: {url}"))
    }
}

/// Reads `file://` URLs and plain paths from disk.
pub struct FileSource;

impl DocumentSource for FileSource {
    fn fetch(&self, url: &str) -> Result<String> {
        let path = if url.starts_with("file://") {
            Url::parse(url)
                .ok()
                .and_then(|parsed| parsed.to_file_path().ok())
                .with_context(|| format!("invalid file url: {url}"))?
        } else {
            Path::new(url).to_path_buf()
        };
        fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))
    }
}

fn is_http(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Absolute URL for a location so relative links on the page can be joined
/// against it. Local paths become `file://` URLs.
pub fn base_url(location: &str) -> Result<String> {
    if is_http(location) || location.starts_with("file://") {
        return Ok(location.to_string());
    }

    let path = fs::canonicalize(location)
        .with_context(|| format!("failed to resolve {location}"))?;
    Url::from_file_path(&path)
        .map(|url| url.to_string())
        .map_err(|()| anyhow!("cannot express {} as a file url", path.display()))
}

/// Picks the file source for local locations and HTTP otherwise.
pub fn source_for(location: &str, timeout: Duration) -> Result<Box<dyn DocumentSource>> {
    if is_http(location) {
        Ok(Box::new(HttpSource::new(timeout)?))
    } else {
        Ok(Box::new(FileSource))
    }
}
