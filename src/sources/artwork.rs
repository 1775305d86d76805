use anyhow::{Context, Result};

use crate::sources::ArtworkSource;

/// Fetches thumbnails over plain HTTP.
pub struct HttpArtwork {
    client: reqwest::blocking::Client,
}

impl HttpArtwork {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to create HTTP client")?;

        Ok(Self { client })
    }
}

impl ArtworkSource for HttpArtwork {
    fn fetch_artwork(&self, url: &str) -> Result<Vec<u8>> {
        let data = self
            .client
            .get(url)
            .send()
            .context("thumbnail download failed")?
            .error_for_status()
            .context("thumbnail request was rejected")?
            .bytes()?
            .to_vec();

        Ok(data)
    }
}
