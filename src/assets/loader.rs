use std::sync::Arc;

use anyhow::Context;

use crate::assets::decode::{AssetHandle, decode_asset};
use crate::assets::source::{BlobStore, ImageSource};
use crate::foundation::error::{AssetRole, PosterError, PosterResult};

/// The two images one render needs.
#[derive(Clone, Debug)]
pub struct LoadedAssets {
    /// Source photograph.
    pub background: AssetHandle,
    /// Brand mark variant chosen for the template.
    pub mark: AssetHandle,
}

/// Fetches and decodes render inputs.
///
/// Nothing is cached: every call fetches and decodes afresh. Remote fetches carry no timeout;
/// wrap the returned future in `tokio::time::timeout` when one is needed.
#[derive(Clone, Debug)]
pub struct AssetLoader {
    client: reqwest::Client,
    blobs: BlobStore,
}

impl AssetLoader {
    /// Loader with a default HTTP client, resolving in-memory URIs through `blobs`.
    pub fn new(blobs: BlobStore) -> PosterResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("ktpost/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("build http client")?;
        Ok(Self::with_client(client, blobs))
    }

    /// Loader using a caller-configured HTTP client.
    pub fn with_client(client: reqwest::Client, blobs: BlobStore) -> Self {
        Self { client, blobs }
    }

    /// The registry backing `blob:` and `mem:` sources.
    pub fn blobs(&self) -> &BlobStore {
        &self.blobs
    }

    /// Load the background and the brand mark concurrently.
    ///
    /// Fails as soon as either fails; the error names the asset that did.
    pub async fn load_pair(&self, background: &str, mark: &str) -> PosterResult<LoadedAssets> {
        let (background, mark) = tokio::try_join!(
            self.load(AssetRole::Background, background),
            self.load(AssetRole::BrandMark, mark),
        )?;
        Ok(LoadedAssets { background, mark })
    }

    /// Fetch and decode one image.
    #[tracing::instrument(level = "debug", skip(self, role, raw), fields(role = %role))]
    pub async fn load(&self, role: AssetRole, raw: &str) -> PosterResult<AssetHandle> {
        let fail = |e: anyhow::Error| PosterError::asset_load(role, summarize(raw), format!("{e:#}"));

        let source = ImageSource::parse(raw).map_err(|e| fail(e.into()))?;
        let bytes = self.fetch_bytes(&source).await.map_err(fail)?;
        let len = bytes.len();
        let handle = tokio::task::spawn_blocking(move || decode_asset(&bytes))
            .await
            .context("decode task panicked")
            .map_err(fail)?
            .map_err(|e| fail(e.into()))?;

        let (w, h) = handle.natural_size();
        tracing::debug!(kind = source.kind(), bytes = len, width = w, height = h, "asset loaded");
        Ok(handle)
    }

    /// Raw bytes behind a source.
    pub async fn fetch_bytes(&self, source: &ImageSource) -> anyhow::Result<Arc<Vec<u8>>> {
        match source {
            ImageSource::Remote(url) => {
                let resp = self
                    .client
                    .get(url)
                    .send()
                    .await
                    .with_context(|| format!("GET {url}"))?;
                let status = resp.status();
                if !status.is_success() {
                    anyhow::bail!("GET {url} returned {status}");
                }
                let body = resp.bytes().await.context("read response body")?;
                Ok(Arc::new(body.to_vec()))
            }
            ImageSource::Inline { bytes, .. } => Ok(Arc::clone(bytes)),
            ImageSource::Memory(uri) => self
                .blobs
                .get(uri)
                .with_context(|| format!("no in-memory blob registered for '{uri}'")),
            ImageSource::File(path) => {
                let bytes = tokio::fs::read(path)
                    .await
                    .with_context(|| format!("read '{}'", path.display()))?;
                Ok(Arc::new(bytes))
            }
        }
    }
}

/// Source string for error messages; inline payloads are cut short.
fn summarize(raw: &str) -> String {
    const MAX: usize = 96;
    let raw = raw.trim();
    if raw.len() <= MAX {
        return raw.to_string();
    }
    let mut end = MAX;
    while !raw.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &raw[..end])
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
