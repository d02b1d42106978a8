//! Artwork fetching with an on-disk cache.
//!
//! Cards never show the image itself; a load only has to prove the bytes
//! decode to a non-empty picture.  The decoded dimensions are shown instead.
//!
//! Cache files are named by a blake3 digest of the URL.  Nothing prunes the
//! directory; it grows with every distinct artwork URL ever loaded.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use tracing::{debug, warn};

use crate::reveal::ArtworkOutcome;

#[derive(Clone)]
pub struct ArtworkLoader {
    client: reqwest::Client,
    cache_dir: PathBuf,
}

impl ArtworkLoader {
    pub fn new(cache_dir: PathBuf, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("p0dcast/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("building artwork http client")?;
        Ok(Self { client, cache_dir })
    }

    pub fn cache_path(&self, url: &str) -> PathBuf {
        cache_path_in(&self.cache_dir, url)
    }

    /// Fetch `url` (or read it from the cache) and read its dimensions.
    /// Every failure is folded into `ArtworkOutcome::Fallback`.
    pub async fn load(&self, url: &str) -> ArtworkOutcome {
        let path = self.cache_path(url);
        if let Ok(bytes) = tokio::fs::read(&path).await {
            if let Some((width, height)) = read_dimensions(&bytes) {
                return ArtworkOutcome::Loaded { width, height };
            }
            debug!("artwork cache entry {} unreadable, refetching", path.display());
        }

        let bytes = match self.fetch(url).await {
            Ok(b) => b,
            Err(e) => {
                debug!("artwork {}: {:#}", url, e);
                return ArtworkOutcome::Fallback(format!("{:#}", e));
            }
        };
        let Some((width, height)) = read_dimensions(&bytes) else {
            return ArtworkOutcome::Fallback("not a decodable image".into());
        };
        if let Err(e) = self.store(&path, &bytes).await {
            warn!("artwork cache write failed: {:#}", e);
        }
        ArtworkOutcome::Loaded { width, height }
    }

    async fn fetch(&self, url: &str) -> anyhow::Result<Vec<u8>> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("HTTP {}", status);
        }
        Ok(resp.bytes().await?.to_vec())
    }

    async fn store(&self, path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
        tokio::fs::create_dir_all(&self.cache_dir).await?;
        tokio::fs::write(path, bytes)
            .await
            .with_context(|| format!("writing {}", path.display()))
    }
}

fn cache_path_in(dir: &Path, url: &str) -> PathBuf {
    let digest = blake3::hash(url.as_bytes()).to_hex();
    dir.join(format!("{}.img", &digest.as_str()[..32]))
}

/// Width and height of an encoded image, `None` when it does not decode or
/// has zero width.
pub fn read_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    let (w, h) = image::io::Reader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()?;
    (w > 0).then_some((w, h))
}
