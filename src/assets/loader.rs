use std::path::{Path, PathBuf};

use anyhow::Context;
use base64::Engine as _;

use crate::foundation::error::{ImprintError, ImprintResult};

/// Async byte loader for declared asset sources.
///
/// Supported sources:
///
/// - `data:<mime>;base64,<payload>`
/// - `http://` and `https://` URLs
/// - `file://` URLs and absolute paths
/// - relative paths starting with `.`, resolved against the loader's working directory
#[derive(Clone, Debug)]
pub struct AssetLoader {
    cwd: PathBuf,
}

impl AssetLoader {
    /// Create a loader resolving relative paths against `cwd`.
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self { cwd: cwd.into() }
    }

    /// Create a loader rooted at the process working directory.
    pub fn from_process_cwd() -> ImprintResult<Self> {
        let cwd = std::env::current_dir().context("resolve process working directory")?;
        Ok(Self::new(cwd))
    }

    /// Directory relative paths resolve against.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Load the raw bytes behind `source`.
    #[tracing::instrument(skip(self), level = "debug")]
    pub async fn load(&self, source: &str) -> ImprintResult<Vec<u8>> {
        if let Some(rest) = source.strip_prefix("data:") {
            return decode_data_url(source, rest);
        }
        if source.starts_with("http://") || source.starts_with("https://") {
            return fetch_remote(source).await;
        }
        if let Some(path) = source.strip_prefix("file://") {
            return read_existing(source, Path::new(path)).await;
        }
        let path = Path::new(source);
        if path.is_absolute() {
            return read_existing(source, path).await;
        }
        if source.starts_with('.') {
            return read_existing(source, &self.cwd.join(path)).await;
        }
        Err(ImprintError::load(source, "unsupported asset source"))
    }
}

fn decode_data_url(source: &str, rest: &str) -> ImprintResult<Vec<u8>> {
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| ImprintError::load(source, "malformed data url"))?;
    let is_base64 = header.split(';').skip(1).any(|p| p == "base64");
    if !is_base64 {
        return Err(ImprintError::load(
            source,
            "only base64 data urls are supported",
        ));
    }
    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| ImprintError::load(source, format!("invalid base64 payload: {e}")))
}

async fn read_existing(source: &str, path: &Path) -> ImprintResult<Vec<u8>> {
    let exists = tokio::fs::try_exists(path)
        .await
        .with_context(|| format!("check asset path '{}'", path.display()))?;
    if !exists {
        return Err(ImprintError::load(
            source,
            format!(
                "the file you are trying to load does not exist ({})",
                path.display()
            ),
        ));
    }
    tokio::fs::read(path)
        .await
        .with_context(|| format!("read asset bytes from '{}'", path.display()))
        .map_err(ImprintError::from)
}

async fn fetch_remote(url: &str) -> ImprintResult<Vec<u8>> {
    let response = reqwest::get(url)
        .await
        .map_err(|e| ImprintError::load(url, format!("request failed: {e}")))?;
    let response = response
        .error_for_status()
        .map_err(|e| ImprintError::load(url, format!("bad response: {e}")))?;
    let bytes = response
        .bytes()
        .await
        .map_err(|e| ImprintError::load(url, format!("reading body failed: {e}")))?;
    Ok(bytes.to_vec())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
