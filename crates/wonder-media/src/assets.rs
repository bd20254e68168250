//! Asset directory: generated files served under a public URL prefix.

use std::io;
use std::path::{Path, PathBuf};

/// Public mount point of the asset directory.
pub const ASSET_URL_PREFIX: &str = "/uploaded_images";

#[derive(Debug, Clone)]
pub struct AssetDir {
    dir: PathBuf,
    url_prefix: String,
}

impl AssetDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            url_prefix: ASSET_URL_PREFIX.to_string(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    pub fn url_for(&self, file_name: &str) -> String {
        format!("{}/{}", self.url_prefix, file_name)
    }

    /// Write `bytes` as `file_name`, creating the directory if needed.
    /// Returns the public URL.
    pub async fn save(&self, file_name: &str, bytes: &[u8]) -> io::Result<String> {
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.dir.join(file_name), bytes).await?;
        Ok(self.url_for(file_name))
    }
}
