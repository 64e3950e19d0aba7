use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::info;

use attendance_domain::ports::CredentialArchive;

/// Keeps issued credential images as PNG files in one directory.
pub struct CredentialFileArchive {
    dir: PathBuf,
}

impl CredentialFileArchive {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl CredentialArchive for CredentialFileArchive {
    async fn retain(&self, file_name: &str, bytes: &[u8]) -> anyhow::Result<String> {
        // Names come from credential_file_name, but never trust a separator.
        let name = Path::new(file_name)
            .file_name()
            .ok_or_else(|| anyhow::anyhow!("invalid credential file name: {}", file_name))?;
        if !self.dir.as_os_str().is_empty() {
            fs::create_dir_all(&self.dir).await?;
        }
        let path = self.dir.join(name);
        fs::write(&path, bytes).await?;
        let location = path.to_string_lossy().to_string();
        info!("credential saved: {}", location);
        Ok(location)
    }
}
