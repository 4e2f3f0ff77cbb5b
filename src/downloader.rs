use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures_util::StreamExt;
use log::debug;
use reqwest::header::{HeaderValue, ACCEPT};
use reqwest::Client;

use crate::error::{DownloadFailure, Error, Result};
use crate::models::Asset;

/// Callback type for reporting download progress.
/// Arguments: asset name, bytes downloaded, total bytes (0 if unknown), is_complete
pub type ProgressFn = Arc<dyn Fn(&str, u64, u64, bool) + Send + Sync>;

/// Streams release assets to disk.
pub struct Downloader {
    client: Client,
    /// Optional progress callback.
    pub progress: Option<ProgressFn>,
}

impl Downloader {
    pub fn new(client: Client, progress: Option<ProgressFn>) -> Self {
        Self { client, progress }
    }

    /// Where `asset` lands: `output` if given, otherwise the asset's own file
    /// name in the current directory.
    pub fn destination(asset: &Asset, output: Option<&Path>) -> Result<PathBuf> {
        if let Some(output) = output {
            return Ok(output.to_path_buf());
        }
        // Only the last component, so a hostile asset name cannot escape the directory.
        Path::new(&asset.name)
            .file_name()
            .map(PathBuf::from)
            .ok_or_else(|| Error::Download {
                url: asset.download_url.clone(),
                path: PathBuf::from(&asset.name),
                source: DownloadFailure::InvalidFileName(asset.name.clone()),
            })
    }

    /// Stream `asset` into `dest`, replacing any existing file.
    ///
    /// A failed transfer leaves whatever was written so far in place.
    pub async fn download(&self, asset: &Asset, dest: &Path) -> Result<()> {
        let fail = |source: DownloadFailure| Error::Download {
            url: asset.download_url.clone(),
            path: dest.to_path_buf(),
            source,
        };

        debug!("downloading {} to {}", asset.download_url, dest.display());
        let resp = self
            .client
            .get(&asset.download_url)
            .header(ACCEPT, HeaderValue::from_static("application/octet-stream"))
            .send()
            .await
            .map_err(|e| fail(e.into()))?;
        if !resp.status().is_success() {
            return Err(fail(DownloadFailure::Status(resp.status())));
        }

        let total = resp.content_length().unwrap_or(0);
        let mut downloaded: u64 = 0;
        let mut stream = resp.bytes_stream();
        let mut file = std::fs::File::create(dest).map_err(|e| fail(e.into()))?;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| fail(e.into()))?;
            file.write_all(&chunk).map_err(|e| fail(e.into()))?;
            downloaded += chunk.len() as u64;

            if let Some(progress) = &self.progress {
                progress(&asset.name, downloaded, total, false);
            }
        }
        file.flush().map_err(|e| fail(e.into()))?;

        if let Some(progress) = &self.progress {
            progress(&asset.name, downloaded, total, true);
        }
        debug!("wrote {downloaded} bytes to {}", dest.display());

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(name: &str) -> Asset {
        Asset {
            name: name.to_owned(),
            download_url: format!("https://example.com/download/{name}"),
            size: 1,
        }
    }

    #[test]
    fn destination_defaults_to_asset_name() {
        let dest = Downloader::destination(&asset("codium_1.0.0_amd64.deb"), None).unwrap();
        assert_eq!(dest, PathBuf::from("codium_1.0.0_amd64.deb"));
    }

    #[test]
    fn destination_override_wins() {
        let dest =
            Downloader::destination(&asset("codium.deb"), Some(Path::new("out/c.deb"))).unwrap();
        assert_eq!(dest, PathBuf::from("out/c.deb"));
    }

    #[test]
    fn destination_strips_directories() {
        let dest = Downloader::destination(&asset("../../etc/passwd"), None).unwrap();
        assert_eq!(dest, PathBuf::from("passwd"));

        let err = Downloader::destination(&asset(".."), None).unwrap_err();
        assert!(matches!(
            err,
            Error::Download {
                source: DownloadFailure::InvalidFileName(_),
                ..
            }
        ));
    }
}
