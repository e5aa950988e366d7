use crate::config::ensure_success;
use crate::constants::DOWNLOADED_DIR;
use anyhow::{Context, Result};
use common::file_utils;
use log::info;
use reqwest::blocking::Client;
use std::fs;
use std::path::{Path, PathBuf};

/// Handles file downloads from the static file route
pub struct FileDownloader {
    server: String,
    client: Client,
}

impl FileDownloader {
    /// Create a new file downloader
    pub fn new(server: String) -> Self {
        Self {
            server,
            client: Client::new(),
        }
    }

    /// Download a stored file into `output_dir`, returning the written path
    pub fn download(&self, stored_name: &str, output_dir: &Path) -> Result<PathBuf> {
        // Validate filename to prevent path traversal when writing locally
        file_utils::validate_filename(stored_name)
            .map_err(|e| anyhow::anyhow!("{}: {}", e.message(), stored_name))?;

        let url = format!(
            "{}{}",
            self.server,
            file_utils::retrieval_path(stored_name)
        );
        info!("Downloading {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .context("Failed to connect to server")?;
        let bytes = ensure_success(response, "Download")?
            .bytes()
            .context("Failed to read response body")?;

        fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create output directory: {:?}", output_dir))?;
        let output_path = output_dir.join(stored_name);
        fs::write(&output_path, &bytes)
            .with_context(|| format!("Failed to write file: {:?}", output_path))?;

        info!("Saved {} bytes to {:?}", bytes.len(), output_path);
        Ok(output_path)
    }
}

/// Download a stored file and print where it landed
pub fn download_file(server: &str, stored_name: &str, output_dir: Option<&PathBuf>) -> Result<()> {
    let output_dir = output_dir
        .cloned()
        .unwrap_or_else(|| PathBuf::from(DOWNLOADED_DIR));
    let downloader = FileDownloader::new(server.to_string());
    let path = downloader.download(stored_name, &output_dir)?;
    println!("Downloaded {} to {}", stored_name, path.display());
    Ok(())
}
