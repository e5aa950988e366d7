use crate::config::ensure_success;
use crate::constants::UPLOAD_ENDPOINT;
use anyhow::{Context, Result};
use common::UploadManifest;
use log::info;
use reqwest::blocking::{multipart, Client};
use std::path::PathBuf;

/// Uploads a set of local files in a single multipart request
pub struct FileUploader {
    server: String,
    field_name: String,
    client: Client,
}

impl FileUploader {
    /// Create a new file uploader
    pub fn new(server: String, field_name: String) -> Self {
        Self {
            server,
            field_name,
            client: Client::new(),
        }
    }

    /// Upload every path as one batch; the server accepts all of them or none
    pub fn upload(&self, paths: &[PathBuf]) -> Result<UploadManifest> {
        if paths.is_empty() {
            anyhow::bail!("No files given to upload");
        }

        let form = self.build_multipart_form(paths)?;
        let url = format!("{}{}", self.server, UPLOAD_ENDPOINT);
        info!("Uploading {} files to {}", paths.len(), url);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .context("Failed to connect to server")?;

        let manifest: UploadManifest = ensure_success(response, "Upload")?
            .json()
            .context("Failed to parse upload manifest")?;

        info!("Uploaded {} files", manifest.count);
        Ok(manifest)
    }

    /// Build the multipart form, one file part per path under the upload field
    fn build_multipart_form(&self, paths: &[PathBuf]) -> Result<multipart::Form> {
        let mut form = multipart::Form::new();
        for path in paths {
            if !path.is_file() {
                anyhow::bail!("Not a regular file: {:?}", path);
            }
            form = form
                .file(self.field_name.clone(), path)
                .with_context(|| format!("Failed to read file: {:?}", path))?;
        }
        Ok(form)
    }
}

/// Upload files and print the manifest
pub fn upload_files(server: &str, field_name: &str, paths: &[PathBuf]) -> Result<()> {
    let uploader = FileUploader::new(server.to_string(), field_name.to_string());
    let manifest = uploader.upload(paths)?;

    println!("{} ({} files)", manifest.message, manifest.count);
    for file in &manifest.files {
        println!(
            "  {} -> {} ({} bytes) {}{}",
            file.originalname, file.filename, file.size, server, file.url
        );
    }
    Ok(())
}

