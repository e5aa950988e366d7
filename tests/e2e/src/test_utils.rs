use anyhow::{Context, Result};
use common::{CatalogResponse, ErrorResponse, UploadManifest};
use reqwest::multipart::{Form, Part};
use std::fs;
use std::path::Path;
use std::process::Command;
use std::time::Duration;
use tokio::time::sleep;

/// Multipart field name the server is started with
pub const UPLOAD_FIELD: &str = "files";

/// Catalog path the server is started with
pub const CATALOG_PATH: &str = "/backup/files";

pub fn create_test_files(dir: &Path, count: usize) -> Result<()> {
    for i in 0..count {
        let filename = format!("file{}.txt", i);
        let content = format!("Test file {} content\n", i);
        let file_path = dir.join(&filename);
        fs::write(&file_path, content)
            .with_context(|| format!("Failed to create test file: {:?}", file_path))?;
    }
    Ok(())
}

pub async fn wait_for_server(url: &str) -> Result<()> {
    let client = reqwest::Client::new();
    let health_url = format!("{}/health", url);

    println!("Waiting for server to be ready...");
    for i in 0..30 {
        match client.get(&health_url).send().await {
            Ok(response) => {
                if response.status().is_success() {
                    println!("Server is ready!");
                    return Ok(());
                }
            }
            Err(_) => {
                if i < 29 {
                    sleep(Duration::from_secs(1)).await;
                }
            }
        }
    }

    anyhow::bail!("Server did not become ready within 30 seconds");
}

/// Upload every file in `test_files_dir` through the client binary
pub fn upload_files(client_binary: &Path, test_files_dir: &Path, server_url: &str) -> Result<()> {
    let mut paths = fs::read_dir(test_files_dir)
        .with_context(|| format!("Failed to read test files: {:?}", test_files_dir))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    paths.sort();

    let output = Command::new(client_binary)
        .arg("upload")
        .args(&paths)
        .arg("--server")
        .arg(server_url)
        .output()
        .with_context(|| "Failed to run upload command")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        anyhow::bail!("Upload failed:\nSTDOUT: {}\nSTDERR: {}", stdout, stderr);
    }

    println!("Upload completed successfully");
    Ok(())
}

/// Download a stored file through the client binary
pub fn download_file(
    client_binary: &Path,
    output_dir: &Path,
    server_url: &str,
    stored_name: &str,
) -> Result<()> {
    let output = Command::new(client_binary)
        .arg("download")
        .arg(stored_name)
        .arg("--output-dir")
        .arg(output_dir)
        .arg("--server")
        .arg(server_url)
        .output()
        .with_context(|| "Failed to run download command")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        anyhow::bail!("Download failed:\nSTDOUT: {}\nSTDERR: {}", stdout, stderr);
    }

    println!("Download completed successfully");
    Ok(())
}

/// Fetch the catalog directly over HTTP
pub async fn fetch_catalog(server_url: &str) -> Result<CatalogResponse> {
    let response = reqwest::get(format!("{}{}", server_url, CATALOG_PATH))
        .await
        .context("Failed to fetch catalog")?;
    if !response.status().is_success() {
        anyhow::bail!("Catalog request failed: {}", response.status());
    }
    response.json().await.context("Failed to parse catalog")
}

/// Outcome of a raw multipart upload
pub enum UploadOutcome {
    Accepted(UploadManifest),
    Rejected(u16, ErrorResponse),
}

/// Post `(original_name, content)` pairs as one multipart request
pub async fn post_files(server_url: &str, files: &[(&str, Vec<u8>)]) -> Result<UploadOutcome> {
    let mut form = Form::new();
    for (name, content) in files {
        form = form.part(
            UPLOAD_FIELD,
            Part::bytes(content.clone()).file_name(name.to_string()),
        );
    }
    post_form(server_url, form).await
}

/// Post an already built form to the upload endpoint
pub async fn post_form(server_url: &str, form: Form) -> Result<UploadOutcome> {
    let response = reqwest::Client::new()
        .post(format!("{}/upload", server_url))
        .multipart(form)
        .send()
        .await
        .context("Failed to send upload request")?;

    let status = response.status();
    if status.is_success() {
        let manifest = response.json().await.context("Failed to parse manifest")?;
        Ok(UploadOutcome::Accepted(manifest))
    } else {
        let error = response
            .json()
            .await
            .context("Failed to parse error response")?;
        Ok(UploadOutcome::Rejected(status.as_u16(), error))
    }
}

/// Fetch the raw bytes served for a retrieval path
pub async fn fetch_bytes(server_url: &str, retrieval_path: &str) -> Result<Vec<u8>> {
    let response = reqwest::get(format!("{}{}", server_url, retrieval_path))
        .await
        .context("Failed to fetch stored file")?;
    if !response.status().is_success() {
        anyhow::bail!(
            "Fetching {} failed: {}",
            retrieval_path,
            response.status()
        );
    }
    Ok(response.bytes().await?.to_vec())
}
