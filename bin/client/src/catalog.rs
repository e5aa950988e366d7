use crate::config::ensure_success;
use anyhow::{Context, Result};
use common::CatalogResponse;
use log::info;
use reqwest::blocking::Client;

/// Fetch the catalog of stored files
pub fn fetch_catalog(server: &str, catalog_path: &str) -> Result<CatalogResponse> {
    let url = format!("{}{}", server, catalog_path);
    info!("Fetching catalog from {}", url);

    let response = Client::new()
        .get(&url)
        .send()
        .context("Failed to connect to server")?;

    ensure_success(response, "Listing")?
        .json()
        .context("Failed to parse catalog")
}

/// Print the catalog in the order the server returned it
pub fn list_files(server: &str, catalog_path: &str) -> Result<()> {
    let catalog = fetch_catalog(server, catalog_path)?;

    println!("{} stored files", catalog.count);
    for file in &catalog.files {
        println!(
            "  {:<48} {:>12} bytes  {}  {}",
            file.filename,
            file.size,
            file.modified.to_rfc3339(),
            file.url
        );
    }
    Ok(())
}
