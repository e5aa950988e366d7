use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Names of the regular files directly inside the backup directory
pub fn stored_files(server_data_dir: &Path) -> Result<BTreeSet<String>> {
    let mut names = BTreeSet::new();
    for entry in fs::read_dir(server_data_dir)
        .with_context(|| format!("Failed to read backup directory: {:?}", server_data_dir))?
    {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            names.insert(entry.file_name().to_string_lossy().into_owned());
        }
    }
    Ok(names)
}

/// Check that every uploaded test file landed in the backup directory under
/// a `<millis>-<name>` stored name with its original content
pub fn validate_upload(
    server_data_dir: &Path,
    test_files_dir: &Path,
    expected_file_count: usize,
) -> Result<()> {
    if !server_data_dir.exists() {
        anyhow::bail!("Backup directory does not exist: {:?}", server_data_dir);
    }

    println!("  ✓ Backup directory exists: {:?}", server_data_dir);

    let stored = stored_files(server_data_dir)?;

    for i in 0..expected_file_count {
        let filename = format!("file{}.txt", i);
        let expected = fs::read(test_files_dir.join(&filename))
            .with_context(|| format!("Failed to read test file: {}", filename))?;

        let matches: Vec<&String> = stored
            .iter()
            .filter(|name| is_stored_name_for(name, &filename))
            .collect();

        let found = matches.iter().any(|name| {
            fs::read(server_data_dir.join(name))
                .map(|content| content == expected)
                .unwrap_or(false)
        });

        if !found {
            anyhow::bail!(
                "No stored file for {} with matching content (candidates: {:?})",
                filename,
                matches
            );
        }
    }

    println!(
        "  ✓ All {} files stored with original content",
        expected_file_count
    );

    let staging = server_data_dir.join(".incoming");
    if staging.exists() && fs::read_dir(&staging)?.next().is_some() {
        anyhow::bail!("Staging directory is not empty: {:?}", staging);
    }

    println!("  ✓ No staging leftovers");

    Ok(())
}

/// Check that a download matches the stored file byte for byte
pub fn validate_downloaded_file(
    server_data_dir: &Path,
    output_dir: &Path,
    stored_name: &str,
) -> Result<()> {
    let downloaded_path = output_dir.join(stored_name);

    if !downloaded_path.exists() {
        anyhow::bail!("Downloaded file does not exist: {:?}", downloaded_path);
    }

    let downloaded = fs::read(&downloaded_path)
        .with_context(|| format!("Failed to read downloaded file: {:?}", downloaded_path))?;
    let stored = fs::read(server_data_dir.join(stored_name))
        .with_context(|| format!("Failed to read stored file: {}", stored_name))?;

    if downloaded != stored {
        anyhow::bail!(
            "Downloaded file differs from stored file: {} vs {} bytes",
            downloaded.len(),
            stored.len()
        );
    }

    println!(
        "  ✓ Downloaded file matches stored file ({} bytes)",
        downloaded.len()
    );

    Ok(())
}

/// `<digits>-<original>`
pub fn is_stored_name_for(stored_name: &str, original: &str) -> bool {
    match stored_name.split_once('-') {
        Some((millis, rest)) => {
            !millis.is_empty() && millis.bytes().all(|b| b.is_ascii_digit()) && rest == original
        }
        None => false,
    }
}
