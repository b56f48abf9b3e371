use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use log::info;
use reqwest::blocking::Client;
use tempfile::NamedTempFile;

use relay_engine::data::read_challenge_from_file;

const DEFAULT_URL: &str = "https://space-fast-track.herokuapp.com/generate";
const DEFAULT_OUTPUT: &str = "data/challenge.txt";

fn main() -> Result<()> {
    env_logger::init();

    let url = env::var("CHALLENGE_URL").unwrap_or_else(|_| DEFAULT_URL.to_string());
    let output = PathBuf::from(
        env::var("CHALLENGE_OUTPUT").unwrap_or_else(|_| DEFAULT_OUTPUT.to_string()),
    );

    let client = Client::builder()
        .user_agent("relay-engine-challenge-fetch/0.1")
        .build()?;

    info!("Downloading challenge from {}", url);
    let temp_file = download_challenge(&client, &url)?;

    let challenge = read_challenge_from_file(temp_file.path())
        .with_context(|| format!("challenge from {url} does not parse"))?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::copy(temp_file.path(), &output)
        .with_context(|| format!("failed to write challenge to {}", output.display()))?;

    info!(
        "Wrote challenge to {} ({} relays, {} comment lines)",
        output.display(),
        challenge.relays.len(),
        challenge.comments.len()
    );

    Ok(())
}

fn download_challenge(client: &Client, url: &str) -> Result<NamedTempFile> {
    let mut response = client
        .get(url)
        .send()
        .with_context(|| format!("failed to download {url}"))?
        .error_for_status()
        .context("challenge generator returned an error status")?;
    let mut file = NamedTempFile::new()?;
    response.copy_to(&mut file)?;
    Ok(file)
}
