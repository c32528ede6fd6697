//! Arena augment data: fetched from the community mirror, cached next to
//! the rest of the versioned game data.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

const AUGMENTS_FILE: &str = "augments.json";

#[derive(Debug, Serialize, Deserialize)]
pub struct AugmentsFile {
    #[serde(default)]
    pub augments: Vec<Augment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Augment {
    #[serde(default, rename = "apiName")]
    pub api_name: String,
    #[serde(default, rename = "dataValues")]
    pub data_values: HashMap<String, f64>,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub rarity: i32,
    #[serde(default)]
    pub tooltip: String,
}

/// Drop the patch component of a full version: "15.4.1" -> "15.4".
/// The community mirror is keyed by major.minor only.
pub fn trim_patch(version: &str) -> &str {
    match version.rfind('.') {
        Some(idx) => &version[..idx],
        None => version,
    }
}

fn mirror_url(version: &str) -> String {
    format!(
        "https://raw.communitydragon.org/{}/cdragon/arena/en_us.json",
        trim_patch(version)
    )
}

/// Fetch the augment payload for `version` and cache it under the
/// locale directory's `augments/` subdirectory.
pub fn fetch_augments(
    http: &reqwest::blocking::Client,
    version: &str,
    locale_dir: &Path,
) -> Result<()> {
    let url = mirror_url(version);
    let payload: AugmentsFile = http
        .get(&url)
        .send()
        .and_then(reqwest::blocking::Response::error_for_status)
        .with_context(|| format!("Failed to fetch {url}"))?
        .json()
        .context("Failed to decode augment payload")?;

    let dir = locale_dir.join("augments");
    fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    let path = dir.join(AUGMENTS_FILE);
    fs::write(&path, serde_json::to_vec(&payload)?)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!(augments = payload.augments.len(), path = %path.display(), "Augment data cached");
    Ok(())
}

/// Load cached augments for the pinned version.
pub fn load_augments(locale_dir: &Path) -> Result<Vec<Augment>> {
    let path = locale_dir.join("augments").join(AUGMENTS_FILE);
    let raw = fs::read(&path)
        .with_context(|| format!("Failed to read augment data from {}", path.display()))?;
    let file: AugmentsFile = serde_json::from_slice(&raw)
        .with_context(|| format!("Failed to decode {}", path.display()))?;
    Ok(file.augments)
}
