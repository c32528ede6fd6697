//! Data Dragon version pinning and fetch-and-cache plumbing.
//!
//! The on-disk layout mirrors the upstream dragontail archive so loaders
//! can read either a cache produced here or a manually extracted dump:
//! `<data_dir>/dragontail-<v>/<v>/data/en_US/{item,champion/*}.json`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde_json::Value;
use tracing::info;

const VERSIONS_URL: &str = "https://ddragon.leagueoflegends.com/api/versions.json";
const CDN_BASE: &str = "https://ddragon.leagueoflegends.com/cdn";
const LOCALE: &str = "en_US";
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Local Data Dragon cache bound to a data directory, plus the HTTP
/// client used to refresh it.
pub struct DragonCache {
    data_dir: PathBuf,
    http: reqwest::blocking::Client,
}

impl DragonCache {
    pub fn new(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            data_dir: data_dir.into(),
            http,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn version_file(&self) -> PathBuf {
        self.data_dir.join("version.txt")
    }

    /// Directory holding the locale data files for `version`.
    pub fn locale_dir(&self, version: &str) -> PathBuf {
        self.data_dir
            .join(format!("dragontail-{version}"))
            .join(version)
            .join("data")
            .join(LOCALE)
    }

    /// Latest game-data version according to the remote service.
    pub fn remote_version(&self) -> Result<String> {
        let versions: Vec<String> = self
            .http
            .get(VERSIONS_URL)
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .with_context(|| format!("Failed to fetch {VERSIONS_URL}"))?
            .json()
            .context("Failed to decode version list")?;
        versions
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("version list is empty"))
    }

    /// Version currently pinned on disk; `None` before the first fetch.
    pub fn local_version(&self) -> Result<Option<String>> {
        match fs::read_to_string(self.version_file()) {
            Ok(raw) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(trimmed.to_string()))
                }
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err).with_context(|| {
                format!("Failed to read {}", self.version_file().display())
            }),
        }
    }

    pub fn set_local_version(&self, version: &str) -> Result<()> {
        fs::create_dir_all(&self.data_dir).with_context(|| {
            format!("Failed to create data directory {}", self.data_dir.display())
        })?;
        fs::write(self.version_file(), version).with_context(|| {
            format!("Failed to write {}", self.version_file().display())
        })
    }

    /// Compare the pinned version against the remote one, adopting the
    /// remote version when the local pin is absent or stale. Returns
    /// true when the pin changed and the cached files need refreshing.
    pub fn update_available(&self) -> Result<bool> {
        let remote = self.remote_version()?;
        match self.local_version()? {
            None => {
                self.set_local_version(&remote)?;
                Ok(true)
            }
            Some(local) if local != remote => {
                self.set_local_version(&remote)?;
                Ok(true)
            }
            Some(_) => Ok(false),
        }
    }

    /// Refresh the cache when a newer version is available. Returns the
    /// pinned version after the check.
    ///
    /// The upstream archive ships as one large tarball; this pulls the
    /// per-file CDN endpoints for the same payloads directly into the
    /// archive's directory layout.
    pub fn fetch_update(&self) -> Result<String> {
        let updated = self.update_available()?;
        let version = self
            .local_version()?
            .ok_or_else(|| anyhow!("no version pinned after update check"))?;
        if !updated {
            info!(version = %version, "Local game data is already current");
            return Ok(version);
        }

        let locale_dir = self.locale_dir(&version);
        fs::create_dir_all(&locale_dir).with_context(|| {
            format!("Failed to create {}", locale_dir.display())
        })?;

        self.fetch_items(&version, &locale_dir)?;
        self.fetch_champions(&version, &locale_dir)?;
        crate::augments::fetch_augments(&self.http, &version, &locale_dir)?;

        info!(version = %version, dir = %locale_dir.display(), "Game data cache refreshed");
        Ok(version)
    }

    fn cdn_data_url(&self, version: &str, file: &str) -> String {
        format!("{CDN_BASE}/{version}/data/{LOCALE}/{file}")
    }

    fn fetch_json(&self, url: &str) -> Result<Value> {
        self.http
            .get(url)
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .with_context(|| format!("Failed to fetch {url}"))?
            .json()
            .with_context(|| format!("Failed to decode JSON from {url}"))
    }

    fn fetch_items(&self, version: &str, locale_dir: &Path) -> Result<()> {
        let url = self.cdn_data_url(version, "item.json");
        let payload = self.fetch_json(&url)?;
        let path = locale_dir.join("item.json");
        fs::write(&path, serde_json::to_vec(&payload)?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!(path = %path.display(), "Item data cached");
        Ok(())
    }

    /// Fetch the all-champion file and split it into the per-champion
    /// files the loader reads, matching the archive layout.
    fn fetch_champions(&self, version: &str, locale_dir: &Path) -> Result<()> {
        let url = self.cdn_data_url(version, "championFull.json");
        let payload = self.fetch_json(&url)?;
        let data = payload
            .get("data")
            .and_then(Value::as_object)
            .ok_or_else(|| anyhow!("champion payload has no data map"))?;

        let champ_dir = locale_dir.join("champion");
        fs::create_dir_all(&champ_dir)
            .with_context(|| format!("Failed to create {}", champ_dir.display()))?;

        let mut written = 0usize;
        for (champ_id, detail) in data {
            let mut data_map = serde_json::Map::new();
            data_map.insert(champ_id.clone(), detail.clone());
            let file = serde_json::json!({
                "type": "champion",
                "format": "standAloneComplex",
                "version": version,
                "data": data_map,
            });
            let path = champ_dir.join(format!("{champ_id}.json"));
            fs::write(&path, serde_json::to_vec(&file)?)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            written += 1;
        }
        info!(champions = written, dir = %champ_dir.display(), "Champion data cached");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn local_version_roundtrip() {
        let dir = tempdir().expect("temp dir");
        let cache = DragonCache::new(dir.path()).expect("cache");

        assert_eq!(cache.local_version().expect("read"), None);
        cache.set_local_version("15.4.1").expect("write");
        assert_eq!(
            cache.local_version().expect("read"),
            Some("15.4.1".to_string())
        );
    }

    #[test]
    fn local_version_trims_whitespace() {
        let dir = tempdir().expect("temp dir");
        let cache = DragonCache::new(dir.path()).expect("cache");
        fs::write(dir.path().join("version.txt"), "15.4.1\n").expect("write");
        assert_eq!(
            cache.local_version().expect("read"),
            Some("15.4.1".to_string())
        );
    }

    #[test]
    fn locale_dir_matches_archive_layout() {
        let cache = DragonCache::new("data").expect("cache");
        assert_eq!(
            cache.locale_dir("15.4.1"),
            PathBuf::from("data/dragontail-15.4.1/15.4.1/data/en_US")
        );
    }
}
