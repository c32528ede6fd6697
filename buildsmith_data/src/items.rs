//! Item file decoding and champion pool preparation.

use std::collections::HashMap;
use std::fs;

use anyhow::{Context, Result};
use serde::Deserialize;

use buildsmith_rs::ItemDescriptor;

use crate::remote::DragonCache;

/// Top-level shape of the Data Dragon item file.
#[derive(Debug, Deserialize)]
pub struct ItemFile {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub version: String,
    /// Per-item records keyed by the numeric item id.
    pub data: HashMap<String, ItemDetail>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ItemDetail {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub plaintext: String,
    /// Component item ids this item builds from.
    #[serde(default)]
    pub from: Vec<String>,
    /// Item ids this item builds into.
    #[serde(default)]
    pub into: Vec<String>,
    #[serde(default)]
    pub image: ItemImage,
    #[serde(default)]
    pub gold: ItemGold,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Map id -> availability on that map.
    #[serde(default)]
    pub maps: HashMap<String, bool>,
    #[serde(default)]
    pub stats: HashMap<String, f64>,
    #[serde(default)]
    pub depth: u32,
    #[serde(default)]
    pub consumed: bool,
    #[serde(default, rename = "inStore")]
    pub in_store: Option<bool>,
    #[serde(default, rename = "requiredChampion")]
    pub required_champion: String,
    #[serde(default, rename = "requiredAlly")]
    pub required_ally: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ItemImage {
    #[serde(default)]
    pub full: String,
    #[serde(default)]
    pub sprite: String,
    #[serde(default)]
    pub group: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ItemGold {
    #[serde(default)]
    pub base: u32,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub sell: u32,
    #[serde(default)]
    pub purchasable: bool,
}

/// An item record flattened out of the file's keyed map.
#[derive(Debug, Clone)]
pub struct Item {
    pub id: String,
    pub detail: ItemDetail,
}

/// Load every item for the pinned game-data version, sorted by id for a
/// deterministic base ordering.
pub fn load_items(cache: &DragonCache, version: &str) -> Result<Vec<Item>> {
    let path = cache.locale_dir(version).join("item.json");
    let raw = fs::read(&path)
        .with_context(|| format!("Failed to read item data from {}", path.display()))?;
    let file: ItemFile = serde_json::from_slice(&raw)
        .with_context(|| format!("Failed to decode {}", path.display()))?;

    let mut items: Vec<Item> = file
        .data
        .into_iter()
        .map(|(id, detail)| Item { id, detail })
        .collect();
    items.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(items)
}

/// Prepare the equippable pool for one champion on one map: keep items
/// available on the map whose champion restriction is empty or matches,
/// collapse duplicate names, and sort by name.
///
/// The result is the deduplicated, deterministic pool the search engine
/// expects.
pub fn champion_pool(items: &[Item], map_id: &str, champion_name: &str) -> Vec<ItemDescriptor> {
    let mut by_name: HashMap<&str, &Item> = HashMap::new();
    for item in items {
        let detail = &item.detail;
        let on_map = detail.maps.get(map_id).copied().unwrap_or(false);
        let allowed = detail.required_champion.is_empty()
            || detail.required_champion == champion_name;
        if on_map && allowed {
            by_name.entry(detail.name.as_str()).or_insert(item);
        }
    }

    let mut pool: Vec<ItemDescriptor> = by_name
        .into_values()
        .map(|item| ItemDescriptor::new(&item.id, &item.detail.name, item.detail.gold.total))
        .collect();
    pool.sort_by(|a, b| a.name.cmp(&b.name));
    pool
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "type": "item",
        "version": "15.4.1",
        "data": {
            "1001": {
                "name": "Boots",
                "plaintext": "Slightly increases Move Speed",
                "into": ["3006", "3047"],
                "gold": {"base": 300, "total": 300, "sell": 210, "purchasable": true},
                "maps": {"11": true, "12": true},
                "stats": {"FlatMovementSpeedMod": 25}
            },
            "3089": {
                "name": "Rabadon's Deathcap",
                "from": ["1026", "1058"],
                "gold": {"base": 1100, "total": 3500, "sell": 2450, "purchasable": true},
                "maps": {"11": true},
                "depth": 3
            },
            "3599": {
                "name": "Kalista's Black Spear",
                "gold": {"base": 0, "total": 0, "sell": 0, "purchasable": true},
                "maps": {"11": true},
                "requiredChampion": "Kalista"
            },
            "9001": {
                "name": "Boots",
                "gold": {"base": 300, "total": 300, "sell": 210, "purchasable": true},
                "maps": {"11": true}
            },
            "2010": {
                "name": "Total Biscuit of Everlasting Will",
                "gold": {"base": 75, "total": 75, "sell": 30, "purchasable": false},
                "maps": {"12": true},
                "consumed": true
            }
        }
    }"#;

    fn sample_items() -> Vec<Item> {
        let file: ItemFile = serde_json::from_str(SAMPLE).expect("sample decodes");
        let mut items: Vec<Item> = file
            .data
            .into_iter()
            .map(|(id, detail)| Item { id, detail })
            .collect();
        items.sort_by(|a, b| a.id.cmp(&b.id));
        items
    }

    #[test]
    fn decodes_nested_fields() {
        let items = sample_items();
        let deathcap = items.iter().find(|item| item.id == "3089").unwrap();
        assert_eq!(deathcap.detail.name, "Rabadon's Deathcap");
        assert_eq!(deathcap.detail.gold.total, 3500);
        assert_eq!(deathcap.detail.from, vec!["1026", "1058"]);
        assert_eq!(deathcap.detail.depth, 3);
        assert!(deathcap.detail.maps["11"]);
    }

    #[test]
    fn pool_filters_by_map() {
        let items = sample_items();
        let pool = champion_pool(&items, "11", "Ahri");
        // The biscuit is map-12 only; the Kalista spear is gated.
        assert!(pool.iter().all(|item| item.name != "Total Biscuit of Everlasting Will"));
        assert!(pool.iter().all(|item| item.name != "Kalista's Black Spear"));
    }

    #[test]
    fn pool_respects_required_champion() {
        let items = sample_items();
        let pool = champion_pool(&items, "11", "Kalista");
        assert!(pool.iter().any(|item| item.name == "Kalista's Black Spear"));
    }

    #[test]
    fn pool_dedupes_by_name_and_sorts() {
        let items = sample_items();
        let pool = champion_pool(&items, "11", "Ahri");
        let boots: Vec<_> = pool.iter().filter(|item| item.name == "Boots").collect();
        assert_eq!(boots.len(), 1, "duplicate names must collapse");
        let names: Vec<_> = pool.iter().map(|item| item.name.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted, "pool must be name-sorted");
    }
}
