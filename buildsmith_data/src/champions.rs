//! Champion file decoding, lookup, and level scaling.

use std::collections::HashMap;
use std::fs;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::remote::DragonCache;

/// Per-champion data file: one entry in `data`, keyed by champion id.
#[derive(Debug, Deserialize)]
struct ChampionFile {
    data: HashMap<String, Champion>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Champion {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub lore: String,
    #[serde(default)]
    pub blurb: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub partype: String,
    #[serde(default)]
    pub info: ChampionInfo,
    pub stats: ChampionStats,
    #[serde(default)]
    pub spells: Vec<SpellDetail>,
    #[serde(default)]
    pub passive: Option<PassiveDetail>,
}

#[derive(Debug, Clone, Copy, Deserialize, Default)]
pub struct ChampionInfo {
    #[serde(default)]
    pub attack: i32,
    #[serde(default)]
    pub defense: i32,
    #[serde(default)]
    pub magic: i32,
    #[serde(default)]
    pub difficulty: i32,
}

/// Base stats plus per-level growth, straight from the data file.
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq)]
pub struct ChampionStats {
    #[serde(default)]
    pub hp: f64,
    #[serde(default, rename = "hpperlevel")]
    pub hp_per_level: f64,
    #[serde(default)]
    pub mp: f64,
    #[serde(default, rename = "mpperlevel")]
    pub mp_per_level: f64,
    #[serde(default, rename = "movespeed")]
    pub move_speed: f64,
    #[serde(default)]
    pub armor: f64,
    #[serde(default, rename = "armorperlevel")]
    pub armor_per_level: f64,
    #[serde(default, rename = "spellblock")]
    pub spell_block: f64,
    #[serde(default, rename = "spellblockperlevel")]
    pub spell_block_per_level: f64,
    #[serde(default, rename = "attackrange")]
    pub attack_range: f64,
    #[serde(default, rename = "hpregen")]
    pub hp_regen: f64,
    #[serde(default, rename = "hpregenperlevel")]
    pub hp_regen_per_level: f64,
    #[serde(default, rename = "mpregen")]
    pub mp_regen: f64,
    #[serde(default, rename = "mpregenperlevel")]
    pub mp_regen_per_level: f64,
    #[serde(default)]
    pub crit: f64,
    #[serde(default, rename = "critperlevel")]
    pub crit_per_level: f64,
    #[serde(default, rename = "attackdamage")]
    pub attack_damage: f64,
    #[serde(default, rename = "attackdamageperlevel")]
    pub attack_damage_per_level: f64,
    #[serde(default, rename = "attackspeed")]
    pub attack_speed: f64,
    #[serde(default, rename = "attackspeedperlevel")]
    pub attack_speed_per_level: f64,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SpellDetail {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cooldown: Vec<f64>,
    #[serde(default)]
    pub cost: Vec<f64>,
    #[serde(default)]
    pub range: Vec<f64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct PassiveDetail {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Load every champion for the pinned version from the per-champion
/// files in the cache's `champion/` directory, sorted by name.
pub fn load_champions(cache: &DragonCache, version: &str) -> Result<Vec<Champion>> {
    let champ_dir = cache.locale_dir(version).join("champion");
    let entries = fs::read_dir(&champ_dir)
        .with_context(|| format!("Failed to read champion data from {}", champ_dir.display()))?;

    let mut champions = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("Failed to list {}", champ_dir.display()))?
            .path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }
        let raw = fs::read(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let file: ChampionFile = serde_json::from_slice(&raw)
            .with_context(|| format!("Failed to decode {}", path.display()))?;
        champions.extend(file.data.into_values());
    }
    champions.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(champions)
}

/// Case-insensitive champion lookup by display name.
pub fn find_champion<'a>(champions: &'a [Champion], name: &str) -> Option<&'a Champion> {
    champions
        .iter()
        .find(|champion| champion.name.eq_ignore_ascii_case(name))
}

/// Growth multiplier for a champion level: `(n-1) × (0.7025 + 0.0175 × (n-1))`.
fn growth(level: u32) -> f64 {
    let steps = f64::from(level - 1);
    steps * (0.7025 + 0.0175 * steps)
}

/// Scale base stats to `level` using the standard growth curve. Flat
/// stats grow additively; attack speed grows as a percentage bonus on
/// the base value. Move speed, range, and crit-per-level handling match
/// the data file semantics (crit growth is additive like the rest).
pub fn stats_at_level(base: &ChampionStats, level: u32) -> Result<ChampionStats> {
    if level < 1 {
        bail!("level must be at least 1");
    }
    let g = growth(level);
    Ok(ChampionStats {
        hp: base.hp + base.hp_per_level * g,
        mp: base.mp + base.mp_per_level * g,
        armor: base.armor + base.armor_per_level * g,
        spell_block: base.spell_block + base.spell_block_per_level * g,
        hp_regen: base.hp_regen + base.hp_regen_per_level * g,
        mp_regen: base.mp_regen + base.mp_regen_per_level * g,
        crit: base.crit + base.crit_per_level * g,
        attack_damage: base.attack_damage + base.attack_damage_per_level * g,
        attack_speed: base.attack_speed * (1.0 + base.attack_speed_per_level / 100.0 * g),
        move_speed: base.move_speed,
        attack_range: base.attack_range,
        ..*base
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "type": "champion",
        "format": "standAloneComplex",
        "version": "15.4.1",
        "data": {
            "Ahri": {
                "id": "Ahri",
                "key": "103",
                "name": "Ahri",
                "title": "the Nine-Tailed Fox",
                "tags": ["Mage", "Assassin"],
                "partype": "Mana",
                "info": {"attack": 3, "defense": 4, "magic": 8, "difficulty": 5},
                "stats": {
                    "hp": 590, "hpperlevel": 104,
                    "mp": 418, "mpperlevel": 25,
                    "movespeed": 330,
                    "armor": 21, "armorperlevel": 4.7,
                    "spellblock": 30, "spellblockperlevel": 1.3,
                    "attackrange": 550,
                    "hpregen": 2.5, "hpregenperlevel": 0.6,
                    "mpregen": 8, "mpregenperlevel": 0.8,
                    "crit": 0, "critperlevel": 0,
                    "attackdamage": 53, "attackdamageperlevel": 3,
                    "attackspeed": 0.668, "attackspeedperlevel": 2.2
                },
                "passive": {"name": "Essence Theft", "description": "..."}
            }
        }
    }"#;

    fn ahri() -> Champion {
        let file: ChampionFile = serde_json::from_str(SAMPLE).expect("sample decodes");
        file.data.into_values().next().expect("one champion")
    }

    #[test]
    fn decodes_stats_and_passive() {
        let champion = ahri();
        assert_eq!(champion.name, "Ahri");
        assert_eq!(champion.stats.hp, 590.0);
        assert_eq!(champion.stats.attack_speed_per_level, 2.2);
        assert_eq!(champion.passive.as_ref().unwrap().name, "Essence Theft");
        assert!(champion.spells.is_empty());
    }

    #[test]
    fn find_is_case_insensitive() {
        let champions = vec![ahri()];
        assert!(find_champion(&champions, "AHRI").is_some());
        assert!(find_champion(&champions, "ahri").is_some());
        assert!(find_champion(&champions, "Annie").is_none());
    }

    #[test]
    fn level_one_is_the_base() {
        let base = ahri().stats;
        let leveled = stats_at_level(&base, 1).expect("level 1");
        assert_eq!(leveled, base);
    }

    #[test]
    fn level_eighteen_growth_multiplier_is_seventeen() {
        // (18-1) × (0.7025 + 0.0175 × 17) = 17 × 1.0 = exactly 17.
        let base = ahri().stats;
        let leveled = stats_at_level(&base, 18).expect("level 18");
        assert_eq!(leveled.hp, 590.0 + 104.0 * 17.0);
        assert_eq!(leveled.attack_damage, 53.0 + 3.0 * 17.0);
        // Attack speed bonus is a percentage of the base.
        let expected_as = 0.668 * (1.0 + 2.2 / 100.0 * 17.0);
        assert!((leveled.attack_speed - expected_as).abs() < 1e-12);
        // Flat, non-growing stats stay put.
        assert_eq!(leveled.move_speed, 330.0);
        assert_eq!(leveled.attack_range, 550.0);
    }

    #[test]
    fn level_zero_is_rejected() {
        assert!(stats_at_level(&ahri().stats, 0).is_err());
    }
}
