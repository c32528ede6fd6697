//! Statically-declared champion stat field table.
//!
//! Anything that needs to walk "all numeric champion stats" (the CLI
//! stat block, future exporters) goes through this table instead of
//! inspecting struct fields at runtime.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::champions::ChampionStats;

/// One named champion stat with its accessor.
pub struct StatField {
    /// Machine name, matching the data-file key.
    pub name: &'static str,
    /// Human-readable label for display.
    pub label: &'static str,
    pub get: fn(&ChampionStats) -> f64,
}

/// Every numeric champion stat, in display order.
pub static STAT_FIELDS: &[StatField] = &[
    StatField { name: "hp", label: "Health", get: |s| s.hp },
    StatField { name: "mp", label: "Resource", get: |s| s.mp },
    StatField { name: "attackdamage", label: "Attack Damage", get: |s| s.attack_damage },
    StatField { name: "attackspeed", label: "Attack Speed", get: |s| s.attack_speed },
    StatField { name: "armor", label: "Armor", get: |s| s.armor },
    StatField { name: "spellblock", label: "Magic Resist", get: |s| s.spell_block },
    StatField { name: "movespeed", label: "Move Speed", get: |s| s.move_speed },
    StatField { name: "attackrange", label: "Attack Range", get: |s| s.attack_range },
    StatField { name: "hpregen", label: "Health Regen", get: |s| s.hp_regen },
    StatField { name: "mpregen", label: "Resource Regen", get: |s| s.mp_regen },
    StatField { name: "crit", label: "Critical Chance", get: |s| s.crit },
];

static STAT_INDEX: Lazy<HashMap<&'static str, &'static StatField>> = Lazy::new(|| {
    STAT_FIELDS
        .iter()
        .map(|field| (field.name, field))
        .collect()
});

pub fn stat_fields() -> &'static [StatField] {
    STAT_FIELDS
}

/// Look up a stat field by its machine name, case-insensitively.
pub fn find_stat(name: &str) -> Option<&'static StatField> {
    let lower = name.to_ascii_lowercase();
    STAT_INDEX.get(lower.as_str()).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_stats() -> ChampionStats {
        ChampionStats {
            hp: 590.0,
            attack_damage: 53.0,
            attack_speed: 0.668,
            move_speed: 330.0,
            ..ChampionStats::default()
        }
    }

    #[test]
    fn table_covers_the_core_stats_once() {
        let mut names: Vec<_> = STAT_FIELDS.iter().map(|field| field.name).collect();
        names.sort_unstable();
        let before = names.len();
        names.dedup();
        assert_eq!(names.len(), before, "duplicate stat names in the table");
        assert!(names.contains(&"hp"));
        assert!(names.contains(&"attackdamage"));
        assert!(names.contains(&"movespeed"));
    }

    #[test]
    fn accessors_read_the_right_field() {
        let stats = sample_stats();
        assert_eq!((find_stat("hp").unwrap().get)(&stats), 590.0);
        assert_eq!((find_stat("attackdamage").unwrap().get)(&stats), 53.0);
        assert_eq!((find_stat("MoveSpeed").unwrap().get)(&stats), 330.0);
    }

    #[test]
    fn unknown_stat_is_none() {
        assert!(find_stat("dodge").is_none());
    }
}
