//! Content of the shared popover, built from one catalog record.

use crate::catalog::CreatureDetail;
use crate::grid::capitalize;

/// Lower bounds of the eight stat tiers.
pub const TIER_THRESHOLDS: [u16; 8] = [0, 30, 60, 90, 110, 130, 150, 200];
pub const STAT_MAX: f32 = 255.0;

/// Rows above the ability line: sprite beside name and type badges.
pub const HEADER_ROWS: u16 = 8;

#[derive(Clone, Debug, PartialEq)]
pub struct StatRow {
    pub label: String,
    pub value: u16,
    pub percent: f32,
    pub tier: u8,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PopoverContent {
    pub id: u16,
    pub name: String,
    pub sprite_url: Option<String>,
    pub types: Vec<String>,
    pub abilities: Vec<String>,
    pub stats: Vec<StatRow>,
}

impl PopoverContent {
    pub fn from_detail(detail: &CreatureDetail) -> Self {
        Self {
            id: detail.id,
            name: capitalize(&detail.name),
            sprite_url: detail.sprite_url.clone(),
            types: detail.types.clone(),
            abilities: detail.abilities.iter().map(|a| ability_label(a)).collect(),
            stats: detail
                .stats
                .iter()
                .map(|stat| StatRow {
                    label: stat_label(&stat.name).to_string(),
                    value: stat.value,
                    percent: fill_percent(stat.value),
                    tier: tier(stat.value),
                })
                .collect(),
        }
    }

    /// Rows the ability badges take when word-wrapped to `inner_width`.
    pub fn ability_rows(&self, inner_width: u16) -> u16 {
        wrapped_rows(
            self.abilities.iter().flat_map(|a| a.split_whitespace()),
            inner_width,
        )
    }

    /// Outer height including borders: header, wrapped abilities, a spacer,
    /// one row per stat.
    pub fn height(&self, inner_width: u16) -> u16 {
        2 + HEADER_ROWS + self.ability_rows(inner_width) + 1 + self.stats.len() as u16
    }
}

/// Greedy word wrap line count, at least one line. Words longer than the
/// width are broken across lines.
fn wrapped_rows<'a>(words: impl Iterator<Item = &'a str>, width: u16) -> u16 {
    let width = usize::from(width.max(1));
    let mut rows = 1usize;
    let mut line = 0usize;
    for word in words {
        let len = word.chars().count();
        if line > 0 && line + 1 + len <= width {
            line += 1 + len;
            continue;
        }
        if line > 0 {
            rows += 1;
        }
        rows += len.saturating_sub(1) / width;
        line = (len.saturating_sub(1) % width) + 1;
    }
    rows as u16
}

pub fn stat_label(name: &str) -> &str {
    match name {
        "special-attack" => "Sp.Atk",
        "special-defense" => "Sp.Def",
        "attack" => "Atk",
        "defense" => "Def",
        "speed" => "Spd",
        "hp" => "HP",
        other => other,
    }
}

pub fn fill_percent(value: u16) -> f32 {
    (f32::from(value) / STAT_MAX * 100.0).min(100.0)
}

pub fn tier(value: u16) -> u8 {
    let count = TIER_THRESHOLDS.iter().filter(|t| **t <= value).count();
    count.max(1) as u8
}

pub fn ability_label(name: &str) -> String {
    name.replace('-', " ")
}
