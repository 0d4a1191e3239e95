//! Catalog data: the fixed generation table, fetched records and the
//! append-only collection they accumulate into.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One fixed page of the remote catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CatalogSegment {
    pub label: &'static str,
    pub offset: u32,
    pub count: u32,
}

pub const SEGMENTS: [CatalogSegment; 9] = [
    CatalogSegment {
        label: "Gen 1 (Kanto)",
        offset: 0,
        count: 151,
    },
    CatalogSegment {
        label: "Gen 2 (Johto)",
        offset: 151,
        count: 100,
    },
    CatalogSegment {
        label: "Gen 3 (Hoenn)",
        offset: 251,
        count: 135,
    },
    CatalogSegment {
        label: "Gen 4 (Sinnoh)",
        offset: 386,
        count: 107,
    },
    CatalogSegment {
        label: "Gen 5 (Unova)",
        offset: 493,
        count: 156,
    },
    CatalogSegment {
        label: "Gen 6 (Kalos)",
        offset: 649,
        count: 72,
    },
    CatalogSegment {
        label: "Gen 7 (Alola)",
        offset: 721,
        count: 88,
    },
    CatalogSegment {
        label: "Gen 8 (Galar)",
        offset: 809,
        count: 96,
    },
    CatalogSegment {
        label: "Gen 9 (Paldea)",
        offset: 905,
        count: 120,
    },
];

pub fn segment(index: usize) -> Option<&'static CatalogSegment> {
    SEGMENTS.get(index)
}

/// Reference returned by a segment listing; dropped once its detail is fetched.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatureSummary {
    pub name: String,
    pub url: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatureStat {
    pub name: String,
    pub value: u16,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatureDetail {
    pub id: u16,
    pub name: String,
    pub sprite_url: Option<String>,
    pub artwork_url: Option<String>,
    pub types: Vec<String>,
    pub abilities: Vec<String>,
    pub stats: Vec<CreatureStat>,
}

impl CreatureDetail {
    /// Case-insensitive on the name, literal on the decimal id.
    pub fn matches(&self, term: &str) -> bool {
        self.name.to_lowercase().contains(term) || self.id.to_string().contains(term)
    }
}

/// Whether loader batches append to the grid directly or go through the
/// active filter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum UiMode {
    #[default]
    Browse,
    Search,
}

/// Every detail fetched so far, in append order. Never truncated.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    entries: Vec<CreatureDetail>,
    by_id: HashMap<u16, usize>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, batch: Vec<CreatureDetail>) {
        self.entries.reserve(batch.len());
        for detail in batch {
            self.by_id.entry(detail.id).or_insert(self.entries.len());
            self.entries.push(detail);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[CreatureDetail] {
        &self.entries
    }

    pub fn get(&self, id: u16) -> Option<&CreatureDetail> {
        self.by_id.get(&id).and_then(|index| self.entries.get(*index))
    }

    /// `term` must already be lower-cased.
    pub fn filter<'a>(&'a self, term: &'a str) -> impl Iterator<Item = &'a CreatureDetail> + 'a {
        self.entries.iter().filter(move |detail| detail.matches(term))
    }
}
