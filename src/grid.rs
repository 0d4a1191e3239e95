//! Card records for the grid. Cards are rebuilt from catalog details and
//! appended as one batch per render call.

use serde::{Deserialize, Serialize};

use crate::catalog::CreatureDetail;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: u16,
    pub label: String,
    pub name: String,
    pub types: Vec<String>,
    pub image_url: Option<String>,
}

impl Card {
    pub fn from_detail(detail: &CreatureDetail) -> Self {
        Self {
            id: detail.id,
            label: id_label(detail.id),
            name: capitalize(&detail.name),
            types: detail.types.clone(),
            image_url: detail
                .artwork_url
                .clone()
                .or_else(|| detail.sprite_url.clone()),
        }
    }
}

/// Replace (when `clear`) or extend the grid with one card per item.
pub fn render_cards<'a, I>(cards: &mut Vec<Card>, items: I, clear: bool)
where
    I: IntoIterator<Item = &'a CreatureDetail>,
{
    if clear {
        cards.clear();
    }
    let batch: Vec<Card> = items.into_iter().map(Card::from_detail).collect();
    cards.extend(batch);
}

pub fn id_label(id: u16) -> String {
    format!("#{id:03}")
}

pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
