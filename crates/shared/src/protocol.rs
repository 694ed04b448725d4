//! Wire shapes of the upstream catalog API and their conversion into domain types.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::{CatalogEntry, CatalogPage, EntryDetail, FilteredEntry, PageCursor};

const OFFICIAL_ARTWORK_KEY: &str = "official-artwork";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListPageResponse {
    pub results: Vec<NamedResource>,
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedResource {
    pub name: String,
    pub url: String,
}

/// Single-entity body as read by a lookup: only the name and artwork matter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityResponse {
    pub name: String,
    #[serde(default)]
    pub sprites: Sprites,
}

/// Same endpoint read for supplementary data; `height` is mandatory so a
/// truncated body fails to decode instead of reporting zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailResponse {
    pub name: String,
    pub height: u32,
    #[serde(default)]
    pub base_experience: Option<u32>,
    #[serde(default)]
    pub abilities: Vec<AbilitySlot>,
    #[serde(default)]
    pub held_items: Vec<HeldItemSlot>,
    #[serde(default)]
    pub sprites: Sprites,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbilitySlot {
    pub ability: NamedResource,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeldItemSlot {
    pub item: NamedResource,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Sprites {
    #[serde(default)]
    pub front_default: Option<String>,
    #[serde(default)]
    pub other: HashMap<String, SpriteSet>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpriteSet {
    #[serde(default)]
    pub front_default: Option<String>,
}

impl From<ListPageResponse> for CatalogPage {
    fn from(value: ListPageResponse) -> Self {
        Self {
            entries: value
                .results
                .into_iter()
                .map(|resource| CatalogEntry {
                    name: resource.name,
                    reference: resource.url,
                })
                .collect(),
            next: value.next.filter(|next| !next.is_empty()).map(PageCursor),
        }
    }
}

impl Sprites {
    pub fn official_artwork(&self) -> Option<String> {
        self.other
            .get(OFFICIAL_ARTWORK_KEY)
            .and_then(|set| set.front_default.clone())
    }
}

impl EntityResponse {
    pub fn into_filtered_entry(self, reference: impl Into<String>) -> FilteredEntry {
        let artwork_url = self.sprites.official_artwork();
        FilteredEntry {
            entry: CatalogEntry {
                name: self.name,
                reference: reference.into(),
            },
            artwork_url,
        }
    }
}

impl DetailResponse {
    pub fn into_detail(self) -> EntryDetail {
        let artwork_url = self.sprites.official_artwork();
        EntryDetail {
            name: self.name,
            height: self.height,
            base_experience: self.base_experience,
            abilities: self
                .abilities
                .into_iter()
                .map(|slot| slot.ability.name)
                .collect(),
            held_items: self
                .held_items
                .into_iter()
                .map(|slot| slot.item.name)
                .collect(),
            artwork_url,
        }
    }
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
