use std::sync::OnceLock;

use async_trait::async_trait;
use serde::Deserialize;

use crate::catalog::{CatalogSegment, CreatureDetail, CreatureStat, CreatureSummary};
use crate::error::LoadError;
use crate::loader::CatalogSource;

pub const DEFAULT_API_BASE: &str = "https://pokeapi.co/api/v2";

#[derive(Clone, Debug, Deserialize)]
struct NamedResource {
    name: String,
    url: String,
}

#[derive(Clone, Debug, Deserialize)]
struct ListResponse {
    results: Vec<NamedResource>,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonResponse {
    id: u16,
    name: String,
    types: Vec<PokemonTypeSlot>,
    stats: Vec<PokemonStatSlot>,
    abilities: Vec<PokemonAbilitySlot>,
    sprites: serde_json::Value,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonTypeSlot {
    #[serde(rename = "type")]
    type_info: NamedResource,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonStatSlot {
    base_stat: u16,
    stat: NamedResource,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonAbilitySlot {
    ability: NamedResource,
}

/// PokeAPI-backed catalog source.
#[derive(Clone, Debug)]
pub struct PokeApi {
    base: String,
}

impl PokeApi {
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn listing_url(&self, segment: &CatalogSegment) -> String {
        format!(
            "{}/pokemon?limit={}&offset={}",
            self.base, segment.count, segment.offset
        )
    }
}

impl Default for PokeApi {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE)
    }
}

#[async_trait]
impl CatalogSource for PokeApi {
    async fn list_segment(
        &self,
        segment: &CatalogSegment,
    ) -> Result<Vec<CreatureSummary>, LoadError> {
        let url = self.listing_url(segment);
        let response: ListResponse = fetch_json(&url).await?;
        Ok(response
            .results
            .into_iter()
            .map(|entry| CreatureSummary {
                name: entry.name,
                url: entry.url,
            })
            .collect())
    }

    async fn fetch_detail(&self, summary: &CreatureSummary) -> Result<CreatureDetail, LoadError> {
        let response: PokemonResponse = fetch_json(&summary.url).await?;
        Ok(detail_from_response(response))
    }
}

fn detail_from_response(response: PokemonResponse) -> CreatureDetail {
    let types = response
        .types
        .into_iter()
        .map(|slot| slot.type_info.name)
        .collect();
    let abilities = response
        .abilities
        .into_iter()
        .map(|slot| slot.ability.name)
        .collect();
    let stats = response
        .stats
        .into_iter()
        .map(|slot| CreatureStat {
            name: slot.stat.name,
            value: slot.base_stat,
        })
        .collect();

    CreatureDetail {
        id: response.id,
        name: response.name,
        sprite_url: pointer_string(&response.sprites, "/front_default"),
        artwork_url: pointer_string(
            &response.sprites,
            "/other/official-artwork/front_default",
        ),
        types,
        abilities,
        stats,
    }
}

pub async fn fetch_bytes(url: &str) -> Result<Vec<u8>, LoadError> {
    let response = http_client()
        .get(url)
        .send()
        .await
        .map_err(|err| LoadError::network(url, err))?;
    let response = response
        .error_for_status()
        .map_err(|err| LoadError::network(url, err))?;
    let bytes = response
        .bytes()
        .await
        .map_err(|err| LoadError::network(url, err))?;
    Ok(bytes.to_vec())
}

async fn fetch_json<T: serde::de::DeserializeOwned>(url: &str) -> Result<T, LoadError> {
    let bytes = fetch_bytes(url).await?;
    serde_json::from_slice(&bytes).map_err(|err| LoadError::malformed(url, err))
}

fn pointer_string(value: &serde_json::Value, pointer: &str) -> Option<String> {
    value
        .pointer(pointer)
        .and_then(|val| val.as_str())
        .map(|s| s.to_string())
}

fn http_client() -> &'static reqwest::Client {
    static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();
    CLIENT.get_or_init(reqwest::Client::new)
}
