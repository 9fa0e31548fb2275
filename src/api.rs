use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use async_trait::async_trait;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tokio::fs;

use crate::error::TowerError;
use crate::provider::{CreatureData, MoveProvider, RosterProvider, MOVESET_SIZE};
use crate::rng::Rng;
use crate::state::{BaseStats, Move};
use crate::team::TeamMember;

const API_BASE: &str = "https://pokeapi.co/api/v2";

/// Bound on how many evolution links are followed before giving up.
const MAX_CHAIN_DEPTH: usize = 8;

#[derive(Clone, Debug, Deserialize)]
struct NamedResource {
    name: String,
    #[serde(default)]
    url: String,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonResponse {
    id: u32,
    name: String,
    stats: Vec<PokemonStatSlot>,
    types: Vec<PokemonTypeSlot>,
    species: NamedResource,
    #[serde(default)]
    moves: Vec<PokemonMoveSlot>,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonStatSlot {
    base_stat: u32,
    stat: NamedResource,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonTypeSlot {
    #[serde(rename = "type")]
    kind: NamedResource,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonMoveSlot {
    #[serde(rename = "move")]
    entry: NamedResource,
}

#[derive(Clone, Debug, Deserialize)]
struct SpeciesResponse {
    id: u32,
    evolves_from_species: Option<NamedResource>,
}

#[derive(Clone, Debug, Deserialize)]
struct MoveResponse {
    name: String,
    power: Option<u32>,
    accuracy: Option<u32>,
    #[serde(rename = "type")]
    kind: NamedResource,
}

/// Creature catalog backed by the public PokeAPI, with an on-disk response
/// cache shared across runs.
#[derive(Clone, Debug, Default)]
pub struct PokeApi;

impl PokeApi {
    pub fn new() -> Self {
        Self
    }

    async fn pokemon(&self, id: u32) -> Result<PokemonResponse, TowerError> {
        fetch_json_cached(&format!("{API_BASE}/pokemon/{id}")).await
    }

    async fn move_details(&self, url: &str) -> Result<Move, TowerError> {
        let response: MoveResponse = fetch_json_cached(url).await?;
        Ok(Move {
            name: response.name,
            power: response.power.unwrap_or(0),
            kind: response.kind.name,
            accuracy: response.accuracy.unwrap_or(100),
        })
    }
}

#[async_trait]
impl RosterProvider for PokeApi {
    async fn creature(&self, id: u32) -> Result<CreatureData, TowerError> {
        let response = self.pokemon(id).await?;
        let get_stat = |stat_name: &str| -> u32 {
            response
                .stats
                .iter()
                .find(|slot| slot.stat.name == stat_name)
                .map(|slot| slot.base_stat)
                .unwrap_or(35)
        };
        let base_stats = BaseStats {
            hp: get_stat("hp"),
            attack: get_stat("attack"),
            defense: get_stat("defense"),
            speed: get_stat("speed"),
        };

        Ok(CreatureData {
            id: response.id,
            name: response.name,
            types: response
                .types
                .into_iter()
                .map(|slot| slot.kind.name)
                .collect(),
            base_stats,
            species_url: response.species.url,
        })
    }

    async fn base_form(&self, species_url: &str) -> Result<u32, TowerError> {
        let mut url = species_url.to_string();
        for _ in 0..MAX_CHAIN_DEPTH {
            let species: SpeciesResponse = fetch_json_cached(&url).await?;
            match species.evolves_from_species {
                Some(parent) if !parent.url.is_empty() => url = parent.url,
                _ => return Ok(species.id),
            }
        }
        Err(TowerError::network(format!(
            "evolution chain deeper than {MAX_CHAIN_DEPTH} at {url}"
        )))
    }
}

#[async_trait]
impl MoveProvider for PokeApi {
    async fn moves(&self, id: u32, seed: u64) -> Result<Vec<Move>, TowerError> {
        let response = self.pokemon(id).await?;
        let mut learnset: Vec<NamedResource> =
            response.moves.into_iter().map(|slot| slot.entry).collect();
        shuffle(&mut learnset, &mut Rng::new(seed));

        let mut moves = Vec::with_capacity(MOVESET_SIZE);
        for entry in learnset {
            if moves.len() == MOVESET_SIZE {
                break;
            }
            let mv = self.move_details(&entry.url).await?;
            if mv.power > 0 {
                moves.push(mv);
            }
        }
        Ok(moves)
    }
}

/// Name and types for a new team-store entry.
pub async fn fetch_member(api: &PokeApi, id: u32) -> Result<TeamMember, TowerError> {
    let creature = api.creature(id).await?;
    Ok(TeamMember {
        id: creature.id,
        name: creature.name,
        types: creature.types,
    })
}

fn shuffle<T>(items: &mut [T], rng: &mut Rng) {
    for i in (1..items.len()).rev() {
        let j = rng.range_usize(i + 1);
        items.swap(i, j);
    }
}

async fn fetch_json_cached<T: serde::de::DeserializeOwned>(url: &str) -> Result<T, TowerError> {
    let bytes = fetch_bytes_cached(url).await?;
    match serde_json::from_slice(&bytes) {
        Ok(value) => Ok(value),
        Err(err) => {
            let cache_path = cache_path("http", url);
            let _ = fs::remove_file(&cache_path).await;
            Err(TowerError::network(format!("unexpected response from {url}: {err}")))
        }
    }
}

pub async fn fetch_bytes_cached(url: &str) -> Result<Vec<u8>, TowerError> {
    let cache_path = cache_path("http", url);
    if let Some(bytes) = read_cache(&cache_path).await {
        return Ok(bytes);
    }

    tracing::debug!(%url, "fetching");
    let client = http_client();
    let response = client
        .get(url)
        .send()
        .await
        .map_err(TowerError::network)?;
    let response = response.error_for_status().map_err(TowerError::network)?;
    let bytes = response
        .bytes()
        .await
        .map_err(TowerError::network)?
        .to_vec();
    write_cache(&cache_path, &bytes).await;
    Ok(bytes)
}

fn http_client() -> &'static reqwest::Client {
    static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();
    CLIENT.get_or_init(reqwest::Client::new)
}

pub fn cache_root() -> PathBuf {
    let base = std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."));
    base.join(".cache").join("towertui")
}

fn cache_path(kind: &str, url: &str) -> PathBuf {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    let digest = hex::encode(hasher.finalize());
    cache_root().join(kind).join(digest)
}

async fn read_cache(path: &Path) -> Option<Vec<u8>> {
    fs::read(path).await.ok()
}

async fn write_cache(path: &Path, bytes: &[u8]) {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent).await;
    }
    let _ = fs::write(path, bytes).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_path_is_stable_per_url() {
        let a = cache_path("http", "https://pokeapi.co/api/v2/pokemon/25");
        let b = cache_path("http", "https://pokeapi.co/api/v2/pokemon/25");
        let c = cache_path("http", "https://pokeapi.co/api/v2/pokemon/26");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.file_name().map(|n| n.len()), Some(64));
    }

    #[test]
    fn seeded_shuffle_is_a_permutation() {
        let mut items: Vec<u32> = (0..20).collect();
        shuffle(&mut items, &mut Rng::new(5));
        let mut again: Vec<u32> = (0..20).collect();
        shuffle(&mut again, &mut Rng::new(5));
        assert_eq!(items, again);

        items.sort_unstable();
        assert_eq!(items, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn parses_pokemon_payload() {
        let json = r#"{
            "id": 25,
            "name": "pikachu",
            "stats": [
                {"base_stat": 35, "stat": {"name": "hp", "url": ""}},
                {"base_stat": 55, "stat": {"name": "attack", "url": ""}}
            ],
            "types": [{"slot": 1, "type": {"name": "electric", "url": ""}}],
            "species": {"name": "pikachu", "url": "https://pokeapi.co/api/v2/pokemon-species/25/"},
            "moves": [{"move": {"name": "thunder-shock", "url": "https://pokeapi.co/api/v2/move/84/"}}]
        }"#;
        let response: PokemonResponse = serde_json::from_str(json).expect("payload parses");
        assert_eq!(response.id, 25);
        assert_eq!(response.types[0].kind.name, "electric");
        assert_eq!(response.moves[0].entry.name, "thunder-shock");
        assert!(response.species.url.ends_with("/25/"));
    }

    #[test]
    fn parses_species_without_parent() {
        let json = r#"{"id": 172, "evolves_from_species": null}"#;
        let species: SpeciesResponse = serde_json::from_str(json).expect("species parses");
        assert!(species.evolves_from_species.is_none());
    }
}
