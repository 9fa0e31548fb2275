use std::io::ErrorKind;
use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::TowerError;
use crate::state::format_name;

pub const TEAM_CAPACITY: usize = 6;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TeamMember {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub types: Vec<String>,
}

impl TeamMember {
    pub fn new(id: u32, name: &str, types: &[&str]) -> Self {
        Self {
            id,
            name: name.to_string(),
            types: types.iter().map(|t| t.to_string()).collect(),
        }
    }
}

/// The persisted roster players pick their tower squad from.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct TeamStore {
    members: Vec<TeamMember>,
}

impl TeamStore {
    pub fn from_members(members: Vec<TeamMember>) -> Self {
        let mut store = Self::default();
        for member in members {
            // A hand-edited file may hold duplicates or more than six entries.
            let _ = store.add(member);
        }
        store
    }

    pub fn list(&self) -> &[TeamMember] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&TeamMember> {
        self.members.iter().find(|member| member.id == id)
    }

    pub fn add(&mut self, member: TeamMember) -> Result<(), TowerError> {
        if self.members.len() >= TEAM_CAPACITY {
            return Err(TowerError::DuplicateOrFull {
                name: format_name(&member.name),
                reason: format!("the team is full ({TEAM_CAPACITY} max)"),
            });
        }
        if self.get(member.id).is_some() {
            return Err(TowerError::DuplicateOrFull {
                name: format_name(&member.name),
                reason: "already on the team".to_string(),
            });
        }
        self.members.push(member);
        Ok(())
    }

    pub fn remove(&mut self, id: u32) -> Option<TeamMember> {
        let index = self.members.iter().position(|member| member.id == id)?;
        Some(self.members.remove(index))
    }

    pub fn clear(&mut self) {
        self.members.clear();
    }
}

/// Squad lent to players whose team store is empty.
pub fn rental_squad() -> Vec<TeamMember> {
    vec![
        TeamMember::new(25, "pikachu", &["electric"]),
        TeamMember::new(4, "charmander", &["fire"]),
        TeamMember::new(7, "squirtle", &["water"]),
    ]
}

pub async fn load_team(path: &Path) -> Result<TeamStore, String> {
    let json = match tokio::fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(TeamStore::default()),
        Err(e) => return Err(format!("Failed to read team file: {}", e)),
    };
    let members: Vec<TeamMember> =
        serde_json::from_str(&json).map_err(|e| format!("Team file corrupted: {}", e))?;
    Ok(TeamStore::from_members(members))
}

pub async fn save_team(path: &Path, team: &TeamStore) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| format!("Failed to create team directory: {}", e))?;
    }
    let json =
        serde_json::to_string_pretty(team).map_err(|e| format!("Failed to serialize: {}", e))?;
    tokio::fs::write(path, json)
        .await
        .map_err(|e| format!("Failed to write team file: {}", e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(id: u32) -> TeamMember {
        TeamMember::new(id, &format!("mon-{id}"), &["normal"])
    }

    #[test]
    fn add_rejects_duplicates() {
        let mut store = TeamStore::default();
        store.add(member(1)).expect("first add");
        let err = store.add(member(1)).unwrap_err();
        assert!(matches!(err, TowerError::DuplicateOrFull { .. }));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn add_rejects_seventh_member() {
        let mut store = TeamStore::default();
        for id in 1..=6 {
            store.add(member(id)).expect("room left");
        }
        let err = store.add(member(7)).unwrap_err();
        assert!(matches!(err, TowerError::DuplicateOrFull { .. }));
        assert_eq!(store.len(), TEAM_CAPACITY);
    }

    #[test]
    fn remove_and_clear() {
        let mut store = TeamStore::from_members(vec![member(1), member(2), member(3)]);
        assert_eq!(store.remove(2).map(|m| m.id), Some(2));
        assert_eq!(store.remove(2), None);
        assert_eq!(
            store.list().iter().map(|m| m.id).collect::<Vec<_>>(),
            vec![1, 3]
        );
        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn from_members_drops_overflow_and_duplicates() {
        let members = vec![
            member(1),
            member(1),
            member(2),
            member(3),
            member(4),
            member(5),
            member(6),
            member(7),
        ];
        let store = TeamStore::from_members(members);
        assert_eq!(store.len(), 6);
        assert!(store.get(7).is_none());
    }

    #[test]
    fn persisted_as_flat_list() {
        let store = TeamStore::from_members(vec![TeamMember::new(25, "pikachu", &["electric"])]);
        let json = serde_json::to_string(&store).expect("serialize");
        assert_eq!(json, r#"[{"id":25,"name":"pikachu","types":["electric"]}]"#);
    }

    #[tokio::test]
    async fn missing_file_loads_empty_store() {
        let path = std::env::temp_dir().join("towertui-test-missing").join("team.json");
        let store = load_team(&path).await.expect("missing file is not an error");
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn save_then_load() {
        let dir = std::env::temp_dir().join(format!("towertui-test-{}", std::process::id()));
        let path = dir.join("team.json");
        let store = TeamStore::from_members(rental_squad());
        save_team(&path, &store).await.expect("save");
        let loaded = load_team(&path).await.expect("load");
        assert_eq!(loaded, store);
        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}
