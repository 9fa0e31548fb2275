use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Boss {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub theme: String,
    pub quote: String,
    /// Candidates; one is drawn at random each time the boss is fought.
    pub pokemon_ids: Vec<u32>,
}

impl Boss {
    fn new(id: &str, name: &str, title: &str, theme: &str, quote: &str, ids: &[u32]) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            title: title.to_string(),
            theme: theme.to_string(),
            quote: quote.to_string(),
            pokemon_ids: ids.to_vec(),
        }
    }
}

pub fn default_bosses() -> Vec<Boss> {
    vec![
        Boss::new(
            "brock",
            "Leader Brock",
            "Gym Leader",
            "rock",
            "My will is as hard as rock!",
            &[95, 74],
        ),
        Boss::new(
            "misty",
            "Leader Misty",
            "Gym Leader",
            "water",
            "The tomboyish mermaid will teach you a lesson!",
            &[121, 120],
        ),
        Boss::new(
            "giovanni",
            "Boss Giovanni",
            "Team Rocket Leader",
            "ground",
            "This world belongs to the strong!",
            &[150, 112, 34],
        ),
        Boss::new(
            "cynthia",
            "Champion Cynthia",
            "Sinnoh Champion",
            "dragon",
            "Before we battle, let me see the bond with your Pokemon...",
            &[445, 448, 350],
        ),
        Boss::new(
            "red",
            "Trainer Red",
            "Living Legend",
            "fire",
            "...",
            &[25, 6, 143],
        ),
        Boss::new(
            "n",
            "King N",
            "Team Plasma Leader",
            "electric",
            "I can hear the voices of your Pokemon suffering.",
            &[643, 644, 571],
        ),
        Boss::new(
            "steven",
            "Champion Steven",
            "Hoenn Champion",
            "steel",
            "The outcome of this battle is already decided.",
            &[376, 306, 227],
        ),
    ]
}

/// Reads a replacement boss roster from a RON list of bosses.
pub async fn load_bosses(path: &Path) -> Result<Vec<Boss>, String> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    parse_bosses(&contents)
}

pub fn parse_bosses(contents: &str) -> Result<Vec<Boss>, String> {
    let bosses: Vec<Boss> =
        ron::de::from_str(contents).map_err(|e| format!("Failed to parse bosses: {}", e))?;
    if bosses.is_empty() {
        return Err("Boss roster is empty".to_string());
    }
    if let Some(boss) = bosses.iter().find(|boss| boss.pokemon_ids.is_empty()) {
        return Err(format!("Boss '{}' has no pokemon", boss.id));
    }
    Ok(bosses)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_roster_is_usable() {
        let bosses = default_bosses();
        assert_eq!(bosses.len(), 7);
        assert!(bosses.iter().all(|boss| !boss.pokemon_ids.is_empty()));
        assert_eq!(bosses[2].pokemon_ids, vec![150, 112, 34]);
    }

    #[test]
    fn parses_ron_roster() {
        let ron = r#"[
            (
                id: "blue",
                name: "Rival Blue",
                quote: "Smell ya later!",
                pokemon_ids: [18, 65],
            ),
        ]"#;
        let bosses = parse_bosses(ron).expect("valid roster");
        assert_eq!(bosses.len(), 1);
        assert_eq!(bosses[0].name, "Rival Blue");
        assert_eq!(bosses[0].title, "");
        assert_eq!(bosses[0].pokemon_ids, vec![18, 65]);
    }

    #[test]
    fn rejects_empty_roster_and_empty_candidates() {
        assert!(parse_bosses("[]").is_err());
        let ron = r#"[(id: "x", name: "X", quote: "", pokemon_ids: [])]"#;
        let err = parse_bosses(ron).unwrap_err();
        assert!(err.contains("'x'"));
    }
}
