use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tui_dispatch_debug::debug::{ron_string, DebugSection, DebugState};

use crate::bosses::{default_bosses, Boss};
use crate::encounter::EncounterPlan;
use crate::rng::Rng;
use crate::team::{TeamMember, TeamStore};
use crate::timeline::Timeline;

/// Fighters a tower run is played with.
pub const SQUAD_SIZE: usize = 3;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Move {
    pub name: String,
    pub power: u32,
    #[serde(rename = "type")]
    pub kind: String,
    /// Shown in the move menu only; resolution never rolls for a miss.
    pub accuracy: u32,
}

impl Move {
    pub fn new(name: &str, power: u32, kind: &str, accuracy: u32) -> Self {
        Self {
            name: name.to_string(),
            power,
            kind: kind.to_string(),
            accuracy,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BaseStats {
    pub hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub speed: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CombatStats {
    pub attack: u32,
    pub defense: u32,
    pub speed: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Fighter {
    /// Identifier of the team-store entry this fighter was built from.
    pub original_id: u32,
    /// Lowest evolution of `original_id`; the form actually fighting.
    pub base_id: u32,
    pub name: String,
    pub level: u32,
    pub stats: CombatStats,
    pub max_hp: u32,
    pub current_hp: u32,
    pub moves: Vec<Move>,
    pub fainted: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Enemy {
    pub id: u32,
    pub name: String,
    pub level: u32,
    pub stats: CombatStats,
    pub max_hp: u32,
    pub current_hp: u32,
    pub moves: Vec<Move>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Phase {
    Lobby,
    Loading,
    Intro,
    Battle,
    Victory,
    Defeat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Turn {
    Player,
    Enemy,
}

/// Presentation stages of the floor intro, in the order they are shown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum IntroStage {
    #[default]
    Waiting,
    TrainerEnters,
    BallThrown,
    Reveal,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LobbyState {
    pub cursor: usize,
    /// Team-store ids picked for the next run, in pick order.
    pub selected: Vec<u32>,
    /// Catalog id being typed into the add prompt; `None` while it is closed.
    #[serde(default)]
    pub add_input: Option<String>,
    /// Set while a typed id is being looked up.
    #[serde(default)]
    pub adding: bool,
}

impl LobbyState {
    pub fn is_selected(&self, id: u32) -> bool {
        self.selected.contains(&id)
    }
}

/// One tower run: the squad, the floor being fought and its turn state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BattleRun {
    pub id: u64,
    pub floor: u32,
    pub team: Vec<Fighter>,
    pub active: usize,
    pub enemy: Option<Enemy>,
    pub boss: Option<Boss>,
    pub plan: Option<EncounterPlan>,
    pub turn: Turn,
    pub resolving: bool,
    pub intro: IntroStage,
    pub move_cursor: usize,
    pub timeline: Timeline,
    pub error: Option<String>,
}

impl BattleRun {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            floor: 1,
            team: Vec::new(),
            active: 0,
            enemy: None,
            boss: None,
            plan: None,
            turn: Turn::Player,
            resolving: false,
            intro: IntroStage::Waiting,
            move_cursor: 0,
            timeline: Timeline::default(),
            error: None,
        }
    }

    pub fn active_fighter(&self) -> Option<&Fighter> {
        self.team.get(self.active)
    }

}

/// What the presentation layer gets after every state change.
#[derive(Clone, Debug, PartialEq)]
pub struct BattleSnapshot<'a> {
    pub phase: Phase,
    pub turn: Option<Turn>,
    pub dialog: &'a str,
    pub enemy: Option<&'a Enemy>,
    pub team: &'a [Fighter],
    pub active: usize,
    pub floor: u32,
    pub intro: IntroStage,
    pub boss: Option<&'a Boss>,
    pub move_cursor: usize,
    /// True only when the battle is waiting on the player's move.
    pub awaiting_move: bool,
    pub message: Option<&'a str>,
}

impl BattleSnapshot<'_> {
    pub fn active_fighter(&self) -> Option<&Fighter> {
        self.team.get(self.active)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AppState {
    pub terminal_size: (u16, u16),
    pub phase: Phase,
    pub team: TeamStore,
    #[serde(default)]
    pub team_loaded: bool,
    pub team_file: String,
    pub lobby: LobbyState,
    pub run: Option<BattleRun>,
    pub bosses: Vec<Boss>,
    /// Last run id handed out; completions for other ids are stale.
    pub run_counter: u64,
    pub dialog: String,
    pub message: Option<String>,
    pub muted: bool,
    /// Highest floor reached by the last finished run.
    pub best_floor: u32,
    pub rng: Rng,
    pub tick: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(default_team_file(), default_bosses(), Rng::default())
    }
}

impl AppState {
    pub fn new(team_file: String, bosses: Vec<Boss>, rng: Rng) -> Self {
        Self {
            terminal_size: (80, 24),
            phase: Phase::Lobby,
            team: TeamStore::default(),
            team_loaded: false,
            team_file,
            lobby: LobbyState::default(),
            run: None,
            bosses,
            run_counter: 0,
            dialog: String::new(),
            message: None,
            muted: false,
            best_floor: 0,
            rng,
            tick: 0,
        }
    }

    pub fn snapshot(&self) -> BattleSnapshot<'_> {
        let run = self.run.as_ref();
        BattleSnapshot {
            phase: self.phase,
            turn: run.map(|run| run.turn),
            dialog: &self.dialog,
            enemy: run.and_then(|run| run.enemy.as_ref()),
            team: run.map(|run| run.team.as_slice()).unwrap_or(&[]),
            active: run.map(|run| run.active).unwrap_or(0),
            floor: run.map(|run| run.floor).unwrap_or(0),
            intro: run.map(|run| run.intro).unwrap_or_default(),
            boss: run.and_then(|run| run.boss.as_ref()),
            move_cursor: run.map(|run| run.move_cursor).unwrap_or(0),
            awaiting_move: self.phase == Phase::Battle
                && run.is_some_and(|run| run.turn == Turn::Player && !run.resolving),
            message: self.message.as_deref(),
        }
    }

    /// Members that will be prepared when the run starts.
    pub fn squad_members(&self) -> Vec<TeamMember> {
        if self.team.is_empty() {
            return crate::team::rental_squad();
        }
        self.lobby
            .selected
            .iter()
            .filter_map(|id| self.team.get(*id).cloned())
            .collect()
    }

    /// Picks needed before the lobby lets a run start.
    pub fn required_picks(&self) -> usize {
        if self.team.is_empty() {
            0
        } else {
            SQUAD_SIZE.min(self.team.len())
        }
    }
}

impl DebugState for AppState {
    fn debug_sections(&self) -> Vec<DebugSection> {
        let mut sections = vec![
            DebugSection::new("Phase")
                .entry("phase", ron_string(&self.phase))
                .entry("dialog", ron_string(&self.dialog))
                .entry("message", ron_string(&self.message)),
            DebugSection::new("Lobby")
                .entry("team", self.team.len().to_string())
                .entry("selected", ron_string(&self.lobby.selected))
                .entry("best_floor", self.best_floor.to_string()),
        ];

        if let Some(run) = &self.run {
            sections.push(
                DebugSection::new("Run")
                    .entry("id", run.id.to_string())
                    .entry("floor", run.floor.to_string())
                    .entry("active", run.active.to_string())
                    .entry("turn", ron_string(&run.turn))
                    .entry("resolving", run.resolving.to_string())
                    .entry("pending_cues", run.timeline.len().to_string()),
            );
            if let Some(enemy) = &run.enemy {
                sections.push(
                    DebugSection::new("Enemy")
                        .entry("id", enemy.id.to_string())
                        .entry("name", enemy.name.clone())
                        .entry("level", enemy.level.to_string())
                        .entry("hp", format!("{}/{}", enemy.current_hp, enemy.max_hp)),
                );
            }
        }

        sections
    }
}

pub fn default_team_file() -> String {
    let base = dirs_next::data_local_dir().unwrap_or_else(|| std::path::PathBuf::from("."));
    base.join("towertui")
        .join("team.json")
        .to_string_lossy()
        .into_owned()
}

pub fn format_name(name: &str) -> String {
    name.split('-')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => {
                    let rest = chars.as_str();
                    format!("{}{}", first.to_ascii_uppercase(), rest)
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
