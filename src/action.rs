use serde::{Deserialize, Serialize};

use crate::state::{Enemy, Fighter};
use crate::team::TeamMember;

#[derive(tui_dispatch::Action, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[action(infer_categories)]
pub enum Action {
    Init,
    UiTerminalResize(u16, u16),
    Tick,

    // Team store
    TeamDidLoad(Vec<TeamMember>),
    TeamDidError(String),
    TeamDidSave,
    TeamSaveDidError(String),

    // Lobby
    LobbySelect(usize),
    LobbyToggle,
    LobbyRemove,
    LobbyClearTeam,
    LobbyAddOpen,
    LobbyAddInputChanged(String),
    LobbyAddCancel,
    LobbyAddSubmit,
    TeamMemberDidFetch(TeamMember),
    TeamMemberDidError(String),

    // Run lifecycle
    TowerStart,
    TeamDidPrepare {
        run_id: u64,
        fighters: Vec<Fighter>,
        failures: Vec<String>,
    },
    EncounterDidLoad {
        run_id: u64,
        floor: u32,
        enemy: Enemy,
    },
    EncounterDidError {
        run_id: u64,
        floor: u32,
        error: String,
    },
    EncounterRetry,

    // Battle
    MoveSelect(usize),
    BattleAttack(usize),
    VictoryContinue,
    ReturnToLobby,

    // Audio
    ToggleMute,
    CryDidPlay,
    CryDidError(String),

    Quit,
}
