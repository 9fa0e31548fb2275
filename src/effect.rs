use crate::encounter::EncounterPlan;
use crate::team::{TeamMember, TeamStore};

#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    LoadTeam { path: String },
    SaveTeam { path: String, team: TeamStore },
    /// Look up a catalog entry to add to the team store.
    FetchMember { id: u32 },

    /// Resolve base forms, stats and moves for the squad of run `run_id`.
    PrepareTeam {
        run_id: u64,
        members: Vec<TeamMember>,
        seed: u64,
    },
    GenerateEncounter {
        run_id: u64,
        plan: EncounterPlan,
        seed: u64,
    },

    PlayCry { id: u32 },
    PlayHitSound,
}
