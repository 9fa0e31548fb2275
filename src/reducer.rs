use tui_dispatch::DispatchResult;

use crate::action::Action;
use crate::combat::{
    all_fainted, level_up_survivors, next_active, pick_enemy_move, roll_variance, strike,
};
use crate::effect::Effect;
use crate::encounter::{plan_encounter, CATALOG_MAX};
use crate::error::TowerError;
use crate::state::{format_name, AppState, BattleRun, Fighter, IntroStage, Phase, Turn, SQUAD_SIZE};
use crate::team::{TeamStore, TEAM_CAPACITY};
use crate::timeline::{
    BattleCue, ENEMY_HIT_DELAY_MS, ENEMY_TURN_DELAY_MS, INTRO_SEQUENCE, PLAYER_HIT_DELAY_MS,
    SWITCH_IN_DELAY_MS, TICK_MS, VICTORY_DELAY_MS,
};

pub const LOBBY_DIALOG: &str = "Pick your fighters. They start at level 5, in their base form.";

pub fn reducer(state: &mut AppState, action: Action) -> DispatchResult<Effect> {
    match action {
        Action::Init => {
            state.phase = Phase::Lobby;
            state.dialog = LOBBY_DIALOG.to_string();
            DispatchResult::changed_with(Effect::LoadTeam {
                path: state.team_file.clone(),
            })
        }
        Action::UiTerminalResize(width, height) => {
            if state.terminal_size != (width, height) {
                state.terminal_size = (width, height);
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }
        Action::Tick => tick(state),

        Action::TeamDidLoad(members) => {
            state.team = TeamStore::from_members(members);
            state.team_loaded = true;
            let team = &state.team;
            state.lobby.selected.retain(|id| team.get(*id).is_some());
            state.lobby.cursor = state.lobby.cursor.min(team.len().saturating_sub(1));
            tracing::info!(members = state.team.len(), "team loaded");
            DispatchResult::changed()
        }
        Action::TeamDidError(error) => {
            tracing::warn!(%error, "team load failed");
            state.team_loaded = true;
            state.message = Some(format!("Could not load team: {error}"));
            DispatchResult::changed()
        }
        Action::TeamDidSave => DispatchResult::unchanged(),
        Action::TeamSaveDidError(error) => {
            tracing::warn!(%error, "team save failed");
            state.message = Some(format!("Could not save team: {error}"));
            DispatchResult::changed()
        }

        Action::LobbySelect(index) => {
            if state.phase != Phase::Lobby || state.team.is_empty() {
                return DispatchResult::unchanged();
            }
            let index = index.min(state.team.len() - 1);
            if state.lobby.cursor == index {
                return DispatchResult::unchanged();
            }
            state.lobby.cursor = index;
            DispatchResult::changed()
        }
        Action::LobbyToggle => lobby_toggle(state),
        Action::LobbyRemove => lobby_remove(state),
        Action::LobbyClearTeam => {
            if state.phase != Phase::Lobby || state.team.is_empty() {
                return DispatchResult::unchanged();
            }
            state.team.clear();
            state.lobby.selected.clear();
            state.lobby.cursor = 0;
            state.message = Some("Team cleared.".to_string());
            save_team(state)
        }
        Action::LobbyAddOpen => {
            if state.phase != Phase::Lobby || state.lobby.add_input.is_some() || state.lobby.adding
            {
                return DispatchResult::unchanged();
            }
            state.lobby.add_input = Some(String::new());
            state.message = None;
            DispatchResult::changed()
        }
        Action::LobbyAddInputChanged(input) => {
            let Some(current) = state.lobby.add_input.as_mut() else {
                return DispatchResult::unchanged();
            };
            *current = input.chars().filter(char::is_ascii_digit).take(4).collect();
            DispatchResult::changed()
        }
        Action::LobbyAddCancel => {
            if state.lobby.add_input.take().is_none() {
                return DispatchResult::unchanged();
            }
            DispatchResult::changed()
        }
        Action::LobbyAddSubmit => lobby_add_submit(state),
        Action::TeamMemberDidFetch(member) => {
            if !state.lobby.adding {
                return DispatchResult::unchanged();
            }
            state.lobby.adding = false;
            let name = format_name(&member.name);
            match state.team.add(member) {
                Ok(()) => {
                    tracing::info!(%name, members = state.team.len(), "team member added");
                    state.message = Some(format!("{name} joined the team."));
                    save_team(state)
                }
                Err(err) => {
                    state.message = Some(err.to_string());
                    DispatchResult::changed()
                }
            }
        }
        Action::TeamMemberDidError(error) => {
            if !state.lobby.adding {
                return DispatchResult::unchanged();
            }
            tracing::warn!(%error, "team member lookup failed");
            state.lobby.adding = false;
            state.message = Some(format!("Could not add: {error}"));
            DispatchResult::changed()
        }

        Action::TowerStart => start_run(state),
        Action::TeamDidPrepare {
            run_id,
            fighters,
            failures,
        } => team_prepared(state, run_id, fighters, failures),
        Action::EncounterDidLoad {
            run_id,
            floor,
            enemy,
        } => {
            if !awaiting_encounter(state, run_id, floor) {
                tracing::debug!(run_id, floor, "discarding stale encounter");
                return DispatchResult::unchanged();
            }
            let Some(run) = state.run.as_mut() else {
                return DispatchResult::unchanged();
            };
            tracing::info!(floor, enemy = %enemy.name, level = enemy.level, "encounter ready");
            run.enemy = Some(enemy);
            run.intro = IntroStage::Waiting;
            run.timeline.clear();
            run.timeline.schedule_all(&INTRO_SEQUENCE);
            state.phase = Phase::Intro;
            DispatchResult::changed()
        }
        Action::EncounterDidError {
            run_id,
            floor,
            error,
        } => {
            if !awaiting_encounter(state, run_id, floor) {
                return DispatchResult::unchanged();
            }
            tracing::warn!(floor, %error, "encounter generation failed");
            if let Some(run) = state.run.as_mut() {
                run.error = Some(error);
            }
            state.dialog = "The opponent never showed up.".to_string();
            DispatchResult::changed()
        }
        Action::EncounterRetry => encounter_retry(state),

        Action::MoveSelect(index) => {
            if state.phase != Phase::Battle {
                return DispatchResult::unchanged();
            }
            let Some(run) = state.run.as_mut() else {
                return DispatchResult::unchanged();
            };
            let move_count = run.active_fighter().map(|f| f.moves.len()).unwrap_or(0);
            if move_count == 0 {
                return DispatchResult::unchanged();
            }
            let index = index.min(move_count - 1);
            if run.move_cursor == index {
                return DispatchResult::unchanged();
            }
            run.move_cursor = index;
            DispatchResult::changed()
        }
        Action::BattleAttack(index) => player_attack(state, index),
        Action::VictoryContinue => {
            if state.phase != Phase::Victory {
                return DispatchResult::unchanged();
            }
            let Some(run) = state.run.as_mut() else {
                return DispatchResult::unchanged();
            };
            run.floor += 1;
            begin_floor(state)
        }
        Action::ReturnToLobby => return_to_lobby(state),

        Action::ToggleMute => {
            state.muted = !state.muted;
            DispatchResult::changed()
        }
        Action::CryDidPlay => DispatchResult::unchanged(),
        Action::CryDidError(error) => {
            tracing::debug!(%error, "cry playback failed");
            DispatchResult::unchanged()
        }

        Action::Quit => DispatchResult::unchanged(),
    }
}

fn lobby_toggle(state: &mut AppState) -> DispatchResult<Effect> {
    if state.phase != Phase::Lobby {
        return DispatchResult::unchanged();
    }
    let Some(member) = state.team.list().get(state.lobby.cursor) else {
        return DispatchResult::unchanged();
    };
    let id = member.id;
    if state.lobby.is_selected(id) {
        state.lobby.selected.retain(|picked| *picked != id);
    } else if state.lobby.selected.len() < SQUAD_SIZE {
        state.lobby.selected.push(id);
    } else {
        state.message = Some(format!("Only {SQUAD_SIZE} fighters can enter the tower."));
        return DispatchResult::changed();
    }
    state.message = None;
    DispatchResult::changed()
}

fn lobby_remove(state: &mut AppState) -> DispatchResult<Effect> {
    if state.phase != Phase::Lobby {
        return DispatchResult::unchanged();
    }
    let Some(id) = state.team.list().get(state.lobby.cursor).map(|m| m.id) else {
        return DispatchResult::unchanged();
    };
    let Some(removed) = state.team.remove(id) else {
        return DispatchResult::unchanged();
    };
    state.lobby.selected.retain(|picked| *picked != id);
    state.lobby.cursor = state
        .lobby
        .cursor
        .min(state.team.len().saturating_sub(1));
    state.message = Some(format!("{} left the team.", format_name(&removed.name)));
    save_team(state)
}

fn lobby_add_submit(state: &mut AppState) -> DispatchResult<Effect> {
    if state.phase != Phase::Lobby {
        return DispatchResult::unchanged();
    }
    let Some(input) = state.lobby.add_input.as_deref() else {
        return DispatchResult::unchanged();
    };
    let id = match input.parse::<u32>() {
        Ok(id) if (1..=CATALOG_MAX).contains(&id) => id,
        _ => {
            let err = TowerError::ValidationFailure(format!(
                "Enter a catalog id between 1 and {CATALOG_MAX}."
            ));
            state.message = Some(err.to_string());
            return DispatchResult::changed();
        }
    };
    state.lobby.add_input = None;
    if state.team.len() >= TEAM_CAPACITY {
        state.message = Some(format!("The team is full ({TEAM_CAPACITY} max)."));
        return DispatchResult::changed();
    }
    if let Some(member) = state.team.get(id) {
        state.message = Some(format!("{} is already on the team.", format_name(&member.name)));
        return DispatchResult::changed();
    }
    state.lobby.adding = true;
    state.message = Some(format!("Looking up #{id}..."));
    DispatchResult::changed_with(Effect::FetchMember { id })
}

fn save_team(state: &AppState) -> DispatchResult<Effect> {
    DispatchResult::changed_with(Effect::SaveTeam {
        path: state.team_file.clone(),
        team: state.team.clone(),
    })
}

fn start_run(state: &mut AppState) -> DispatchResult<Effect> {
    if state.phase != Phase::Lobby {
        return DispatchResult::unchanged();
    }
    if !state.team_loaded {
        state.message = Some("Team is still loading.".to_string());
        return DispatchResult::changed();
    }

    let required = state.required_picks();
    if state.lobby.selected.len() != required {
        let err = TowerError::ValidationFailure(format!(
            "Select exactly {required} fighters ({} picked).",
            state.lobby.selected.len()
        ));
        tracing::debug!(%err, "tower start rejected");
        state.message = Some(err.to_string());
        return DispatchResult::changed();
    }

    state.run_counter += 1;
    let run_id = state.run_counter;
    let members = state.squad_members();
    let seed = state.rng.next_u64();
    tracing::info!(run_id, squad = members.len(), "tower run starting");

    state.run = Some(BattleRun::new(run_id));
    state.phase = Phase::Loading;
    state.message = None;
    state.dialog = "Preparing the tower... resetting levels...".to_string();
    DispatchResult::changed_with(Effect::PrepareTeam {
        run_id,
        members,
        seed,
    })
}

fn team_prepared(
    state: &mut AppState,
    run_id: u64,
    fighters: Vec<Fighter>,
    failures: Vec<String>,
) -> DispatchResult<Effect> {
    let awaiting = state.phase == Phase::Loading
        && state
            .run
            .as_ref()
            .is_some_and(|run| run.id == run_id && run.team.is_empty());
    if !awaiting {
        tracing::debug!(run_id, "discarding stale team preparation");
        return DispatchResult::unchanged();
    }

    if fighters.is_empty() {
        tracing::warn!(run_id, ?failures, "no fighter could be prepared");
        state.run = None;
        state.phase = Phase::Lobby;
        state.dialog = LOBBY_DIALOG.to_string();
        state.message = Some(format!(
            "No fighter could be prepared: {}",
            failures.join("; ")
        ));
        return DispatchResult::changed();
    }

    if !failures.is_empty() {
        tracing::warn!(run_id, ?failures, "starting with a partial team");
        state.message = Some(format!("Left behind: {}", failures.join("; ")));
    }
    if let Some(run) = state.run.as_mut() {
        run.team = fighters;
        run.active = 0;
    }
    begin_floor(state)
}

/// Resets per-floor state and asks for the floor's opponent.
fn begin_floor(state: &mut AppState) -> DispatchResult<Effect> {
    let Some(floor) = state.run.as_ref().map(|run| run.floor) else {
        return DispatchResult::unchanged();
    };
    let plan = plan_encounter(floor, &state.bosses, &mut state.rng);
    let seed = state.rng.next_u64();

    let Some(run) = state.run.as_mut() else {
        return DispatchResult::unchanged();
    };
    run.enemy = None;
    run.boss = plan.boss.clone();
    run.plan = Some(plan.clone());
    run.turn = Turn::Player;
    run.resolving = false;
    run.intro = IntroStage::Waiting;
    run.move_cursor = 0;
    run.error = None;
    run.timeline.clear();

    state.phase = Phase::Loading;
    state.dialog = match &plan.boss {
        Some(boss) => format!("{} challenges you!", boss.name),
        None => "A trainer appears!".to_string(),
    };
    tracing::info!(run_id = run.id, floor, boss = plan.boss.is_some(), "floor starting");
    DispatchResult::changed_with(Effect::GenerateEncounter {
        run_id: run.id,
        plan,
        seed,
    })
}

fn awaiting_encounter(state: &AppState, run_id: u64, floor: u32) -> bool {
    state.phase == Phase::Loading
        && state.run.as_ref().is_some_and(|run| {
            run.id == run_id && run.floor == floor && run.enemy.is_none() && run.error.is_none()
        })
}

fn encounter_retry(state: &mut AppState) -> DispatchResult<Effect> {
    if state.phase != Phase::Loading {
        return DispatchResult::unchanged();
    }
    let Some(run) = state.run.as_mut() else {
        return DispatchResult::unchanged();
    };
    if run.error.is_none() {
        return DispatchResult::unchanged();
    }
    let Some(plan) = run.plan.clone() else {
        return DispatchResult::unchanged();
    };
    let seed = state.rng.next_u64();
    run.error = None;
    state.dialog = "Calling the opponent again...".to_string();
    tracing::info!(run_id = run.id, floor = run.floor, "retrying encounter");
    DispatchResult::changed_with(Effect::GenerateEncounter {
        run_id: run.id,
        plan,
        seed,
    })
}

fn player_attack(state: &mut AppState, index: usize) -> DispatchResult<Effect> {
    if state.phase != Phase::Battle {
        return DispatchResult::unchanged();
    }
    let Some(run) = state.run.as_mut() else {
        return DispatchResult::unchanged();
    };
    if run.turn != Turn::Player || run.resolving {
        tracing::debug!(turn = ?run.turn, resolving = run.resolving, "attack rejected");
        return DispatchResult::unchanged();
    }
    let Some(fighter) = run.active_fighter() else {
        return DispatchResult::unchanged();
    };
    let Some(mv) = fighter.moves.get(index) else {
        return DispatchResult::unchanged();
    };

    state.dialog = format!("{} uses {}!", format_name(&fighter.name), format_name(&mv.name));
    run.resolving = true;
    run.move_cursor = index;
    run.timeline
        .schedule(PLAYER_HIT_DELAY_MS, BattleCue::PlayerHit { move_index: index });
    DispatchResult::changed()
}

fn return_to_lobby(state: &mut AppState) -> DispatchResult<Effect> {
    if !matches!(
        state.phase,
        Phase::Loading | Phase::Victory | Phase::Defeat
    ) {
        return DispatchResult::unchanged();
    }
    if let Some(run) = state.run.take() {
        if !run.team.is_empty() {
            state.best_floor = state.best_floor.max(run.floor);
        }
        tracing::info!(run_id = run.id, floor = run.floor, "run ended");
    }
    state.phase = Phase::Lobby;
    state.lobby.selected.clear();
    state.dialog = LOBBY_DIALOG.to_string();
    state.message = None;
    DispatchResult::changed()
}

fn tick(state: &mut AppState) -> DispatchResult<Effect> {
    state.tick = state.tick.wrapping_add(1);
    let Some(until) = state
        .run
        .as_ref()
        .map(|run| run.timeline.now() + TICK_MS)
    else {
        return DispatchResult::unchanged();
    };

    let mut changed = matches!(state.phase, Phase::Loading | Phase::Intro);
    let mut effects = Vec::new();
    while let Some(cue) = state
        .run
        .as_mut()
        .and_then(|run| run.timeline.pop_due(until))
    {
        apply_cue(state, cue, &mut effects);
        changed = true;
    }
    if let Some(run) = state.run.as_mut() {
        run.timeline.settle(until);
    }

    if !effects.is_empty() {
        DispatchResult::changed_with_many(effects)
    } else if changed {
        DispatchResult::changed()
    } else {
        DispatchResult::unchanged()
    }
}

fn apply_cue(state: &mut AppState, cue: BattleCue, effects: &mut Vec<Effect>) {
    let muted = state.muted;
    let Some(run) = state.run.as_mut() else {
        return;
    };

    match cue {
        BattleCue::TrainerEnters => {
            run.intro = IntroStage::TrainerEnters;
            state.dialog = match &run.boss {
                Some(boss) => format!("\"{}\"", boss.quote),
                None => "Let's battle!".to_string(),
            };
        }
        BattleCue::BallThrown => run.intro = IntroStage::BallThrown,
        BattleCue::Reveal => {
            run.intro = IntroStage::Reveal;
            if let Some(enemy) = &run.enemy {
                if !muted {
                    effects.push(Effect::PlayCry { id: enemy.id });
                }
            }
        }
        BattleCue::BattleStart => {
            state.phase = Phase::Battle;
            run.turn = Turn::Player;
            run.resolving = false;
            if let Some(enemy) = &run.enemy {
                state.dialog = format!("Enemy {} appeared!", format_name(&enemy.name));
            }
        }
        BattleCue::PlayerHit { move_index } => {
            let variance = roll_variance(&mut state.rng);
            let active = run.active;
            let (Some(fighter), Some(enemy)) = (run.team.get(active), run.enemy.as_mut()) else {
                return;
            };
            let Some(mv) = fighter.moves.get(move_index) else {
                return;
            };
            let hit = strike(fighter, enemy, mv, variance);
            tracing::debug!(damage = hit.damage, enemy_hp = hit.remaining_hp, "player hit");
            if !muted {
                effects.push(Effect::PlayHitSound);
            }
            if hit.knocked_out {
                run.timeline.schedule(VICTORY_DELAY_MS, BattleCue::Victory);
            } else {
                run.timeline.schedule(ENEMY_TURN_DELAY_MS, BattleCue::EnemyTurn);
            }
        }
        BattleCue::EnemyTurn => {
            run.turn = Turn::Enemy;
            let Some(enemy) = &run.enemy else {
                return;
            };
            let move_index = pick_enemy_move(&enemy.moves, &mut state.rng);
            if let Some(mv) = enemy.moves.get(move_index) {
                state.dialog = format!("Enemy uses {}!", format_name(&mv.name));
            }
            run.timeline
                .schedule(ENEMY_HIT_DELAY_MS, BattleCue::EnemyHit { move_index });
        }
        BattleCue::EnemyHit { move_index } => {
            let variance = roll_variance(&mut state.rng);
            let active = run.active;
            let (Some(fighter), Some(enemy)) = (run.team.get_mut(active), run.enemy.as_ref())
            else {
                return;
            };
            let Some(mv) = enemy.moves.get(move_index) else {
                return;
            };
            let hit = strike(enemy, fighter, mv, variance);
            tracing::debug!(damage = hit.damage, fighter_hp = hit.remaining_hp, "enemy hit");
            if !muted {
                effects.push(Effect::PlayHitSound);
            }

            if !hit.knocked_out {
                state.dialog = format!("What will {} do?", format_name(&fighter.name));
                run.turn = Turn::Player;
                run.resolving = false;
                return;
            }

            let fainted_name = format_name(&fighter.name);
            if all_fainted(&run.team) {
                tracing::info!(run_id = run.id, floor = run.floor, "team defeated");
                state.phase = Phase::Defeat;
                state.dialog = "Your team has been defeated!".to_string();
                run.resolving = false;
                run.timeline.clear();
            } else if let Some(index) = next_active(&run.team) {
                state.dialog = format!("{fainted_name} fainted!");
                run.timeline
                    .schedule(SWITCH_IN_DELAY_MS, BattleCue::SwitchIn { index });
            }
        }
        BattleCue::SwitchIn { index } => {
            let Some(fighter) = run.team.get(index) else {
                return;
            };
            state.dialog = format!("Go, {}!", format_name(&fighter.name));
            if !muted {
                effects.push(Effect::PlayCry { id: fighter.base_id });
            }
            run.active = index;
            run.move_cursor = 0;
            run.turn = Turn::Player;
            run.resolving = false;
        }
        BattleCue::Victory => {
            level_up_survivors(&mut run.team);
            tracing::info!(run_id = run.id, floor = run.floor, "floor cleared");
            state.phase = Phase::Victory;
            state.dialog = "Enemy defeated!".to_string();
            run.resolving = false;
        }
    }
}
