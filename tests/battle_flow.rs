//! Store-level walk through a tower run, plus render checks of the screens it
//! passes through.

use tui_dispatch::testing::*;
use towertui::{
    action::Action,
    bosses::default_bosses,
    effect::Effect,
    reducer::reducer,
    rng::Rng,
    state::{AppState, BattleRun, CombatStats, Enemy, Fighter, Move, Phase, Turn},
    team::TeamMember,
    timeline::TICK_MS,
    ui,
};

fn fresh_state() -> AppState {
    AppState::new(
        "/tmp/towertui-flow-team.json".into(),
        default_bosses(),
        Rng::new(3),
    )
}

fn pichu() -> Fighter {
    Fighter {
        original_id: 25,
        base_id: 172,
        name: "pichu".into(),
        level: 5,
        stats: CombatStats {
            attack: 9,
            defense: 6,
            speed: 11,
        },
        max_hp: 17,
        current_hp: 17,
        moves: vec![Move::new("thunder-shock", 40, "electric", 100)],
        fainted: false,
    }
}

fn rattata() -> Enemy {
    Enemy {
        id: 19,
        name: "rattata".into(),
        level: 5,
        stats: CombatStats {
            attack: 10,
            defense: 8,
            speed: 12,
        },
        max_hp: 19,
        current_hp: 19,
        moves: vec![Move::new("tackle", 40, "normal", 100)],
    }
}

/// Ticks needed for the whole trainer intro to play out.
const INTRO_TICKS: u64 = 4000 / TICK_MS;

#[test]
fn rental_run_reaches_the_battle_screen() {
    let mut harness = EffectStoreTestHarness::new(fresh_state(), reducer);

    harness.dispatch_collect(Action::TeamDidLoad(Vec::new()));
    harness.dispatch_collect(Action::TowerStart);
    harness.assert_state(|s| s.phase == Phase::Loading);

    let effects = harness.drain_effects();
    effects.effects_count(1);
    effects.effects_first_matches(|e| {
        matches!(e, Effect::PrepareTeam { run_id: 1, members, .. } if members.len() == 3)
    });

    harness.dispatch_collect(Action::TeamDidPrepare {
        run_id: 1,
        fighters: vec![pichu()],
        failures: Vec::new(),
    });
    let effects = harness.drain_effects();
    effects.effects_count(1);
    effects.effects_first_matches(|e| {
        matches!(e, Effect::GenerateEncounter { run_id: 1, plan, .. } if plan.floor == 1 && plan.level == 5)
    });
    harness.assert_state(|s| s.dialog == "A trainer appears!");

    harness.complete_action(Action::EncounterDidLoad {
        run_id: 1,
        floor: 1,
        enemy: rattata(),
    });
    let (changed, total) = harness.process_emitted();
    assert_eq!((changed, total), (1, 1));
    harness.assert_state(|s| s.phase == Phase::Intro);
    harness.drain_effects();

    for _ in 0..INTRO_TICKS {
        harness.dispatch_collect(Action::Tick);
    }
    harness.assert_state(|s| s.phase == Phase::Battle);
    harness.assert_state(|s| {
        s.run
            .as_ref()
            .is_some_and(|run| run.turn == Turn::Player && !run.resolving)
    });

    let effects = harness.drain_effects();
    effects.effects_count(1);
    effects.effects_first_matches(|e| matches!(e, Effect::PlayCry { id: 19 }));

    let output = harness.render_plain(80, 30, |frame, area, state| {
        ui::render_state(frame, area, state);
    });
    assert!(output.contains("ENEMY RATTATA"), "enemy panel missing:\n{output}");
    assert!(output.contains("Thunder Shock"), "move menu missing:\n{output}");
}

#[test]
fn completions_from_an_abandoned_run_are_ignored() {
    let mut harness = EffectStoreTestHarness::new(fresh_state(), reducer);

    harness.dispatch_collect(Action::TeamDidLoad(Vec::new()));
    harness.dispatch_collect(Action::TowerStart);
    harness.dispatch_collect(Action::ReturnToLobby);
    harness.dispatch_collect(Action::TowerStart);
    harness.drain_effects();

    harness.complete_action(Action::TeamDidPrepare {
        run_id: 1,
        fighters: vec![pichu()],
        failures: Vec::new(),
    });
    let (changed, total) = harness.process_emitted();
    assert_eq!((changed, total), (0, 1));
    harness.assert_state(|s| s.run.as_ref().is_some_and(|run| run.id == 2 && run.team.is_empty()));
}

#[test]
fn mute_silences_the_reveal_cry() {
    let mut harness = EffectStoreTestHarness::new(fresh_state(), reducer);

    harness.dispatch_collect(Action::ToggleMute);
    harness.dispatch_collect(Action::TeamDidLoad(Vec::new()));
    harness.dispatch_collect(Action::TowerStart);
    harness.dispatch_collect(Action::TeamDidPrepare {
        run_id: 1,
        fighters: vec![pichu()],
        failures: Vec::new(),
    });
    harness.dispatch_collect(Action::EncounterDidLoad {
        run_id: 1,
        floor: 1,
        enemy: rattata(),
    });
    harness.drain_effects();

    for _ in 0..INTRO_TICKS {
        harness.dispatch_collect(Action::Tick);
    }
    harness.assert_state(|s| s.phase == Phase::Battle);
    harness.drain_effects().effects_empty();
}

#[test]
fn lobby_lists_the_stored_team() {
    let mut render = RenderHarness::new(100, 30);
    let mut state = fresh_state();
    let _ = reducer(&mut state, Action::Init);
    let _ = reducer(
        &mut state,
        Action::TeamDidLoad(vec![
            TeamMember::new(1, "bulbasaur", &["grass", "poison"]),
            TeamMember::new(6, "charizard", &["fire", "flying"]),
        ]),
    );
    let _ = reducer(&mut state, Action::LobbyToggle);

    let output = render.render_to_string_plain(|frame| {
        ui::render_state(frame, frame.area(), &state);
    });
    assert!(output.contains("CHOOSE YOUR SQUAD"));
    assert!(output.contains("[1] #1    Bulbasaur  grass/poison"));
    assert!(output.contains("Charizard"));
    assert!(output.contains("Picked 1/2"));
}

#[test]
fn empty_lobby_offers_the_rental_squad() {
    let mut render = RenderHarness::new(100, 30);
    let mut state = fresh_state();
    let _ = reducer(&mut state, Action::TeamDidLoad(Vec::new()));

    let output = render.render_to_string_plain(|frame| {
        ui::render_state(frame, frame.area(), &state);
    });
    assert!(output.contains("rental squad"));
    assert!(output.contains("Pikachu"));
    assert!(output.contains("Squirtle"));
}

#[test]
fn failed_encounter_shows_retry_hint() {
    let mut render = RenderHarness::new(100, 30);
    let mut state = fresh_state();
    let mut run = BattleRun::new(1);
    run.team = vec![pichu()];
    run.error = Some("network failure: offline".into());
    state.run = Some(run);
    state.phase = Phase::Loading;
    state.dialog = "The opponent never showed up.".into();

    let output = render.render_to_string_plain(|frame| {
        ui::render_state(frame, frame.area(), &state);
    });
    assert!(output.contains("network failure: offline"));
    assert!(output.contains("r: Retry"));
}

#[test]
fn defeat_overlay_reports_the_floor() {
    let mut render = RenderHarness::new(100, 30);
    let mut state = fresh_state();
    let mut fallen = pichu();
    fallen.current_hp = 0;
    fallen.fainted = true;
    let mut run = BattleRun::new(1);
    run.team = vec![fallen];
    run.enemy = Some(rattata());
    run.floor = 4;
    state.run = Some(run);
    state.phase = Phase::Defeat;

    let output = render.render_to_string_plain(|frame| {
        ui::render_state(frame, frame.area(), &state);
    });
    assert!(output.contains("YOUR TEAM WAS DEFEATED"));
    assert!(output.contains("You reached floor 4."));
}
