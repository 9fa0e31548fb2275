use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tui_dispatch::{
    EffectContext, EffectStoreLike, EffectStoreWithMiddleware, EventOutcome, RenderContext, TaskKey,
};
use tui_dispatch_debug::debug::DebugLayer;
use tui_dispatch_debug::{
    DebugCliArgs, DebugRunOutput, DebugSession, DebugSessionError, ReplayItem,
};

use towertui::action::Action;
use towertui::api::{self, PokeApi};
use towertui::audio;
use towertui::config::TowerConfig;
use towertui::effect::Effect;
use towertui::encounter::generate_enemy;
use towertui::logging::setup_logging;
use towertui::provider::prepare_team;
use towertui::reducer::reducer;
use towertui::state::{format_name, AppState};
use towertui::team::{load_team, save_team, TeamStore};
use towertui::timeline::TICK_MS;
use towertui::ui;

#[derive(Parser, Debug)]
#[command(name = "towertui")]
#[command(about = "Climb a Pokemon battle tower in the terminal")]
struct Args {
    #[command(flatten)]
    debug: DebugCliArgs,

    /// Team file to read and write (JSON list)
    #[arg(long)]
    team_file: Option<PathBuf>,

    /// RON file replacing the built-in boss roster
    #[arg(long)]
    bosses: Option<PathBuf>,

    /// Seed for encounters, move picks and damage rolls
    #[arg(long)]
    seed: Option<u64>,

    /// Start with sound off
    #[arg(long)]
    mute: bool,

    #[arg(long)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage the persisted team without starting the tower
    Team {
        #[command(subcommand)]
        action: TeamCommand,
    },
}

#[derive(Subcommand, Debug)]
enum TeamCommand {
    List,
    /// Add a creature by catalog id
    Add { id: u32 },
    Remove { id: u32 },
    Clear,
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let args = Args::parse();
    let config = TowerConfig::resolve(
        args.team_file,
        args.bosses.as_deref(),
        args.seed,
        args.mute,
        args.log_dir,
    )
    .await
    .map_err(io::Error::other)?;

    if let Some(Command::Team { action }) = args.command {
        return run_team_command(&config.team_file, action).await;
    }

    setup_logging(&config.log_dir)?;
    tracing::info!(seed = config.seed, team_file = %config.team_file.display(), "starting");

    let debug = DebugSession::new(args.debug);
    let initial = config.initial_state();
    let state = debug
        .load_state_or_else_async(|| {
            let state = initial.clone();
            async move { Ok::<AppState, io::Error>(state) }
        })
        .await
        .map_err(debug_error)?;
    let replay_actions = debug.load_replay_items().map_err(debug_error)?;
    let (middleware, recorder) = debug.middleware_with_recorder();
    let store = EffectStoreWithMiddleware::new(state, reducer, middleware);

    let use_alt_screen = debug.use_alt_screen();
    let mut stdout = io::stdout();
    if use_alt_screen {
        enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &debug, store, replay_actions).await;

    if use_alt_screen {
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
    }

    let run_output = result?;
    run_output.write_render_output()?;
    debug.save_actions(recorder.as_ref()).map_err(debug_error)?;
    Ok(())
}

fn debug_error(error: DebugSessionError) -> io::Error {
    io::Error::other(format!("debug session error: {error}"))
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    debug: &DebugSession,
    store: impl EffectStoreLike<AppState, Action, Effect>,
    replay_actions: Vec<ReplayItem<Action>>,
) -> io::Result<DebugRunOutput<AppState>> {
    debug
        .run_effect_app(
            terminal,
            store,
            DebugLayer::simple(),
            replay_actions,
            Some(Action::Init),
            Some(Action::Quit),
            |runtime| {
                if debug.render_once() {
                    return;
                }
                runtime
                    .subscriptions()
                    .interval("tick", Duration::from_millis(TICK_MS), || Action::Tick);
            },
            |frame, area, state, render_ctx: RenderContext| {
                ui::render(frame, area, state, render_ctx);
            },
            |event, state| -> EventOutcome<Action> { ui::handle_event(event, state) },
            |action| matches!(action, Action::Quit),
            handle_effect,
        )
        .await
}

fn handle_effect(effect: Effect, ctx: &mut EffectContext<Action>) {
    match effect {
        Effect::LoadTeam { path } => {
            ctx.tasks().spawn(TaskKey::new("team_load"), async move {
                match load_team(Path::new(&path)).await {
                    Ok(team) => Action::TeamDidLoad(team.list().to_vec()),
                    Err(error) => Action::TeamDidError(error),
                }
            });
        }
        Effect::SaveTeam { path, team } => {
            ctx.tasks().spawn(TaskKey::new("team_save"), async move {
                match save_team(Path::new(&path), &team).await {
                    Ok(()) => Action::TeamDidSave,
                    Err(error) => Action::TeamSaveDidError(error),
                }
            });
        }
        Effect::FetchMember { id } => {
            ctx.tasks().spawn(TaskKey::new("team_add"), async move {
                match api::fetch_member(&PokeApi::new(), id).await {
                    Ok(member) => Action::TeamMemberDidFetch(member),
                    Err(error) => Action::TeamMemberDidError(error.to_string()),
                }
            });
        }
        Effect::PrepareTeam {
            run_id,
            members,
            seed,
        } => {
            ctx.tasks().spawn(TaskKey::new("prepare_team"), async move {
                let preparation = prepare_team(&PokeApi::new(), &members, seed).await;
                Action::TeamDidPrepare {
                    run_id,
                    fighters: preparation.fighters,
                    failures: preparation.failures,
                }
            });
        }
        Effect::GenerateEncounter { run_id, plan, seed } => {
            ctx.tasks().spawn(TaskKey::new("encounter"), async move {
                let floor = plan.floor;
                match generate_enemy(&PokeApi::new(), &plan, seed).await {
                    Ok(enemy) => Action::EncounterDidLoad {
                        run_id,
                        floor,
                        enemy,
                    },
                    Err(error) => Action::EncounterDidError {
                        run_id,
                        floor,
                        error: error.to_string(),
                    },
                }
            });
        }
        Effect::PlayCry { id } => {
            ctx.tasks().spawn(TaskKey::new("cry"), async move {
                match api::fetch_bytes_cached(&audio::cry_url(id)).await {
                    Ok(bytes) => {
                        match tokio::task::spawn_blocking(move || audio::play_ogg(bytes)).await {
                            Ok(Ok(())) => Action::CryDidPlay,
                            Ok(Err(error)) => Action::CryDidError(error),
                            Err(error) => Action::CryDidError(error.to_string()),
                        }
                    }
                    Err(error) => Action::CryDidError(format!("cry {id}: {error}")),
                }
            });
        }
        Effect::PlayHitSound => audio::play_hit_tone(),
    }
}

async fn run_team_command(path: &Path, command: TeamCommand) -> io::Result<()> {
    let mut team = load_team(path).await.map_err(io::Error::other)?;
    match command {
        TeamCommand::List => {
            print_team(&team);
            return Ok(());
        }
        TeamCommand::Add { id } => {
            let member = api::fetch_member(&PokeApi::new(), id)
                .await
                .map_err(io::Error::other)?;
            let name = format_name(&member.name);
            team.add(member).map_err(io::Error::other)?;
            println!("{name} joined the team.");
        }
        TeamCommand::Remove { id } => match team.remove(id) {
            Some(member) => println!("{} left the team.", format_name(&member.name)),
            None => {
                println!("No team member with id {id}.");
                return Ok(());
            }
        },
        TeamCommand::Clear => {
            team.clear();
            println!("Team cleared.");
        }
    }
    save_team(path, &team).await.map_err(io::Error::other)?;
    print_team(&team);
    Ok(())
}

fn print_team(team: &TeamStore) {
    if team.is_empty() {
        println!("Team is empty; the tower will lend you a rental squad.");
        return;
    }
    for member in team.list() {
        println!(
            "#{:<4} {:<14} {}",
            member.id,
            format_name(&member.name),
            member.types.join("/")
        );
    }
}
