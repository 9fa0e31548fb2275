use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{block::Title, Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use tui_dispatch::{EventKind, EventOutcome, RenderContext};
use tui_dispatch_components::centered_rect;

use crate::action::Action;
use crate::state::{format_name, AppState, BattleSnapshot, Fighter, IntroStage, Phase};
use crate::team::rental_squad;

const BG_BASE: Color = Color::Rgb(24, 26, 36);
const BG_PANEL: Color = Color::Rgb(36, 40, 58);
const BG_PANEL_ALT: Color = Color::Rgb(30, 32, 48);
const TEXT_MAIN: Color = Color::Rgb(228, 230, 240);
const TEXT_DIM: Color = Color::Rgb(160, 166, 186);
const ACCENT_GREEN: Color = Color::Rgb(104, 204, 120);
const ACCENT_GOLD: Color = Color::Rgb(222, 196, 120);
const ACCENT_RED: Color = Color::Rgb(220, 96, 96);
const HIGHLIGHT_BG: Color = ACCENT_GOLD;
const HIGHLIGHT_TEXT: Color = Color::Rgb(20, 20, 28);
const BORDER_ACCENT: Color = Color::Rgb(84, 90, 122);

pub fn render(frame: &mut Frame, area: Rect, state: &AppState, _ctx: RenderContext) {
    render_state(frame, area, state);
}

pub fn render_state(frame: &mut Frame, area: Rect, state: &AppState) {
    frame.render_widget(Block::default().style(Style::default().bg(BG_BASE)), area);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(6)])
        .split(area);
    render_header(frame, layout[0], state);

    let body = layout[1];
    match state.phase {
        Phase::Lobby => render_lobby(frame, body, state),
        Phase::Loading => render_loading(frame, body, state),
        Phase::Intro | Phase::Battle | Phase::Victory | Phase::Defeat => {
            if state.run.is_none() {
                return;
            }
            let snapshot = state.snapshot();
            render_battle(frame, body, &snapshot);
            match snapshot.phase {
                Phase::Victory => render_victory(frame, body, &snapshot),
                Phase::Defeat => render_defeat(frame, body, &snapshot),
                _ => {}
            }
        }
    }
}

pub fn handle_event(event: &EventKind, state: &AppState) -> EventOutcome<Action> {
    match event {
        EventKind::Resize(width, height) => {
            EventOutcome::action(Action::UiTerminalResize(*width, *height)).with_render()
        }
        EventKind::Key(key) => handle_key(*key, state),
        _ => EventOutcome::ignored(),
    }
}

fn handle_key(key: KeyEvent, state: &AppState) -> EventOutcome<Action> {
    if state.phase == Phase::Lobby {
        if let Some(input) = state.lobby.add_input.as_ref() {
            return handle_add_prompt_key(key, input);
        }
    }
    match key.code {
        KeyCode::Char('q') => return EventOutcome::action(Action::Quit),
        KeyCode::Char('m') => return EventOutcome::action(Action::ToggleMute),
        _ => {}
    }

    match state.phase {
        Phase::Lobby => handle_lobby_key(key, state),
        Phase::Loading => {
            let retry_ready = state.run.as_ref().is_some_and(|run| run.error.is_some());
            let action = match key.code {
                KeyCode::Char('r') if retry_ready => Some(Action::EncounterRetry),
                KeyCode::Esc => Some(Action::ReturnToLobby),
                _ => None,
            };
            EventOutcome::from(action)
        }
        Phase::Intro => EventOutcome::ignored(),
        Phase::Battle => handle_battle_key(key, state),
        Phase::Victory => {
            let action = match key.code {
                KeyCode::Enter | KeyCode::Char('z') => Some(Action::VictoryContinue),
                KeyCode::Esc => Some(Action::ReturnToLobby),
                _ => None,
            };
            EventOutcome::from(action)
        }
        Phase::Defeat => match key.code {
            KeyCode::Enter | KeyCode::Char('z') | KeyCode::Esc => {
                EventOutcome::action(Action::ReturnToLobby)
            }
            _ => EventOutcome::ignored(),
        },
    }
}

fn handle_lobby_key(key: KeyEvent, state: &AppState) -> EventOutcome<Action> {
    let len = state.team.len();
    let cursor = state.lobby.cursor;
    let action = match key.code {
        KeyCode::Up | KeyCode::Char('w') if len > 0 => {
            let index = if cursor == 0 { len - 1 } else { cursor - 1 };
            Some(Action::LobbySelect(index))
        }
        KeyCode::Down | KeyCode::Char('s') if len > 0 => {
            let index = if cursor + 1 >= len { 0 } else { cursor + 1 };
            Some(Action::LobbySelect(index))
        }
        KeyCode::Char(' ') => Some(Action::LobbyToggle),
        KeyCode::Enter | KeyCode::Char('z') => Some(Action::TowerStart),
        KeyCode::Char('x') | KeyCode::Delete => Some(Action::LobbyRemove),
        KeyCode::Char('C') => Some(Action::LobbyClearTeam),
        KeyCode::Char('a') if !state.lobby.adding => Some(Action::LobbyAddOpen),
        _ => None,
    };
    EventOutcome::from(action)
}

fn handle_add_prompt_key(key: KeyEvent, input: &str) -> EventOutcome<Action> {
    let action = match key.code {
        KeyCode::Char(c) if c.is_ascii_digit() => {
            let mut next = input.to_string();
            next.push(c);
            Some(Action::LobbyAddInputChanged(next))
        }
        KeyCode::Backspace => {
            let mut next = input.to_string();
            next.pop();
            Some(Action::LobbyAddInputChanged(next))
        }
        KeyCode::Enter => Some(Action::LobbyAddSubmit),
        KeyCode::Esc => Some(Action::LobbyAddCancel),
        _ => None,
    };
    EventOutcome::from(action)
}

fn handle_battle_key(key: KeyEvent, state: &AppState) -> EventOutcome<Action> {
    let Some(run) = state.run.as_ref() else {
        return EventOutcome::ignored();
    };
    let move_count = run.active_fighter().map(|f| f.moves.len()).unwrap_or(0);
    if move_count == 0 {
        return EventOutcome::ignored();
    }
    let cursor = run.move_cursor;

    let action = match key.code {
        KeyCode::Up | KeyCode::Left | KeyCode::Char('w') | KeyCode::Char('a') => {
            let index = if cursor == 0 { move_count - 1 } else { cursor - 1 };
            Some(Action::MoveSelect(index))
        }
        KeyCode::Down | KeyCode::Right | KeyCode::Char('s') | KeyCode::Char('d') => {
            let index = if cursor + 1 >= move_count { 0 } else { cursor + 1 };
            Some(Action::MoveSelect(index))
        }
        KeyCode::Enter | KeyCode::Char('z') => Some(Action::BattleAttack(cursor)),
        KeyCode::Char(c @ '1'..='4') => {
            let index = c as usize - '1' as usize;
            (index < move_count).then_some(Action::BattleAttack(index))
        }
        _ => None,
    };
    EventOutcome::from(action)
}

fn render_header(frame: &mut Frame, area: Rect, state: &AppState) {
    let mut spans = vec![Span::styled(
        " BATTLE TOWER ",
        Style::default()
            .fg(HIGHLIGHT_TEXT)
            .bg(ACCENT_GOLD)
            .add_modifier(Modifier::BOLD),
    )];
    if let Some(run) = state.run.as_ref() {
        spans.push(Span::styled(
            format!("  Floor {}", run.floor),
            Style::default().fg(TEXT_MAIN).add_modifier(Modifier::BOLD),
        ));
        if run.boss.is_some() {
            spans.push(Span::styled("  BOSS", Style::default().fg(ACCENT_RED)));
        }
    }
    if state.best_floor > 0 {
        spans.push(Span::styled(
            format!("  Best {}", state.best_floor),
            Style::default().fg(TEXT_DIM),
        ));
    }
    if state.muted {
        spans.push(Span::styled("  [muted]", Style::default().fg(TEXT_DIM)));
    }
    frame.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().bg(BG_PANEL_ALT)),
        area,
    );
}

fn render_lobby(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = panel_block(" CHOOSE YOUR SQUAD ", BG_PANEL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = vec![
        Line::from(Span::styled(state.dialog.clone(), Style::default().fg(TEXT_DIM))),
        Line::from(""),
    ];

    if !state.team_loaded {
        lines.push(Line::from("Loading team..."));
    } else if state.team.is_empty() {
        lines.push(Line::from("Your team is empty. A rental squad will fight for you:"));
        for member in rental_squad() {
            lines.push(Line::from(format!("  {}", format_name(&member.name))));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Press a to add your own by catalog id.",
            Style::default().fg(TEXT_DIM),
        )));
    } else {
        for (idx, member) in state.team.list().iter().enumerate() {
            let mark = match state.lobby.selected.iter().position(|id| *id == member.id) {
                Some(order) => format!("[{}]", order + 1),
                None => "[ ]".to_string(),
            };
            let types = if member.types.is_empty() {
                String::new()
            } else {
                format!("  {}", member.types.join("/"))
            };
            let label = format!(
                "{mark} #{:<4} {}{types}",
                member.id,
                format_name(&member.name)
            );
            lines.push(menu_line(&label, idx == state.lobby.cursor));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(format!(
            "Picked {}/{}",
            state.lobby.selected.len(),
            state.required_picks()
        )));
    }

    if let Some(input) = state.lobby.add_input.as_ref() {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("Add catalog id: ", Style::default().fg(TEXT_MAIN)),
            Span::styled(
                format!("{input}_"),
                Style::default().fg(ACCENT_GOLD).add_modifier(Modifier::BOLD),
            ),
        ]));
    }

    if let Some(message) = state.message.as_ref() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            message.clone(),
            Style::default().fg(ACCENT_GOLD),
        )));
    }

    let hint = if state.lobby.add_input.is_some() {
        "Digits: Type id  |  Enter: Add  |  Esc: Cancel"
    } else {
        "Arrows: Move  |  Space: Pick  |  Enter: Enter tower  |  a: Add  |  x: Remove  |  C: Clear  |  q: Quit"
    };
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(hint, Style::default().fg(TEXT_DIM))));

    let paragraph = Paragraph::new(Text::from(lines)).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, inner);
}

fn render_loading(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = panel_block(" LOADING ", BG_PANEL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let dots = ".".repeat((state.tick / 3 % 4) as usize);
    let mut lines = vec![
        Line::from(Span::styled(
            format!("{}{dots}", state.dialog),
            Style::default().fg(TEXT_MAIN).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    if let Some(message) = state.message.as_ref() {
        lines.push(Line::from(Span::styled(
            message.clone(),
            Style::default().fg(ACCENT_GOLD),
        )));
    }
    let error = state.run.as_ref().and_then(|run| run.error.as_ref());
    if let Some(error) = error {
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(ACCENT_RED),
        )));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "r: Retry  |  Esc: Back to lobby",
            Style::default().fg(TEXT_DIM),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            "Esc: Back to lobby",
            Style::default().fg(TEXT_DIM),
        )));
    }

    let content = centered_rect(60, 8, inner);
    frame.render_widget(
        Paragraph::new(Text::from(lines))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        content,
    );
}

fn render_battle(frame: &mut Frame, area: Rect, snapshot: &BattleSnapshot) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),
            Constraint::Min(5),
            Constraint::Length(7),
        ])
        .split(area);

    render_enemy_panel(frame, layout[0], snapshot);
    render_player_panel(frame, layout[1], snapshot);
    render_command_box(frame, layout[2], snapshot);
}

fn render_enemy_panel(frame: &mut Frame, area: Rect, snapshot: &BattleSnapshot) {
    let revealed = snapshot.phase != Phase::Intro || snapshot.intro == IntroStage::Reveal;
    let title = match (snapshot.boss, snapshot.enemy) {
        _ if !revealed => " ??? ".to_string(),
        (Some(boss), Some(enemy)) => format!(
            " {}'S {} ",
            boss.name.to_ascii_uppercase(),
            format_name(&enemy.name).to_ascii_uppercase()
        ),
        (None, Some(enemy)) => format!(" ENEMY {} ", format_name(&enemy.name).to_ascii_uppercase()),
        (_, None) => " ENEMY ".to_string(),
    };
    let block = panel_block(title.as_str(), BG_PANEL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = Vec::new();
    if !revealed {
        let trainer = snapshot
            .boss
            .map(|boss| format!("{} ({})", boss.name, boss.title))
            .unwrap_or_else(|| "Tower Trainer".to_string());
        match snapshot.intro {
            IntroStage::Waiting => lines.push(Line::from("")),
            IntroStage::TrainerEnters => lines.push(Line::from(trainer)),
            IntroStage::BallThrown | IntroStage::Reveal => {
                lines.push(Line::from(trainer));
                lines.push(Line::from(Span::styled(
                    "  ( o )  ",
                    Style::default().fg(ACCENT_RED).add_modifier(Modifier::BOLD),
                )));
            }
        }
    } else if let Some(enemy) = snapshot.enemy {
        lines.push(hp_line(enemy.current_hp, enemy.max_hp));
        lines.push(Line::from(Span::styled(
            format!(
                "Lv {}   ATK {}  DEF {}  SPD {}",
                enemy.level, enemy.stats.attack, enemy.stats.defense, enemy.stats.speed
            ),
            Style::default().fg(TEXT_DIM),
        )));
    }

    frame.render_widget(
        Paragraph::new(Text::from(lines)).style(Style::default().fg(TEXT_MAIN)),
        inner,
    );
}

fn render_player_panel(frame: &mut Frame, area: Rect, snapshot: &BattleSnapshot) {
    let title = snapshot
        .active_fighter()
        .map(|fighter| format!(" {} ", format_name(&fighter.name).to_ascii_uppercase()))
        .unwrap_or_else(|| " SQUAD ".to_string());
    let block = panel_block(title.as_str(), BG_PANEL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = Vec::new();
    if let Some(fighter) = snapshot.active_fighter() {
        lines.push(hp_line(fighter.current_hp, fighter.max_hp));
        lines.push(Line::from(Span::styled(
            format!(
                "Lv {}   ATK {}  DEF {}  SPD {}",
                fighter.level, fighter.stats.attack, fighter.stats.defense, fighter.stats.speed
            ),
            Style::default().fg(TEXT_DIM),
        )));
    }
    lines.push(team_preview_line(snapshot.team, snapshot.active));

    frame.render_widget(
        Paragraph::new(Text::from(lines)).style(Style::default().fg(TEXT_MAIN)),
        inner,
    );
}

fn team_preview_line(team: &[Fighter], active: usize) -> Line<'static> {
    let mut spans = Vec::new();
    for (idx, fighter) in team.iter().enumerate() {
        let style = if fighter.fainted {
            Style::default().fg(ACCENT_RED).add_modifier(Modifier::CROSSED_OUT)
        } else if idx == active {
            Style::default().fg(ACCENT_GREEN).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(TEXT_MAIN)
        };
        let marker = if fighter.fainted { "x" } else { "o" };
        spans.push(Span::styled(
            format!("{marker} {} Lv{}", format_name(&fighter.name), fighter.level),
            style,
        ));
        if idx + 1 < team.len() {
            spans.push(Span::raw("   "));
        }
    }
    Line::from(spans)
}

fn render_command_box(frame: &mut Frame, area: Rect, snapshot: &BattleSnapshot) {
    let block = panel_block("COMMAND", BG_PANEL_ALT);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = vec![Line::from(snapshot.dialog.to_string())];
    if snapshot.awaiting_move {
        if let Some(fighter) = snapshot.active_fighter() {
            lines.push(Line::from(" "));
            for (idx, mv) in fighter.moves.iter().enumerate() {
                let label = format!(
                    "{} {:<16} {:<9} PW {:>3}  ACC {:>3}",
                    idx + 1,
                    format_name(&mv.name),
                    mv.kind,
                    mv.power,
                    mv.accuracy
                );
                lines.push(menu_line(&label, idx == snapshot.move_cursor));
            }
        }
    }
    if let Some(message) = snapshot.message {
        lines.push(Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(ACCENT_GOLD),
        )));
    }

    frame.render_widget(
        Paragraph::new(Text::from(lines))
            .style(Style::default().fg(TEXT_MAIN))
            .wrap(Wrap { trim: true }),
        inner,
    );
}

fn render_victory(frame: &mut Frame, area: Rect, snapshot: &BattleSnapshot) {
    let floor = snapshot.floor;
    let lines = vec![
        Line::from(Span::styled(
            format!("FLOOR {floor} CLEARED"),
            Style::default()
                .fg(ACCENT_GREEN)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("Your standing fighters grew a level."),
        Line::from(""),
        Line::from(Span::styled(
            "Enter: Next floor  |  Esc: Leave the tower",
            Style::default().fg(TEXT_DIM),
        )),
    ];
    render_overlay(frame, area, " VICTORY ", lines);
}

fn render_defeat(frame: &mut Frame, area: Rect, snapshot: &BattleSnapshot) {
    let floor = snapshot.floor;
    let lines = vec![
        Line::from(Span::styled(
            "YOUR TEAM WAS DEFEATED",
            Style::default().fg(ACCENT_RED).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(format!("You reached floor {floor}.")),
        Line::from(""),
        Line::from(Span::styled(
            "Enter: Back to lobby",
            Style::default().fg(TEXT_DIM),
        )),
    ];
    render_overlay(frame, area, " DEFEAT ", lines);
}

fn render_overlay(frame: &mut Frame, area: Rect, title: &str, lines: Vec<Line<'static>>) {
    let modal = centered_rect(48, 9, area);
    frame.render_widget(Clear, modal);
    let block = panel_block(title, BG_PANEL);
    let inner = block.inner(modal);
    frame.render_widget(block, modal);
    frame.render_widget(
        Paragraph::new(Text::from(lines))
            .alignment(Alignment::Center)
            .style(Style::default().fg(TEXT_MAIN)),
        inner,
    );
}

fn hp_line(current: u32, max: u32) -> Line<'static> {
    let width: usize = 20;
    let ratio = if max == 0 {
        0.0
    } else {
        current as f32 / max as f32
    };
    let filled = ((ratio * width as f32).round() as usize).min(width);
    let empty = width.saturating_sub(filled);
    let color = if ratio > 0.5 {
        ACCENT_GREEN
    } else if ratio > 0.2 {
        ACCENT_GOLD
    } else {
        ACCENT_RED
    };
    Line::from(vec![
        Span::raw("HP "),
        Span::styled(
            "█".repeat(filled),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::styled("░".repeat(empty), Style::default().fg(TEXT_DIM)),
        Span::raw(format!(" {current}/{max}")),
    ])
}

fn panel_block<'a, T>(title: T, bg: Color) -> Block<'a>
where
    T: Into<Title<'a>>,
{
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(title)
        .style(Style::default().bg(bg).fg(TEXT_MAIN))
        .border_style(Style::default().fg(BORDER_ACCENT))
}

fn menu_line(label: &str, selected: bool) -> Line<'static> {
    let style = if selected {
        Style::default()
            .fg(HIGHLIGHT_TEXT)
            .bg(HIGHLIGHT_BG)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(TEXT_MAIN)
    };
    Line::from(Span::styled(label.to_string(), style))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    use crate::state::{BattleRun, CombatStats, Move};
    use crate::team::{TeamMember, TeamStore};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn battle_state(moves: usize) -> AppState {
        let mut state = AppState::default();
        let mut run = BattleRun::new(1);
        run.team = vec![Fighter {
            original_id: 25,
            base_id: 25,
            name: "pikachu".into(),
            level: 5,
            stats: CombatStats::default(),
            max_hp: 20,
            current_hp: 20,
            moves: (0..moves)
                .map(|i| Move::new(&format!("move-{i}"), 40, "normal", 100))
                .collect(),
            fainted: false,
        }];
        state.run = Some(run);
        state.phase = Phase::Battle;
        state
    }

    #[test]
    fn number_keys_pick_existing_moves_only() {
        let state = battle_state(2);
        assert_eq!(
            handle_key(press(KeyCode::Char('2')), &state).actions,
            vec![Action::BattleAttack(1)]
        );
        assert!(handle_key(press(KeyCode::Char('3')), &state)
            .actions
            .is_empty());
    }

    #[test]
    fn move_cursor_wraps() {
        let state = battle_state(4);
        assert_eq!(
            handle_key(press(KeyCode::Up), &state).actions,
            vec![Action::MoveSelect(3)]
        );
        assert_eq!(
            handle_key(press(KeyCode::Enter), &state).actions,
            vec![Action::BattleAttack(0)]
        );
    }

    #[test]
    fn lobby_keys() {
        let mut state = AppState::default();
        state.team = TeamStore::from_members(vec![
            TeamMember::new(1, "bulbasaur", &["grass"]),
            TeamMember::new(4, "charmander", &["fire"]),
        ]);
        assert_eq!(
            handle_key(press(KeyCode::Down), &state).actions,
            vec![Action::LobbySelect(1)]
        );
        assert_eq!(
            handle_key(press(KeyCode::Char(' ')), &state).actions,
            vec![Action::LobbyToggle]
        );
        assert_eq!(
            handle_key(press(KeyCode::Enter), &state).actions,
            vec![Action::TowerStart]
        );
    }

    #[test]
    fn intro_swallows_input() {
        let mut state = battle_state(1);
        state.phase = Phase::Intro;
        assert!(handle_key(press(KeyCode::Enter), &state).actions.is_empty());
        assert_eq!(
            handle_key(press(KeyCode::Char('m')), &state).actions,
            vec![Action::ToggleMute]
        );
    }

    #[test]
    fn retry_only_after_failure() {
        let mut state = battle_state(1);
        state.phase = Phase::Loading;
        assert!(handle_key(press(KeyCode::Char('r')), &state).actions.is_empty());
        if let Some(run) = state.run.as_mut() {
            run.error = Some("offline".into());
        }
        assert_eq!(
            handle_key(press(KeyCode::Char('r')), &state).actions,
            vec![Action::EncounterRetry]
        );
    }

    #[test]
    fn add_prompt_captures_keys() {
        let mut state = AppState::default();
        assert_eq!(
            handle_key(press(KeyCode::Char('a')), &state).actions,
            vec![Action::LobbyAddOpen]
        );

        state.lobby.add_input = Some("2".into());
        assert_eq!(
            handle_key(press(KeyCode::Char('5')), &state).actions,
            vec![Action::LobbyAddInputChanged("25".into())]
        );
        assert_eq!(
            handle_key(press(KeyCode::Backspace), &state).actions,
            vec![Action::LobbyAddInputChanged(String::new())]
        );
        assert!(handle_key(press(KeyCode::Char('q')), &state).actions.is_empty());
        assert_eq!(
            handle_key(press(KeyCode::Enter), &state).actions,
            vec![Action::LobbyAddSubmit]
        );
        assert_eq!(
            handle_key(press(KeyCode::Esc), &state).actions,
            vec![Action::LobbyAddCancel]
        );
    }

    #[test]
    fn move_menu_follows_the_snapshot() {
        use tui_dispatch::testing::RenderHarness;

        let mut render = RenderHarness::new(80, 30);
        let mut state = battle_state(1);
        assert!(state.snapshot().awaiting_move);
        let output = render.render_to_string_plain(|frame| {
            render_state(frame, frame.area(), &state);
        });
        assert!(output.contains("Move 0"));

        if let Some(run) = state.run.as_mut() {
            run.resolving = true;
        }
        assert!(!state.snapshot().awaiting_move);
        let output = render.render_to_string_plain(|frame| {
            render_state(frame, frame.area(), &state);
        });
        assert!(!output.contains("Move 0"));
        assert!(output.contains("PIKACHU"));
    }
}
