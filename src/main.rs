use std::io;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use compile_stats::config::AppConfig;
use compile_stats::state::{self, AppState, Screen, StatsPane, StoreCommand, apply_delta};
use compile_stats::store_worker::spawn_store_worker;

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<StoreCommand>>,
    export_dir: PathBuf,
    db_label: String,
}

impl App {
    fn new(cmd_tx: Option<mpsc::Sender<StoreCommand>>, config: &AppConfig) -> Self {
        Self {
            state: AppState::new(),
            should_quit: false,
            cmd_tx,
            export_dir: config.export_dir.clone(),
            db_label: config.db_path.display().to_string(),
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.confirm_clear {
            if matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y')) {
                self.send(StoreCommand::ClearAll, "Clear");
            } else {
                self.state.push_log("[INFO] Clear cancelled");
            }
            self.state.confirm_clear = false;
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('1') => self.state.screen = Screen::Stats,
            KeyCode::Char('2') => self.state.screen = Screen::Logs,
            KeyCode::Tab => {
                if self.state.screen == Screen::Stats {
                    self.state.cycle_pane();
                } else {
                    self.state.toggle_screen();
                }
            }
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char('r') | KeyCode::Char('R') => self.send(StoreCommand::Refresh, "Refresh"),
            KeyCode::Char('d') | KeyCode::Delete => self.delete_selected(),
            KeyCode::Char('C') => {
                if self.state.logs.is_empty() {
                    self.state.push_log("[INFO] Nothing to clear");
                } else {
                    self.state.confirm_clear = true;
                }
            }
            KeyCode::Char('x') | KeyCode::Char('X') => self.send(
                StoreCommand::Export {
                    dir: self.export_dir.clone(),
                },
                "Export",
            ),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Esc => self.state.help_overlay = false,
            _ => {}
        }
    }

    fn delete_selected(&mut self) {
        if self.state.screen != Screen::Logs {
            return;
        }
        let Some(id) = self.state.selected_log_id() else {
            self.state.push_log("[INFO] No log selected");
            return;
        };
        self.send(StoreCommand::Delete { id }, "Delete");
    }

    fn send(&mut self, cmd: StoreCommand, label: &str) {
        let Some(tx) = &self.cmd_tx else {
            self.state.push_log(format!("[INFO] {label} unavailable"));
            return;
        };
        if tx.send(cmd).is_err() {
            self.state.push_log(format!("[WARN] {label} request failed"));
        }
    }
}

fn main() -> io::Result<()> {
    let config = AppConfig::load();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    spawn_store_worker(config.db_path.clone(), tx, cmd_rx);

    let mut app = App::new(Some(cmd_tx), &config);
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<state::Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.on_key(key);
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(app)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.state.screen {
        Screen::Stats => render_stats(frame, chunks[1], &app.state),
        Screen::Logs => render_logs(frame, chunks[1], &app.state),
    }

    render_feed(frame, chunks[2], &app.state);

    let footer = Paragraph::new(footer_text(&app.state)).style(footer_style(&app.state));
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(app: &App) -> String {
    let state = &app.state;
    let title = match state.screen {
        Screen::Stats => format!("COMPILE STATS | Pane: {}", pane_label(state.pane)),
        Screen::Logs => "COMPILE STATS | Game Logs".to_string(),
    };
    let counts = if state.loading {
        "loading...".to_string()
    } else {
        format!(
            "games {} | logs {} | skipped {}",
            state.stats.games_played,
            state.logs.len(),
            state.skipped
        )
    };
    format!("{title}\n{counts}\ndb: {}", app.db_label)
}

fn footer_text(state: &AppState) -> String {
    if state.confirm_clear {
        return format!(
            "Delete ALL {} game logs? y to confirm, any other key cancels",
            state.logs.len()
        );
    }
    match state.screen {
        Screen::Stats => {
            "1 Stats | 2 Logs | Tab Pane | j/k/↑/↓ Scroll | r Refresh | x Export | ? Help | q Quit"
                .to_string()
        }
        Screen::Logs => {
            "1 Stats | 2 Logs | j/k/↑/↓ Move | d Delete | C Clear all | r Refresh | x Export | ? Help | q Quit"
                .to_string()
        }
    }
}

fn footer_style(state: &AppState) -> Style {
    if state.confirm_clear {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    }
}

fn pane_label(pane: StatsPane) -> &'static str {
    match pane {
        StatsPane::Players => "Players",
        StatsPane::Protocols => "Protocols",
        StatsPane::Matchups => "Matchups",
    }
}

fn render_stats(frame: &mut Frame, area: Rect, state: &AppState) {
    if state.loading {
        let loading =
            Paragraph::new("Loading stats...").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(loading, area);
        return;
    }
    if state.stats.is_empty() {
        let empty = Paragraph::new("No game data recorded yet.")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, area);
        return;
    }

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(30),
            Constraint::Percentage(45),
        ])
        .split(area);

    let players = state
        .player_rows()
        .into_iter()
        .map(|row| format!("{:<16} {:>4} W", truncate(&row.name, 16), row.wins))
        .collect::<Vec<_>>();
    render_pane(frame, columns[0], "Player Wins", players, state, StatsPane::Players);

    let protocols = state
        .protocol_rows()
        .into_iter()
        .map(|row| {
            format!(
                "{:<10} {:>3}W / {:>3}L ({:>3}%)",
                truncate(&row.name, 10),
                row.record.wins,
                row.record.losses,
                row.record.win_rate_pct()
            )
        })
        .collect::<Vec<_>>();
    render_pane(frame, columns[1], "Protocols (W/L)", protocols, state, StatsPane::Protocols);

    let matchups = state
        .matchup_rows()
        .into_iter()
        .map(|row| {
            let a = row.record.side_a();
            let b = row.record.side_b();
            format!(
                "{} vs {} ({}) | {} {}W/{}L {}% | {} {}W/{}L {}%",
                row.protocol_a,
                row.protocol_b,
                row.record.games(),
                row.protocol_a,
                a.wins,
                a.losses,
                a.win_rate_pct(),
                row.protocol_b,
                b.wins,
                b.losses,
                b.win_rate_pct()
            )
        })
        .collect::<Vec<_>>();
    render_pane(frame, columns[2], "Matchups (by draft slot)", matchups, state, StatsPane::Matchups);
}

fn render_pane(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    lines: Vec<String>,
    state: &AppState,
    pane: StatsPane,
) {
    let focused = state.pane == pane;
    let border_style = if focused {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let offset = if focused { state.stats_scroll } else { 0 };
    let text = if lines.is_empty() {
        "none recorded".to_string()
    } else {
        lines.into_iter().skip(offset).collect::<Vec<_>>().join("\n")
    };
    let widget = Paragraph::new(text).block(
        Block::default()
            .title(title.to_string())
            .borders(Borders::ALL)
            .border_style(border_style),
    );
    frame.render_widget(widget, area);
}

fn render_logs(frame: &mut Frame, area: Rect, state: &AppState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(area);

    let widths = log_columns();
    render_logs_header(frame, sections[0], &widths);

    let list_area = sections[1];
    if state.logs.is_empty() {
        let empty =
            Paragraph::new("No game logs stored").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, list_area);
        return;
    }
    if list_area.height == 0 {
        return;
    }

    let visible = list_area.height as usize;
    let (start, end) = visible_range(state.selected, state.logs.len(), visible);

    for (i, idx) in (start..end).enumerate() {
        let row_area = Rect {
            x: list_area.x,
            y: list_area.y + i as u16,
            width: list_area.width,
            height: 1,
        };
        let selected = idx == state.selected;
        let row_style = if selected {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else {
            Style::default()
        };
        if selected {
            frame.render_widget(Block::default().style(row_style), row_area);
        }

        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(widths)
            .split(row_area);

        let view = state.logs[idx].to_view();
        let when = view.timestamp.get(..16).unwrap_or(&view.timestamp).replace('T', " ");
        render_cell_text(frame, cols[0], &view.id.to_string(), row_style);
        render_cell_text(frame, cols[1], &when, row_style);
        render_cell_text(frame, cols[2], &view.player1_name, row_style);
        render_cell_text(frame, cols[3], &protocols_label(&view.player1_protocols), row_style);
        render_cell_text(frame, cols[4], &view.player2_name, row_style);
        render_cell_text(frame, cols[5], &protocols_label(&view.player2_protocols), row_style);
        render_cell_text(frame, cols[6], &view.winner_name, row_style);
    }
}

fn log_columns() -> [Constraint; 7] {
    [
        Constraint::Length(6),
        Constraint::Length(17),
        Constraint::Length(14),
        Constraint::Min(24),
        Constraint::Length(14),
        Constraint::Min(24),
        Constraint::Length(14),
    ]
}

fn render_logs_header(frame: &mut Frame, area: Rect, widths: &[Constraint]) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(widths.iter().copied())
        .split(area);
    let style = Style::default().add_modifier(Modifier::BOLD);

    render_cell_text(frame, cols[0], "ID", style);
    render_cell_text(frame, cols[1], "Logged (UTC)", style);
    render_cell_text(frame, cols[2], "Player 1", style);
    render_cell_text(frame, cols[3], "Protocols", style);
    render_cell_text(frame, cols[4], "Player 2", style);
    render_cell_text(frame, cols[5], "Protocols", style);
    render_cell_text(frame, cols[6], "Winner", style);
}

fn render_cell_text(frame: &mut Frame, area: Rect, text: &str, style: Style) {
    let paragraph = Paragraph::new(text.to_string()).style(style);
    frame.render_widget(paragraph, area);
}

fn render_feed(frame: &mut Frame, area: Rect, state: &AppState) {
    let visible = area.height.saturating_sub(1) as usize;
    let start = state.feed.len().saturating_sub(visible);
    let text = state
        .feed
        .iter()
        .skip(start)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n");
    let feed = Paragraph::new(text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::TOP).title("Log"));
    frame.render_widget(feed, area);
}

fn protocols_label(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().unwrap_or("-"))
            .collect::<Vec<_>>()
            .join(" / "),
        serde_json::Value::String(raw) => format!("<bad: {}>", truncate(raw, 16)),
        other => other.to_string(),
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out = text.chars().take(max.saturating_sub(1)).collect::<String>();
    out.push('…');
    out
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Compile Stats - Help",
        "",
        "Global:",
        "  1            Stats",
        "  2            Game logs",
        "  r            Reload from database",
        "  x            Export workbook (.xlsx)",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Stats:",
        "  Tab          Next pane",
        "  j/k or ↑/↓   Scroll pane",
        "",
        "Logs:",
        "  j/k or ↑/↓   Move",
        "  d / Del      Delete selected log",
        "  C            Clear all logs (asks first)",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
