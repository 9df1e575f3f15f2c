use std::collections::VecDeque;
use std::path::PathBuf;

use crate::game_log::GameLog;
use crate::stats::{MatchupRecord, ProtocolRecord, StatsSnapshot};

const LOG_CAPACITY: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Stats,
    Logs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsPane {
    Players,
    Protocols,
    Matchups,
}

impl StatsPane {
    pub fn next(self) -> Self {
        match self {
            StatsPane::Players => StatsPane::Protocols,
            StatsPane::Protocols => StatsPane::Matchups,
            StatsPane::Matchups => StatsPane::Players,
        }
    }
}

/// Requests from the UI to the store worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCommand {
    Refresh,
    Delete { id: i64 },
    ClearAll,
    Export { dir: PathBuf },
}

/// Updates from the store worker to the UI.
#[derive(Debug, Clone)]
pub enum Delta {
    Loaded {
        logs: Vec<GameLog>,
        stats: StatsSnapshot,
        skipped: usize,
    },
    Exported(PathBuf),
    Log(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerRow {
    pub name: String,
    pub wins: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolRow {
    pub name: String,
    pub record: ProtocolRecord,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchupRow {
    pub protocol_a: String,
    pub protocol_b: String,
    pub record: MatchupRecord,
}

#[derive(Debug)]
pub struct AppState {
    pub screen: Screen,
    pub pane: StatsPane,
    pub logs: Vec<GameLog>,
    pub stats: StatsSnapshot,
    pub skipped: usize,
    pub loading: bool,
    pub selected: usize,
    pub stats_scroll: usize,
    pub confirm_clear: bool,
    pub help_overlay: bool,
    pub last_export: Option<PathBuf>,
    pub feed: VecDeque<String>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            screen: Screen::Stats,
            pane: StatsPane::Players,
            logs: Vec::new(),
            stats: StatsSnapshot::default(),
            skipped: 0,
            loading: true,
            selected: 0,
            stats_scroll: 0,
            confirm_clear: false,
            help_overlay: false,
            last_export: None,
            feed: VecDeque::new(),
        }
    }

    pub fn push_log(&mut self, line: impl Into<String>) {
        if self.feed.len() >= LOG_CAPACITY {
            self.feed.pop_front();
        }
        self.feed.push_back(line.into());
    }

    pub fn toggle_screen(&mut self) {
        self.screen = match self.screen {
            Screen::Stats => Screen::Logs,
            Screen::Logs => Screen::Stats,
        };
        self.confirm_clear = false;
    }

    pub fn cycle_pane(&mut self) {
        self.pane = self.pane.next();
        self.stats_scroll = 0;
    }

    pub fn select_next(&mut self) {
        match self.screen {
            Screen::Logs => {
                if self.selected + 1 < self.logs.len() {
                    self.selected += 1;
                }
            }
            Screen::Stats => {
                if self.stats_scroll + 1 < self.pane_len() {
                    self.stats_scroll += 1;
                }
            }
        }
    }

    pub fn select_prev(&mut self) {
        match self.screen {
            Screen::Logs => self.selected = self.selected.saturating_sub(1),
            Screen::Stats => self.stats_scroll = self.stats_scroll.saturating_sub(1),
        }
    }

    pub fn selected_log(&self) -> Option<&GameLog> {
        self.logs.get(self.selected)
    }

    pub fn selected_log_id(&self) -> Option<i64> {
        self.selected_log().map(|log| log.id)
    }

    pub fn pane_len(&self) -> usize {
        match self.pane {
            StatsPane::Players => self.stats.player_wins.len(),
            StatsPane::Protocols => self.stats.protocol_stats.len(),
            StatsPane::Matchups => self.stats.protocol_matchups.len(),
        }
    }

    pub fn player_rows(&self) -> Vec<PlayerRow> {
        player_rows(&self.stats)
    }

    pub fn protocol_rows(&self) -> Vec<ProtocolRow> {
        protocol_rows(&self.stats)
    }

    pub fn matchup_rows(&self) -> Vec<MatchupRow> {
        matchup_rows(&self.stats)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::Loaded {
            logs,
            stats,
            skipped,
        } => {
            state.logs = logs;
            state.stats = stats;
            state.skipped = skipped;
            state.loading = false;
            state.confirm_clear = false;
            if state.selected >= state.logs.len() {
                state.selected = state.logs.len().saturating_sub(1);
            }
            let pane_len = state.pane_len();
            if state.stats_scroll >= pane_len {
                state.stats_scroll = pane_len.saturating_sub(1);
            }
        }
        Delta::Exported(path) => {
            state.push_log(format!("[INFO] Exported {}", path.display()));
            state.last_export = Some(path);
        }
        Delta::Log(line) => state.push_log(line),
    }
}

/// Most wins first, ties by name.
pub fn player_rows(stats: &StatsSnapshot) -> Vec<PlayerRow> {
    let mut rows = stats
        .player_wins
        .iter()
        .map(|(name, wins)| PlayerRow {
            name: name.clone(),
            wins: *wins,
        })
        .collect::<Vec<_>>();
    rows.sort_by(|a, b| b.wins.cmp(&a.wins).then_with(|| a.name.cmp(&b.name)));
    rows
}

pub fn protocol_rows(stats: &StatsSnapshot) -> Vec<ProtocolRow> {
    stats
        .protocol_stats
        .iter()
        .map(|(name, record)| ProtocolRow {
            name: name.clone(),
            record: *record,
        })
        .collect()
}

pub fn matchup_rows(stats: &StatsSnapshot) -> Vec<MatchupRow> {
    stats
        .protocol_matchups
        .iter()
        .map(|(key, record)| {
            let (a, b) = stats.matchup_labels(key).unwrap_or((key.as_str(), ""));
            MatchupRow {
                protocol_a: a.to_string(),
                protocol_b: b.to_string(),
                record: *record,
            }
        })
        .collect()
}
