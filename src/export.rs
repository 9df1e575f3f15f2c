use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::game_log::GameLog;
use crate::state::{matchup_rows, player_rows, protocol_rows};
use crate::stats::StatsSnapshot;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub path: PathBuf,
    pub players: usize,
    pub protocols: usize,
    pub matchups: usize,
    pub logs: usize,
}

pub fn default_export_name(now: DateTime<Utc>) -> String {
    format!("compile_stats_{}.xlsx", now.format("%Y%m%d_%H%M%S"))
}

pub fn export_stats(path: &Path, stats: &StatsSnapshot, logs: &[GameLog]) -> Result<ExportReport> {
    let summary = vec![
        vec!["Metric".to_string(), "Value".to_string()],
        vec!["Games Played".to_string(), stats.games_played.to_string()],
        vec!["Players".to_string(), stats.player_wins.len().to_string()],
        vec!["Protocols".to_string(), stats.protocol_stats.len().to_string()],
        vec![
            "Matchups".to_string(),
            stats.protocol_matchups.len().to_string(),
        ],
    ];

    let mut players = vec![vec!["Player".to_string(), "Wins".to_string()]];
    players.extend(
        player_rows(stats)
            .into_iter()
            .map(|row| vec![row.name, row.wins.to_string()]),
    );

    let mut protocols = vec![vec![
        "Protocol".to_string(),
        "Wins".to_string(),
        "Losses".to_string(),
        "Win %".to_string(),
    ]];
    protocols.extend(protocol_rows(stats).into_iter().map(|row| {
        vec![
            row.name,
            row.record.wins.to_string(),
            row.record.losses.to_string(),
            row.record.win_rate_pct().to_string(),
        ]
    }));

    let mut matchups = vec![vec![
        "Protocol A".to_string(),
        "Protocol B".to_string(),
        "Games".to_string(),
        "A Wins".to_string(),
        "A Losses".to_string(),
        "A Win %".to_string(),
        "B Win %".to_string(),
    ]];
    matchups.extend(matchup_rows(stats).into_iter().map(|row| {
        vec![
            row.protocol_a,
            row.protocol_b,
            row.record.games().to_string(),
            row.record.wins_a.to_string(),
            row.record.losses_a.to_string(),
            row.record.side_a().win_rate_pct().to_string(),
            row.record.side_b().win_rate_pct().to_string(),
        ]
    }));

    let mut log_rows = vec![vec![
        "ID".to_string(),
        "Timestamp".to_string(),
        "Player 1".to_string(),
        "Player 1 Protocols".to_string(),
        "Player 2".to_string(),
        "Player 2 Protocols".to_string(),
        "Winner".to_string(),
    ]];
    log_rows.extend(logs.iter().map(log_row));

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Summary")?;
        write_rows(sheet, &summary)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Players")?;
        write_rows(sheet, &players)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Protocols")?;
        write_rows(sheet, &protocols)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Matchups")?;
        write_rows(sheet, &matchups)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("GameLogs")?;
        write_rows(sheet, &log_rows)?;
    }

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create export dir {}", parent.display()))?;
    }
    workbook
        .save(path)
        .with_context(|| format!("save workbook {}", path.display()))?;
    log::info!("stats exported to {}", path.display());

    Ok(ExportReport {
        path: path.to_path_buf(),
        players: players.len() - 1,
        protocols: protocols.len() - 1,
        matchups: matchups.len() - 1,
        logs: logs.len(),
    })
}

fn log_row(log: &GameLog) -> Vec<String> {
    let view = log.to_view();
    vec![
        view.id.to_string(),
        view.timestamp,
        view.player1_name,
        protocols_cell(&view.player1_protocols),
        view.player2_name,
        protocols_cell(&view.player2_protocols),
        view.winner_name,
    ]
}

fn protocols_cell(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().unwrap_or_default())
            .collect::<Vec<_>>()
            .join(", "),
        serde_json::Value::String(raw) => raw.clone(),
        other => other.to_string(),
    }
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
