use std::path::PathBuf;
use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use anyhow::Result;
use chrono::Utc;

use crate::export;
use crate::state::{Delta, StoreCommand};
use crate::stats::aggregate_with_report;
use crate::store::LogStore;

/// Owns the store on its own thread; the UI only ever sees finished snapshots.
pub fn spawn_store_worker(db_path: PathBuf, tx: Sender<Delta>, cmd_rx: Receiver<StoreCommand>) {
    thread::spawn(move || {
        let store = match LogStore::open(&db_path) {
            Ok(store) => store,
            Err(err) => {
                let _ = tx.send(Delta::Log(format!("[WARN] Store unavailable: {err:#}")));
                return;
            }
        };
        let _ = tx.send(Delta::Log(format!(
            "[INFO] Opened {}",
            db_path.display()
        )));
        if let Err(err) = send_snapshot(&store, &tx) {
            let _ = tx.send(Delta::Log(format!("[WARN] Stats load failed: {err:#}")));
        }

        while let Ok(cmd) = cmd_rx.recv() {
            if let Err(err) = handle_command(&store, cmd, &tx) {
                let _ = tx.send(Delta::Log(format!("[WARN] {err:#}")));
            }
        }
    });
}

pub fn handle_command(store: &LogStore, cmd: StoreCommand, tx: &Sender<Delta>) -> Result<()> {
    match cmd {
        StoreCommand::Refresh => send_snapshot(store, tx),
        StoreCommand::Delete { id } => {
            let line = if store.delete(id)? > 0 {
                format!("[INFO] Log {id} deleted")
            } else {
                format!("[WARN] Log {id} not found")
            };
            let _ = tx.send(Delta::Log(line));
            send_snapshot(store, tx)
        }
        StoreCommand::ClearAll => {
            store.clear()?;
            let _ = tx.send(Delta::Log("[INFO] All game logs cleared".to_string()));
            send_snapshot(store, tx)
        }
        StoreCommand::Export { dir } => {
            let logs = store.list()?;
            let stats = aggregate_with_report(&logs).snapshot;
            let path = dir.join(export::default_export_name(Utc::now()));
            export::export_stats(&path, &stats, &logs)?;
            let _ = tx.send(Delta::Exported(path));
            Ok(())
        }
    }
}

fn send_snapshot(store: &LogStore, tx: &Sender<Delta>) -> Result<()> {
    let logs = store.list()?;
    let report = aggregate_with_report(&logs);
    for skipped in &report.skipped {
        let _ = tx.send(Delta::Log(format!(
            "[WARN] Skipped log {}: {}",
            skipped.id, skipped.defect
        )));
    }
    let _ = tx.send(Delta::Loaded {
        logs,
        stats: report.snapshot,
        skipped: report.skipped.len(),
    });
    Ok(())
}
