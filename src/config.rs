use std::env;
use std::path::PathBuf;

const APP_DIR: &str = "compile_stats";
const DB_FILE: &str = "compile_stats.db";

pub const DB_ENV: &str = "COMPILE_STATS_DB";
pub const EXPORT_DIR_ENV: &str = "COMPILE_STATS_EXPORT_DIR";

/// Flags that consume the following argument when not written as `--flag=value`.
const VALUE_FLAGS: &[&str] = &["--db", "--out", "--games", "--seed", "--players"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub export_dir: PathBuf,
}

impl AppConfig {
    /// Loads `.env` files, then resolves paths from the process arguments.
    pub fn load() -> Self {
        load_dotenv();
        Self::from_args(&cli_args())
    }

    pub fn from_args(args: &[String]) -> Self {
        let db_path = arg_value(args, "--db")
            .map(PathBuf::from)
            .or_else(|| env_path(DB_ENV))
            .unwrap_or_else(default_db_path);
        let export_dir = arg_value(args, "--out")
            .map(PathBuf::from)
            .or_else(|| env_path(EXPORT_DIR_ENV))
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            db_path,
            export_dir,
        }
    }
}

pub fn load_dotenv() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
}

pub fn cli_args() -> Vec<String> {
    env::args().skip(1).collect()
}

/// Value of `--name=value` or `--name value`; blank values are ignored.
pub fn arg_value(args: &[String], name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix(&prefix) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == name
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}

pub fn has_flag(args: &[String], name: &str) -> bool {
    args.iter().any(|arg| arg == name)
}

/// Arguments that are neither flags nor flag values.
pub fn positional_args(args: &[String]) -> Vec<String> {
    let mut out = Vec::new();
    let mut skip_next = false;
    for arg in args {
        if skip_next {
            skip_next = false;
            continue;
        }
        if arg.starts_with("--") {
            skip_next = VALUE_FLAGS.contains(&arg.as_str());
            continue;
        }
        out.push(arg.clone());
    }
    out
}

pub fn default_db_path() -> PathBuf {
    data_dir()
        .map(|dir| dir.join(DB_FILE))
        .unwrap_or_else(|| PathBuf::from(DB_FILE))
}

fn data_dir() -> Option<PathBuf> {
    if let Some(base) = env_path("XDG_DATA_HOME") {
        return Some(base.join(APP_DIR));
    }
    let home = env_path("HOME")?;
    Some(home.join(".local").join("share").join(APP_DIR))
}

fn env_path(key: &str) -> Option<PathBuf> {
    let raw = env::var(key).ok()?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(PathBuf::from(trimmed))
}
