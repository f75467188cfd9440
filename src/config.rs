use std::env;
use std::path::PathBuf;

use crate::aggregate::DEFAULT_TOP_N;

pub const DEFAULT_DATA_FILE: &str = "Prova ABP.xlsx";
pub const DEFAULT_LOG_FILE: &str = "abp_terminal.log";

#[derive(Debug, Clone)]
pub struct Config {
    pub data_path: PathBuf,
    pub export_dir: PathBuf,
    pub log_file: PathBuf,
    pub layout_seed: u64,
    pub top_n: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_FILE),
            export_dir: PathBuf::from("."),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            layout_seed: 42,
            top_n: DEFAULT_TOP_N,
        }
    }
}

impl Config {
    /// Loads `.env.local` then `.env`, then reads `ABP_*` variables.
    pub fn from_env() -> Self {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");

        let defaults = Self::default();
        Self {
            data_path: path_env("ABP_DATA_PATH").unwrap_or(defaults.data_path),
            export_dir: path_env("ABP_EXPORT_DIR").unwrap_or(defaults.export_dir),
            log_file: path_env("ABP_LOG_FILE").unwrap_or(defaults.log_file),
            layout_seed: env::var("ABP_LAYOUT_SEED")
                .ok()
                .and_then(|val| val.trim().parse::<u64>().ok())
                .unwrap_or(defaults.layout_seed),
            top_n: env::var("ABP_TOP_N")
                .ok()
                .and_then(|val| val.trim().parse::<usize>().ok())
                .unwrap_or(defaults.top_n)
                .clamp(1, 50),
        }
    }
}

/// Value of `--name value` or `--name=value`, ignoring blanks.
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

impl Config {
    /// Command-line overrides shared by both binaries.
    pub fn apply_args(&mut self, args: &[String]) {
        if let Some(path) = arg_value(args, "--data") {
            self.data_path = PathBuf::from(path);
        }
        if let Some(dir) = arg_value(args, "--out") {
            self.export_dir = PathBuf::from(dir);
        }
        if let Some(seed) = arg_value(args, "--seed").and_then(|v| v.parse::<u64>().ok()) {
            self.layout_seed = seed;
        }
    }
}

fn path_env(key: &str) -> Option<PathBuf> {
    env::var(key)
        .ok()
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn arg_value_accepts_both_forms() {
        assert_eq!(
            arg_value(&args(&["--data", "x.csv"]), "--data").as_deref(),
            Some("x.csv")
        );
        assert_eq!(
            arg_value(&args(&["--data=y.xlsx"]), "--data").as_deref(),
            Some("y.xlsx")
        );
        assert_eq!(arg_value(&args(&["--data"]), "--data"), None);
        assert_eq!(arg_value(&args(&["--data=  "]), "--data"), None);
    }

    #[test]
    fn args_override_config() {
        let mut config = Config::default();
        config.apply_args(&args(&["--data", "liga.csv", "--out=exports", "--seed", "7"]));
        assert_eq!(config.data_path, PathBuf::from("liga.csv"));
        assert_eq!(config.export_dir, PathBuf::from("exports"));
        assert_eq!(config.layout_seed, 7);
    }
}
