use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::payoff::DEFAULT_MAX_DISPLAY_MONTHS;

const DB_FILE: &str = "debtui.db";
const LOG_FILE: &str = "debtui.log";
const DEFAULT_PROFILE: &str = "default";

pub(crate) const ENV_DATA_DIR: &str = "DEBTUI_DATA_DIR";
pub(crate) const ENV_PROFILE: &str = "DEBTUI_PROFILE";
pub(crate) const ENV_MAX_MONTHS: &str = "DEBTUI_MAX_MONTHS";

/// Runtime settings. Precedence: command-line flag, then environment, then default.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Config {
    pub(crate) data_dir: PathBuf,
    pub(crate) profile: String,
    pub(crate) max_display_months: usize,
}

impl Config {
    /// Resolve from the process arguments and environment. Returns the config
    /// and the arguments left over once global flags are removed.
    pub(crate) fn from_args(args: &[String]) -> Result<(Self, Vec<String>)> {
        Self::resolve(args, |key| std::env::var(key).ok())
    }

    fn resolve(
        args: &[String],
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<(Self, Vec<String>)> {
        let mut data_dir: Option<PathBuf> = None;
        let mut profile: Option<String> = None;
        let mut max_months: Option<String> = None;
        let mut rest = Vec::with_capacity(args.len());

        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--data-dir" => data_dir = Some(PathBuf::from(flag_value(&mut iter, arg)?)),
                "--profile" => profile = Some(flag_value(&mut iter, arg)?),
                "--max-months" => max_months = Some(flag_value(&mut iter, arg)?),
                _ => rest.push(arg.clone()),
            }
        }

        let data_dir = match data_dir.or_else(|| env(ENV_DATA_DIR).map(PathBuf::from)) {
            Some(dir) => dir,
            None => default_data_dir()?,
        };

        let profile = profile
            .or_else(|| env(ENV_PROFILE))
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| DEFAULT_PROFILE.to_string());

        let max_display_months = match max_months.or_else(|| env(ENV_MAX_MONTHS)) {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .with_context(|| format!("Invalid month cap: '{raw}' (expected a positive number)"))?,
            None => DEFAULT_MAX_DISPLAY_MONTHS,
        };

        Ok((
            Self {
                data_dir,
                profile,
                max_display_months,
            },
            rest,
        ))
    }

    pub(crate) fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE)
    }

    pub(crate) fn log_path(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE)
    }

    pub(crate) fn ensure_data_dir(&self) -> Result<&Path> {
        std::fs::create_dir_all(&self.data_dir).with_context(|| {
            format!(
                "Failed to create data directory: {}",
                self.data_dir.display()
            )
        })?;
        Ok(&self.data_dir)
    }
}

fn flag_value<'a>(iter: &mut impl Iterator<Item = &'a String>, flag: &str) -> Result<String> {
    iter.next()
        .cloned()
        .with_context(|| format!("Missing value for {flag}"))
}

fn default_data_dir() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "debtui", "DebTUI")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    Ok(proj_dirs.data_dir().to_path_buf())
}
