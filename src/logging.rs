use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::{Mutex, Once};

use tracing_subscriber::{fmt, EnvFilter};

pub(crate) const ENV_LOG: &str = "DEBTUI_LOG";
const DEFAULT_DIRECTIVE: &str = "debtui=info";

static TRACING_INIT: Once = Once::new();

/// Route tracing output to `log_path`. Stdout belongs to the TUI, so nothing
/// is written to the terminal. Later calls are no-ops.
pub(crate) fn init_tracing(log_path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("Failed to open log file: {}", log_path.display()))?;

    TRACING_INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(ENV_LOG)
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

        // Another subscriber may already be installed (tests); keep it.
        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .with_target(false)
            .try_init();
    });
    Ok(())
}
