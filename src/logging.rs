//! Logging setup
//!
//! The TUI owns stdout, so log output goes to a file that is truncated on
//! every start. The filter defaults to `prodsearch=info` and can be
//! overridden with `RUST_LOG`.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "prodsearch=info";

/// Default log file: `<cache dir>/prodsearch/prodsearch.log`, or the working
/// directory when there is no cache dir
pub fn default_log_path() -> PathBuf {
    dirs::cache_dir()
        .map(|d| d.join("prodsearch"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("prodsearch.log")
}

fn env_filter(verbose: bool) -> EnvFilter {
    let fallback = if verbose {
        "prodsearch=debug"
    } else {
        DEFAULT_FILTER
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// Log to `path`. Falls back to stderr if the file cannot be opened.
pub fn init_file(path: &Path, verbose: bool) {
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true) // Start fresh each run
        .open(path);

    match file {
        Ok(file) => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter(verbose))
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .try_init();
        }
        Err(e) => {
            eprintln!("[prodsearch] Cannot open log file {}: {}", path.display(), e);
            init_stderr(verbose);
        }
    }
}

/// Log to stderr, for the one-shot commands
pub fn init_stderr(verbose: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_writer(std::io::stderr)
        .try_init();
}
