use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::EnvFilter;

const LOG_FILE_NAME: &str = "web-search-agent.log";

/// Keeps the non-blocking writer alive. Drop it only at shutdown.
#[allow(dead_code)]
pub struct LogGuard(WorkerGuard);

/// How debug log files are rotated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogRotation {
    /// Append to a single file
    #[default]
    None,
    /// One file per day, `{name}.YYYY-MM-DD`
    Daily,
}

#[derive(Debug, Clone, Default)]
pub struct LogSettings {
    /// Write debug-level logs to a file instead of warnings to stderr
    pub debug: bool,
    /// File or directory for debug logs; defaults to the user cache dir
    pub log_path: Option<PathBuf>,
    pub rotation: LogRotation,
    /// Rotated files to keep (daily rotation only), default 7
    pub keep: Option<usize>,
}

/// Initialize tracing.
///
/// Without `debug`, warnings go to stderr and `RUST_LOG` can raise the level.
/// With `debug`, logs go to a file and a guard is returned that must be held.
pub fn init(settings: &LogSettings) -> Result<Option<LogGuard>> {
    if !settings.debug {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init()
            .ok(); // Already initialized (e.g. in tests)
        return Ok(None);
    }

    let base = resolve_log_path(settings.log_path.as_deref())?;

    let (writer, guard): (NonBlocking, WorkerGuard) = match settings.rotation {
        LogRotation::None => {
            ensure_parent_dir(&base)?;
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&base)
                .with_context(|| format!("Failed to open log file: {}", base.display()))?;
            tracing_appender::non_blocking(file)
        }
        LogRotation::Daily => {
            let (dir, base_name) = split_dir_and_name(&base)?;
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
            cleanup_rotated_logs(&dir, &base_name, settings.keep.unwrap_or(7))?;
            tracing_appender::non_blocking(tracing_appender::rolling::daily(&dir, &base_name))
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("web_search_agent=debug,warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(true)
        .with_writer(writer)
        .try_init()
        .ok();

    tracing::info!(log_file = %base.display(), rotation = ?settings.rotation, "debug logging enabled");

    Ok(Some(LogGuard(guard)))
}

fn default_log_path() -> Result<PathBuf> {
    let dir = dirs::cache_dir()
        .context("Failed to get cache directory")?
        .join("web-search-agent");
    Ok(dir.join(LOG_FILE_NAME))
}

fn resolve_log_path(configured: Option<&Path>) -> Result<PathBuf> {
    let Some(path) = configured else {
        return default_log_path();
    };

    let raw = path.to_string_lossy();
    if raw.ends_with(std::path::MAIN_SEPARATOR) || path.is_dir() {
        return Ok(path.join(LOG_FILE_NAME));
    }
    Ok(path.to_path_buf())
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
    }
    Ok(())
}

fn split_dir_and_name(path: &Path) -> Result<(PathBuf, String)> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .context("Invalid log path: not valid UTF-8")?
        .to_string();
    Ok((dir, name))
}

// tracing_appender::rolling::daily names files `{base_name}.{YYYY-MM-DD}`.
fn cleanup_rotated_logs(dir: &Path, base_name: &str, keep: usize) -> Result<()> {
    if keep == 0 {
        return Ok(());
    }

    let prefix = format!("{base_name}.");
    let mut candidates: Vec<String> = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read log directory: {}", dir.display()))?
    {
        let entry = entry?;
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else { continue };
        if name.starts_with(&prefix) {
            candidates.push(name.to_string());
        }
    }

    candidates.sort();
    candidates.reverse(); // newest first

    for name in candidates.iter().skip(keep) {
        let path = dir.join(name);
        if let Err(e) = std::fs::remove_file(&path) {
            tracing::debug!(error = %e, file = %path.display(), "failed to remove old log file");
        }
    }

    Ok(())
}

/// Best-effort redaction before text reaches a log line.
///
/// Masks each of `secrets` verbatim, plus common `sk-...` style API keys.
pub fn redact_secrets(input: &str, secrets: &[&str]) -> String {
    let mut text = input.to_string();
    for secret in secrets.iter().filter(|s| s.len() >= 4) {
        text = text.replace(secret, "***REDACTED***");
    }
    redact_sk_keys(&text)
}

fn redact_sk_keys(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut last = 0usize;
    let mut i = 0usize;

    while i < input.len() {
        if input[i..].starts_with("sk-") {
            let mut j = i + 3;
            while j < input.len() {
                match bytes[j] {
                    b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' => j += 1,
                    _ => break,
                }
            }

            // Short matches are probably ordinary words.
            if j - (i + 3) >= 8 {
                out.push_str(&input[last..i]);
                out.push_str("sk-***REDACTED***");
                last = j;
                i = j;
                continue;
            }
        }

        i += input[i..].chars().next().map_or(1, char::len_utf8);
    }

    out.push_str(&input[last..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redacts_sk_keys() {
        let out = redact_secrets("bad key sk-abcdef123456 given", &[]);
        assert_eq!(out, "bad key sk-***REDACTED*** given");
    }

    #[test]
    fn test_keeps_short_sk_prefix() {
        assert_eq!(redact_secrets("task-sk-abc", &[]), "task-sk-abc");
    }

    #[test]
    fn test_redacts_explicit_secrets() {
        let out = redact_secrets("token BSAxyz123 rejected", &["BSAxyz123"]);
        assert_eq!(out, "token ***REDACTED*** rejected");
    }

    #[test]
    fn test_handles_multibyte_text() {
        let out = redact_secrets("clé invalide: sk-ééé", &[]);
        assert_eq!(out, "clé invalide: sk-ééé");
    }

    #[test]
    fn test_resolve_log_path_directory() {
        let dir = tempfile::tempdir().unwrap();
        let resolved = resolve_log_path(Some(dir.path())).unwrap();
        assert_eq!(resolved, dir.path().join(LOG_FILE_NAME));
    }

    #[test]
    fn test_resolve_log_path_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("custom.log");
        assert_eq!(resolve_log_path(Some(&file)).unwrap(), file);
    }

    #[test]
    fn test_cleanup_keeps_newest() {
        let dir = tempfile::tempdir().unwrap();
        for day in ["2026-01-01", "2026-01-02", "2026-01-03"] {
            std::fs::write(dir.path().join(format!("{LOG_FILE_NAME}.{day}")), "x").unwrap();
        }
        std::fs::write(dir.path().join("unrelated.txt"), "x").unwrap();

        cleanup_rotated_logs(dir.path(), LOG_FILE_NAME, 2).unwrap();

        assert!(!dir.path().join(format!("{LOG_FILE_NAME}.2026-01-01")).exists());
        assert!(dir.path().join(format!("{LOG_FILE_NAME}.2026-01-02")).exists());
        assert!(dir.path().join(format!("{LOG_FILE_NAME}.2026-01-03")).exists());
        assert!(dir.path().join("unrelated.txt").exists());
    }
}
