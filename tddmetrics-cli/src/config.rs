//! Configuration resolution for the TDD metrics CLI.

use crate::CliResult;
use std::path::PathBuf;

/// Overrides the event log location.
pub(crate) const LOG_PATH_ENV: &str = "TDDMETRICS_LOG_PATH";
/// Telemetry endpoint receiving recorded events.
pub(crate) const TELEMETRY_URL_ENV: &str = "TDDMETRICS_TELEMETRY_URL";
/// Bearer token for the telemetry endpoint.
pub(crate) const TELEMETRY_TOKEN_ENV: &str = "TDDMETRICS_TELEMETRY_TOKEN";

const DEFAULT_LOG_PATH: &str = ".claude/logs/tdd-cycle.jsonl";

/// Resolve the event log path from the flag, the environment, or `$HOME`.
pub(crate) fn resolve_log_path(explicit: Option<PathBuf>) -> CliResult<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path);
    }
    if let Some(path) = non_empty_env(LOG_PATH_ENV) {
        return Ok(PathBuf::from(path));
    }
    if let Some(home) = non_empty_env("HOME") {
        return Ok(PathBuf::from(home).join(DEFAULT_LOG_PATH));
    }
    Err("unable to resolve event log path; pass --log-path".into())
}

/// Settings for the optional telemetry upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct TelemetryConfig {
    /// Endpoint events are POSTed to.
    pub endpoint: Option<String>,
    /// Bearer token sent with each upload.
    pub token: Option<String>,
}

impl TelemetryConfig {
    /// Build telemetry settings from environment variables.
    pub(crate) fn from_env() -> Self {
        Self {
            endpoint: non_empty_env(TELEMETRY_URL_ENV),
            token: non_empty_env(TELEMETRY_TOKEN_ENV),
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::{Mutex, OnceLock};

    pub(crate) fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub(crate) struct EnvGuard {
        key: &'static str,
        prev: Option<String>,
    }

    impl EnvGuard {
        pub(crate) fn set(key: &'static str, value: Option<&str>) -> Self {
            let prev = std::env::var(key).ok();
            match value {
                Some(value) => unsafe { std::env::set_var(key, value) },
                None => unsafe { std::env::remove_var(key) },
            }
            Self { key, prev }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            if let Some(prev) = self.prev.take() {
                unsafe { std::env::set_var(self.key, prev) };
            } else {
                unsafe { std::env::remove_var(self.key) };
            }
        }
    }

    #[test]
    fn explicit_log_path_wins() {
        let _lock = env_lock();
        let _env = EnvGuard::set(LOG_PATH_ENV, Some("/tmp/from-env.jsonl"));
        let path = resolve_log_path(Some(PathBuf::from("/tmp/flag.jsonl"))).expect("path");
        assert_eq!(path, PathBuf::from("/tmp/flag.jsonl"));
    }

    #[test]
    fn env_log_path_beats_home() {
        let _lock = env_lock();
        let _env = EnvGuard::set(LOG_PATH_ENV, Some("/tmp/from-env.jsonl"));
        let _home = EnvGuard::set("HOME", Some("/home/dev"));
        let path = resolve_log_path(None).expect("path");
        assert_eq!(path, PathBuf::from("/tmp/from-env.jsonl"));
    }

    #[test]
    fn home_fallback_uses_default_location() {
        let _lock = env_lock();
        let _env = EnvGuard::set(LOG_PATH_ENV, Some("   "));
        let _home = EnvGuard::set("HOME", Some("/home/dev"));
        let path = resolve_log_path(None).expect("path");
        assert_eq!(
            path,
            PathBuf::from("/home/dev/.claude/logs/tdd-cycle.jsonl")
        );
    }

    #[test]
    fn errors_without_any_location() {
        let _lock = env_lock();
        let _env = EnvGuard::set(LOG_PATH_ENV, None);
        let _home = EnvGuard::set("HOME", None);
        let err = resolve_log_path(None).unwrap_err();
        assert!(err.to_string().contains("--log-path"));
    }

    #[test]
    fn telemetry_config_reads_trimmed_env() {
        let _lock = env_lock();
        let _url = EnvGuard::set(TELEMETRY_URL_ENV, Some(" https://telemetry.example/events "));
        let _token = EnvGuard::set(TELEMETRY_TOKEN_ENV, Some(""));
        let config = TelemetryConfig::from_env();
        assert_eq!(
            config.endpoint.as_deref(),
            Some("https://telemetry.example/events")
        );
        assert_eq!(config.token, None);
    }
}
