//! Environment configuration.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    /// `LOG_LEVEL`: level name applied to new loggers when it names a known level.
    pub log_level: Option<String>,
    /// `DEBUG`: comma/space separated debug namespaces.
    pub debug_namespaces: Option<String>,
    /// `TAPE_LOG_TRACE_FILE`: diagnostics log file.
    pub trace_file: Option<PathBuf>,
    /// `TAPE_LOG_REFRESH_MS`: interactive refresh interval override.
    pub refresh_interval: Option<Duration>,
    /// `TAPE_LOG_NO_COLOR=1`: disable styling.
    pub no_color: bool,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self {
            log_level: env_string_opt("LOG_LEVEL"),
            debug_namespaces: env_string_opt("DEBUG"),
            trace_file: env_string_opt("TAPE_LOG_TRACE_FILE").map(PathBuf::from),
            refresh_interval: env_string_opt("TAPE_LOG_REFRESH_MS")
                .and_then(|value| value.trim().parse::<u64>().ok())
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis),
            no_color: env_flag("TAPE_LOG_NO_COLOR"),
        }
    }
}

fn env_flag(key: &str) -> bool {
    env::var(key).map(|value| value == "1").unwrap_or(false)
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    })
}

#[cfg(test)]
pub(crate) mod test_env {
    use std::env;
    use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

    pub(crate) struct EnvGuard {
        key: &'static str,
        previous: Option<String>,
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            if let Some(value) = &self.previous {
                env::set_var(self.key, value);
            } else {
                env::remove_var(self.key);
            }
        }
    }

    /// Serializes tests that touch process environment variables.
    pub(crate) fn env_lock() -> MutexGuard<'static, ()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn set_env_guard(key: &'static str, value: Option<&str>) -> EnvGuard {
        let previous = env::var(key).ok();
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
        EnvGuard { key, previous }
    }
}
