use std::env;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub enabled: bool,
    /// `EnvFilter` directive, e.g. `info` or `truelink::nl80211=trace`.
    pub level: String,
    /// Write `truelink::nl80211` events to their own daily file as well.
    pub split_netlink: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            split_netlink: true,
        }
    }
}

impl LoggingConfig {
    /// `TRUELINK_LOG` wins over `RUST_LOG`; `TRUELINK_LOGS_DISABLED=1`
    /// turns logging off entirely.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Some(level) = env::var("TRUELINK_LOG")
            .ok()
            .or_else(|| env::var("RUST_LOG").ok())
            .filter(|v| !v.trim().is_empty())
        {
            cfg.level = level;
        }
        if let Ok(v) = env::var("TRUELINK_LOGS_DISABLED") {
            if v == "1" || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes") {
                cfg.enabled = false;
            }
        }
        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    struct EnvGuard {
        vars: Vec<(String, Option<String>)>,
    }

    impl EnvGuard {
        fn new(keys: &[&str]) -> Self {
            let vars = keys
                .iter()
                .map(|k| (k.to_string(), std::env::var(k).ok()))
                .collect();
            for key in keys {
                std::env::remove_var(key);
            }
            Self { vars }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (key, value) in self.vars.drain(..) {
                match value {
                    Some(val) => std::env::set_var(&key, val),
                    None => std::env::remove_var(&key),
                }
            }
        }
    }

    const KEYS: [&str; 3] = ["TRUELINK_LOG", "RUST_LOG", "TRUELINK_LOGS_DISABLED"];

    #[test]
    fn test_default_config() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _guard = EnvGuard::new(&KEYS);
        assert_eq!(LoggingConfig::from_env(), LoggingConfig::default());
    }

    #[test]
    fn test_truelink_log_wins_over_rust_log() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _guard = EnvGuard::new(&KEYS);
        std::env::set_var("RUST_LOG", "warn");
        assert_eq!(LoggingConfig::from_env().level, "warn");
        std::env::set_var("TRUELINK_LOG", "truelink::nl80211=trace");
        assert_eq!(LoggingConfig::from_env().level, "truelink::nl80211=trace");
    }

    #[test]
    fn test_disabled_flag() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _guard = EnvGuard::new(&KEYS);
        std::env::set_var("TRUELINK_LOGS_DISABLED", "1");
        assert!(!LoggingConfig::from_env().enabled);
    }
}
