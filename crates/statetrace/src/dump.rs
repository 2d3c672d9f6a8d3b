//! Periodic logging of the registry contents.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{MissedTickBehavior, interval};

use crate::{Order, Registry};

pub const DUMP_INTERVAL_ENV: &str = "STATETRACE_DUMP_INTERVAL_MS";
pub const DUMP_ORDER_ENV: &str = "STATETRACE_DUMP_ORDER";

const DEFAULT_DUMP_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct DumpConfig {
    /// Time between two dumps.
    pub interval: Duration,
    /// Order used when listing.
    pub order: Order,
    /// Prefix for the log line, to tell several dumpers apart.
    pub label: String,
}

impl Default for DumpConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_DUMP_INTERVAL,
            order: Order::ByDurationDescending,
            label: "statetrace".to_string(),
        }
    }
}

impl DumpConfig {
    /// Defaults, overridden by `STATETRACE_DUMP_INTERVAL_MS` and
    /// `STATETRACE_DUMP_ORDER` when set. Malformed values are ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(DUMP_INTERVAL_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => config.interval = Duration::from_millis(ms),
                _ => tracing::warn!(value = %raw, "ignoring invalid {DUMP_INTERVAL_ENV}"),
            }
        }

        if let Some(raw) = lookup(DUMP_ORDER_ENV) {
            match Order::parse(&raw) {
                Some(order) => config.order = order,
                None => tracing::warn!(value = %raw, "ignoring invalid {DUMP_ORDER_ENV}"),
            }
        }

        config
    }
}

/// Lists and renders the registry once.
pub fn dump_once(registry: &Registry, config: &DumpConfig) -> String {
    registry.list(&config.order).render()
}

/// Spawns a task that logs the registry contents every `config.interval`.
///
/// Must be called from within a Tokio runtime. Abort the returned handle to
/// stop dumping.
pub fn spawn_periodic_dump(
    registry: Arc<Registry>,
    config: DumpConfig,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            log_dump(&registry, &config);
        }
    })
}

/// One tick of the periodic dump. Returns the message that was logged.
fn log_dump(registry: &Registry, config: &DumpConfig) -> String {
    let snapshot = registry.list(&config.order);
    if snapshot.is_empty() {
        let message = "no active states".to_string();
        tracing::info!(label = %config.label, "{message}");
        return message;
    }

    let message = format!("active states:\n{}", snapshot.render());
    tracing::info!(label = %config.label, active = snapshot.len(), "{message}");
    message
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use parking_lot::Mutex;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_env() {
        let config = DumpConfig::from_lookup(lookup(&[]));
        assert_eq!(config.interval, DEFAULT_DUMP_INTERVAL);
        assert!(matches!(config.order, Order::ByDurationDescending));
    }

    #[test]
    fn env_overrides_interval_and_order() {
        let config = DumpConfig::from_lookup(lookup(&[
            (DUMP_INTERVAL_ENV, "250"),
            (DUMP_ORDER_ENV, "id"),
        ]));
        assert_eq!(config.interval, Duration::from_millis(250));
        assert!(matches!(config.order, Order::ById));
    }

    #[test]
    fn malformed_env_is_ignored() {
        let config = DumpConfig::from_lookup(lookup(&[
            (DUMP_INTERVAL_ENV, "soon"),
            (DUMP_ORDER_ENV, "alphabetical"),
        ]));
        assert_eq!(config.interval, DEFAULT_DUMP_INTERVAL);
        assert!(matches!(config.order, Order::ByDurationDescending));

        let zero = DumpConfig::from_lookup(lookup(&[(DUMP_INTERVAL_ENV, "0")]));
        assert_eq!(zero.interval, DEFAULT_DUMP_INTERVAL);
    }

    #[test]
    fn dump_once_uses_configured_order() {
        let registry = Registry::new();
        registry.enter("/b", "second");
        registry.enter("/a", "first");
        let config = DumpConfig {
            order: Order::ById,
            ..DumpConfig::default()
        };
        let text = dump_once(&registry, &config);
        assert!(text.starts_with("/a: "), "got {text}");
        assert!(text.contains("\n  first\n/b: "), "got {text}");
    }

    #[test]
    fn dump_tick_logs_rendered_states() {
        let registry = Registry::new();
        registry.enter("/stuck", "waiting");
        let message = log_dump(&registry, &DumpConfig::default());
        assert!(message.starts_with("active states:\n/stuck: "), "got {message}");
        assert!(message.ends_with("\n  waiting\n"), "got {message}");
    }

    #[test]
    fn dump_tick_on_empty_registry_is_one_line() {
        let message = log_dump(&Registry::new(), &DumpConfig::default());
        assert_eq!(message, "no active states");
    }

    #[test]
    fn dump_tick_reaches_the_subscriber() {
        let buffer = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(buffer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::INFO)
            .finish();

        let registry = Registry::new();
        registry.enter("/stuck", "waiting");
        tracing::subscriber::with_default(subscriber, || {
            log_dump(&registry, &DumpConfig::default());
            registry.clear();
            log_dump(&registry, &DumpConfig::default());
        });

        let logged = buffer.contents();
        assert!(logged.contains("/stuck: "), "got {logged}");
        assert!(logged.contains("  waiting"), "got {logged}");
        assert!(logged.contains("no active states"), "got {logged}");
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock()).into_owned()
        }
    }

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[tokio::test]
    async fn periodic_dump_keeps_running_until_aborted() {
        let registry = Arc::new(Registry::new());
        registry.enter("/stuck", "waiting");
        let handle = spawn_periodic_dump(
            Arc::clone(&registry),
            DumpConfig {
                interval: Duration::from_millis(5),
                ..DumpConfig::default()
            },
        );

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(!handle.is_finished());
        assert!(registry.contains("/stuck"));

        handle.abort();
        assert!(handle.await.is_err_and(|e| e.is_cancelled()));
    }
}
