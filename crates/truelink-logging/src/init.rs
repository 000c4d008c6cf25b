use std::path::Path;

use anyhow::Result;
use once_cell::sync::OnceCell;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_error::ErrorLayer;
use tracing_log::LogTracer;
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::reload;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Layer, Registry};

use crate::config::LoggingConfig;
use crate::targets::T_NL80211;

static RELOAD: OnceCell<reload::Handle<EnvFilter, Registry>> = OnceCell::new();

pub struct LoggingGuards {
    _file_guards: Vec<WorkerGuard>,
}

/// Install the global subscriber.
///
/// Console output goes to stderr so stdout stays free for telemetry.
/// With `log_dir`, events are also written to daily rolling files there;
/// if the directory cannot be created, file logging is skipped with a
/// warning.
pub fn init(component: &str, log_dir: Option<&Path>, cfg: &LoggingConfig) -> Result<LoggingGuards> {
    let filter = build_filter(cfg);
    let (filter_layer, handle) = reload::Layer::new(filter);
    let _ = RELOAD.set(handle);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .compact();

    let base = tracing_subscriber::registry()
        .with(filter_layer)
        .with(ErrorLayer::default())
        .with(stderr_layer);

    let mut guards = Vec::new();

    let Some(log_dir) = log_dir else {
        base.try_init().ok();
        let _ = LogTracer::init();
        return Ok(LoggingGuards { _file_guards: guards });
    };

    if let Err(err) = std::fs::create_dir_all(log_dir) {
        base.try_init().ok();
        let _ = LogTracer::init();
        tracing::warn!(
            "File logging disabled ({}): {}",
            log_dir.display(),
            err
        );
        return Ok(LoggingGuards { _file_guards: guards });
    }

    let component_appender =
        tracing_appender::rolling::daily(log_dir, format!("{component}.log"));
    let (component_writer, component_guard) = tracing_appender::non_blocking(component_appender);
    let component_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_ansi(false)
        .compact()
        .with_writer(component_writer)
        .with_filter(component_targets(cfg.split_netlink));
    guards.push(component_guard);

    let netlink_layer = if cfg.split_netlink {
        let (layer, guard) = subsystem_layer(log_dir, "nl80211.log", T_NL80211);
        guards.push(guard);
        Some(layer)
    } else {
        None
    };

    base.with(component_layer)
        .with(netlink_layer)
        .try_init()
        .ok();
    let _ = LogTracer::init();

    Ok(LoggingGuards { _file_guards: guards })
}

/// Swap the active filter, e.g. after the level changed at runtime.
pub fn apply(cfg: &LoggingConfig) -> Result<()> {
    let handle = RELOAD
        .get()
        .ok_or_else(|| anyhow::anyhow!("logging not initialized"))?;
    handle.reload(build_filter(cfg))?;
    Ok(())
}

fn build_filter(cfg: &LoggingConfig) -> EnvFilter {
    if !cfg.enabled {
        return EnvFilter::new("off");
    }
    EnvFilter::try_new(cfg.level.clone()).unwrap_or_else(|_| EnvFilter::new("info"))
}

fn component_targets(split_netlink: bool) -> Targets {
    let targets = Targets::new().with_default(LevelFilter::TRACE);
    if split_netlink {
        targets.with_target(T_NL80211, LevelFilter::OFF)
    } else {
        targets
    }
}

fn subsystem_layer<S>(
    log_dir: &Path,
    filename: &str,
    target: &'static str,
) -> (
    impl tracing_subscriber::Layer<S> + Send + Sync,
    WorkerGuard,
)
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    let appender = tracing_appender::rolling::daily(log_dir, filename);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_ansi(false)
        .compact()
        .with_writer(writer)
        .with_filter(Targets::new().with_target(target, LevelFilter::TRACE));
    (layer, guard)
}
