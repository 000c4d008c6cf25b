use std::panic;

use anyhow::Result;
use clap::Parser;
use serde_json::{json, Value};
use tracing::{error, info, warn};
use truelink_logging::LoggingConfig;
use truelink_monitor::{LinkTopology, MonitorConfig, MonitorEvent, TelemetrySnapshot};

mod cli;

use cli::{Cli, OutputFormat};

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() {
    let cli = Cli::parse();
    let format = cli.output_format;
    if let Err(err) = run(cli).await {
        emit_error(format, &err);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let log_cfg = LoggingConfig::from_env();
    let _logging_guards = truelink_logging::init("truelinkd", cli.log_dir.as_deref(), &log_cfg)?;
    install_panic_hook();

    let mut config = MonitorConfig::from_env();
    cli.apply(&mut config);
    info!(
        "truelinkd starting iface={} interval={:?}",
        if config.interface.is_empty() {
            "<auto>"
        } else {
            config.interface.as_str()
        },
        config.poll_interval
    );

    run_platform(&cli, config).await
}

#[cfg(target_os = "linux")]
async fn run_platform(cli: &Cli, config: MonitorConfig) -> Result<()> {
    linux::run(cli, config).await
}

#[cfg(not(target_os = "linux"))]
async fn run_platform(_cli: &Cli, _config: MonitorConfig) -> Result<()> {
    anyhow::bail!("nl80211 station queries are only available on Linux")
}

#[cfg(target_os = "linux")]
mod linux {
    use anyhow::{Context, Result};
    use tokio::sync::mpsc::unbounded_channel;
    use tracing::{debug, info, warn};
    use truelink_monitor::{
        LinkMonitor, MonitorConfig, MonitorEvent, MonitorService, StaticTopology, SysfsTopology,
        TopologyProvider,
    };
    use truelink_netlink::{NeliConnector, Nl80211Client};

    use super::{emit_event, emit_snapshot, link_template};
    use crate::cli::Cli;

    pub async fn run(cli: &Cli, config: MonitorConfig) -> Result<()> {
        let format = cli.output_format;
        let client = Nl80211Client::init(NeliConnector::new(config.recv_timeout))
            .with_max_frames(config.max_frames);

        let template = link_template(&config);
        // A fully specified link needs no discovery.
        let mut topology: Box<dyn TopologyProvider> =
            if !template.interface.is_empty() && !template.bssid.is_empty() {
                Box::new(StaticTopology::connected(template))
            } else {
                Box::new(SysfsTopology::new(template))
            };

        if cli.once {
            let mut monitor = LinkMonitor::new(client, &config, None);
            monitor.on_topology(topology.current());
            let snapshot = monitor.snapshot();
            let stats = monitor.source().stats();
            debug!("query stats: {:?}", stats);
            return emit_snapshot(format, &snapshot, Some(serde_json::to_value(stats)?));
        }

        let (tx, mut rx) = unbounded_channel();
        let monitor = LinkMonitor::new(client, &config, Some(tx));
        let mut service = MonitorService::spawn(monitor, topology);

        loop {
            tokio::select! {
                res = tokio::signal::ctrl_c() => {
                    res.context("waiting for ctrl-c")?;
                    info!("interrupt received, stopping");
                    break;
                }
                event = rx.recv() => {
                    let Some(event) = event else {
                        warn!("monitor event channel closed");
                        break;
                    };
                    match event {
                        MonitorEvent::StatsUpdated => {
                            emit_snapshot(format, &service.snapshot(), None)?;
                        }
                        MonitorEvent::LastErrorChanged(_) => {}
                        other => emit_event(format, &other)?,
                    }
                }
            }
        }

        tokio::task::spawn_blocking(move || service.stop())
            .await
            .context("joining monitor thread")?;
        Ok(())
    }
}

fn link_template(config: &MonitorConfig) -> LinkTopology {
    LinkTopology {
        interface: config.interface.clone(),
        ssid: config.ssid.clone(),
        bssid: config.bssid.clone().unwrap_or_default(),
        frequency_mhz: config.frequency_mhz,
        channel_width_mhz: config.channel_width_mhz,
    }
}

fn summary_line(snap: &TelemetrySnapshot) -> String {
    if !snap.connected {
        return "not connected".to_string();
    }
    format!(
        "{} {} {} dBm ({}%, {}) rx {:.1} Mbit/s tx {:.1} Mbit/s {} MCS {} NSS {} {} MHz",
        snap.interface,
        if snap.ssid.is_empty() { "-" } else { snap.ssid.as_str() },
        snap.signal_dbm,
        snap.signal_percent,
        snap.signal_quality,
        snap.rx_rate_mbps,
        snap.tx_rate_mbps,
        snap.wifi_generation,
        snap.mcs_index,
        snap.mimo_streams,
        snap.channel_width_mhz,
    )
}

fn emit_snapshot(format: OutputFormat, snap: &TelemetrySnapshot, stats: Option<Value>) -> Result<()> {
    let message = summary_line(snap);
    match format {
        OutputFormat::Json => {
            let mut data = serde_json::to_value(snap)?;
            if let (Some(stats), Value::Object(map)) = (stats, &mut data) {
                map.insert("query_stats".to_string(), stats);
            }
            let status = if snap.last_error.is_empty() { "ok" } else { "error" };
            emit_payload(format, status, message, data)
        }
        OutputFormat::Text => {
            println!("{message}");
            if !snap.last_error.is_empty() {
                eprintln!("  -> {}", snap.last_error);
            }
            Ok(())
        }
    }
}

fn emit_event(format: OutputFormat, event: &MonitorEvent) -> Result<()> {
    let (status, message) = match event {
        MonitorEvent::ConnectionChanged(true) => ("ok", "link connected".to_string()),
        MonitorEvent::ConnectionChanged(false) => ("ok", "link disconnected".to_string()),
        MonitorEvent::AvailabilityChanged(true) => ("ok", "wireless device available".to_string()),
        MonitorEvent::AvailabilityChanged(false) => {
            ("ok", "no wireless device found".to_string())
        }
        MonitorEvent::ErrorOccurred(message) => {
            warn!("{}", message);
            ("error", message.clone())
        }
        MonitorEvent::LastErrorChanged(message) => ("ok", message.clone()),
        MonitorEvent::StatsUpdated => ("ok", "stats updated".to_string()),
    };
    match format {
        OutputFormat::Json => emit_payload(format, status, message, serde_json::to_value(event)?),
        OutputFormat::Text => {
            if status == "error" {
                eprintln!("Error: {message}");
            } else {
                println!("{message}");
            }
            Ok(())
        }
    }
}

fn emit_error(format: OutputFormat, err: &anyhow::Error) {
    let details: Vec<String> = err.chain().map(|cause| cause.to_string()).collect();
    let payload = json!({
        "status": "error",
        "message": err.to_string(),
        "details": details,
        "data": Value::Null,
    });

    match format {
        OutputFormat::Json => println!("{}", payload),
        OutputFormat::Text => {
            eprintln!("Error: {}", err);
            if details.len() > 1 {
                for detail in details.iter().skip(1) {
                    eprintln!("  -> {}", detail);
                }
            }
        }
    }
}

fn emit_payload(format: OutputFormat, status: &str, message: String, data: Value) -> Result<()> {
    let payload = json!({
        "status": status,
        "message": message,
        "data": data,
    });

    match format {
        OutputFormat::Json => println!("{}", payload),
        OutputFormat::Text => {
            println!("{}", payload["message"].as_str().unwrap_or_default());
            if !payload["data"].is_null() {
                let pretty = serde_json::to_string_pretty(&payload["data"])?;
                println!("{pretty}");
            }
        }
    }
    Ok(())
}

fn install_panic_hook() {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}:{}", loc.file(), loc.line(), loc.column()))
            .unwrap_or_else(|| "unknown location".to_string());

        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };

        error!(
            target: "truelinkd::panic",
            location = %location,
            message = %message,
            "PANIC: truelinkd panicked"
        );

        default_hook(panic_info);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_when_disconnected() {
        let snap = TelemetrySnapshot::default();
        assert_eq!(summary_line(&snap), "not connected");
    }

    #[test]
    fn test_summary_line_fields() {
        let snap = TelemetrySnapshot {
            connected: true,
            interface: "wlan0".to_string(),
            signal_dbm: -55,
            signal_percent: 90,
            signal_quality: "Good".to_string(),
            rx_rate_mbps: 866.7,
            tx_rate_mbps: 650.0,
            wifi_generation: "WiFi 5".to_string(),
            mcs_index: 9,
            mimo_streams: 2,
            channel_width_mhz: 80,
            ..TelemetrySnapshot::default()
        };
        assert_eq!(
            summary_line(&snap),
            "wlan0 - -55 dBm (90%, Good) rx 866.7 Mbit/s tx 650.0 Mbit/s WiFi 5 MCS 9 NSS 2 80 MHz"
        );
    }

    #[test]
    fn test_link_template_from_config() {
        let config = MonitorConfig {
            interface: "wlan1".to_string(),
            bssid: Some("aa:bb:cc:dd:ee:ff".to_string()),
            frequency_mhz: 5500,
            ..MonitorConfig::default()
        };
        let link = link_template(&config);
        assert_eq!(link.interface, "wlan1");
        assert_eq!(link.bssid, "aa:bb:cc:dd:ee:ff");
        assert_eq!(link.frequency_mhz, 5500);
        assert_eq!(link.channel_width_mhz, 20);
    }
}
