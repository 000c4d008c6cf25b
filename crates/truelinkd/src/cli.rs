use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use truelink_monitor::MonitorConfig;

#[derive(Parser, Debug)]
#[command(
    name = "truelinkd",
    author,
    version,
    about = "Poll nl80211 station statistics for a wireless link"
)]
pub struct Cli {
    /// Wireless interface (defaults to the first one under /sys/class/net)
    #[arg(long, short = 'i')]
    pub interface: Option<String>,

    /// Scope queries to this peer (AP) address, e.g. aa:bb:cc:dd:ee:ff
    #[arg(long)]
    pub bssid: Option<String>,

    /// SSID reported alongside the telemetry
    #[arg(long)]
    pub ssid: Option<String>,

    /// Operating frequency in MHz, used for the channel number
    #[arg(long = "frequency")]
    pub frequency_mhz: Option<u32>,

    /// Nominal channel width in MHz when the kernel reports none
    #[arg(long = "width")]
    pub channel_width_mhz: Option<u32>,

    /// Polling interval in milliseconds
    #[arg(long = "interval-ms")]
    pub interval_ms: Option<u64>,

    /// Smooth the signal level as well as the rates
    #[arg(long)]
    pub smooth_signal: bool,

    /// Query once, print one snapshot and exit
    #[arg(long)]
    pub once: bool,

    /// Also write daily rolling log files to this directory
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Output format for telemetry and errors
    #[arg(long = "output", value_enum, default_value_t = OutputFormat::Json)]
    pub output_format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}

impl Cli {
    /// Flags override the environment.
    pub fn apply(&self, config: &mut MonitorConfig) {
        if let Some(interface) = &self.interface {
            config.interface = interface.clone();
        }
        if let Some(bssid) = &self.bssid {
            config.bssid = Some(bssid.clone()).filter(|b| !b.is_empty());
        }
        if let Some(ssid) = &self.ssid {
            config.ssid = ssid.clone();
        }
        if let Some(freq) = self.frequency_mhz {
            config.frequency_mhz = freq;
        }
        if let Some(width) = self.channel_width_mhz {
            config.channel_width_mhz = width;
        }
        if let Some(ms) = self.interval_ms.filter(|ms| *ms > 0) {
            config.poll_interval = Duration::from_millis(ms);
        }
        if self.smooth_signal {
            config.smooth_signal = true;
        }
    }
}
