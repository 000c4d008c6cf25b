use std::env;
use std::time::Duration;

use truelink_netlink::client::DEFAULT_MAX_FRAMES;

use crate::history::{DEFAULT_BASELINE_MAX, DEFAULT_HISTORY_SIZE};
use crate::smoothing::DEFAULT_ALPHA;

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_RECV_TIMEOUT_MS: u64 = 1000;
pub const DEFAULT_CHANNEL_WIDTH_MHZ: u32 = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    /// Empty means "first wireless interface".
    pub interface: String,
    pub bssid: Option<String>,
    pub ssid: String,
    pub frequency_mhz: u32,
    pub channel_width_mhz: u32,
    pub poll_interval: Duration,
    pub history_size: usize,
    pub baseline_max_mbps: f64,
    pub smoothing_alpha: f64,
    pub smooth_signal: bool,
    pub recv_timeout: Duration,
    pub max_frames: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interface: String::new(),
            bssid: None,
            ssid: String::new(),
            frequency_mhz: 0,
            channel_width_mhz: DEFAULT_CHANNEL_WIDTH_MHZ,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            history_size: DEFAULT_HISTORY_SIZE,
            baseline_max_mbps: DEFAULT_BASELINE_MAX,
            smoothing_alpha: DEFAULT_ALPHA,
            smooth_signal: false,
            recv_timeout: Duration::from_millis(DEFAULT_RECV_TIMEOUT_MS),
            max_frames: DEFAULT_MAX_FRAMES,
        }
    }
}

impl MonitorConfig {
    pub fn from_env() -> Self {
        let interface = env::var("TRUELINK_INTERFACE").unwrap_or_default();
        let bssid = env::var("TRUELINK_BSSID").ok().filter(|v| !v.is_empty());
        let ssid = env::var("TRUELINK_SSID").unwrap_or_default();
        let frequency_mhz = env::var("TRUELINK_FREQUENCY_MHZ")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(0);
        let channel_width_mhz = env::var("TRUELINK_CHANNEL_WIDTH_MHZ")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(DEFAULT_CHANNEL_WIDTH_MHZ);
        let poll_interval_ms = env::var("TRUELINK_POLL_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(DEFAULT_POLL_INTERVAL_MS);
        let history_size = env::var("TRUELINK_HISTORY_SIZE")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(DEFAULT_HISTORY_SIZE);
        let baseline_max_mbps = env::var("TRUELINK_BASELINE_MAX_MBPS")
            .ok()
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|v| v.is_finite() && *v >= 0.0)
            .unwrap_or(DEFAULT_BASELINE_MAX);
        let smoothing_alpha = env::var("TRUELINK_SMOOTHING_ALPHA")
            .ok()
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|v| *v > 0.0 && *v <= 1.0)
            .unwrap_or(DEFAULT_ALPHA);
        let smooth_signal = env_bool("TRUELINK_SMOOTH_SIGNAL", false);
        let recv_timeout_ms = env::var("TRUELINK_RECV_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_RECV_TIMEOUT_MS);
        let max_frames = env::var("TRUELINK_MAX_FRAMES")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(DEFAULT_MAX_FRAMES);

        Self {
            interface,
            bssid,
            ssid,
            frequency_mhz,
            channel_width_mhz,
            poll_interval: Duration::from_millis(poll_interval_ms),
            history_size,
            baseline_max_mbps,
            smoothing_alpha,
            smooth_signal,
            recv_timeout: Duration::from_millis(recv_timeout_ms),
            max_frames,
        }
    }
}

fn env_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes"))
        .unwrap_or(default)
}
