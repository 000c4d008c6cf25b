//! # truelink-monitor
//!
//! Turns raw nl80211 station records into link telemetry: EWMA-smoothed
//! rates, a rolling rate history, display classifications and an
//! edge-triggered error channel, all gated by a connected/disconnected
//! state machine.

pub mod config;
pub mod display;
pub mod history;
pub mod monitor;
pub mod service;
pub mod smoothing;
pub mod targets;
pub mod topology;

pub use config::MonitorConfig;
pub use display::{
    channel_from_frequency, channel_width_mhz, generation_label, signal_percent, SignalQuality,
    StatusColor,
};
pub use history::RateHistory;
pub use monitor::{ConnectionState, LinkMonitor, MonitorEvent, TelemetrySnapshot};
pub use service::MonitorService;
pub use smoothing::{Ewma, RateSmoother};
pub use targets::T_MONITOR;
pub use topology::{
    LinkTopology, StaticTopology, SysfsTopology, Topology, TopologyError, TopologyProvider,
};
