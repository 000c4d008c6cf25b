//! Per-interface link telemetry.
//!
//! `LinkMonitor` owns the connection state machine and the smoothed
//! values. It is driven from outside: `on_topology` whenever the network
//! layer's view changes, `tick` once per polling interval.

use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};
use truelink_netlink::{Direction, MacAddr, StationInfo, StationSource};

use crate::config::MonitorConfig;
use crate::display::{
    channel_from_frequency, channel_width_mhz, display_mode, generation_label, signal_percent,
    SignalQuality, StatusColor,
};
use crate::history::RateHistory;
use crate::smoothing::RateSmoother;
use crate::targets::T_MONITOR;
use crate::topology::{LinkTopology, Topology};

pub const INIT_FAILURE_MESSAGE: &str = "Failed to initialize nl80211";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "value", rename_all = "snake_case")]
pub enum MonitorEvent {
    ConnectionChanged(bool),
    AvailabilityChanged(bool),
    StatsUpdated,
    LastErrorChanged(String),
    ErrorOccurred(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

/// Everything a presentation layer needs, captured at one instant.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TelemetrySnapshot {
    pub connected: bool,
    pub available: bool,
    pub interface: String,
    pub ssid: String,
    pub bssid: String,

    pub signal_dbm: i32,
    pub signal_percent: u8,
    pub signal_quality: String,

    /// Smoothed, Mbit/s.
    pub tx_rate_mbps: f64,
    pub rx_rate_mbps: f64,
    /// Latest sample, Mbit/s.
    pub raw_tx_rate_mbps: f64,
    pub raw_rx_rate_mbps: f64,

    pub wifi_generation: String,
    pub wifi_mode: String,
    pub mcs_index: u8,
    pub mimo_streams: u8,
    pub channel_width_mhz: u32,
    pub frequency_mhz: u32,
    pub channel: u32,
    pub status_color: String,

    pub rx_history: Vec<f64>,
    pub tx_history: Vec<f64>,
    pub max_rate_mbps: f64,
    pub history_size: usize,
    pub update_interval_ms: u64,

    pub last_error: String,
    pub station: StationInfo,
}

pub struct LinkMonitor<S: StationSource> {
    source: S,
    state: ConnectionState,
    available: bool,
    link: Option<LinkTopology>,
    station: StationInfo,
    smoother: RateSmoother,
    history: RateHistory,
    last_error: String,
    update_interval: Duration,
    events: Option<UnboundedSender<MonitorEvent>>,
}

impl<S: StationSource> LinkMonitor<S> {
    pub fn new(
        source: S,
        config: &MonitorConfig,
        events: Option<UnboundedSender<MonitorEvent>>,
    ) -> Self {
        let mut monitor = Self {
            source,
            state: ConnectionState::Disconnected,
            available: false,
            link: None,
            station: StationInfo::default(),
            smoother: RateSmoother::new(config.smoothing_alpha, config.smooth_signal),
            history: RateHistory::new(config.history_size, config.baseline_max_mbps),
            last_error: String::new(),
            update_interval: config.poll_interval,
            events,
        };
        if !monitor.source.is_valid() {
            warn!(target: T_MONITOR, "{}", INIT_FAILURE_MESSAGE);
            monitor.set_error(INIT_FAILURE_MESSAGE.to_string());
        }
        monitor
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    pub fn update_interval(&self) -> Duration {
        self.update_interval
    }

    pub fn last_error(&self) -> &str {
        &self.last_error
    }

    pub fn station(&self) -> &StationInfo {
        &self.station
    }

    pub fn history(&self) -> &RateHistory {
        &self.history
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Apply the network layer's current view.
    ///
    /// Returns true when the monitor is connected afterwards, i.e. when
    /// the caller should keep polling.
    pub fn on_topology(&mut self, topology: Topology) -> bool {
        if topology.available != self.available {
            self.available = topology.available;
            self.emit(MonitorEvent::AvailabilityChanged(topology.available));
        }

        match (self.state, topology.link) {
            (ConnectionState::Disconnected, Some(link)) => {
                info!(
                    target: T_MONITOR,
                    "link up iface={} ssid={} bssid={}", link.interface, link.ssid, link.bssid
                );
                self.link = Some(link);
                self.state = ConnectionState::Connected;
                self.emit(MonitorEvent::ConnectionChanged(true));
                self.tick();
            }
            (ConnectionState::Connected, Some(link)) => {
                let roamed = self.link.as_ref().map_or(true, |current| {
                    current.interface != link.interface || current.bssid != link.bssid
                });
                if self.link.as_ref() != Some(&link) {
                    debug!(
                        target: T_MONITOR,
                        "link changed iface={} bssid={}", link.interface, link.bssid
                    );
                    self.link = Some(link);
                }
                if roamed {
                    self.tick();
                }
            }
            (ConnectionState::Connected, None) => {
                info!(target: T_MONITOR, "link down");
                self.state = ConnectionState::Disconnected;
                self.link = None;
                self.reset();
                self.emit(MonitorEvent::ConnectionChanged(false));
            }
            (ConnectionState::Disconnected, None) => {}
        }
        self.is_connected()
    }

    /// One polling step. Does nothing while disconnected.
    pub fn tick(&mut self) {
        if !self.is_connected() {
            return;
        }
        let Some(link) = self.link.as_ref() else {
            return;
        };
        let interface = link.interface.clone();

        let peer = match parse_peer(&link.bssid) {
            Ok(peer) => peer,
            Err(message) => {
                self.set_error(message);
                self.emit(MonitorEvent::StatsUpdated);
                return;
            }
        };

        let info = self.source.get_station_info(&interface, peer);
        if info.valid {
            if !self.last_error.is_empty() {
                self.set_error(String::new());
            }
            self.smoother.update(
                info.bitrate_mbps(Direction::Tx),
                info.bitrate_mbps(Direction::Rx),
                info.signal_dbm,
            );
            self.history
                .push(self.smoother.rx.value(), self.smoother.tx.value());
            self.station = info;
        } else {
            let error = self.source.last_error().to_string();
            if error != self.last_error {
                self.set_error(error);
            }
        }
        self.emit(MonitorEvent::StatsUpdated);
    }

    /// Drop all telemetry back to the zero state.
    pub fn reset(&mut self) {
        self.smoother.reset();
        self.history.clear();
        self.station = StationInfo::default();
        if !self.last_error.is_empty() {
            self.set_error(String::new());
        }
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        let connected = self.is_connected();
        let link = self.link.clone().unwrap_or_default();
        let info = &self.station;

        let signal_dbm = if self.smoother.smooths_signal() && self.smoother.signal.is_seeded() {
            self.smoother.signal.value().round() as i32
        } else {
            info.signal_dbm
        };
        let percent = if info.valid {
            signal_percent(signal_dbm)
        } else {
            0
        };
        let mode = display_mode(info);
        let width = channel_width_mhz(info, link.channel_width_mhz);

        TelemetrySnapshot {
            connected,
            available: self.available,
            interface: link.interface.clone(),
            ssid: link.ssid.clone(),
            bssid: link.bssid.clone(),
            signal_dbm,
            signal_percent: percent,
            signal_quality: SignalQuality::from_dbm(signal_dbm).label().to_string(),
            tx_rate_mbps: self.smoother.tx.value(),
            rx_rate_mbps: self.smoother.rx.value(),
            raw_tx_rate_mbps: info.bitrate_mbps(Direction::Tx),
            raw_rx_rate_mbps: info.bitrate_mbps(Direction::Rx),
            wifi_generation: generation_label(info).to_string(),
            wifi_mode: mode.label().to_string(),
            mcs_index: info.rx_mcs,
            mimo_streams: info.rx_nss,
            channel_width_mhz: width,
            frequency_mhz: link.frequency_mhz,
            channel: channel_from_frequency(link.frequency_mhz),
            status_color: StatusColor::classify(connected, info.rx_mode, width, signal_dbm)
                .hex()
                .to_string(),
            rx_history: self.history.rx(),
            tx_history: self.history.tx(),
            max_rate_mbps: self.history.max_rate(),
            history_size: self.history.capacity(),
            update_interval_ms: self.update_interval.as_millis() as u64,
            last_error: self.last_error.clone(),
            station: info.clone(),
        }
    }

    fn set_error(&mut self, error: String) {
        if error == self.last_error {
            return;
        }
        if !error.is_empty() {
            debug!(target: T_MONITOR, "monitor error: {}", error);
        }
        self.last_error = error.clone();
        self.emit(MonitorEvent::LastErrorChanged(error.clone()));
        if !error.is_empty() {
            self.emit(MonitorEvent::ErrorOccurred(error));
        }
    }

    fn emit(&self, event: MonitorEvent) {
        if let Some(tx) = &self.events {
            // Receiver gone just means nobody is listening any more.
            let _ = tx.send(event);
        }
    }
}

/// Empty text means "no peer scoping".
fn parse_peer(bssid: &str) -> Result<Option<MacAddr>, String> {
    if bssid.is_empty() {
        return Ok(None);
    }
    MacAddr::parse(bssid)
        .map(Some)
        .map_err(|err| err.to_string())
}
