//! Presentation values derived from a station record.

use serde::Serialize;
use truelink_netlink::{StationInfo, WifiMode};

/// Signal strength as 0..=100, linear between -100 dBm and -50 dBm.
pub fn signal_percent(dbm: i32) -> u8 {
    dbm.saturating_add(100).saturating_mul(2).clamp(0, 100) as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum SignalQuality {
    Poor,
    Weak,
    Fair,
    Good,
    Excellent,
}

impl SignalQuality {
    pub fn from_dbm(dbm: i32) -> Self {
        match dbm {
            d if d >= -50 => SignalQuality::Excellent,
            d if d >= -60 => SignalQuality::Good,
            d if d >= -70 => SignalQuality::Fair,
            d if d >= -80 => SignalQuality::Weak,
            _ => SignalQuality::Poor,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SignalQuality::Excellent => "Excellent",
            SignalQuality::Good => "Good",
            SignalQuality::Fair => "Fair",
            SignalQuality::Weak => "Weak",
            SignalQuality::Poor => "Poor",
        }
    }
}

/// Mode used for display: rx when known, otherwise tx.
pub fn display_mode(info: &StationInfo) -> WifiMode {
    if info.rx_mode != WifiMode::Unknown {
        info.rx_mode
    } else {
        info.tx_mode
    }
}

/// "WiFi 4".."WiFi 7", "Legacy", or "Unknown" without a valid record.
pub fn generation_label(info: &StationInfo) -> &'static str {
    if !info.valid {
        return "Unknown";
    }
    display_mode(info).generation()
}

/// Channel width in MHz: the rx PHY width when reported, else the
/// nominal width of the connection.
pub fn channel_width_mhz(info: &StationInfo, nominal_mhz: u32) -> u32 {
    if info.valid && info.rx_channel_width.as_ordinal() > 0 {
        info.rx_channel_width.mhz()
    } else {
        nominal_mhz
    }
}

/// Channel number for a center frequency, 0 when outside the 2.4, 5 and
/// 6 GHz bands.
pub fn channel_from_frequency(freq_mhz: u32) -> u32 {
    match freq_mhz {
        2484 => 14,
        2412..=2483 => (freq_mhz - 2412) / 5 + 1,
        5170..=5825 => (freq_mhz - 5170) / 5 + 34,
        5955..=7115 => (freq_mhz - 5955) / 5 + 1,
        _ => 0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StatusColor {
    Disconnected,
    Optimal,
    Moderate,
    Degraded,
}

impl StatusColor {
    pub fn classify(connected: bool, mode: WifiMode, width_mhz: u32, signal_dbm: i32) -> Self {
        if !connected {
            StatusColor::Disconnected
        } else if mode.is_he_or_newer() && width_mhz >= 160 && signal_dbm > -60 {
            StatusColor::Optimal
        } else if mode.is_vht_or_newer() && signal_dbm > -70 {
            StatusColor::Moderate
        } else {
            StatusColor::Degraded
        }
    }

    pub fn hex(&self) -> &'static str {
        match self {
            StatusColor::Disconnected => "#808080",
            StatusColor::Optimal => "#4CAF50",
            StatusColor::Moderate => "#FFC107",
            StatusColor::Degraded => "#F44336",
        }
    }
}
