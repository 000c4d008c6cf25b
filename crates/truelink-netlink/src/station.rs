use serde::Serialize;
use tracing::debug;

use crate::attrs::{AttrError, AttrTable};
use crate::consts::*;
use crate::rate_info::{decode_rate_info, ChannelWidth, Modulation, RateInfo, WifiMode};
use crate::targets::T_NL80211;

/// PHY-level statistics for one station, as reported by GET_STATION.
///
/// Every field keeps its zero/`Unknown` default when the kernel omits the
/// matching attribute. A record with `valid == false` is entirely default.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StationInfo {
    pub valid: bool,

    pub signal_dbm: i32,
    pub signal_avg_dbm: i32,

    /// Units of 100 kbit/s.
    pub tx_bitrate: u32,
    pub rx_bitrate: u32,
    pub tx_mcs: u8,
    pub rx_mcs: u8,
    pub tx_nss: u8,
    pub rx_nss: u8,
    pub tx_channel_width: ChannelWidth,
    pub rx_channel_width: ChannelWidth,
    pub tx_mode: WifiMode,
    pub rx_mode: WifiMode,

    pub rx_bytes: u64,
    pub tx_bytes: u64,
    pub rx_packets: u32,
    pub tx_packets: u32,
    pub tx_retries: u32,
    pub tx_failed: u32,
    pub rx_drop_misc: u64,
    pub beacon_loss: u32,
    pub beacon_rx: u64,
    pub beacon_signal_avg: i32,
    pub fcs_error_count: u32,
    /// Seconds.
    pub connected_time: u32,
    /// Milliseconds.
    pub inactive_time: u32,
    /// kbit/s.
    pub expected_throughput: u32,
    pub ack_signal: i32,
    pub ack_signal_avg: i32,
    pub has_ack_signal: bool,
    /// Microseconds.
    pub rx_duration: u64,
    pub tx_duration: u64,

    /// A rate sub-block failed to decode; that direction was reset.
    pub partial_parse: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Tx,
    Rx,
}

impl StationInfo {
    pub fn tx_rate(&self) -> RateInfo {
        self.rate(Direction::Tx)
    }

    pub fn rx_rate(&self) -> RateInfo {
        self.rate(Direction::Rx)
    }

    fn rate(&self, direction: Direction) -> RateInfo {
        let (bitrate, mcs, nss, width, mode) = match direction {
            Direction::Tx => (
                self.tx_bitrate,
                self.tx_mcs,
                self.tx_nss,
                self.tx_channel_width,
                self.tx_mode,
            ),
            Direction::Rx => (
                self.rx_bitrate,
                self.rx_mcs,
                self.rx_nss,
                self.rx_channel_width,
                self.rx_mode,
            ),
        };
        let modulation = match mode {
            WifiMode::Unknown => Modulation::Legacy,
            WifiMode::Ht => Modulation::Ht { mcs },
            WifiMode::Vht => Modulation::Vht { mcs, nss },
            WifiMode::He => Modulation::He { mcs, nss },
            WifiMode::Eht => Modulation::Eht { mcs, nss },
        };
        RateInfo {
            bitrate,
            modulation,
            width,
        }
    }

    fn apply_rate(&mut self, direction: Direction, rate: RateInfo) {
        let (bitrate, mcs, nss, width, mode) = match direction {
            Direction::Tx => (
                &mut self.tx_bitrate,
                &mut self.tx_mcs,
                &mut self.tx_nss,
                &mut self.tx_channel_width,
                &mut self.tx_mode,
            ),
            Direction::Rx => (
                &mut self.rx_bitrate,
                &mut self.rx_mcs,
                &mut self.rx_nss,
                &mut self.rx_channel_width,
                &mut self.rx_mode,
            ),
        };
        *bitrate = rate.bitrate;
        *mcs = rate.mcs();
        *nss = rate.nss();
        *width = rate.width;
        *mode = rate.mode();
    }

    /// Rate in Mbit/s for the given direction.
    pub fn bitrate_mbps(&self, direction: Direction) -> f64 {
        let raw = match direction {
            Direction::Tx => self.tx_bitrate,
            Direction::Rx => self.rx_bitrate,
        };
        f64::from(raw) / 10.0
    }
}

/// Decode a `NL80211_ATTR_STA_INFO` payload into a station record.
///
/// A structurally broken STA_INFO block is an error and the record should
/// be skipped. A broken rate sub-block only resets that direction and sets
/// `partial_parse`.
pub fn decode_station_info(payload: &[u8]) -> Result<StationInfo, AttrError> {
    let table = AttrTable::parse(payload)?;
    let mut info = StationInfo {
        valid: true,
        ..StationInfo::default()
    };

    if let Some(signal) = table.i8(NL80211_STA_INFO_SIGNAL) {
        info.signal_dbm = i32::from(signal);
    }
    if let Some(signal) = table.i8(NL80211_STA_INFO_SIGNAL_AVG) {
        info.signal_avg_dbm = i32::from(signal);
    }

    for (direction, attr) in [
        (Direction::Tx, NL80211_STA_INFO_TX_BITRATE),
        (Direction::Rx, NL80211_STA_INFO_RX_BITRATE),
    ] {
        let Some(block) = table.bytes(attr) else {
            continue;
        };
        match decode_rate_info(block) {
            Ok(rate) => info.apply_rate(direction, rate),
            Err(err) => {
                debug!(target: T_NL80211, "discarding {:?} rate block: {}", direction, err);
                info.apply_rate(direction, RateInfo::default());
                info.partial_parse = true;
            }
        }
    }

    fill_counters(&mut info, &table);
    Ok(info)
}

fn fill_counters(info: &mut StationInfo, table: &AttrTable<'_>) {
    info.rx_bytes = table
        .u64(NL80211_STA_INFO_RX_BYTES64)
        .or_else(|| table.u32(NL80211_STA_INFO_RX_BYTES).map(u64::from))
        .unwrap_or(0);
    info.tx_bytes = table
        .u64(NL80211_STA_INFO_TX_BYTES64)
        .or_else(|| table.u32(NL80211_STA_INFO_TX_BYTES).map(u64::from))
        .unwrap_or(0);

    info.rx_packets = table.u32(NL80211_STA_INFO_RX_PACKETS).unwrap_or(0);
    info.tx_packets = table.u32(NL80211_STA_INFO_TX_PACKETS).unwrap_or(0);
    info.tx_retries = table.u32(NL80211_STA_INFO_TX_RETRIES).unwrap_or(0);
    info.tx_failed = table.u32(NL80211_STA_INFO_TX_FAILED).unwrap_or(0);
    info.rx_drop_misc = table.u64(NL80211_STA_INFO_RX_DROP_MISC).unwrap_or(0);
    info.beacon_loss = table.u32(NL80211_STA_INFO_BEACON_LOSS).unwrap_or(0);
    info.beacon_rx = table.u64(NL80211_STA_INFO_BEACON_RX).unwrap_or(0);
    info.beacon_signal_avg = table
        .i8(NL80211_STA_INFO_BEACON_SIGNAL_AVG)
        .map(i32::from)
        .unwrap_or(0);
    info.fcs_error_count = table.u32(NL80211_STA_INFO_FCS_ERROR_COUNT).unwrap_or(0);
    info.connected_time = table.u32(NL80211_STA_INFO_CONNECTED_TIME).unwrap_or(0);
    info.inactive_time = table.u32(NL80211_STA_INFO_INACTIVE_TIME).unwrap_or(0);
    info.expected_throughput = table
        .u32(NL80211_STA_INFO_EXPECTED_THROUGHPUT)
        .unwrap_or(0);
    info.rx_duration = table.u64(NL80211_STA_INFO_RX_DURATION).unwrap_or(0);
    info.tx_duration = table.u64(NL80211_STA_INFO_TX_DURATION).unwrap_or(0);

    if let Some(ack) = table.i8(NL80211_STA_INFO_ACK_SIGNAL) {
        info.ack_signal = i32::from(ack);
        info.has_ack_signal = true;
    }
    if let Some(ack) = table.i8(NL80211_STA_INFO_ACK_SIGNAL_AVG) {
        info.ack_signal_avg = i32::from(ack);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attrs::push_attr;

    fn rate_block(attrs: &[(u16, &[u8])]) -> Vec<u8> {
        let mut buf = Vec::new();
        for (ty, payload) in attrs {
            push_attr(&mut buf, *ty, payload);
        }
        buf
    }

    fn sta_info() -> Vec<u8> {
        let tx = rate_block(&[
            (NL80211_RATE_INFO_BITRATE32, &8647u32.to_ne_bytes()),
            (NL80211_RATE_INFO_VHT_MCS, &[9]),
            (NL80211_RATE_INFO_VHT_NSS, &[2]),
            (NL80211_RATE_INFO_80_MHZ_WIDTH, &[]),
        ]);
        let rx = rate_block(&[
            (NL80211_RATE_INFO_BITRATE32, &12010u32.to_ne_bytes()),
            (NL80211_RATE_INFO_HE_MCS, &[11]),
            (NL80211_RATE_INFO_HE_NSS, &[2]),
            (NL80211_RATE_INFO_160_MHZ_WIDTH, &[]),
        ]);
        let mut buf = Vec::new();
        push_attr(&mut buf, NL80211_STA_INFO_SIGNAL, &[(-52i8) as u8]);
        push_attr(&mut buf, NL80211_STA_INFO_SIGNAL_AVG, &[(-55i8) as u8]);
        push_attr(&mut buf, NL80211_STA_INFO_TX_BITRATE, &tx);
        push_attr(&mut buf, NL80211_STA_INFO_RX_BITRATE, &rx);
        push_attr(&mut buf, NL80211_STA_INFO_RX_BYTES, &1000u32.to_ne_bytes());
        push_attr(&mut buf, NL80211_STA_INFO_RX_BYTES64, &(5u64 << 32).to_ne_bytes());
        push_attr(&mut buf, NL80211_STA_INFO_TX_BYTES, &777u32.to_ne_bytes());
        push_attr(&mut buf, NL80211_STA_INFO_CONNECTED_TIME, &3600u32.to_ne_bytes());
        push_attr(&mut buf, NL80211_STA_INFO_ACK_SIGNAL, &[(-48i8) as u8]);
        buf
    }

    #[test]
    fn test_full_record() {
        let info = decode_station_info(&sta_info()).unwrap();
        assert!(info.valid);
        assert!(!info.partial_parse);
        assert_eq!(info.signal_dbm, -52);
        assert_eq!(info.signal_avg_dbm, -55);

        assert_eq!(info.tx_bitrate, 8647);
        assert_eq!(info.tx_mode, WifiMode::Vht);
        assert_eq!(info.tx_mcs, 9);
        assert_eq!(info.tx_nss, 2);
        assert_eq!(info.tx_channel_width, ChannelWidth::Mhz80);

        assert_eq!(info.rx_bitrate, 12010);
        assert_eq!(info.rx_mode, WifiMode::He);
        assert_eq!(info.rx_channel_width, ChannelWidth::Mhz160);
        assert!((info.bitrate_mbps(Direction::Rx) - 1201.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_counters() {
        let info = decode_station_info(&sta_info()).unwrap();
        assert_eq!(info.rx_bytes, 5u64 << 32);
        assert_eq!(info.tx_bytes, 777);
        assert_eq!(info.connected_time, 3600);
        assert!(info.has_ack_signal);
        assert_eq!(info.ack_signal, -48);
        assert_eq!(info.tx_retries, 0);
        assert_eq!(info.beacon_rx, 0);
    }

    #[test]
    fn test_empty_block_is_valid_default() {
        let info = decode_station_info(&[]).unwrap();
        assert!(info.valid);
        assert_eq!(
            info,
            StationInfo {
                valid: true,
                ..StationInfo::default()
            }
        );
    }

    #[test]
    fn test_malformed_rate_block_resets_direction() {
        let mut bad_rx = rate_block(&[(NL80211_RATE_INFO_HE_MCS, &[11])]);
        bad_rx[0] = 64;
        let tx = rate_block(&[
            (NL80211_RATE_INFO_BITRATE, &650u16.to_ne_bytes()),
            (NL80211_RATE_INFO_MCS, &[7]),
        ]);
        let mut buf = Vec::new();
        push_attr(&mut buf, NL80211_STA_INFO_SIGNAL, &[(-70i8) as u8]);
        push_attr(&mut buf, NL80211_STA_INFO_TX_BITRATE, &tx);
        push_attr(&mut buf, NL80211_STA_INFO_RX_BITRATE, &bad_rx);

        let info = decode_station_info(&buf).unwrap();
        assert!(info.valid);
        assert!(info.partial_parse);
        assert_eq!(info.signal_dbm, -70);
        assert_eq!(info.tx_bitrate, 650);
        assert_eq!(info.tx_mode, WifiMode::Ht);
        assert_eq!(info.tx_nss, 1);
        assert_eq!(info.rx_rate(), RateInfo::default());
    }

    #[test]
    fn test_malformed_sta_info_is_error() {
        let mut buf = sta_info();
        buf.extend_from_slice(&[1, 2]);
        assert!(decode_station_info(&buf).is_err());
    }

    #[test]
    fn test_rate_views_roundtrip_fields() {
        let info = decode_station_info(&sta_info()).unwrap();
        let tx = info.tx_rate();
        assert_eq!(tx.mode(), WifiMode::Vht);
        assert_eq!(tx.mcs(), 9);
        assert_eq!(tx.nss(), 2);
    }
}
