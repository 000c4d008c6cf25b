use truelink_netlink::attrs::push_attr;
use truelink_netlink::consts::*;
use truelink_netlink::{decode_station_info, ChannelWidth, Direction, WifiMode};

fn legacy_station() -> Vec<u8> {
    let mut tx = Vec::new();
    push_attr(&mut tx, NL80211_RATE_INFO_BITRATE, &540u16.to_ne_bytes());
    let mut rx = Vec::new();
    push_attr(&mut rx, NL80211_RATE_INFO_BITRATE, &10u16.to_ne_bytes());

    let mut buf = Vec::new();
    push_attr(&mut buf, NL80211_STA_INFO_SIGNAL, &[(-71i8) as u8]);
    push_attr(&mut buf, NL80211_STA_INFO_TX_BITRATE, &tx);
    push_attr(&mut buf, NL80211_STA_INFO_RX_BITRATE, &rx);
    push_attr(&mut buf, NL80211_STA_INFO_TX_RETRIES, &12u32.to_ne_bytes());
    push_attr(&mut buf, NL80211_STA_INFO_TX_FAILED, &3u32.to_ne_bytes());
    push_attr(&mut buf, NL80211_STA_INFO_BEACON_RX, &4096u64.to_ne_bytes());
    push_attr(&mut buf, NL80211_STA_INFO_BEACON_SIGNAL_AVG, &[(-70i8) as u8]);
    push_attr(&mut buf, NL80211_STA_INFO_RX_DURATION, &987_654u64.to_ne_bytes());
    buf
}

#[test]
fn legacy_station_has_no_modulation() {
    let info = decode_station_info(&legacy_station()).unwrap();
    assert!(info.valid);
    assert!(!info.partial_parse);
    assert_eq!(info.signal_dbm, -71);
    assert_eq!(info.bitrate_mbps(Direction::Tx), 54.0);
    assert_eq!(info.bitrate_mbps(Direction::Rx), 1.0);
    assert_eq!(info.tx_mode, WifiMode::Unknown);
    assert_eq!(info.rx_mode.generation(), "Legacy");
    assert_eq!(info.rx_mcs, 0);
    assert_eq!(info.rx_nss, 0);
    assert_eq!(info.rx_channel_width, ChannelWidth::Mhz20);
    assert_eq!(info.tx_retries, 12);
    assert_eq!(info.tx_failed, 3);
    assert_eq!(info.beacon_rx, 4096);
    assert_eq!(info.beacon_signal_avg, -70);
    assert_eq!(info.rx_duration, 987_654);
    assert!(!info.has_ack_signal);
}

#[test]
fn station_record_serializes_for_consumers() {
    let info = decode_station_info(&legacy_station()).unwrap();
    let json = serde_json::to_value(&info).unwrap();
    assert_eq!(json["valid"], true);
    assert_eq!(json["signal_dbm"], -71);
    assert_eq!(json["tx_bitrate"], 540);
    assert_eq!(json["tx_mode"], "UNKNOWN");
    assert_eq!(json["partial_parse"], false);
}

#[test]
fn truncated_payload_is_rejected() {
    let mut buf = legacy_station();
    buf.truncate(buf.len() - 3);
    assert!(decode_station_info(&buf).is_err());
}
