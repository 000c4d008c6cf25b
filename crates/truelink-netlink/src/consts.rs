//! nl80211 wire constants (include/uapi/linux/nl80211.h).

pub const NL80211_GENL_NAME: &str = "nl80211";
pub const NL80211_GENL_VERSION: u8 = 1;

pub const NLMSG_ERR: u16 = 2; // NLMSG_ERROR
pub const NLMSG_DONE: u16 = 3; // NLMSG_DONE

// nl80211 commands
pub const NL80211_CMD_GET_STATION: u8 = 17;

// nl80211 top-level attributes
pub const NL80211_ATTR_IFINDEX: u16 = 3;
pub const NL80211_ATTR_MAC: u16 = 6;
pub const NL80211_ATTR_STA_INFO: u16 = 21;

// nl80211_sta_info
pub const NL80211_STA_INFO_INACTIVE_TIME: u16 = 1;
pub const NL80211_STA_INFO_RX_BYTES: u16 = 2;
pub const NL80211_STA_INFO_TX_BYTES: u16 = 3;
pub const NL80211_STA_INFO_SIGNAL: u16 = 7;
pub const NL80211_STA_INFO_TX_BITRATE: u16 = 8;
pub const NL80211_STA_INFO_RX_PACKETS: u16 = 9;
pub const NL80211_STA_INFO_TX_PACKETS: u16 = 10;
pub const NL80211_STA_INFO_TX_RETRIES: u16 = 11;
pub const NL80211_STA_INFO_TX_FAILED: u16 = 12;
pub const NL80211_STA_INFO_SIGNAL_AVG: u16 = 13;
pub const NL80211_STA_INFO_RX_BITRATE: u16 = 14;
pub const NL80211_STA_INFO_CONNECTED_TIME: u16 = 16;
pub const NL80211_STA_INFO_BEACON_LOSS: u16 = 18;
pub const NL80211_STA_INFO_RX_BYTES64: u16 = 23;
pub const NL80211_STA_INFO_TX_BYTES64: u16 = 24;
pub const NL80211_STA_INFO_EXPECTED_THROUGHPUT: u16 = 27;
pub const NL80211_STA_INFO_RX_DROP_MISC: u16 = 28;
pub const NL80211_STA_INFO_BEACON_RX: u16 = 29;
pub const NL80211_STA_INFO_BEACON_SIGNAL_AVG: u16 = 30;
pub const NL80211_STA_INFO_RX_DURATION: u16 = 32;
pub const NL80211_STA_INFO_ACK_SIGNAL: u16 = 34;
pub const NL80211_STA_INFO_ACK_SIGNAL_AVG: u16 = 35;
pub const NL80211_STA_INFO_FCS_ERROR_COUNT: u16 = 37;
pub const NL80211_STA_INFO_TX_DURATION: u16 = 38;

// nl80211_rate_info
pub const NL80211_RATE_INFO_BITRATE: u16 = 1;
pub const NL80211_RATE_INFO_MCS: u16 = 2;
pub const NL80211_RATE_INFO_40_MHZ_WIDTH: u16 = 3;
pub const NL80211_RATE_INFO_BITRATE32: u16 = 5;
pub const NL80211_RATE_INFO_VHT_MCS: u16 = 6;
pub const NL80211_RATE_INFO_VHT_NSS: u16 = 7;
pub const NL80211_RATE_INFO_80_MHZ_WIDTH: u16 = 8;
pub const NL80211_RATE_INFO_80P80_MHZ_WIDTH: u16 = 9;
pub const NL80211_RATE_INFO_160_MHZ_WIDTH: u16 = 10;
pub const NL80211_RATE_INFO_HE_MCS: u16 = 13;
pub const NL80211_RATE_INFO_HE_NSS: u16 = 14;
pub const NL80211_RATE_INFO_320_MHZ_WIDTH: u16 = 18;
pub const NL80211_RATE_INFO_EHT_MCS: u16 = 19;
pub const NL80211_RATE_INFO_EHT_NSS: u16 = 20;
