//! Decoding of the nested `nl80211_rate_info` block.
//!
//! A rate block is sparse: drivers only emit the attributes that apply to
//! the frame's modulation family. When several families are present the
//! newest one wins, and the same goes for channel width flags.

use serde::Serialize;

use crate::attrs::{AttrError, AttrTable};
use crate::consts::*;

/// Modulation family, ordered oldest to newest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WifiMode {
    #[default]
    Unknown,
    Ht,
    Vht,
    He,
    Eht,
}

impl WifiMode {
    pub fn label(&self) -> &'static str {
        match self {
            WifiMode::Ht => "HT",
            WifiMode::Vht => "VHT",
            WifiMode::He => "HE",
            WifiMode::Eht => "EHT",
            WifiMode::Unknown => "Legacy",
        }
    }

    /// Marketing generation name ("WiFi 4" through "WiFi 7").
    pub fn generation(&self) -> &'static str {
        match self {
            WifiMode::Ht => "WiFi 4",
            WifiMode::Vht => "WiFi 5",
            WifiMode::He => "WiFi 6",
            WifiMode::Eht => "WiFi 7",
            WifiMode::Unknown => "Legacy",
        }
    }

    pub fn is_he_or_newer(&self) -> bool {
        *self >= WifiMode::He
    }

    pub fn is_vht_or_newer(&self) -> bool {
        *self >= WifiMode::Vht
    }
}

impl std::fmt::Display for WifiMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Channel width as reported in a rate block.
///
/// The discriminant is the ordinal used on the wire-facing API
/// (0:20, 1:40, 2:80, 3:160, 4:80+80, 5:320).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum ChannelWidth {
    #[default]
    Mhz20 = 0,
    Mhz40 = 1,
    Mhz80 = 2,
    Mhz160 = 3,
    Mhz80P80 = 4,
    Mhz320 = 5,
}

impl ChannelWidth {
    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        match ordinal {
            0 => Some(Self::Mhz20),
            1 => Some(Self::Mhz40),
            2 => Some(Self::Mhz80),
            3 => Some(Self::Mhz160),
            4 => Some(Self::Mhz80P80),
            5 => Some(Self::Mhz320),
            _ => None,
        }
    }

    pub fn as_ordinal(self) -> u8 {
        self as u8
    }

    /// Occupied bandwidth; 80+80 counts as 160.
    pub fn mhz(self) -> u32 {
        match self {
            Self::Mhz20 => 20,
            Self::Mhz40 => 40,
            Self::Mhz80 => 80,
            Self::Mhz160 | Self::Mhz80P80 => 160,
            Self::Mhz320 => 320,
        }
    }
}

/// Width ordinal to MHz, falling back to 20 for unknown ordinals.
pub fn channel_width_to_mhz(ordinal: u8) -> u32 {
    ChannelWidth::from_ordinal(ordinal)
        .unwrap_or_default()
        .mhz()
}

/// Modulation details of one rate block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Modulation {
    #[default]
    Legacy,
    Ht { mcs: u8 },
    Vht { mcs: u8, nss: u8 },
    He { mcs: u8, nss: u8 },
    Eht { mcs: u8, nss: u8 },
}

impl Modulation {
    pub fn mode(&self) -> WifiMode {
        match self {
            Modulation::Legacy => WifiMode::Unknown,
            Modulation::Ht { .. } => WifiMode::Ht,
            Modulation::Vht { .. } => WifiMode::Vht,
            Modulation::He { .. } => WifiMode::He,
            Modulation::Eht { .. } => WifiMode::Eht,
        }
    }

    pub fn mcs(&self) -> u8 {
        match *self {
            Modulation::Legacy => 0,
            Modulation::Ht { mcs }
            | Modulation::Vht { mcs, .. }
            | Modulation::He { mcs, .. }
            | Modulation::Eht { mcs, .. } => mcs,
        }
    }

    /// Spatial streams. HT encodes them in the MCS index (8 per stream).
    pub fn nss(&self) -> u8 {
        match *self {
            Modulation::Legacy => 0,
            Modulation::Ht { mcs } => mcs / 8 + 1,
            Modulation::Vht { nss, .. } | Modulation::He { nss, .. } | Modulation::Eht { nss, .. } => {
                nss
            }
        }
    }
}

struct Family {
    mcs_attr: u16,
    nss_attr: Option<u16>,
    build: fn(u8, u8) -> Modulation,
}

// First family whose MCS attribute is present wins.
const MODULATION_PRIORITY: [Family; 4] = [
    Family {
        mcs_attr: NL80211_RATE_INFO_EHT_MCS,
        nss_attr: Some(NL80211_RATE_INFO_EHT_NSS),
        build: |mcs, nss| Modulation::Eht { mcs, nss },
    },
    Family {
        mcs_attr: NL80211_RATE_INFO_HE_MCS,
        nss_attr: Some(NL80211_RATE_INFO_HE_NSS),
        build: |mcs, nss| Modulation::He { mcs, nss },
    },
    Family {
        mcs_attr: NL80211_RATE_INFO_VHT_MCS,
        nss_attr: Some(NL80211_RATE_INFO_VHT_NSS),
        build: |mcs, nss| Modulation::Vht { mcs, nss },
    },
    Family {
        mcs_attr: NL80211_RATE_INFO_MCS,
        nss_attr: None,
        build: |mcs, _| Modulation::Ht { mcs },
    },
];

// First flag present wins; none present means 20 MHz.
const WIDTH_PRIORITY: [(u16, ChannelWidth); 5] = [
    (NL80211_RATE_INFO_320_MHZ_WIDTH, ChannelWidth::Mhz320),
    (NL80211_RATE_INFO_160_MHZ_WIDTH, ChannelWidth::Mhz160),
    (NL80211_RATE_INFO_80P80_MHZ_WIDTH, ChannelWidth::Mhz80P80),
    (NL80211_RATE_INFO_80_MHZ_WIDTH, ChannelWidth::Mhz80),
    (NL80211_RATE_INFO_40_MHZ_WIDTH, ChannelWidth::Mhz40),
];

/// One decoded rate block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateInfo {
    /// Units of 100 kbit/s.
    pub bitrate: u32,
    pub modulation: Modulation,
    pub width: ChannelWidth,
}

impl RateInfo {
    pub fn mode(&self) -> WifiMode {
        self.modulation.mode()
    }

    pub fn mcs(&self) -> u8 {
        self.modulation.mcs()
    }

    pub fn nss(&self) -> u8 {
        self.modulation.nss()
    }
}

/// Decode a `nl80211_rate_info` payload.
///
/// An empty block decodes to defaults. Only a structurally broken block
/// is an error.
pub fn decode_rate_info(payload: &[u8]) -> Result<RateInfo, AttrError> {
    let table = AttrTable::parse(payload)?;

    let bitrate = table
        .u32(NL80211_RATE_INFO_BITRATE32)
        .or_else(|| table.u16(NL80211_RATE_INFO_BITRATE).map(u32::from))
        .unwrap_or(0);

    let modulation = MODULATION_PRIORITY
        .iter()
        .find_map(|family| {
            let mcs = table.u8(family.mcs_attr)?;
            let nss = family
                .nss_attr
                .and_then(|attr| table.u8(attr))
                .unwrap_or(0);
            Some((family.build)(mcs, nss))
        })
        .unwrap_or_default();

    let width = WIDTH_PRIORITY
        .iter()
        .find(|(attr, _)| table.flag(*attr))
        .map(|(_, width)| *width)
        .unwrap_or_default();

    Ok(RateInfo {
        bitrate,
        modulation,
        width,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attrs::push_attr;

    fn block(attrs: &[(u16, &[u8])]) -> Vec<u8> {
        let mut buf = Vec::new();
        for (ty, payload) in attrs {
            push_attr(&mut buf, *ty, payload);
        }
        buf
    }

    #[test]
    fn test_empty_block_defaults() {
        let info = decode_rate_info(&[]).unwrap();
        assert_eq!(info, RateInfo::default());
        assert_eq!(info.mode(), WifiMode::Unknown);
        assert_eq!(info.width.mhz(), 20);
    }

    #[test]
    fn test_bitrate32_preferred() {
        let payload = block(&[
            (NL80211_RATE_INFO_BITRATE, &1200u16.to_ne_bytes()),
            (NL80211_RATE_INFO_BITRATE32, &24020u32.to_ne_bytes()),
        ]);
        assert_eq!(decode_rate_info(&payload).unwrap().bitrate, 24020);
    }

    #[test]
    fn test_bitrate16_fallback() {
        let payload = block(&[(NL80211_RATE_INFO_BITRATE, &1200u16.to_ne_bytes())]);
        assert_eq!(decode_rate_info(&payload).unwrap().bitrate, 1200);
    }

    #[test]
    fn test_single_family_vht() {
        let payload = block(&[
            (NL80211_RATE_INFO_VHT_MCS, &[9]),
            (NL80211_RATE_INFO_VHT_NSS, &[2]),
            (NL80211_RATE_INFO_80_MHZ_WIDTH, &[]),
        ]);
        let info = decode_rate_info(&payload).unwrap();
        assert_eq!(info.modulation, Modulation::Vht { mcs: 9, nss: 2 });
        assert_eq!(info.width, ChannelWidth::Mhz80);
    }

    #[test]
    fn test_newest_family_wins() {
        let payload = block(&[
            (NL80211_RATE_INFO_MCS, &[15]),
            (NL80211_RATE_INFO_VHT_MCS, &[7]),
            (NL80211_RATE_INFO_VHT_NSS, &[1]),
            (NL80211_RATE_INFO_HE_MCS, &[11]),
            (NL80211_RATE_INFO_HE_NSS, &[2]),
        ]);
        let info = decode_rate_info(&payload).unwrap();
        assert_eq!(info.mode(), WifiMode::He);
        assert_eq!(info.mcs(), 11);
        assert_eq!(info.nss(), 2);
    }

    #[test]
    fn test_eht_beats_everything() {
        let payload = block(&[
            (NL80211_RATE_INFO_HE_MCS, &[11]),
            (NL80211_RATE_INFO_EHT_MCS, &[13]),
            (NL80211_RATE_INFO_EHT_NSS, &[4]),
        ]);
        let info = decode_rate_info(&payload).unwrap();
        assert_eq!(info.modulation, Modulation::Eht { mcs: 13, nss: 4 });
    }

    #[test]
    fn test_ht_streams_from_mcs() {
        for mcs in 0u8..=31 {
            let payload = block(&[(NL80211_RATE_INFO_MCS, &[mcs])]);
            let info = decode_rate_info(&payload).unwrap();
            assert_eq!(info.mode(), WifiMode::Ht);
            assert_eq!(info.nss(), mcs / 8 + 1, "mcs {mcs}");
        }
    }

    #[test]
    fn test_missing_nss_reads_zero() {
        let payload = block(&[(NL80211_RATE_INFO_HE_MCS, &[5])]);
        let info = decode_rate_info(&payload).unwrap();
        assert_eq!(info.modulation, Modulation::He { mcs: 5, nss: 0 });
    }

    #[test]
    fn test_nss_from_other_family_is_ignored() {
        let cases: [(u16, u16, Modulation); 3] = [
            (
                NL80211_RATE_INFO_EHT_MCS,
                NL80211_RATE_INFO_HE_NSS,
                Modulation::Eht { mcs: 7, nss: 0 },
            ),
            (
                NL80211_RATE_INFO_HE_MCS,
                NL80211_RATE_INFO_VHT_NSS,
                Modulation::He { mcs: 7, nss: 0 },
            ),
            (
                NL80211_RATE_INFO_VHT_MCS,
                NL80211_RATE_INFO_EHT_NSS,
                Modulation::Vht { mcs: 7, nss: 0 },
            ),
        ];
        for (mcs_attr, nss_attr, expected) in cases {
            let payload = block(&[(mcs_attr, &[7]), (nss_attr, &[3])]);
            let info = decode_rate_info(&payload).unwrap();
            assert_eq!(info.modulation, expected);
            assert_eq!(info.nss(), 0);
        }

        // HT derives its streams from the index whatever else is present.
        let payload = block(&[
            (NL80211_RATE_INFO_MCS, &[10]),
            (NL80211_RATE_INFO_VHT_NSS, &[4]),
        ]);
        let info = decode_rate_info(&payload).unwrap();
        assert_eq!(info.modulation, Modulation::Ht { mcs: 10 });
        assert_eq!(info.nss(), 2);
    }

    #[test]
    fn test_width_priority() {
        let payload = block(&[
            (NL80211_RATE_INFO_40_MHZ_WIDTH, &[]),
            (NL80211_RATE_INFO_160_MHZ_WIDTH, &[]),
            (NL80211_RATE_INFO_320_MHZ_WIDTH, &[]),
        ]);
        assert_eq!(decode_rate_info(&payload).unwrap().width, ChannelWidth::Mhz320);

        let payload = block(&[
            (NL80211_RATE_INFO_80_MHZ_WIDTH, &[]),
            (NL80211_RATE_INFO_80P80_MHZ_WIDTH, &[]),
        ]);
        assert_eq!(decode_rate_info(&payload).unwrap().width, ChannelWidth::Mhz80P80);
    }

    #[test]
    fn test_malformed_block_is_error() {
        let mut payload = block(&[(NL80211_RATE_INFO_VHT_MCS, &[9])]);
        payload[0] = 40;
        assert!(decode_rate_info(&payload).is_err());
    }

    #[test]
    fn test_width_ordinals() {
        assert_eq!(channel_width_to_mhz(0), 20);
        assert_eq!(channel_width_to_mhz(1), 40);
        assert_eq!(channel_width_to_mhz(2), 80);
        assert_eq!(channel_width_to_mhz(3), 160);
        assert_eq!(channel_width_to_mhz(4), 160);
        assert_eq!(channel_width_to_mhz(5), 320);
        assert_eq!(channel_width_to_mhz(42), 20);
    }

    #[test]
    fn test_mode_labels() {
        assert_eq!(WifiMode::Eht.label(), "EHT");
        assert_eq!(WifiMode::Unknown.label(), "Legacy");
        assert_eq!(WifiMode::Vht.generation(), "WiFi 5");
        assert_eq!(WifiMode::Unknown.generation(), "Legacy");
        assert!(WifiMode::Eht > WifiMode::He);
    }
}
