//! # truelink-netlink
//!
//! nl80211 `GET_STATION` queries and a decoder for the station-info
//! attribute tree.
//!
//! ## Platform Support
//!
//! The socket transport is Linux-only and gated with
//! `#[cfg(target_os = "linux")]`. Attribute decoding, the request model and
//! the query client (over any [`Connector`]) build everywhere.
//!
//! ## Usage
//!
//! ```no_run
//! # #[cfg(target_os = "linux")]
//! # fn main() {
//! use truelink_netlink::{NeliConnector, Nl80211Client};
//!
//! let mut client = Nl80211Client::init(NeliConnector::default());
//! let info = client.get_station_info("wlan0", None);
//! if info.valid {
//!     println!("{} dBm, rx {} Mbit/s", info.signal_dbm, info.rx_bitrate / 10);
//! } else {
//!     eprintln!("{}", client.last_error());
//! }
//! # }
//! # #[cfg(not(target_os = "linux"))]
//! # fn main() {}
//! ```

pub mod attrs;
pub mod client;
pub mod consts;
pub mod error;
pub mod mac;
pub mod rate_info;
pub mod request;
#[cfg(target_os = "linux")]
pub mod socket;
pub mod station;
pub mod targets;
pub mod transport;

pub use attrs::AttrError;
pub use client::{Nl80211Client, QueryStatsSnapshot, StationSource};
pub use error::{NetlinkError, Result};
pub use mac::{MacAddr, MacParseError};
pub use rate_info::{
    channel_width_to_mhz, decode_rate_info, ChannelWidth, Modulation, RateInfo, WifiMode,
};
pub use request::StationRequest;
#[cfg(target_os = "linux")]
pub use socket::{NeliConnector, NeliTransport};
pub use station::{decode_station_info, Direction, StationInfo};
pub use targets::T_NL80211;
pub use transport::{Connector, Reply, StationTransport};
