//! One-shot GET_STATION queries.
//!
//! Each query opens its own transport, sends one request and drains the
//! replies through a small handler set. The transport is dropped before
//! `get_station_info` returns, whichever way the query ends.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use tracing::{debug, warn};

use crate::consts::NL80211_GENL_NAME;
use crate::error::{NetlinkError, Result};
use crate::mac::MacAddr;
use crate::request::StationRequest;
use crate::station::{decode_station_info, StationInfo};
use crate::targets::T_NL80211;
use crate::transport::{Connector, Reply, StationTransport};

/// Upper bound on frames read for one query.
pub const DEFAULT_MAX_FRAMES: usize = 256;

/// Per-client query counters.
#[derive(Debug, Default)]
pub struct QueryStats {
    total: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
    partial: AtomicU64,
    empty: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct QueryStatsSnapshot {
    pub total: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub partial: u64,
    /// Clean replies that carried no station (not associated).
    pub empty: u64,
}

impl QueryStats {
    fn record(&self, outcome: &Outcome) {
        self.total.fetch_add(1, Ordering::Relaxed);
        match outcome {
            Outcome::Ok => self.succeeded.fetch_add(1, Ordering::Relaxed),
            Outcome::Partial => self.partial.fetch_add(1, Ordering::Relaxed),
            Outcome::Failed => self.failed.fetch_add(1, Ordering::Relaxed),
            Outcome::Empty => self.empty.fetch_add(1, Ordering::Relaxed),
        };
    }

    pub fn snapshot(&self) -> QueryStatsSnapshot {
        QueryStatsSnapshot {
            total: self.total.load(Ordering::Relaxed),
            succeeded: self.succeeded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            partial: self.partial.load(Ordering::Relaxed),
            empty: self.empty.load(Ordering::Relaxed),
        }
    }
}

enum Outcome {
    Ok,
    Partial,
    Failed,
    Empty,
}

/// Source of station records. Implemented by [`Nl80211Client`] and by test
/// doubles in downstream crates.
pub trait StationSource {
    fn get_station_info(&mut self, ifname: &str, peer: Option<MacAddr>) -> StationInfo;

    /// Error text of the most recent query; empty after a success.
    fn last_error(&self) -> &str;

    fn is_valid(&self) -> bool;
}

#[derive(Debug, Default)]
struct ReplyState {
    station: Option<StationInfo>,
    kernel_error: Option<i32>,
    frames: usize,
    receive_error: Option<NetlinkError>,
    /// DONE, ACK, NLMSG_ERROR or the scoped record ended the stream.
    terminated: bool,
}

/// nl80211 station-info client.
///
/// The family id is resolved once at construction; sockets are opened per
/// query.
pub struct Nl80211Client<C: Connector> {
    connector: C,
    family_id: Option<u16>,
    max_frames: usize,
    last_error: String,
    stats: QueryStats,
}

impl<C: Connector> Nl80211Client<C> {
    /// Open a transport, resolve the nl80211 family, and close it again.
    ///
    /// A client whose resolution failed is still returned; `is_valid()`
    /// reports false and every query fails with an initialization error.
    pub fn init(connector: C) -> Self {
        let mut client = Self {
            connector,
            family_id: None,
            max_frames: DEFAULT_MAX_FRAMES,
            last_error: String::new(),
            stats: QueryStats::default(),
        };
        match client.resolve_family() {
            Ok(id) => {
                debug!(target: T_NL80211, "resolved nl80211 family id={}", id);
                client.family_id = Some(id);
            }
            Err(err) => {
                warn!(target: T_NL80211, "nl80211 unavailable: {}", err);
                client.last_error = err.to_string();
            }
        }
        client
    }

    pub fn with_max_frames(mut self, max_frames: usize) -> Self {
        self.max_frames = max_frames.max(1);
        self
    }

    fn resolve_family(&self) -> Result<u16> {
        let mut transport = self.connector.open()?;
        transport.resolve_family(NL80211_GENL_NAME)
    }

    pub fn family_id(&self) -> Option<u16> {
        self.family_id
    }

    pub fn is_valid(&self) -> bool {
        self.family_id.is_some()
    }

    /// Error text of the most recent query; empty after a success.
    pub fn last_error(&self) -> &str {
        &self.last_error
    }

    pub fn stats(&self) -> QueryStatsSnapshot {
        self.stats.snapshot()
    }

    /// Query the kernel for one station record.
    ///
    /// Never fails outright: on error the returned record has
    /// `valid == false` and `last_error()` describes what went wrong.
    pub fn get_station_info(&mut self, ifname: &str, peer: Option<MacAddr>) -> StationInfo {
        let started = Instant::now();
        let result = self.query(ifname, peer);

        let (info, outcome) = match result {
            Ok((info, Some(err))) => {
                self.last_error = err.to_string();
                (info, Outcome::Failed)
            }
            Ok((info, None)) if info.partial_parse => {
                self.last_error = NetlinkError::PartialParse.to_string();
                (info, Outcome::Partial)
            }
            Ok((info, None)) => {
                self.last_error.clear();
                let outcome = if info.valid { Outcome::Ok } else { Outcome::Empty };
                (info, outcome)
            }
            Err(err) => {
                self.last_error = err.to_string();
                (StationInfo::default(), Outcome::Failed)
            }
        };
        self.stats.record(&outcome);

        debug!(
            target: T_NL80211,
            "get_station iface={} mode={} valid={} error={:?} elapsed_us={}",
            ifname,
            StationRequest::label_for(peer),
            info.valid,
            self.last_error,
            started.elapsed().as_micros()
        );
        info
    }

    /// A record decoded before a trailing failure is kept and returned
    /// alongside that failure.
    fn query(
        &self,
        ifname: &str,
        peer: Option<MacAddr>,
    ) -> Result<(StationInfo, Option<NetlinkError>)> {
        let ifindex = self.connector.interface_index(ifname)?;
        let family_id = self
            .family_id
            .ok_or_else(|| NetlinkError::init("nl80211 family not resolved"))?;

        let request = StationRequest::new(family_id, ifindex, peer);
        let mut transport = self.connector.open()?;
        transport.send(&request)?;

        let mut state = self.drain(&mut transport, &request);
        drop(transport);

        let trailing = if let Some(err) = state.receive_error.take() {
            Some(err)
        } else if let Some(code) = state.kernel_error {
            Some(NetlinkError::from_kernel_code(code))
        } else if !state.terminated && state.frames >= self.max_frames {
            Some(NetlinkError::receive(format!(
                "no end of {} reply after {} frames",
                request.mode_label(),
                state.frames
            )))
        } else if !state.terminated {
            Some(NetlinkError::receive(format!(
                "{} reply ended after {} frames without DONE or ACK",
                request.mode_label(),
                state.frames
            )))
        } else {
            None
        };

        match (state.station, trailing) {
            (None, Some(err)) => Err(err),
            // No station record (e.g. not associated) leaves an invalid,
            // error-free result.
            (station, trailing) => Ok((station.unwrap_or_default(), trailing)),
        }
    }

    fn drain<T: StationTransport>(
        &self,
        transport: &mut T,
        request: &StationRequest,
    ) -> ReplyState {
        let mut state = ReplyState::default();
        while state.frames < self.max_frames {
            let reply = match transport.recv() {
                Ok(Some(reply)) => reply,
                Ok(None) => break,
                Err(err) => {
                    state.receive_error = Some(err);
                    break;
                }
            };
            state.frames += 1;
            let keep_going = match reply {
                Reply::Station { sta_info } => on_valid(&mut state, sta_info, request),
                Reply::Done | Reply::Ack => false,
                Reply::Error(code) => {
                    state.kernel_error = Some(code);
                    false
                }
            };
            if !keep_going {
                state.terminated = true;
                break;
            }
        }
        if !state.terminated && state.receive_error.is_none() {
            debug!(
                target: T_NL80211,
                "get_station stream open after {} frames", state.frames
            );
        }
        state
    }
}

/// Valid-data handler. Returns whether to keep reading.
fn on_valid(state: &mut ReplyState, sta_info: Option<Vec<u8>>, request: &StationRequest) -> bool {
    let Some(payload) = sta_info else {
        return true;
    };
    if state.station.is_some() {
        // Dump: the first station record is the one reported; keep draining
        // until DONE so the socket is left clean.
        return true;
    }
    match decode_station_info(&payload) {
        Ok(info) => {
            state.station = Some(info);
            request.is_dump()
        }
        Err(err) => {
            debug!(target: T_NL80211, "skipping malformed STA_INFO: {}", err);
            true
        }
    }
}

impl<C: Connector> StationSource for Nl80211Client<C> {
    fn get_station_info(&mut self, ifname: &str, peer: Option<MacAddr>) -> StationInfo {
        Nl80211Client::get_station_info(self, ifname, peer)
    }

    fn last_error(&self) -> &str {
        Nl80211Client::last_error(self)
    }

    fn is_valid(&self) -> bool {
        Nl80211Client::is_valid(self)
    }
}
