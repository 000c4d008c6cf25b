//! The seam between the query client and the kernel.
//!
//! The client only sees requests going out and classified replies coming
//! back, which keeps the receive loop testable without a live nl80211
//! socket.

use crate::error::Result;
use crate::request::StationRequest;

/// One frame received in answer to a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// A GET_STATION message. `sta_info` is the raw nested
    /// `NL80211_ATTR_STA_INFO` payload when the message carried one.
    Station { sta_info: Option<Vec<u8>> },
    /// End of a multipart dump.
    Done,
    /// NLMSG_ERROR with a zero code.
    Ack,
    /// NLMSG_ERROR with a negative errno.
    Error(i32),
}

impl Reply {
    /// Classify an NLMSG_ERROR code.
    pub fn from_error_code(code: i32) -> Self {
        if code == 0 {
            Reply::Ack
        } else {
            Reply::Error(code)
        }
    }
}

/// An open request/response channel to the nl80211 family.
///
/// Dropping the transport releases the underlying socket.
pub trait StationTransport {
    fn resolve_family(&mut self, name: &str) -> Result<u16>;

    fn send(&mut self, request: &StationRequest) -> Result<()>;

    /// Next reply frame, or `None` at end of stream. A receive timeout is an
    /// error, not `None`.
    fn recv(&mut self) -> Result<Option<Reply>>;
}

/// Opens transports and resolves interface names.
pub trait Connector {
    type Transport: StationTransport;

    fn open(&self) -> Result<Self::Transport>;

    fn interface_index(&self, name: &str) -> Result<u32>;
}
