use crate::consts::{NL80211_ATTR_IFINDEX, NL80211_ATTR_MAC, NL80211_CMD_GET_STATION};
use crate::mac::MacAddr;

/// One attribute of an outgoing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestAttr {
    IfIndex(u32),
    Mac(MacAddr),
}

impl RequestAttr {
    pub fn nla_type(&self) -> u16 {
        match self {
            RequestAttr::IfIndex(_) => NL80211_ATTR_IFINDEX,
            RequestAttr::Mac(_) => NL80211_ATTR_MAC,
        }
    }
}

/// A GET_STATION request.
///
/// Without a peer the request asks the kernel to dump every station on the
/// interface. With a peer it is scoped to that station's MAC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationRequest {
    pub family_id: u16,
    pub ifindex: u32,
    pub peer: Option<MacAddr>,
}

impl StationRequest {
    pub fn new(family_id: u16, ifindex: u32, peer: Option<MacAddr>) -> Self {
        Self {
            family_id,
            ifindex,
            peer,
        }
    }

    pub fn command(&self) -> u8 {
        NL80211_CMD_GET_STATION
    }

    pub fn is_dump(&self) -> bool {
        self.peer.is_none()
    }

    pub fn attributes(&self) -> Vec<RequestAttr> {
        let mut attrs = vec![RequestAttr::IfIndex(self.ifindex)];
        if let Some(peer) = self.peer {
            attrs.push(RequestAttr::Mac(peer));
        }
        attrs
    }

    pub fn mode_label(&self) -> &'static str {
        Self::label_for(self.peer)
    }

    /// "dump" without a peer, "scoped" with one.
    pub fn label_for(peer: Option<MacAddr>) -> &'static str {
        if peer.is_none() {
            "dump"
        } else {
            "scoped"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dump_without_peer() {
        let req = StationRequest::new(28, 4, None);
        assert!(req.is_dump());
        assert_eq!(req.command(), NL80211_CMD_GET_STATION);
        assert_eq!(req.attributes(), vec![RequestAttr::IfIndex(4)]);
        assert_eq!(req.mode_label(), "dump");
    }

    #[test]
    fn test_scoped_with_peer() {
        let peer = MacAddr([2, 0, 0, 0, 0, 1]);
        let req = StationRequest::new(28, 4, Some(peer));
        assert!(!req.is_dump());
        let attrs = req.attributes();
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs[1], RequestAttr::Mac(peer));
        assert_eq!(attrs[1].nla_type(), NL80211_ATTR_MAC);
        assert_eq!(req.mode_label(), "scoped");
        assert_eq!(StationRequest::label_for(Some(peer)), "scoped");
    }
}
