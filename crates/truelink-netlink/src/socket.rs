use std::io;
use std::path::PathBuf;
use std::time::Duration;

use neli::{
    attr::Attribute,
    consts::{
        nl::{NlmF, NlmFFlags},
        socket::NlFamily,
    },
    err::{NlError, SerError, WrappedError},
    genl::{Genlmsghdr, Nlattr},
    nl::{NlPayload, Nlmsghdr},
    socket::NlSocketHandle,
    types::GenlBuffer,
};
use tracing::debug;

use crate::consts::{NLMSG_DONE, NLMSG_ERR, NL80211_ATTR_STA_INFO, NL80211_GENL_VERSION};
use crate::error::{NetlinkError, Result};
use crate::request::{RequestAttr, StationRequest};
use crate::targets::T_NL80211;
use crate::transport::{Connector, Reply, StationTransport};

pub const DEFAULT_RECV_TIMEOUT: Duration = Duration::from_millis(1000);
const SYSFS_NET: &str = "/sys/class/net";
const RECV_TIMEOUT_REASON: &str = "timed out waiting for nl80211 reply";

/// Opens a generic-netlink socket per query.
#[derive(Debug, Clone)]
pub struct NeliConnector {
    recv_timeout: Duration,
    sysfs_root: PathBuf,
}

impl Default for NeliConnector {
    fn default() -> Self {
        Self::new(DEFAULT_RECV_TIMEOUT)
    }
}

impl NeliConnector {
    pub fn new(recv_timeout: Duration) -> Self {
        Self {
            recv_timeout,
            sysfs_root: PathBuf::from(SYSFS_NET),
        }
    }
}

impl Connector for NeliConnector {
    type Transport = NeliTransport;

    fn open(&self) -> Result<NeliTransport> {
        let socket = NlSocketHandle::connect(NlFamily::Generic, None, &[]).map_err(|e| {
            if e.kind() == io::ErrorKind::PermissionDenied {
                NetlinkError::io_error("connect nl80211 socket", e)
            } else {
                NetlinkError::init(format!("Failed to connect netlink socket: {}", e))
            }
        })?;
        set_recv_timeout(&socket, self.recv_timeout);
        Ok(NeliTransport { socket })
    }

    fn interface_index(&self, name: &str) -> Result<u32> {
        if name.is_empty() {
            return Err(NetlinkError::InterfaceNotFound {
                name: String::new(),
            });
        }
        let path = self.sysfs_root.join(name).join("ifindex");
        let raw = std::fs::read_to_string(&path).map_err(|_| NetlinkError::InterfaceNotFound {
            name: name.to_string(),
        })?;
        raw.trim()
            .parse::<u32>()
            .map_err(|_| NetlinkError::InterfaceNotFound {
                name: name.to_string(),
            })
    }
}

/// A connected nl80211 socket. Closed on drop.
pub struct NeliTransport {
    socket: NlSocketHandle,
}

impl StationTransport for NeliTransport {
    fn resolve_family(&mut self, name: &str) -> Result<u16> {
        self.socket
            .resolve_genl_family(name)
            .map_err(|e| NetlinkError::init(format!("Failed to resolve {}: {}", name, e)))
    }

    fn send(&mut self, request: &StationRequest) -> Result<()> {
        let nlhdr = build_message(request)?;
        self.socket
            .send(nlhdr)
            .map_err(|e| classify_ser_error("send GET_STATION", e))
    }

    fn recv(&mut self) -> Result<Option<Reply>> {
        let msg: Nlmsghdr<u16, Genlmsghdr<u8, u16>> = match self.socket.recv() {
            Ok(Some(msg)) => msg,
            // neli folds EAGAIN from SO_RCVTIMEO into Ok(None).
            Ok(None) => {
                debug!(target: T_NL80211, "nl80211 recv timed out");
                return Err(NetlinkError::receive(RECV_TIMEOUT_REASON));
            }
            Err(NlError::Nlmsgerr(err)) => return Ok(Some(Reply::from_error_code(err.error))),
            Err(e) => return Err(classify_recv_error(e)),
        };

        if msg.nl_type == NLMSG_DONE {
            return Ok(Some(Reply::Done));
        }

        if msg.nl_type == NLMSG_ERR {
            return Ok(Some(match msg.nl_payload {
                NlPayload::Err(err) => Reply::from_error_code(err.error),
                NlPayload::Ack(ack) => Reply::from_error_code(ack.error),
                _ => Reply::Ack,
            }));
        }

        match msg.nl_payload {
            NlPayload::Payload(genl) => {
                let sta_info = genl
                    .get_attr_handle()
                    .iter()
                    .find(|attr| attr.nla_type.nla_type == NL80211_ATTR_STA_INFO)
                    .map(|attr| attr.payload().as_ref().to_vec());
                Ok(Some(Reply::Station { sta_info }))
            }
            NlPayload::Err(err) => Ok(Some(Reply::from_error_code(err.error))),
            NlPayload::Ack(ack) => Ok(Some(Reply::from_error_code(ack.error))),
            _ => Ok(Some(Reply::Station { sta_info: None })),
        }
    }
}

type StationMessage = Nlmsghdr<u16, Genlmsghdr<u8, u16>>;

/// Build the GET_STATION frame: `NLM_F_DUMP` without a peer, a MAC filter
/// with one.
fn build_message(request: &StationRequest) -> Result<StationMessage> {
    let mut attrs = GenlBuffer::new();
    for attr in request.attributes() {
        let built = match attr {
            RequestAttr::IfIndex(ifindex) => {
                Nlattr::new(false, false, attr.nla_type(), ifindex).map_err(|e| {
                    NetlinkError::MessageBuildFailure {
                        reason: format!("Failed to set interface index: {}", e),
                    }
                })?
            }
            RequestAttr::Mac(mac) => {
                Nlattr::new(false, false, attr.nla_type(), &mac.octets()[..]).map_err(|e| {
                    NetlinkError::MessageBuildFailure {
                        reason: format!("Failed to set BSSID: {}", e),
                    }
                })?
            }
        };
        attrs.push(built);
    }

    let mut flags = vec![NlmF::Request];
    if request.is_dump() {
        flags.push(NlmF::Dump);
    }
    let genlhdr = Genlmsghdr::new(request.command(), NL80211_GENL_VERSION, attrs);
    Ok(Nlmsghdr::new(
        None,
        request.family_id,
        NlmFFlags::new(&flags),
        None,
        None,
        NlPayload::Payload(genlhdr),
    ))
}

fn classify_ser_error(operation: &str, err: SerError) -> NetlinkError {
    match err {
        SerError::Wrapped(WrappedError::IOError(io_err)) => {
            if io_err.kind() == io::ErrorKind::PermissionDenied {
                NetlinkError::io_error(operation, io_err)
            } else {
                NetlinkError::send(io_err.to_string())
            }
        }
        other => NetlinkError::send(other.to_string()),
    }
}

fn classify_recv_error<T, P>(err: NlError<T, P>) -> NetlinkError
where
    NlError<T, P>: std::fmt::Display,
{
    match err {
        NlError::Wrapped(WrappedError::IOError(io_err)) => match io_err.kind() {
            io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => {
                NetlinkError::receive(RECV_TIMEOUT_REASON)
            }
            io::ErrorKind::PermissionDenied => {
                NetlinkError::io_error("receive GET_STATION", io_err)
            }
            _ => NetlinkError::receive(io_err.to_string()),
        },
        NlError::Nlmsgerr(msg_err) => NetlinkError::from_kernel_code(msg_err.error),
        other => NetlinkError::receive(other.to_string()),
    }
}

fn set_recv_timeout(sock: &NlSocketHandle, timeout: Duration) {
    use std::os::unix::io::AsRawFd;

    let fd = sock.as_raw_fd();
    let tv = libc::timeval {
        tv_sec: timeout.as_secs() as libc::time_t,
        tv_usec: timeout.subsec_micros() as libc::suseconds_t,
    };
    let rc = unsafe {
        libc::setsockopt(
            fd,
            libc::SOL_SOCKET,
            libc::SO_RCVTIMEO,
            &tv as *const _ as *const libc::c_void,
            std::mem::size_of::<libc::timeval>() as libc::socklen_t,
        )
    };
    if rc != 0 {
        debug!(
            target: T_NL80211,
            "failed to set nl80211 recv timeout: {}",
            io::Error::last_os_error()
        );
    }
}
