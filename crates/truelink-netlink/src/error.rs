use thiserror::Error;

// errno values, kept local so this module builds without libc
const EPERM: i32 = 1;
const EACCES: i32 = 13;

/// Failure kinds surfaced by a station-info query.
///
/// The `Display` text of each variant is what callers see as the
/// client's last error string, so messages stay short and actionable.
#[derive(Error, Debug)]
pub enum NetlinkError {
    #[error("{}", describe_missing_interface(.name))]
    InterfaceNotFound { name: String },

    #[error("Failed to initialize nl80211: {reason}")]
    InitializationFailure { reason: String },

    #[error("Failed to build netlink message: {reason}")]
    MessageBuildFailure { reason: String },

    #[error("Failed to send netlink message: {reason}")]
    TransportSendFailure { reason: String },

    #[error("Failed to receive netlink response: {reason}")]
    TransportReceiveFailure { reason: String },

    #[error("Permission denied during {operation} - may need CAP_NET_ADMIN")]
    PermissionDenied { operation: String },

    #[error("Kernel error: {code} ({})", describe_errno(.code))]
    KernelError { code: i32 },

    #[error("Incomplete station info (failed to parse rate fields)")]
    PartialParse,

    #[error("IO error during {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, NetlinkError>;

impl NetlinkError {
    /// Create an IO error with context
    pub fn io_error(operation: impl Into<String>, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::PermissionDenied {
            return Self::PermissionDenied {
                operation: operation.into(),
            };
        }
        Self::Io {
            operation: operation.into(),
            source,
        }
    }

    /// Map a negative errno carried in an NLMSG_ERROR frame.
    pub fn from_kernel_code(code: i32) -> Self {
        let errno = code.abs();
        if errno == EPERM || errno == EACCES {
            return Self::PermissionDenied {
                operation: "nl80211 GET_STATION".to_string(),
            };
        }
        Self::KernelError { code }
    }

    pub fn send(reason: impl Into<String>) -> Self {
        Self::TransportSendFailure {
            reason: reason.into(),
        }
    }

    pub fn receive(reason: impl Into<String>) -> Self {
        Self::TransportReceiveFailure {
            reason: reason.into(),
        }
    }

    pub fn init(reason: impl Into<String>) -> Self {
        Self::InitializationFailure {
            reason: reason.into(),
        }
    }

    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::PermissionDenied { .. })
    }
}

fn describe_missing_interface(name: &str) -> String {
    if name.is_empty() {
        "No interface name provided".to_string()
    } else {
        format!("Interface not found: {name}")
    }
}

fn describe_errno(code: &i32) -> String {
    std::io::Error::from_raw_os_error(code.abs()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_interface_messages() {
        let empty = NetlinkError::InterfaceNotFound {
            name: String::new(),
        };
        assert_eq!(empty.to_string(), "No interface name provided");

        let named = NetlinkError::InterfaceNotFound {
            name: "wlan9".to_string(),
        };
        assert_eq!(named.to_string(), "Interface not found: wlan9");
    }

    #[test]
    fn test_kernel_code_classification() {
        assert!(NetlinkError::from_kernel_code(-1).is_permission_denied());
        assert!(NetlinkError::from_kernel_code(-13).is_permission_denied());
        match NetlinkError::from_kernel_code(-95) {
            NetlinkError::KernelError { code } => assert_eq!(code, -95),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_kernel_error_mentions_code() {
        let err = NetlinkError::KernelError { code: -19 };
        assert!(err.to_string().starts_with("Kernel error: -19"));
    }

    #[test]
    fn test_io_error_permission_maps_to_denied() {
        let io = std::io::Error::from(std::io::ErrorKind::PermissionDenied);
        let err = NetlinkError::io_error("open socket", io);
        assert!(err.is_permission_denied());
        assert!(err.to_string().contains("CAP_NET_ADMIN"));
    }

    #[test]
    fn test_partial_parse_message() {
        assert_eq!(
            NetlinkError::PartialParse.to_string(),
            "Incomplete station info (failed to parse rate fields)"
        );
    }
}
