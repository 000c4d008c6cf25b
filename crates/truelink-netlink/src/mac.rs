use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use thiserror::Error;

/// 48-bit hardware address of a peer station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MacAddr(pub [u8; 6]);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid BSSID format: {input}")]
pub struct MacParseError {
    pub input: String,
}

impl MacAddr {
    pub fn octets(&self) -> [u8; 6] {
        self.0
    }

    /// Parse colon-separated hex ("aa:bb:cc:dd:ee:ff", case-insensitive).
    pub fn parse(text: &str) -> Result<Self, MacParseError> {
        let err = || MacParseError {
            input: text.to_string(),
        };
        let mut octets = [0u8; 6];
        let mut parts = text.split(':');
        for slot in octets.iter_mut() {
            let part = parts.next().ok_or_else(err)?;
            if part.is_empty() || part.len() > 2 || !part.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(err());
            }
            *slot = u8::from_str_radix(part, 16).map_err(|_| err())?;
        }
        if parts.next().is_some() {
            return Err(err());
        }
        Ok(Self(octets))
    }
}

impl FromStr for MacAddr {
    type Err = MacParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

impl Serialize for MacAddr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
