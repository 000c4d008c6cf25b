//! Netlink attribute (TLV) walking for nested nl80211 payloads.
//!
//! neli hands us the top-level attributes already split, but the
//! station-info and rate-info blocks arrive as opaque nested payloads.
//! The walk here is strict: a truncated or overlong attribute is an
//! error rather than a silent stop, so callers can tell a malformed
//! block apart from a sparse one.

use thiserror::Error;

pub const NLA_HDRLEN: usize = 4;
pub const NLA_TYPE_MASK: u16 = 0x3fff;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttrError {
    #[error("attribute at offset {offset} declares length {len} (minimum 4)")]
    ShortHeader { offset: usize, len: usize },

    #[error("attribute at offset {offset} overruns payload ({len} > {remaining} bytes)")]
    Overrun {
        offset: usize,
        len: usize,
        remaining: usize,
    },

    #[error("{remaining} trailing bytes at offset {offset} do not form an attribute header")]
    Trailing { offset: usize, remaining: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NlAttrSlice<'a> {
    pub nla_type: u16,
    pub payload: &'a [u8],
}

/// Split a nested attribute payload into its children.
///
/// An empty payload yields an empty list.
pub fn parse_nested(payload: &[u8]) -> Result<Vec<NlAttrSlice<'_>>, AttrError> {
    let mut attrs = Vec::new();
    let mut offset = 0;
    while offset < payload.len() {
        let remaining = payload.len() - offset;
        if remaining < NLA_HDRLEN {
            return Err(AttrError::Trailing { offset, remaining });
        }
        let header = &payload[offset..offset + NLA_HDRLEN];
        let len = u16::from_ne_bytes([header[0], header[1]]) as usize;
        let nla_type = u16::from_ne_bytes([header[2], header[3]]) & NLA_TYPE_MASK;
        if len < NLA_HDRLEN {
            return Err(AttrError::ShortHeader { offset, len });
        }
        if len > remaining {
            return Err(AttrError::Overrun {
                offset,
                len,
                remaining,
            });
        }
        attrs.push(NlAttrSlice {
            nla_type,
            payload: &payload[offset + NLA_HDRLEN..offset + len],
        });
        // The final attribute may omit its alignment padding.
        offset = (offset + align(len)).min(payload.len());
    }
    Ok(attrs)
}

const fn align(len: usize) -> usize {
    (len + 3) & !3
}

/// Attributes of one nested block, looked up by type.
///
/// When the kernel repeats a type the first occurrence wins. Typed getters
/// return `None` both for absent attributes and for payloads too short to
/// hold the requested width.
#[derive(Debug, Clone, Default)]
pub struct AttrTable<'a> {
    attrs: Vec<NlAttrSlice<'a>>,
}

impl<'a> AttrTable<'a> {
    pub fn parse(payload: &'a [u8]) -> Result<Self, AttrError> {
        Ok(Self {
            attrs: parse_nested(payload)?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    pub fn bytes(&self, nla_type: u16) -> Option<&'a [u8]> {
        self.attrs
            .iter()
            .find(|attr| attr.nla_type == nla_type)
            .map(|attr| attr.payload)
    }

    pub fn flag(&self, nla_type: u16) -> bool {
        self.bytes(nla_type).is_some()
    }

    pub fn u8(&self, nla_type: u16) -> Option<u8> {
        self.bytes(nla_type).and_then(|b| b.first().copied())
    }

    pub fn i8(&self, nla_type: u16) -> Option<i8> {
        self.u8(nla_type).map(|v| v as i8)
    }

    pub fn u16(&self, nla_type: u16) -> Option<u16> {
        self.array::<2>(nla_type).map(u16::from_ne_bytes)
    }

    pub fn u32(&self, nla_type: u16) -> Option<u32> {
        self.array::<4>(nla_type).map(u32::from_ne_bytes)
    }

    pub fn u64(&self, nla_type: u16) -> Option<u64> {
        self.array::<8>(nla_type).map(u64::from_ne_bytes)
    }

    fn array<const N: usize>(&self, nla_type: u16) -> Option<[u8; N]> {
        self.bytes(nla_type)
            .and_then(|b| b.get(..N))
            .and_then(|b| b.try_into().ok())
    }
}

/// Append one attribute (header, payload, padding) to `buf`.
///
/// Used to build nested payloads for tests and for fixture replay.
pub fn push_attr(buf: &mut Vec<u8>, nla_type: u16, payload: &[u8]) {
    let len = NLA_HDRLEN + payload.len();
    buf.extend_from_slice(&(len as u16).to_ne_bytes());
    buf.extend_from_slice(&nla_type.to_ne_bytes());
    buf.extend_from_slice(payload);
    buf.resize(buf.len() + (align(len) - len), 0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_payload() {
        assert!(parse_nested(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_parse_aligned_children() {
        let mut buf = Vec::new();
        push_attr(&mut buf, 1, &[7]);
        push_attr(&mut buf, 5, &42u32.to_ne_bytes());
        let attrs = parse_nested(&buf).unwrap();
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs[0].nla_type, 1);
        assert_eq!(attrs[0].payload, &[7]);
        assert_eq!(attrs[1].nla_type, 5);
    }

    #[test]
    fn test_type_flags_masked() {
        let mut buf = Vec::new();
        push_attr(&mut buf, 0x8000 | 8, &[]);
        let attrs = parse_nested(&buf).unwrap();
        assert_eq!(attrs[0].nla_type, 8);
    }

    #[test]
    fn test_short_header_rejected() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&2u16.to_ne_bytes());
        buf.extend_from_slice(&1u16.to_ne_bytes());
        assert_eq!(
            parse_nested(&buf),
            Err(AttrError::ShortHeader { offset: 0, len: 2 })
        );
    }

    #[test]
    fn test_overrun_rejected() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&12u16.to_ne_bytes());
        buf.extend_from_slice(&1u16.to_ne_bytes());
        buf.extend_from_slice(&[0, 0]);
        assert!(matches!(parse_nested(&buf), Err(AttrError::Overrun { .. })));
    }

    #[test]
    fn test_trailing_garbage_rejected() {
        let mut buf = Vec::new();
        push_attr(&mut buf, 1, &[1, 2, 3, 4]);
        buf.extend_from_slice(&[0xff, 0xff]);
        assert!(matches!(
            parse_nested(&buf),
            Err(AttrError::Trailing { offset: 8, .. })
        ));
    }

    #[test]
    fn test_unpadded_final_attribute_accepted() {
        let mut buf = Vec::new();
        push_attr(&mut buf, 2, &[9]);
        buf.truncate(5);
        let attrs = parse_nested(&buf).unwrap();
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs[0].payload, &[9]);
    }

    #[test]
    fn test_table_getters() {
        let mut buf = Vec::new();
        push_attr(&mut buf, 1, &[0xc4]);
        push_attr(&mut buf, 2, &600u16.to_ne_bytes());
        push_attr(&mut buf, 3, &[]);
        push_attr(&mut buf, 4, &[1, 2]);
        let table = AttrTable::parse(&buf).unwrap();
        assert_eq!(table.i8(1), Some(-60));
        assert_eq!(table.u16(2), Some(600));
        assert!(table.flag(3));
        assert!(!table.flag(9));
        // too short for a u32
        assert_eq!(table.u32(4), None);
    }
}
