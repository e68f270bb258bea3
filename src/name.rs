use std::fmt::Display;
use std::hash::{Hash, Hasher};
use std::io::Cursor;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tracing::warn;

use super::Networkable;
use crate::DnsError;

pub const MAX_LABEL_LEN: usize = 63;
/// Wire length limit, counting length bytes and the terminator.
pub const MAX_NAME_LEN: usize = 255;
const MAX_POINTER_JUMPS: usize = 16;

const POINTER_TAG: u8 = 0b1100_0000;

/// A domain name in dotted form, without the trailing dot.
///
/// The root name is the empty string. Comparison ignores ASCII case.
#[derive(Debug, Clone)]
pub struct Name {
    name: String,
}

impl Name {
    pub fn new(name: &str) -> Result<Self, DnsError> {
        let trimmed = name.strip_suffix('.').unwrap_or(name);
        if trimmed.is_empty() {
            return Ok(Self::root());
        }

        let mut wire_len = 1;
        for label in trimmed.split('.') {
            if label.is_empty() || label.len() > MAX_LABEL_LEN {
                return Err(DnsError::InvalidName(name.to_owned()));
            }
            wire_len += label.len() + 1;
        }

        if wire_len > MAX_NAME_LEN {
            return Err(DnsError::InvalidName(name.to_owned()));
        }

        Ok(Self {
            name: trimmed.to_owned(),
        })
    }

    pub fn root() -> Self {
        Self {
            name: String::new(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.name.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.name.split('.').filter(|label| !label.is_empty())
    }
}

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        self.name.eq_ignore_ascii_case(&other.name)
    }
}

impl Eq for Name {}

impl Hash for Name {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for byte in self.name.bytes() {
            state.write_u8(byte.to_ascii_lowercase());
        }
        state.write_u8(0);
    }
}

impl Display for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_root() {
            f.write_str(".")
        } else {
            f.write_str(&self.name)
        }
    }
}

impl Networkable for Name {
    fn to_bytes(&self) -> Result<Bytes, DnsError> {
        let mut ret = BytesMut::with_capacity(self.name.len() + 2);

        for label in self.labels() {
            ret.put_u8(label.len() as u8);
            ret.extend_from_slice(label.as_bytes());
        }

        ret.put_u8(0);

        Ok(ret.freeze())
    }

    /// Reads a possibly compressed name. The cursor must span the whole
    /// message, since pointer offsets count from its first byte.
    fn from_bytes(bytes: &mut Cursor<&[u8]>) -> Result<Self, DnsError> {
        let mut parts: Vec<String> = Vec::new();
        let mut wire_len = 1;
        let mut jumps = 0;
        // Where to continue once the name is complete, set on the first jump.
        let mut resume = None;

        loop {
            if !bytes.has_remaining() {
                return Err(DnsError::FormatError("name runs past the end of the message"));
            }

            let start = bytes.position();
            let len = bytes.get_u8();

            match len & POINTER_TAG {
                0 if len == 0 => break,
                0 => {
                    let len = len as usize;
                    if bytes.remaining() < len {
                        return Err(DnsError::FormatError("label runs past the end of the message"));
                    }

                    wire_len += len + 1;
                    if wire_len > MAX_NAME_LEN {
                        return Err(DnsError::FormatError("name exceeds 255 bytes"));
                    }

                    let chars = bytes.copy_to_bytes(len);
                    // A dot inside a label cannot survive the dotted form.
                    if chars.contains(&b'.') {
                        return Err(DnsError::FormatError("label contains a dot"));
                    }
                    let label = std::str::from_utf8(&chars)
                        .or(Err(DnsError::FormatError("label is not valid UTF-8")))?;
                    parts.push(label.to_owned());
                }
                POINTER_TAG => {
                    if !bytes.has_remaining() {
                        return Err(DnsError::FormatError("truncated compression pointer"));
                    }

                    let pointer = (u16::from(len & !POINTER_TAG) << 8) | u16::from(bytes.get_u8());
                    if u64::from(pointer) >= start {
                        warn!(pointer, at = start, "compression pointer does not point backwards");
                        return Err(DnsError::FormatError("compression pointer does not point backwards"));
                    }

                    jumps += 1;
                    if jumps > MAX_POINTER_JUMPS {
                        return Err(DnsError::FormatError("too many compression pointers"));
                    }

                    if resume.is_none() {
                        resume = Some(bytes.position());
                    }
                    bytes.set_position(u64::from(pointer));
                }
                _ => return Err(DnsError::FormatError("reserved label type")),
            }
        }

        if let Some(position) = resume {
            bytes.set_position(position);
        }

        Ok(Self {
            name: parts.join("."),
        })
    }
}
