use std::io::Cursor;
use std::net::Ipv4Addr;

use bytes::{Buf, Bytes};
use tracing::trace;

use crate::{DnsError, Name, Networkable, RecordType};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordData {
    A(Ipv4Addr),
    Ns(Name),
    Opaque(Bytes),
}

impl RecordData {
    pub fn from_bytes(
        type_: RecordType,
        rd_length: u16,
        bytes: &mut Cursor<&[u8]>,
    ) -> Result<Self, DnsError> {
        match type_ {
            RecordType::A => {
                if rd_length != 4 || bytes.remaining() < 4 {
                    return Err(DnsError::FormatError("A record data is not 4 bytes"));
                }

                Ok(Self::A(Ipv4Addr::from(bytes.get_u32())))
            }

            // The declared length is not used to bound the name.
            RecordType::Ns => Ok(Self::Ns(Name::from_bytes(bytes)?)),

            other => {
                let rd_length = rd_length as usize;
                if bytes.remaining() < rd_length {
                    return Err(DnsError::FormatError("record data runs past the end of the message"));
                }

                trace!(?other, rd_length, "keeping record data opaque");
                Ok(Self::Opaque(bytes.copy_to_bytes(rd_length)))
            }
        }
    }

    pub fn to_bytes(&self) -> Result<Bytes, DnsError> {
        match self {
            Self::A(addr) => Ok(Bytes::copy_from_slice(&addr.octets())),
            Self::Ns(name) => name.to_bytes(),
            Self::Opaque(data) => Ok(data.clone()),
        }
    }

    /// The type implied by the data. Opaque data carries no type of its own.
    pub fn record_type(&self) -> RecordType {
        match self {
            Self::A(_) => RecordType::A,
            Self::Ns(_) => RecordType::Ns,
            Self::Opaque(_) => RecordType::Null,
        }
    }
}
