use std::io::Cursor;
use std::net::Ipv4Addr;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tracing::instrument;

use super::{Name, Networkable};
use crate::{DnsError, RecordType};

mod record_data;
pub use record_data::RecordData;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRecord {
    pub name: Name,
    pub type_: RecordType,
    pub class: u16,
    pub ttl: u32,
    pub data: RecordData,
}

impl ResourceRecord {
    pub fn new(name: Name, class: u16, ttl: u32, data: RecordData) -> Self {
        Self {
            name,
            type_: data.record_type(),
            class,
            ttl,
            data,
        }
    }

    pub fn ipv4(&self) -> Option<Ipv4Addr> {
        match self.data {
            RecordData::A(addr) => Some(addr),
            _ => None,
        }
    }

    pub fn ns_name(&self) -> Option<&Name> {
        match &self.data {
            RecordData::Ns(name) => Some(name),
            _ => None,
        }
    }
}

impl Networkable for ResourceRecord {
    #[instrument(level = "trace", skip_all)]
    fn to_bytes(&self) -> Result<Bytes, DnsError> {
        let mut ret = BytesMut::new();
        ret.extend_from_slice(&self.name.to_bytes()?);
        ret.put_u16(self.type_.to_int());
        ret.put_u16(self.class);
        ret.put_u32(self.ttl);
        let data = self.data.to_bytes()?;
        let rd_length = u16::try_from(data.len())
            .or(Err(DnsError::FormatError("record data exceeds 65535 bytes")))?;
        ret.put_u16(rd_length);
        ret.extend_from_slice(&data);

        Ok(ret.freeze())
    }

    #[instrument(level = "trace", skip_all)]
    fn from_bytes(bytes: &mut Cursor<&[u8]>) -> Result<Self, DnsError> {
        let name = Name::from_bytes(bytes)?;

        if bytes.remaining() < 10 {
            return Err(DnsError::FormatError("truncated resource record"));
        }

        let type_ = RecordType::from_int(bytes.get_u16());
        let class = bytes.get_u16();
        let ttl = bytes.get_u32();
        let data_length = bytes.get_u16();

        let data = RecordData::from_bytes(type_, data_length, bytes)?;

        Ok(Self {
            name,
            type_,
            class,
            ttl,
            data,
        })
    }
}

/// Renders the raw data of an A record as a dotted quad.
pub fn format_ipv4(data: &[u8]) -> Result<String, DnsError> {
    let octets: [u8; 4] = data
        .try_into()
        .or(Err(DnsError::FormatError("IPv4 address is not 4 bytes")))?;

    Ok(Ipv4Addr::from(octets).to_string())
}
