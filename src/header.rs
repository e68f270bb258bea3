use std::io::Cursor;

use bitfield::bitfield;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use tracing::{instrument, warn};

use super::Networkable;
use crate::DnsError;

pub const HEADER_LEN: usize = 12;

bitfield! {
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    pub struct Flags(u16);
    impl Debug;
    u8;
    // query or response
    pub qr, set_qr: 15;
    // query type
    pub opcode, set_opcode: 14, 11;
    // authoritative answerer
    pub aa, set_aa: 10;
    // truncation
    pub tc, set_tc: 9;
    // recursion desired
    pub rd, set_rd: 8;
    // recursion available
    pub ra, set_ra: 7;
    // reserved
    pub z, set_z: 6, 4;
    // response code
    pub rcode, set_rcode: 3, 0;
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Header {
    pub id: u16,
    pub flags: Flags,
    pub num_questions: u16,
    pub num_answers: u16,
    pub num_authorities: u16,
    pub num_additionals: u16,
}

impl Header {
    pub fn new(id: u16, flags: Flags) -> Self {
        Self {
            id,
            flags,
            ..Default::default()
        }
    }
}

impl Networkable for Header {
    #[instrument(level = "trace", skip_all)]
    fn to_bytes(&self) -> Result<Bytes, DnsError> {
        let mut ret = BytesMut::with_capacity(HEADER_LEN);
        ret.put_u16(self.id);
        ret.put_u16(self.flags.0);
        ret.put_u16(self.num_questions);
        ret.put_u16(self.num_answers);
        ret.put_u16(self.num_authorities);
        ret.put_u16(self.num_additionals);

        Ok(ret.freeze())
    }

    #[instrument(level = "trace", skip_all)]
    fn from_bytes(bytes: &mut Cursor<&[u8]>) -> Result<Self, DnsError> {
        if bytes.remaining() < HEADER_LEN {
            warn!(remaining = bytes.remaining(), "insufficient remaining bytes");
            return Err(DnsError::FormatError("truncated header"));
        }

        let id = bytes.get_u16();
        let flags = Flags(bytes.get_u16());
        let qd_count = bytes.get_u16();
        let an_count = bytes.get_u16();
        let ns_count = bytes.get_u16();
        let ar_count = bytes.get_u16();

        Ok(Self {
            id,
            flags,
            num_questions: qd_count,
            num_answers: an_count,
            num_authorities: ns_count,
            num_additionals: ar_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn writes_fields_in_wire_order() {
        let mut header = Header::new(0x1314, Flags::default());
        header.num_questions = 1;
        header.num_additionals = 3;

        assert_eq!(
            header.to_bytes().unwrap().as_ref(),
            [0x13u8, 0x14, 0, 0, 0, 1, 0, 0, 0, 0, 0, 3]
        );
    }

    #[test]
    fn reads_flags() {
        let data = [0xab, 0xcd, 0x81, 0x83, 0, 1, 0, 0, 0, 1, 0, 0];
        let header = Header::from_bytes(&mut Cursor::new(&data[..])).unwrap();

        assert_eq!(header.id, 0xabcd);
        assert!(header.flags.qr());
        assert!(header.flags.rd());
        assert!(header.flags.ra());
        assert!(!header.flags.tc());
        assert_eq!(header.flags.rcode(), 3);
        assert_eq!(header.num_questions, 1);
        assert_eq!(header.num_authorities, 1);
    }

    #[test]
    fn rejects_short_header() {
        let data = [0u8; 11];
        let result = Header::from_bytes(&mut Cursor::new(&data[..]));
        assert!(matches!(result, Err(DnsError::FormatError(_))));
    }
}
