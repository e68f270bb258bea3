use std::io::Cursor;

use bytes::Bytes;

mod error;
pub use error::{DnsError, UnresolvableReason};

mod header;
pub use header::{Flags, Header};

mod name;
pub use name::Name;

mod message;
pub use message::Message;

mod question;
pub use question::Question;

mod resource_record;
pub use resource_record::{format_ipv4, RecordData, ResourceRecord};

mod record_type;
pub use record_type::{RecordType, CLASS_IN};

mod query;
pub use query::build_query;

pub mod resolver;

pub trait Networkable: Sized {
    fn to_bytes(&self) -> Result<Bytes, DnsError>;

    fn from_bytes(bytes: &mut Cursor<&[u8]>) -> Result<Self, DnsError>;
}
