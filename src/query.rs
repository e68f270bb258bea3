use bytes::Bytes;
use tracing::instrument;

use crate::{DnsError, Flags, Header, Message, Name, Networkable, Question, RecordType};

/// Builds a single-question query with every flag cleared, so the server
/// answers or refers instead of recursing on our behalf.
///
/// Returns the transaction id along with the wire bytes.
#[instrument(level = "debug")]
pub fn build_query(name: &str, type_: RecordType) -> Result<(u16, Bytes), DnsError> {
    encode_query(Question::new(Name::new(name)?, type_))
}

pub(crate) fn encode_query(question: Question) -> Result<(u16, Bytes), DnsError> {
    let id = rand::random::<u16>();
    let mut query = Message::new(Header::new(id, Flags::default()));
    query.add_question(question);

    Ok((id, query.to_bytes()?))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::CLASS_IN;

    #[test]
    fn builds_non_recursive_query() {
        let (id, bytes) = build_query("google.com", RecordType::A).unwrap();

        assert_eq!(&bytes[0..2], &id.to_be_bytes());
        assert_eq!(&bytes[2..12], &[0u8, 0, 0, 1, 0, 0, 0, 0, 0, 0]);
        assert_eq!(&bytes[12..], b"\x06google\x03com\x00\x00\x01\x00\x01");

        let message = Message::from_bytes(&mut Cursor::new(&bytes[..])).unwrap();
        assert!(!message.header.flags.rd());
        assert_eq!(message.questions[0].class, CLASS_IN);
    }

    #[test]
    fn rejects_bad_names() {
        assert!(matches!(
            build_query("bad..name", RecordType::A),
            Err(DnsError::InvalidName(_))
        ));
    }
}
