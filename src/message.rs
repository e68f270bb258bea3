use std::io::Cursor;

use bytes::{Bytes, BytesMut};
use tracing::{instrument, trace};

use super::{Header, Networkable, Question, ResourceRecord};
use crate::DnsError;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Message {
    pub header: Header,
    pub questions: Vec<Question>,
    pub answers: Vec<ResourceRecord>,
    pub authorities: Vec<ResourceRecord>,
    pub additionals: Vec<ResourceRecord>,
}

impl Message {
    pub fn new(header: Header) -> Self {
        Self {
            header,
            ..Default::default()
        }
    }

    pub fn add_question(&mut self, question: Question) {
        self.header.num_questions += 1;
        self.questions.push(question)
    }

    pub fn add_answer(&mut self, answer: ResourceRecord) {
        self.header.num_answers += 1;
        self.answers.push(answer)
    }

    pub fn add_authority(&mut self, authority: ResourceRecord) {
        self.header.num_authorities += 1;
        self.authorities.push(authority)
    }

    pub fn add_additional(&mut self, additional: ResourceRecord) {
        self.header.num_additionals += 1;
        self.additionals.push(additional)
    }
}

fn section_count(len: usize) -> Result<u16, DnsError> {
    u16::try_from(len).or(Err(DnsError::FormatError("section has more than 65535 entries")))
}

fn read_records(
    count: u16,
    bytes: &mut Cursor<&[u8]>,
) -> Result<Vec<ResourceRecord>, DnsError> {
    (0..count)
        .map(|_| ResourceRecord::from_bytes(bytes))
        .collect()
}

impl Networkable for Message {
    #[instrument(level = "debug", skip_all)]
    fn to_bytes(&self) -> Result<Bytes, DnsError> {
        // Counts always follow the sections actually written.
        let header = Header {
            num_questions: section_count(self.questions.len())?,
            num_answers: section_count(self.answers.len())?,
            num_authorities: section_count(self.authorities.len())?,
            num_additionals: section_count(self.additionals.len())?,
            ..self.header.clone()
        };

        let mut ret = BytesMut::new();
        ret.extend_from_slice(&header.to_bytes()?);

        for question in self.questions.iter() {
            ret.extend_from_slice(&question.to_bytes()?)
        }

        for record in self
            .answers
            .iter()
            .chain(&self.authorities)
            .chain(&self.additionals)
        {
            ret.extend_from_slice(&record.to_bytes()?)
        }

        Ok(ret.freeze())
    }

    #[instrument(level = "debug", skip_all)]
    fn from_bytes(bytes: &mut Cursor<&[u8]>) -> Result<Self, DnsError> {
        let header = Header::from_bytes(bytes)?;

        trace!(
            questions = header.num_questions,
            answers = header.num_answers,
            authorities = header.num_authorities,
            additionals = header.num_additionals,
            "parsing message"
        );

        let questions = (0..header.num_questions)
            .map(|_| Question::from_bytes(bytes))
            .collect::<Result<Vec<_>, _>>()?;
        let answers = read_records(header.num_answers, bytes)?;
        let authorities = read_records(header.num_authorities, bytes)?;
        let additionals = read_records(header.num_additionals, bytes)?;

        Ok(Self {
            header,
            questions,
            answers,
            authorities,
            additionals,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::net::Ipv4Addr;

    use super::*;
    use crate::{Flags, Name, RecordData, RecordType, CLASS_IN};

    fn parse(data: &[u8]) -> Result<Message, DnsError> {
        Message::from_bytes(&mut Cursor::new(data))
    }

    #[test]
    fn round_trips_question_and_answer() {
        let name = Name::new("dns.google").unwrap();
        let question = Question::new(name.clone(), RecordType::A);
        let answer = ResourceRecord::new(
            name,
            CLASS_IN,
            900,
            RecordData::A(Ipv4Addr::new(8, 8, 8, 8)),
        );

        let mut message = Message::new(Header::new(0xbeef, Flags::default()));
        message.add_question(question.clone());
        message.add_answer(answer.clone());

        let parsed = parse(&message.to_bytes().unwrap()).unwrap();

        assert_eq!(parsed.header.num_questions, 1);
        assert_eq!(parsed.header.num_answers, 1);
        assert_eq!(parsed.header.num_authorities, 0);
        assert_eq!(parsed.header.num_additionals, 0);
        assert_eq!(parsed.questions, vec![question]);
        assert_eq!(parsed.answers, vec![answer]);
        assert_eq!(parsed, message);
    }

    #[test]
    fn reads_compressed_referral() {
        // Header: id 1, response, 1 question, 0 answers, 1 authority, 1 additional
        let mut data = vec![0, 1, 0x80, 0, 0, 1, 0, 0, 0, 1, 0, 1];
        // Question at offset 12: example.com A IN
        data.extend_from_slice(b"\x07example\x03com\x00\x00\x01\x00\x01");
        // Authority: com NS a.gtld-servers.net
        data.extend_from_slice(b"\xc0\x14\x00\x02\x00\x01\x00\x00\x00\x3c\x00\x14");
        data.extend_from_slice(b"\x01a\x0cgtld-servers\x03net\x00");
        // Additional: a.gtld-servers.net A 192.5.6.30, owner is a pointer to the NS data
        data.extend_from_slice(b"\xc0\x29\x00\x01\x00\x01\x00\x00\x00\x3c\x00\x04\xc0\x05\x06\x1e");

        let message = parse(&data).unwrap();

        assert_eq!(message.questions[0].name.as_str(), "example.com");
        assert_eq!(message.authorities[0].name.as_str(), "com");
        assert_eq!(
            message.authorities[0].ns_name().unwrap().as_str(),
            "a.gtld-servers.net"
        );
        assert_eq!(message.additionals[0].name.as_str(), "a.gtld-servers.net");
        assert_eq!(
            message.additionals[0].ipv4(),
            Some(Ipv4Addr::new(192, 5, 6, 30))
        );
    }

    #[test]
    fn rejects_counts_beyond_data() {
        let mut message = Message::new(Header::new(7, Flags::default()));
        message.add_question(Question::new(Name::new("example.com").unwrap(), RecordType::A));

        let mut data = message.to_bytes().unwrap().to_vec();
        // claim an answer that is not there
        data[7] = 1;

        assert!(matches!(parse(&data), Err(DnsError::FormatError(_))));
    }

    #[test]
    fn writes_counts_from_sections() {
        let mut header = Header::new(7, Flags::default());
        header.num_answers = 5;

        let data = Message::new(header).to_bytes().unwrap();
        assert_eq!(data.len(), 12);
        assert_eq!(&data[4..], &[0u8; 8]);
    }

    #[test]
    fn rejects_oversized_sections() {
        let record = ResourceRecord::new(
            Name::root(),
            CLASS_IN,
            0,
            RecordData::A(Ipv4Addr::LOCALHOST),
        );

        let message = Message {
            additionals: vec![record; 65536],
            ..Default::default()
        };

        assert!(matches!(message.to_bytes(), Err(DnsError::FormatError(_))));
    }
}
