//! Iterative resolution: start at a root server and follow referrals until a
//! server answers the question itself.

use std::io::Cursor;
use std::net::Ipv4Addr;

use tracing::{debug, info, instrument, warn};

use crate::query::encode_query;
use crate::{
    DnsError, Message, Name, Networkable, Question, RecordType, ResourceRecord,
    UnresolvableReason,
};

mod config;
pub use config::{ResolverConfig, DEFAULT_ROOT_SERVER, DNS_PORT};

mod transport;
pub use transport::{Transport, UdpTransport};

const RCODE_NAME_ERROR: u8 = 3;

/// What a single response lets the walk do next.
#[derive(Debug)]
enum Step {
    Answered(ResourceRecord),
    /// A nameserver for a closer zone, with its address supplied as glue.
    Referral(Ipv4Addr),
    /// A nameserver for a closer zone, known only by name.
    UnresolvedReferral(Name),
    Stuck { rcode: u8 },
}

impl Step {
    fn from_response(mut response: Message, question: &Question) -> Self {
        if let Some(idx) = response
            .answers
            .iter()
            .position(|r| r.type_ == question.type_ && r.class == question.class)
        {
            return Self::Answered(response.answers.swap_remove(idx));
        }

        let mut nameservers = response.authorities.iter().filter_map(|r| r.ns_name());

        let glue = response.additionals.iter().find_map(|r| {
            let addr = r.ipv4()?;
            nameservers
                .clone()
                .any(|ns| ns == &r.name)
                .then_some(addr)
        });
        if let Some(addr) = glue {
            return Self::Referral(addr);
        }

        match nameservers.next() {
            Some(ns) => Self::UnresolvedReferral(ns.clone()),
            None => Self::Stuck {
                rcode: response.header.flags.rcode(),
            },
        }
    }
}

#[derive(Debug)]
pub struct Resolver<T> {
    transport: T,
    config: ResolverConfig,
}

impl Resolver<UdpTransport> {
    pub fn with_config(config: ResolverConfig) -> Self {
        Self::new(UdpTransport::from_config(&config), config)
    }
}

impl Default for Resolver<UdpTransport> {
    fn default() -> Self {
        Self::with_config(ResolverConfig::default())
    }
}

impl<T: Transport> Resolver<T> {
    pub fn new(transport: T, config: ResolverConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Walks the delegation tree from the root and returns the first answer
    /// record matching `type_`.
    pub fn resolve(&self, name: &str, type_: RecordType) -> Result<ResourceRecord, DnsError> {
        let question = Question::new(Name::new(name)?, type_);
        let mut budget = self.config.max_referrals;
        self.walk(&question, 0, &mut budget)
    }

    pub fn resolve_ipv4(&self, name: &str) -> Result<Ipv4Addr, DnsError> {
        let record = self.resolve(name, RecordType::A)?;
        record
            .ipv4()
            .ok_or_else(|| DnsError::unresolvable(name, UnresolvableReason::NoAddress))
    }

    /// `budget` is the number of round-trips left for the whole resolution,
    /// shared with every nested nameserver lookup.
    #[instrument(level = "debug", skip(self, question, budget), fields(name = %question.name))]
    fn walk(
        &self,
        question: &Question,
        depth: usize,
        budget: &mut usize,
    ) -> Result<ResourceRecord, DnsError> {
        if depth > self.config.max_depth {
            return Err(DnsError::unresolvable(
                &question.name,
                UnresolvableReason::TooDeep,
            ));
        }

        let mut server = self.config.root_server;

        loop {
            if *budget == 0 {
                return Err(DnsError::unresolvable(
                    &question.name,
                    UnresolvableReason::TooManyReferrals,
                ));
            }
            *budget -= 1;

            info!("querying {server} for {}", question.name);
            let response = self.query(server, question)?;

            match Step::from_response(response, question) {
                Step::Answered(record) => return Ok(record),
                Step::Referral(next) => {
                    debug!(%next, "following glue");
                    server = next;
                }
                Step::UnresolvedReferral(ns) => {
                    debug!(%ns, "looking up nameserver without glue");
                    let lookup = Question::new(ns.clone(), RecordType::A);
                    let record = self.walk(&lookup, depth + 1, budget)?;
                    server = record
                        .ipv4()
                        .ok_or_else(|| DnsError::unresolvable(&ns, UnresolvableReason::NoAddress))?;
                }
                Step::Stuck { rcode } => {
                    let reason = match rcode {
                        0 => UnresolvableReason::NoReferral,
                        RCODE_NAME_ERROR => UnresolvableReason::NameError,
                        other => UnresolvableReason::ServerFailure(other),
                    };
                    return Err(DnsError::unresolvable(&question.name, reason));
                }
            }
        }
    }

    /// One round-trip, retried against the same server on retryable errors.
    fn query(&self, server: Ipv4Addr, question: &Question) -> Result<Message, DnsError> {
        let mut attempt = 0;
        loop {
            match self.exchange(server, question) {
                Ok(response) => return Ok(response),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    attempt += 1;
                    warn!(%server, attempt, error = %e, "retrying query");
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn exchange(&self, server: Ipv4Addr, question: &Question) -> Result<Message, DnsError> {
        let (id, query) = encode_query(question.clone())?;
        let response = self
            .transport
            .exchange(self.config.server_addr(server), &query)?;

        let message = Message::from_bytes(&mut Cursor::new(&response[..]))?;

        if message.header.id != id {
            warn!(expected = id, got = message.header.id, "mismatched response id");
            return Err(DnsError::FormatError("response id does not match the query"));
        }
        if !message.header.flags.qr() {
            return Err(DnsError::FormatError("message is not a response"));
        }
        if message.header.flags.tc() {
            warn!(%server, "response was truncated, using it as-is");
        }

        Ok(message)
    }
}
