use std::net::SocketAddr;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DnsError {
    #[error("transport failure talking to {server}: {source}")]
    TransportError {
        server: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("timed out waiting for a response from {0}")]
    Timeout(SocketAddr),

    #[error("malformed message: {0}")]
    FormatError(&'static str),

    #[error("invalid domain name: {0:?}")]
    InvalidName(String),

    #[error("cannot resolve {name}: {reason}")]
    Unresolvable {
        name: String,
        reason: UnresolvableReason,
    },
}

impl DnsError {
    /// Whether asking the same server again could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::TransportError { .. } | Self::Timeout(_) | Self::FormatError(_)
        )
    }

    pub(crate) fn unresolvable(name: impl ToString, reason: UnresolvableReason) -> Self {
        Self::Unresolvable {
            name: name.to_string(),
            reason,
        }
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnresolvableReason {
    #[error("no answer and no referral data in the response")]
    NoReferral,

    #[error("the name does not exist (NXDOMAIN)")]
    NameError,

    #[error("server answered with response code {0}")]
    ServerFailure(u8),

    #[error("nameserver lookup did not yield an IPv4 address")]
    NoAddress,

    #[error("too many referrals")]
    TooManyReferrals,

    #[error("nameserver lookups nested too deeply")]
    TooDeep,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_retryable_errors() {
        let server: SocketAddr = "198.41.0.4:53".parse().unwrap();

        assert!(DnsError::Timeout(server).is_retryable());
        assert!(DnsError::FormatError("truncated header").is_retryable());
        assert!(!DnsError::unresolvable("example.com", UnresolvableReason::NoReferral).is_retryable());
        assert!(!DnsError::InvalidName("a..b".into()).is_retryable());
    }

    #[test]
    fn reports_reason() {
        let err = DnsError::unresolvable("nope.example", UnresolvableReason::NameError);
        assert_eq!(
            err.to_string(),
            "cannot resolve nope.example: the name does not exist (NXDOMAIN)"
        );
    }
}
