//! # Host Resolution
//!
//! Boundary nodes serve every canister under a handful of root domains.
//! A host anywhere below one of them (`foo.bar.ic0.app`) is routed to the
//! root itself so requests are not redirected through a canister's own
//! subdomain. Matching is on whole labels: `fooic0.app` is not `ic0.app`.

use crate::domain::{AgentError, Endpoint, Principal};

/// Root domains that subdomains collapse into.
pub const CANONICAL_ROOT_DOMAINS: &[&str] = &["ic0.app", "icp0.io", "icp-api.io"];

/// Canonical root domain for `hostname`, if it is one or sits under one.
///
/// Case-insensitive. Only a match at a label boundary counts.
pub fn canonical_root(hostname: &str) -> Option<&'static str> {
    let lower = hostname.to_ascii_lowercase();
    CANONICAL_ROOT_DOMAINS.iter().copied().find(|root| {
        lower == *root
            || lower
                .strip_suffix(*root)
                .is_some_and(|prefix| prefix.ends_with('.'))
    })
}

/// Hostname the transport should target for a user-supplied host string.
pub fn resolve_hostname(host: &str) -> Result<String, AgentError> {
    Ok(ResolvedHost::parse(host)?.hostname)
}

/// Parsed, canonicalised replica origin.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedHost {
    /// `http` or `https`.
    pub scheme: String,
    /// Hostname, collapsed to its canonical root when applicable.
    pub hostname: String,
    /// Explicit port.
    pub port: Option<u16>,
}

impl ResolvedHost {
    /// Parse `scheme://host[:port][/path]`. A missing scheme means `https`;
    /// path, query and fragment are dropped.
    pub fn parse(input: &str) -> Result<Self, AgentError> {
        let trimmed = input.trim();
        let (scheme, rest) = match trimmed.split_once("://") {
            Some((scheme, rest)) => (scheme.to_ascii_lowercase(), rest),
            None => ("https".to_string(), trimmed),
        };
        if scheme != "http" && scheme != "https" {
            return Err(AgentError::InvalidHost(format!(
                "unsupported scheme '{}' in '{}'",
                scheme, input
            )));
        }

        let authority = rest
            .split(|c: char| matches!(c, '/' | '?' | '#'))
            .next()
            .unwrap_or_default();
        let authority = authority
            .rsplit_once('@')
            .map_or(authority, |(_, host)| host);

        let (hostname, port) = split_port(authority, input)?;
        if hostname.is_empty() {
            return Err(AgentError::InvalidHost(format!("no hostname in '{}'", input)));
        }

        let hostname = match canonical_root(hostname) {
            Some(root) => root.to_string(),
            None => hostname.to_string(),
        };

        Ok(Self {
            scheme,
            hostname,
            port,
        })
    }

    /// `scheme://hostname[:port]`.
    pub fn origin(&self) -> String {
        let host = if self.hostname.contains(':') {
            format!("[{}]", self.hostname)
        } else {
            self.hostname.clone()
        };
        match self.port {
            Some(port) => format!("{}://{}:{}", self.scheme, host, port),
            None => format!("{}://{}", self.scheme, host),
        }
    }

    /// URL of a canister endpoint.
    pub fn endpoint_url(&self, canister_id: &Principal, endpoint: Endpoint) -> String {
        format!(
            "{}/api/v2/canister/{}/{}",
            self.origin(),
            canister_id.to_text(),
            endpoint.as_str()
        )
    }

    /// URL of the replica status endpoint.
    pub fn status_url(&self) -> String {
        format!("{}/api/v2/status", self.origin())
    }
}

fn split_port<'a>(authority: &'a str, input: &str) -> Result<(&'a str, Option<u16>), AgentError> {
    // Bracketed IPv6 literal
    if let Some(rest) = authority.strip_prefix('[') {
        let (address, after) = rest
            .split_once(']')
            .ok_or_else(|| AgentError::InvalidHost(format!("unterminated IPv6 literal in '{}'", input)))?;
        let port = match after.strip_prefix(':') {
            Some(port) => Some(parse_port(port, input)?),
            None => None,
        };
        return Ok((address, port));
    }

    match authority.rsplit_once(':') {
        Some((hostname, port)) => Ok((hostname, Some(parse_port(port, input)?))),
        None => Ok((authority, None)),
    }
}

fn parse_port(port: &str, input: &str) -> Result<u16, AgentError> {
    port.parse()
        .map_err(|_| AgentError::InvalidHost(format!("invalid port '{}' in '{}'", port, input)))
}
