// cybertip-ingest/src/source/http_poll.rs
// ============================================================================
// Module: HTTP Poll Source
// Description: Polls a partner HTTP endpoint for newly submitted tips.
// Purpose: Implement `ReporterSource` for `PartnerPortal` and `PartnerApi`.
// Dependencies: cybertip-core, reqwest, url
// ============================================================================

//! ## Overview
//! [`HttpPollSource`] generalizes the host-allowlist and private-network
//! defenses of a plain payload-fetching HTTP client into a polling adapter:
//! each [`ReporterSource::poll`] call issues one GET against a configured
//! endpoint, expecting a JSON array of pending submissions, and maps each
//! entry into a [`RawTipInput`] tagged with the adapter's configured
//! channel. One type serves both `PartnerPortal` and `PartnerApi`, since the
//! only difference between them is which endpoint and channel label the
//! operator configures.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::IpAddr;
use std::net::ToSocketAddrs;
use std::time::Duration;

use cybertip_core::core::time::Timestamp;
use cybertip_core::core::tip::SourceChannel;
use cybertip_core::interfaces::RawContentType;
use cybertip_core::interfaces::RawTipInput;
use cybertip_core::interfaces::ReporterSource;
use cybertip_core::interfaces::SourceError;
use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use serde::Deserialize;
use serde_json::Value;
use url::Host;
use url::Url;

// ============================================================================
// SECTION: Host Policy
// ============================================================================

/// Host allow/deny pattern, mirroring a simple allowlist-of-partners model.
#[derive(Debug, Clone)]
enum HostPattern {
    /// Exact host match.
    Exact(String),
    /// Wildcard suffix match, for example `*.partner.example`.
    WildcardSuffix(String),
}

impl HostPattern {
    /// Parses a host pattern string into a normalized matcher.
    fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        let normalized = trimmed.trim_end_matches('.').to_ascii_lowercase();
        if let Some(suffix) = normalized.strip_prefix("*.") {
            if suffix.is_empty() {
                return None;
            }
            return Some(Self::WildcardSuffix(suffix.to_string()));
        }
        Some(Self::Exact(normalized))
    }

    /// Returns true when the pattern matches the provided host.
    fn matches(&self, host: &str) -> bool {
        match self {
            Self::Exact(value) => host == value,
            Self::WildcardSuffix(suffix) => {
                if host.len() <= suffix.len() || !host.ends_with(suffix.as_str()) {
                    return false;
                }
                let boundary = host.len() - suffix.len() - 1;
                host.as_bytes().get(boundary) == Some(&b'.')
            }
        }
    }
}

/// Host allowlist enforced before polling a partner endpoint.
#[derive(Debug, Clone, Default)]
pub struct HttpPollPolicy {
    /// Allowed hosts; empty means no host restriction.
    allowlist: Vec<HostPattern>,
    /// Whether private and link-local IP ranges are allowed.
    allow_private_networks: bool,
}

impl HttpPollPolicy {
    /// Creates a policy allowing any public host.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts polling to the given hosts.
    #[must_use]
    pub fn allow_hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.allowlist = hosts.into_iter().filter_map(|host| HostPattern::parse(host.as_ref())).collect();
        self
    }

    /// Allows requests to private or link-local endpoints, for test and
    /// on-premises deployments.
    #[must_use]
    pub const fn allow_private_networks(mut self) -> Self {
        self.allow_private_networks = true;
        self
    }

    /// Validates the endpoint URL against the policy.
    fn enforce(&self, url: &Url) -> Result<(), SourceError> {
        let host = url.host().ok_or_else(|| SourceError::Malformed("endpoint has no host".to_string()))?;
        let host_label = normalize_host_label(&host);
        if !self.allowlist.is_empty() && !self.allowlist.iter().any(|pattern| pattern.matches(&host_label)) {
            return Err(SourceError::Malformed(format!("host not in allowlist: {host_label}")));
        }
        if !self.allow_private_networks {
            let ips = resolve_host_ips(&host, url)?;
            if ips.iter().any(is_private_or_link_local) {
                return Err(SourceError::Malformed(format!(
                    "host resolves to private or link-local address: {host_label}"
                )));
            }
        }
        Ok(())
    }
}

/// Normalizes a host label into a lowercase string for matching.
fn normalize_host_label(host: &Host<&str>) -> String {
    match host {
        Host::Domain(domain) => domain.trim_end_matches('.').to_ascii_lowercase(),
        Host::Ipv4(ip) => ip.to_string(),
        Host::Ipv6(ip) => ip.to_string(),
    }
}

/// Resolves a host to its IP addresses for private-range validation.
fn resolve_host_ips(host: &Host<&str>, url: &Url) -> Result<Vec<IpAddr>, SourceError> {
    match host {
        Host::Ipv4(ip) => Ok(vec![IpAddr::V4(*ip)]),
        Host::Ipv6(ip) => Ok(vec![IpAddr::V6(*ip)]),
        Host::Domain(domain) => {
            let port = url
                .port_or_known_default()
                .ok_or_else(|| SourceError::Malformed("missing port for host resolution".to_string()))?;
            (*domain, port)
                .to_socket_addrs()
                .map(|iter| iter.map(|addr| addr.ip()).collect())
                .map_err(|err| SourceError::Io(format!("dns lookup failed: {err}")))
        }
    }
}

/// Returns true if the IP is private, link-local, loopback, or unspecified.
const fn is_private_or_link_local(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(addr) => {
            addr.is_private()
                || addr.is_loopback()
                || addr.is_link_local()
                || addr.is_unspecified()
                || addr.is_multicast()
                || addr.is_broadcast()
        }
        IpAddr::V6(addr) => {
            addr.is_loopback()
                || addr.is_unique_local()
                || addr.is_unicast_link_local()
                || addr.is_unspecified()
                || addr.is_multicast()
        }
    }
}

// ============================================================================
// SECTION: Wire Shape
// ============================================================================

/// One pending submission as returned by a partner endpoint.
#[derive(Debug, Deserialize)]
struct RawSubmissionWire {
    /// Raw content body, in whatever format `content_type` names.
    raw_content: String,
    /// Format of `raw_content`.
    content_type: RawContentTypeWire,
    /// Partner-reported receipt time, RFC3339. Defaults to poll time when absent.
    received_at: Option<String>,
    /// Free-form partner metadata, passed through untouched.
    metadata: Option<Value>,
}

/// Wire encoding of [`RawContentType`].
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum RawContentTypeWire {
    /// PDF with extractable text.
    PdfText,
    /// XML document.
    Xml,
    /// JSON document.
    Json,
    /// Email message (headers plus body).
    Email,
    /// Plain text.
    Text,
}

impl From<RawContentTypeWire> for RawContentType {
    fn from(value: RawContentTypeWire) -> Self {
        match value {
            RawContentTypeWire::PdfText => Self::PdfText,
            RawContentTypeWire::Xml => Self::Xml,
            RawContentTypeWire::Json => Self::Json,
            RawContentTypeWire::Email => Self::Email,
            RawContentTypeWire::Text => Self::Text,
        }
    }
}

// ============================================================================
// SECTION: HTTP Poll Source
// ============================================================================

/// Configuration for a single [`HttpPollSource`] instance.
#[derive(Debug, Clone)]
pub struct HttpPollConfig {
    /// Endpoint to poll for pending submissions.
    pub endpoint: String,
    /// Channel this instance reports submissions under.
    pub channel: SourceChannel,
    /// Host policy enforced before every poll.
    pub policy: HttpPollPolicy,
    /// Per-request timeout.
    pub timeout: Duration,
}

/// Polls a partner HTTP endpoint and maps pending submissions to
/// [`RawTipInput`] values.
#[derive(Debug)]
pub struct HttpPollSource {
    /// Parsed, policy-checked endpoint URL.
    url: Url,
    /// Channel this instance reports submissions under.
    channel: SourceChannel,
    /// HTTP client used for polling.
    client: Client,
    /// Host policy enforced before every poll.
    policy: HttpPollPolicy,
}

impl HttpPollSource {
    /// Builds a poll source from `config`, validating the endpoint against
    /// its policy immediately so misconfiguration surfaces at startup.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the endpoint is not a valid URL, fails
    /// policy enforcement, or the HTTP client cannot be constructed.
    pub fn new(config: HttpPollConfig) -> Result<Self, SourceError> {
        let url = Url::parse(&config.endpoint)
            .map_err(|err| SourceError::Malformed(format!("invalid endpoint: {err}")))?;
        match url.scheme() {
            "http" | "https" => {}
            scheme => return Err(SourceError::Malformed(format!("unsupported scheme: {scheme}"))),
        }
        config.policy.enforce(&url)?;
        let client = Client::builder()
            .redirect(Policy::none())
            .timeout(config.timeout)
            .build()
            .map_err(|err| SourceError::Io(err.to_string()))?;
        Ok(Self { url, channel: config.channel, client, policy: config.policy })
    }
}

impl ReporterSource for HttpPollSource {
    fn channel(&self) -> SourceChannel {
        self.channel
    }

    fn poll(&mut self) -> Result<Vec<RawTipInput>, SourceError> {
        self.policy.enforce(&self.url)?;
        let response =
            self.client.get(self.url.as_str()).send().map_err(|err| SourceError::Io(err.to_string()))?;
        if response.url() != &self.url {
            return Err(SourceError::Io(format!(
                "redirected from {} to {}",
                self.url,
                response.url()
            )));
        }
        if !response.status().is_success() {
            return Err(SourceError::Io(format!("http status {}", response.status())));
        }
        let submissions: Vec<RawSubmissionWire> =
            response.json().map_err(|err| SourceError::Malformed(err.to_string()))?;
        submissions
            .into_iter()
            .map(|wire| {
                let received_at = wire
                    .received_at
                    .as_deref()
                    .map(parse_rfc3339)
                    .transpose()?;
                Ok(RawTipInput {
                    source: self.channel,
                    raw_content: wire.raw_content,
                    content_type: wire.content_type.into(),
                    received_at,
                    metadata: wire.metadata,
                })
            })
            .collect()
    }
}

/// Parses an RFC3339 timestamp string from the wire, mapping parse failure
/// to a malformed-content error instead of silently dropping the submission.
fn parse_rfc3339(raw: &str) -> Result<Timestamp, SourceError> {
    Timestamp::parse(raw).map_err(|err| SourceError::Malformed(format!("invalid received_at: {err}")))
}
