//! Trusted service URL tracking for the Parley framework.
//!
//! Channels are reachable at service URLs; only URLs whose host is on the
//! caller's allow-list should be called back. This crate provides the
//! trust predicate consumed at resumption-token construction time and a
//! concrete host allow-list implementation.
//!
//! # Main types
//!
//! - [`ServiceUrlTrust`] — The trust predicate trait.
//! - [`TrustedHostSet`] — A host-name allow-list.

use std::collections::HashSet;

use parley_core::{ParleyError, ParleyResult};
use tracing::debug;
use url::Url;

/// Predicate answering whether a channel service URL may be trusted.
pub trait ServiceUrlTrust {
    /// Returns `true` if the given service URL is currently trusted.
    fn is_trusted(&self, service_url: &str) -> bool;
}

impl<F> ServiceUrlTrust for F
where
    F: Fn(&str) -> bool,
{
    fn is_trusted(&self, service_url: &str) -> bool {
        self(service_url)
    }
}

/// An allow-list of trusted channel service hosts.
///
/// Trust is tracked per host name, lowercased, ignoring scheme, port,
/// and path. A URL that cannot be parsed is never trusted.
#[derive(Debug, Clone, Default)]
pub struct TrustedHostSet {
    hosts: HashSet<String>,
}

impl TrustedHostSet {
    /// Creates an empty allow-list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the host of `service_url` to the allow-list.
    ///
    /// Returns [`ParleyError::InvalidArgument`] when the URL cannot be
    /// parsed or has no host component.
    pub fn add_trusted(&mut self, service_url: &str) -> ParleyResult<()> {
        let host = host_of(service_url).ok_or_else(|| {
            ParleyError::InvalidArgument(format!("not a valid service URL: {service_url}"))
        })?;
        debug!(host = %host, "trusting service host");
        self.hosts.insert(host);
        Ok(())
    }

    /// Number of trusted hosts.
    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    /// Returns `true` if no host is trusted.
    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}

impl ServiceUrlTrust for TrustedHostSet {
    fn is_trusted(&self, service_url: &str) -> bool {
        match host_of(service_url) {
            Some(host) => self.hosts.contains(&host),
            None => false,
        }
    }
}

fn host_of(service_url: &str) -> Option<String> {
    let url = Url::parse(service_url).ok()?;
    url.host_str().map(str::to_lowercase)
}
