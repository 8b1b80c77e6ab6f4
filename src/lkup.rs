use anyhow::{anyhow, Context};
use std::future::Future;
use std::net::IpAddr;
use std::time::Duration;

use hickory_resolver::TokioAsyncResolver;

use tokio::time::timeout;
use tracing::{debug, trace};

/// Something that can turn an address into its PTR names.
pub trait ReverseLookup: Send + Sync + 'static {
    fn lookup(&self, ip: IpAddr) -> impl Future<Output = anyhow::Result<Vec<String>>> + Send;
}

/// hickory resolver built once from the system configuration, shared by all workers
#[derive(Clone)]
pub struct HickoryLookup {
    resolver: TokioAsyncResolver,
}

impl HickoryLookup {
    pub fn from_system_conf() -> anyhow::Result<HickoryLookup> {
        let resolver =
            TokioAsyncResolver::tokio_from_system_conf().context("Error creating resolver")?;
        Ok(HickoryLookup { resolver })
    }
}

impl ReverseLookup for HickoryLookup {
    async fn lookup(&self, ip: IpAddr) -> anyhow::Result<Vec<String>> {
        let lookup_result = self.resolver.reverse_lookup(ip).await?;
        Ok(lookup_result
            .iter()
            .map(|record| format!("{}", record))
            .collect())
    }
}

/// getnameinfo through dns-lookup, run on the blocking pool
#[derive(Clone, Copy, Default)]
pub struct SystemLookup;

impl ReverseLookup for SystemLookup {
    async fn lookup(&self, ip: IpAddr) -> anyhow::Result<Vec<String>> {
        let hostname = tokio::task::spawn_blocking(move || dns_lookup::lookup_addr(&ip)).await??;
        Ok(rooted_name(hostname, ip).into_iter().collect())
    }
}

// * getnameinfo hands back the numeric address when there is no PTR record,
// * and leaves off the root dot that hickory's names carry
fn rooted_name(mut hostname: String, ip: IpAddr) -> Option<String> {
    if hostname.is_empty() || hostname == ip.to_string() {
        return None;
    }
    if !hostname.ends_with('.') {
        hostname.push('.');
    }
    Some(hostname)
}

/// Substring filter applied to the first returned hostname. Empty matches everything.
#[derive(Debug, Clone, Default)]
pub struct DomainFilter {
    needle: String,
}

impl DomainFilter {
    pub fn new(needle: impl Into<String>) -> DomainFilter {
        DomainFilter {
            needle: needle.into(),
        }
    }

    pub fn matches(&self, hostname: &str) -> bool {
        hostname.contains(&self.needle)
    }
}

/// Resolve `ip` and return its first hostname. Unparseable addresses, lookup
/// errors, empty answers and timeouts all come back as `None`.
pub async fn first_hostname<L: ReverseLookup>(
    lookup: &L,
    ip: &str,
    lookup_timeout: Option<Duration>,
) -> Option<String> {
    let result = match ip.parse::<IpAddr>() {
        Ok(addr) => match lookup_timeout {
            Some(limit) => timeout(limit, lookup.lookup(addr))
                .await
                .unwrap_or_else(|_| Err(anyhow!("timed out after {:?}", limit))),
            None => lookup.lookup(addr).await,
        },
        Err(e) => Err(e.into()),
    };
    match result {
        Ok(names) => {
            trace!("{ip}: {names:?}");
            names.into_iter().next()
        }
        Err(e) => {
            debug!("lookup failed for {ip}: {e:#}");
            None
        }
    }
}
