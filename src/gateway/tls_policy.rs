//! Usage: Decide when outgoing calls may skip certificate validation (local dev only).

use super::backend_url::BackendBase;
use crate::settings::DeploymentMode;
use reqwest::dns::{Addrs, Name, Resolve, Resolving};
use reqwest::Url;
use std::net::SocketAddr;
use std::sync::Arc;

const LOOPBACK_HOSTS: [&str; 3] = ["localhost", "127.0.0.1", "::1"];

pub fn should_relax_tls(base: &BackendBase, mode: DeploymentMode) -> bool {
    if mode.is_production() {
        return false;
    }

    let raw = base.as_str();
    let candidate = if raw.starts_with("http") {
        Url::parse(raw)
    } else {
        Url::parse(&format!("https://{raw}"))
    };

    match candidate {
        Ok(url) => url.scheme() == "https" && url.host_str().is_some_and(is_loopback_host),
        Err(_) => LOOPBACK_HOSTS.iter().any(|host| raw.contains(host)),
    }
}

fn is_loopback_host(host: &str) -> bool {
    let host = host.trim_start_matches('[').trim_end_matches(']');
    LOOPBACK_HOSTS.contains(&host)
}

/// Client for relaxed calls: accepts any peer certificate and resolves names to
/// IPv4 addresses only (dev backends commonly listen on 127.0.0.1 alone).
pub(super) fn build_relaxed_client(user_agent: &str) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(user_agent)
        .danger_accept_invalid_certs(true)
        .dns_resolver(Arc::new(Ipv4OnlyResolver))
        .build()
}

struct Ipv4OnlyResolver;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

impl Resolve for Ipv4OnlyResolver {
    fn resolve(&self, name: Name) -> Resolving {
        Box::pin(resolve_ipv4(name.as_str().to_string()))
    }
}

async fn resolve_ipv4(host: String) -> Result<Addrs, BoxError> {
    let resolved = tokio::net::lookup_host((host.as_str(), 0)).await?;
    let addrs: Vec<SocketAddr> = resolved.filter(SocketAddr::is_ipv4).collect();
    if addrs.is_empty() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::AddrNotAvailable,
            format!("no IPv4 address for {host}"),
        )
        .into());
    }
    Ok(Box::new(addrs.into_iter()))
}
