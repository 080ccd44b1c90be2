//! Host and container introspection for the home page.

use serde::Serialize;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use tokio::net::UdpSocket;
use tracing::debug;

/// Marker file created by the Docker runtime inside containers.
const CONTAINER_MARKER: &str = "/.dockerenv";

/// Public address used only to ask the kernel which local interface routes
/// outbound traffic. Nothing is sent.
const ROUTE_PROBE_ADDR: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1)), 80);

/// What the service knows about the host it runs on.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct SystemInfo {
    pub hostname: String,
    /// Primary non-loopback IPv4 address, empty when none is found.
    pub ip_address: String,
    pub is_container: bool,
    /// Orchestrator detection is not implemented; always `false`.
    pub is_kubernetes: bool,
}

impl SystemInfo {
    /// Probe the current host.
    pub async fn probe() -> Self {
        Self {
            hostname: hostname().await,
            ip_address: primary_ipv4().await.map(|ip| ip.to_string()).unwrap_or_default(),
            is_container: is_container(Path::new(CONTAINER_MARKER)).await,
            is_kubernetes: false,
        }
    }
}

async fn hostname() -> String {
    for path in ["/proc/sys/kernel/hostname", "/etc/hostname"] {
        if let Ok(contents) = tokio::fs::read_to_string(path).await {
            let name = contents.trim();
            if !name.is_empty() {
                return name.to_string();
            }
        }
    }
    std::env::var("HOSTNAME").unwrap_or_default()
}

/// Find the IPv4 address of the interface that carries the default route.
async fn primary_ipv4() -> Option<Ipv4Addr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).await.ok()?;
    if let Err(e) = socket.connect(ROUTE_PROBE_ADDR).await {
        debug!(error = %e, "no IPv4 route available");
        return None;
    }

    match socket.local_addr().ok()?.ip() {
        IpAddr::V4(ip) if !ip.is_loopback() && !ip.is_unspecified() => Some(ip),
        _ => None,
    }
}

async fn is_container(marker: &Path) -> bool {
    tokio::fs::try_exists(marker).await.unwrap_or(false)
}
