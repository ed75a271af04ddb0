mod backend_url;
mod errors;
mod forwarder;
mod manager;
mod normalize;
mod resources;
mod routes;
mod tls_policy;
mod util;

#[cfg(test)]
mod test_support;

pub use backend_url::{build_backend_url, BackendBase};
pub use errors::{ForwardError, GatewayReply};
pub use forwarder::{ForwardOptions, Gateway, GatewayConfig};
pub use manager::GatewayManager;
pub use normalize::normalize_keys;
pub use tls_policy::should_relax_tls;

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct GatewayStatus {
    pub running: bool,
    pub port: Option<u16>,
    pub base_url: Option<String>,
}
