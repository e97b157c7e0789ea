//! mDNS advertisement of the Wyoming TCP surface on the LAN (§6).

use mdns_sd::{ServiceDaemon, ServiceInfo};
use tracing::{info, warn};

const SERVICE_TYPE: &str = "_wyoming._tcp.local.";

/// Advertises the Wyoming service and returns the daemon handle; dropping or
/// unregistering it withdraws the advertisement.
pub fn advertise(program_name: &str, hostname_short: &str, port: u16) -> Option<ServiceDaemon> {
    let daemon = match ServiceDaemon::new() {
        Ok(d) => d,
        Err(e) => {
            warn!(error = %e, "mdns: failed to start daemon, continuing without advertisement");
            return None;
        }
    };

    let instance_name = format!("{program_name}-{hostname_short}");
    let host_fqdn = format!("{hostname_short}.local.");

    let service = match ServiceInfo::new(
        SERVICE_TYPE,
        &instance_name,
        &host_fqdn,
        "",
        port,
        None,
    ) {
        Ok(s) => s.enable_addr_auto(),
        Err(e) => {
            warn!(error = %e, "mdns: failed to build service info");
            return None;
        }
    };

    match daemon.register(service) {
        Ok(()) => {
            info!(instance = %instance_name, port, "mdns: advertising wyoming service");
            Some(daemon)
        }
        Err(e) => {
            warn!(error = %e, "mdns: failed to register service");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instance_name_is_program_dash_host() {
        let instance_name = format!("{}-{}", "wyoming-gateway", "myhost");
        assert_eq!(instance_name, "wyoming-gateway-myhost");
    }
}
