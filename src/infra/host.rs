use crate::domain::HostParams;
use crate::infra::config::Settings;
use std::fs;
use std::net::{IpAddr, UdpSocket};
use tracing::{debug, warn};

pub const PLACEHOLDER_IP: &str = "127.0.0.1";
pub const DEFAULT_TIMEZONE: &str = "Etc/UTC";

/// Host facts for manifest rendering. Configured values win; discovery is
/// best-effort and falls back to placeholders.
pub fn discover(settings: &Settings) -> HostParams {
    let ip = settings
        .host_ip
        .clone()
        .or_else(|| {
            let found = primary_ip();
            if found.is_none() {
                warn!("Could not detect the host IP address, using {PLACEHOLDER_IP}");
            }
            found
        })
        .unwrap_or_else(|| PLACEHOLDER_IP.to_string());

    let timezone = settings
        .timezone
        .clone()
        .or_else(system_timezone)
        .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());

    debug!(%ip, %timezone, "host parameters");
    HostParams { ip, timezone }
}

/// Address of the interface holding the default route. Connecting a UDP
/// socket only consults the routing table; no packet is sent.
fn primary_ip() -> Option<String> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect("1.1.1.1:53").ok()?;
    let addr = socket.local_addr().ok()?.ip();

    match addr {
        IpAddr::V4(v4) if !v4.is_unspecified() && !v4.is_loopback() => Some(v4.to_string()),
        _ => None,
    }
}

fn system_timezone() -> Option<String> {
    if let Ok(content) = fs::read_to_string("/etc/timezone") {
        let zone = content.trim();
        if !zone.is_empty() {
            return Some(zone.to_string());
        }
    }

    // /etc/localtime -> /usr/share/zoneinfo/Region/City
    let target = fs::read_link("/etc/localtime").ok()?;
    let target = target.to_string_lossy();
    target
        .split_once("zoneinfo/")
        .map(|(_, zone)| zone.to_string())
        .filter(|zone| !zone.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::config::AppConfig;

    #[test]
    fn configured_values_take_precedence() {
        let mut settings = AppConfig::default().into_settings().unwrap();
        settings.host_ip = Some("10.1.2.3".into());
        settings.timezone = Some("America/Sao_Paulo".into());

        let host = discover(&settings);

        assert_eq!(host.ip, "10.1.2.3");
        assert_eq!(host.timezone, "America/Sao_Paulo");
    }

    #[test]
    fn discovery_never_returns_empty_values() {
        let settings = AppConfig::default().into_settings().unwrap();
        let host = discover(&settings);

        assert!(!host.ip.is_empty());
        assert!(!host.timezone.is_empty());
    }
}
