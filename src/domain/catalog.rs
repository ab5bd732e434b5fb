//! The fixed catalog of installable services.

use super::compose::ComposeFile;
use super::secret::{SecretSet, SecretSpec};
use super::templates;
use crate::error::{Error, Result};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ServiceId {
    Portainer,
    Pihole,
    AdGuard,
    Vaultwarden,
    Passbolt,
    UptimeKuma,
    Monitoring,
    WikiJs,
}

impl ServiceId {
    pub const ALL: [ServiceId; 8] = [
        ServiceId::Portainer,
        ServiceId::Pihole,
        ServiceId::AdGuard,
        ServiceId::Vaultwarden,
        ServiceId::Passbolt,
        ServiceId::UptimeKuma,
        ServiceId::Monitoring,
        ServiceId::WikiJs,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Portainer => "portainer",
            Self::Pihole => "pihole",
            Self::AdGuard => "adguard",
            Self::Vaultwarden => "vaultwarden",
            Self::Passbolt => "passbolt",
            Self::UptimeKuma => "uptime-kuma",
            Self::Monitoring => "monitoring",
            Self::WikiJs => "wikijs",
        }
    }

    pub fn definition(&self) -> &'static ServiceDefinition {
        match self {
            Self::Portainer => &PORTAINER,
            Self::Pihole => &PIHOLE,
            Self::AdGuard => &ADGUARD,
            Self::Vaultwarden => &VAULTWARDEN,
            Self::Passbolt => &PASSBOLT,
            Self::UptimeKuma => &UPTIME_KUMA,
            Self::Monitoring => &MONITORING,
            Self::WikiJs => &WIKIJS,
        }
    }

    /// Renders the compose document for this service.
    pub fn render(&self, ctx: &RenderContext) -> Result<ComposeFile> {
        let name = self.as_str();
        match self {
            Self::Portainer => Ok(templates::portainer(ctx)),
            Self::Pihole => templates::pihole(name, ctx),
            Self::AdGuard => Ok(templates::adguard(ctx)),
            Self::Vaultwarden => templates::vaultwarden(name, ctx),
            Self::Passbolt => templates::passbolt(name, ctx),
            Self::UptimeKuma => Ok(templates::uptime_kuma(ctx)),
            Self::Monitoring => templates::monitoring(name, ctx),
            Self::WikiJs => templates::wikijs(name, ctx),
        }
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|id| id.as_str() == wanted)
            .ok_or_else(|| Error::UnknownService(s.to_string()))
    }
}

/// Static metadata for one catalog entry.
#[derive(Debug)]
pub struct ServiceDefinition {
    pub id: ServiceId,
    pub label: &'static str,
    /// Container whose logs represent the service.
    pub container: &'static str,
    /// Every container the manifest declares, primary first.
    pub containers: &'static [&'static str],
    pub secrets: &'static [SecretSpec],
    /// Web UI address; `{ip}` is replaced with the host address.
    pub url_template: &'static str,
    pub needs_certificate: bool,
}

impl ServiceDefinition {
    pub fn url(&self, host_ip: &str) -> String {
        self.url_template.replace("{ip}", host_ip)
    }
}

/// Host facts substituted into manifests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostParams {
    pub ip: String,
    pub timezone: String,
}

pub struct RenderContext<'a> {
    pub host: &'a HostParams,
    pub secrets: &'a SecretSet,
    /// Absolute directory holding `cert.pem` and `key.pem`.
    pub cert_dir: &'a Path,
}

static PORTAINER: ServiceDefinition = ServiceDefinition {
    id: ServiceId::Portainer,
    label: "Portainer (container management UI)",
    container: "portainer",
    containers: &["portainer"],
    secrets: &[],
    url_template: "https://{ip}:9443",
    needs_certificate: false,
};

static PIHOLE: ServiceDefinition = ServiceDefinition {
    id: ServiceId::Pihole,
    label: "Pi-hole (DNS ad blocker)",
    container: "pihole",
    containers: &["pihole"],
    secrets: &[SecretSpec::standard(templates::PIHOLE_PASSWORD)],
    url_template: "http://{ip}:8080/admin",
    needs_certificate: false,
};

static ADGUARD: ServiceDefinition = ServiceDefinition {
    id: ServiceId::AdGuard,
    label: "AdGuard Home (DNS ad blocker)",
    container: "adguard",
    containers: &["adguard"],
    secrets: &[],
    url_template: "http://{ip}:3000",
    needs_certificate: false,
};

static VAULTWARDEN: ServiceDefinition = ServiceDefinition {
    id: ServiceId::Vaultwarden,
    label: "Vaultwarden (password manager)",
    container: "vaultwarden",
    containers: &["vaultwarden"],
    secrets: &[SecretSpec::high(templates::VAULTWARDEN_ADMIN_TOKEN)],
    url_template: "https://{ip}:8443",
    needs_certificate: true,
};

static PASSBOLT: ServiceDefinition = ServiceDefinition {
    id: ServiceId::Passbolt,
    label: "Passbolt (team password manager)",
    container: "passbolt",
    containers: &["passbolt", "passbolt-db"],
    secrets: &[SecretSpec::high(templates::PASSBOLT_DB_PASSWORD)],
    url_template: "https://{ip}:4433",
    needs_certificate: false,
};

static UPTIME_KUMA: ServiceDefinition = ServiceDefinition {
    id: ServiceId::UptimeKuma,
    label: "Uptime Kuma (uptime monitoring)",
    container: "uptime-kuma",
    containers: &["uptime-kuma"],
    secrets: &[],
    url_template: "http://{ip}:3001",
    needs_certificate: false,
};

static MONITORING: ServiceDefinition = ServiceDefinition {
    id: ServiceId::Monitoring,
    label: "Prometheus + Node Exporter + Grafana (monitoring stack)",
    container: "monitoring-grafana",
    containers: &[
        "monitoring-grafana",
        "monitoring-prometheus",
        "monitoring-node-exporter",
    ],
    secrets: &[SecretSpec::standard(templates::GRAFANA_ADMIN_PASSWORD)],
    url_template: "http://{ip}:3002",
    needs_certificate: false,
};

static WIKIJS: ServiceDefinition = ServiceDefinition {
    id: ServiceId::WikiJs,
    label: "Wiki.js (markdown wiki)",
    container: "wikijs",
    containers: &["wikijs", "wikijs-db"],
    secrets: &[SecretSpec::high(templates::WIKIJS_DB_PASSWORD)],
    url_template: "http://{ip}:8083",
    needs_certificate: false,
};
