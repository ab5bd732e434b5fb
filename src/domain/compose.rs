//! Typed compose documents.
//!
//! Only the subset of the compose format the catalog emits is modelled. The
//! runtime consumes the serialized YAML verbatim, so field names follow the
//! compose specification exactly.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComposeFile {
    pub services: BTreeMap<String, ComposeService>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub volumes: BTreeMap<String, VolumeDecl>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub networks: BTreeMap<String, NetworkDecl>,
}

impl ComposeFile {
    pub fn service(mut self, key: &str, service: ComposeService) -> Self {
        self.services.insert(key.to_string(), service);
        self
    }

    pub fn volume(mut self, name: &str) -> Self {
        self.volumes.insert(name.to_string(), VolumeDecl::default());
        self
    }

    pub fn network(mut self, name: &str) -> Self {
        self.networks.insert(
            name.to_string(),
            NetworkDecl {
                driver: Some("bridge".to_string()),
            },
        );
        self
    }

    /// Container names declared by this document, in key order.
    pub fn container_names(&self) -> Vec<&str> {
        self.services
            .iter()
            .map(|(key, svc)| svc.container_name.as_deref().unwrap_or(key.as_str()))
            .collect()
    }

    pub fn to_yaml(&self) -> Result<String, serde_yml::Error> {
        serde_yml::to_string(self)
    }

    pub fn from_yaml(text: &str) -> Result<Self, serde_yml::Error> {
        serde_yml::from_str(text)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComposeService {
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restart: Option<RestartPolicy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub networks: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cap_add: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub healthcheck: Option<HealthCheck>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub depends_on: BTreeMap<String, DependsOn>,
}

impl ComposeService {
    pub fn new(image: &str, container_name: &str) -> Self {
        Self {
            image: image.to_string(),
            container_name: Some(container_name.to_string()),
            restart: Some(RestartPolicy::UnlessStopped),
            ..Self::default()
        }
    }

    pub fn env(mut self, key: &str, value: impl Into<String>) -> Self {
        self.environment.insert(key.to_string(), value.into());
        self
    }

    pub fn port(mut self, mapping: &str) -> Self {
        self.ports.push(mapping.to_string());
        self
    }

    pub fn mount(mut self, mount: impl Into<String>) -> Self {
        self.volumes.push(mount.into());
        self
    }

    pub fn on_network(mut self, network: &str) -> Self {
        self.networks.push(network.to_string());
        self
    }

    pub fn cap(mut self, capability: &str) -> Self {
        self.cap_add.push(capability.to_string());
        self
    }

    pub fn command<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.command = Some(args.into_iter().map(Into::into).collect());
        self
    }

    pub fn healthcheck(mut self, check: HealthCheck) -> Self {
        self.healthcheck = Some(check);
        self
    }

    pub fn depends_on(mut self, service: &str, condition: DependsCondition) -> Self {
        self.depends_on
            .insert(service.to_string(), DependsOn { condition });
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RestartPolicy {
    No,
    Always,
    UnlessStopped,
    OnFailure,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCheck {
    pub test: Vec<String>,
    pub interval: String,
    pub timeout: String,
    pub retries: u32,
}

impl HealthCheck {
    /// `CMD-SHELL` check with the given interval/timeout/retries triple.
    pub fn shell(command: &str, interval: &str, timeout: &str, retries: u32) -> Self {
        Self {
            test: vec!["CMD-SHELL".to_string(), command.to_string()],
            interval: interval.to_string(),
            timeout: timeout.to_string(),
            retries,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependsOn {
    pub condition: DependsCondition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependsCondition {
    ServiceStarted,
    ServiceHealthy,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeDecl {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkDecl {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver: Option<String>,
}
