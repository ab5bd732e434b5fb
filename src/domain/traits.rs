use super::Container;
use crate::error::Result;
use std::fmt::Debug;
use std::path::Path;

/// Control interface of the container engine.
pub trait ContainerRuntime: Send + Sync + Debug {
    /// Fails with `RuntimeUnavailable` when the engine cannot be reached
    fn check_available(&self) -> Result<()>;

    /// Get the current state of a container; missing containers are `Absent`
    fn get_container(&self, name: &str) -> Result<Container>;

    /// Every container the engine knows about, running or not
    fn list_containers(&self) -> Result<Vec<Container>>;

    /// Bring up every service declared in a compose manifest
    fn compose_up(&self, manifest: &Path) -> Result<()>;

    fn start_container(&self, name: &str) -> Result<()>;

    fn stop_container(&self, name: &str) -> Result<()>;

    fn restart_container(&self, name: &str) -> Result<()>;

    /// Force-remove a container. Named volumes survive.
    fn remove_container(&self, name: &str) -> Result<()>;

    /// Last `lines` lines of a container's combined output
    fn container_logs(&self, name: &str, lines: usize) -> Result<String>;
}

/// Issues self-signed TLS keypairs.
pub trait CertificateIssuer: Send + Sync + Debug {
    fn is_available(&self) -> bool;

    fn issue(&self, request: &CertificateRequest<'_>) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct CertificateRequest<'a> {
    pub service: &'a str,
    pub key_path: &'a Path,
    pub cert_path: &'a Path,
    pub common_name: &'a str,
    pub days: u32,
    pub key_bits: u32,
}
