use crate::domain::{CertificateIssuer, ContainerRuntime, HostParams};
use crate::infra::config::{Settings, load_settings};
use crate::infra::{DockerAdapter, OpensslIssuer, ServiceLayout, host};
use crate::services::{CatalogResolver, LifecycleController, Reconciler};
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Everything one CLI invocation needs, wired from explicit settings.
pub struct AppContext {
    pub config_dir: PathBuf,
    pub settings: Settings,
    pub runtime: Arc<dyn ContainerRuntime>,
    pub issuer: Arc<dyn CertificateIssuer>,
    pub resolver: Arc<CatalogResolver>,
    pub reconciler: Reconciler,
    pub lifecycle: LifecycleController,
}

impl AppContext {
    pub fn new(config_dir: &Path) -> Result<Self> {
        let settings = load_settings(config_dir)?;
        let runtime = Arc::new(DockerAdapter::new(settings.runtime_binary.clone()));
        let issuer = Arc::new(OpensslIssuer::new());
        Self::assemble(config_dir, settings, runtime, issuer)
    }

    /// Same wiring with injected runtime and issuer.
    pub fn with_runtime(
        config_dir: &Path,
        runtime: Arc<dyn ContainerRuntime>,
        issuer: Arc<dyn CertificateIssuer>,
    ) -> Result<Self> {
        let settings = load_settings(config_dir)?;
        Self::assemble(config_dir, settings, runtime, issuer)
    }

    fn assemble(
        config_dir: &Path,
        settings: Settings,
        runtime: Arc<dyn ContainerRuntime>,
        issuer: Arc<dyn CertificateIssuer>,
    ) -> Result<Self> {
        let host = host::discover(&settings);
        let layout = ServiceLayout::new(settings.services_dir.clone(), settings.owner);
        let resolver = Arc::new(CatalogResolver::new(
            layout,
            host,
            settings.secrets,
            issuer.clone(),
        ));
        let reconciler = Reconciler::new(runtime.clone(), resolver.clone());
        let lifecycle = LifecycleController::new(runtime.clone());

        Ok(Self {
            config_dir: config_dir.to_path_buf(),
            settings,
            runtime,
            issuer,
            resolver,
            reconciler,
            lifecycle,
        })
    }

    pub fn layout(&self) -> &ServiceLayout {
        self.resolver.layout()
    }

    pub fn host(&self) -> &HostParams {
        self.resolver.host()
    }
}
