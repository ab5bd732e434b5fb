use crate::domain::{
    CertificateIssuer, CertificateRequest, HostParams, RenderContext, SecretPolicy, SecretSet,
    ServiceId,
};
use crate::error::{Error, Result};
use crate::infra::credentials;
use crate::infra::layout::{MANIFEST_MODE, PRIVATE_MODE, ServiceLayout};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

pub const CERT_FILE: &str = "cert.pem";
pub const KEY_FILE: &str = "key.pem";
pub const CERT_DAYS: u32 = 365;
pub const CERT_KEY_BITS: u32 = 2048;

/// A compose manifest on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestFile {
    pub service: ServiceId,
    pub path: PathBuf,
    pub contents: String,
    /// Whether this resolve call wrote the file.
    pub created: bool,
}

/// Maps catalog identifiers to manifests, generating secrets and
/// certificates on first install only.
pub struct CatalogResolver {
    layout: ServiceLayout,
    host: HostParams,
    policy: SecretPolicy,
    issuer: Arc<dyn CertificateIssuer>,
}

impl CatalogResolver {
    pub fn new(
        layout: ServiceLayout,
        host: HostParams,
        policy: SecretPolicy,
        issuer: Arc<dyn CertificateIssuer>,
    ) -> Self {
        Self {
            layout,
            host,
            policy,
            issuer,
        }
    }

    pub fn layout(&self) -> &ServiceLayout {
        &self.layout
    }

    pub fn host(&self) -> &HostParams {
        &self.host
    }

    pub fn resolve(&self, identifier: &str) -> Result<ManifestFile> {
        let id: ServiceId = identifier.parse()?;
        self.resolve_service(id)
    }

    pub fn resolve_service(&self, id: ServiceId) -> Result<ManifestFile> {
        let path = self.layout.manifest_path(id);

        // Never overwrite: the operator may have edited it.
        if path.is_file() {
            debug!("{id}: reusing manifest {:?}", path);
            let contents = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
            return Ok(ManifestFile {
                service: id,
                path,
                contents,
                created: false,
            });
        }

        info!("Generating manifest for {id}");
        self.layout.ensure_dir(self.layout.root())?;

        let secrets = self.materialize_secrets(id)?;
        let cert_dir = self.layout.cert_dir(id);
        if id.definition().needs_certificate {
            self.ensure_certificate(id, &cert_dir)?;
        }

        let ctx = RenderContext {
            host: &self.host,
            secrets: &secrets,
            cert_dir: &cert_dir,
        };
        let contents = format!(
            "# {} generated by pistack\n{}",
            id.definition().label,
            id.render(&ctx)?.to_yaml()?
        );

        self.layout.write_atomic(&path, &contents, MANIFEST_MODE)?;
        info!("Wrote {:?}", path);

        Ok(ManifestFile {
            service: id,
            path,
            contents,
            created: true,
        })
    }

    /// Loads the credential record and fills in whatever is missing. Values
    /// already on disk are never regenerated.
    fn materialize_secrets(&self, id: ServiceId) -> Result<SecretSet> {
        let specs = id.definition().secrets;
        let path = self.layout.credentials_path(id);
        let mut secrets = credentials::read(&path)?;

        if specs.is_empty() {
            return Ok(secrets);
        }

        let mut generated = 0;
        for spec in specs {
            if secrets.contains(spec.name) {
                debug!("{id}: reusing stored {}", spec.name);
                continue;
            }
            secrets.insert(self.policy.generate(id.as_str(), spec)?);
            generated += 1;
        }

        if generated > 0 {
            credentials::write(&self.layout, &path, &secrets)?;
            info!("Stored {generated} credential(s) in {:?}", path);
        }

        Ok(secrets)
    }

    fn ensure_certificate(&self, id: ServiceId, cert_dir: &Path) -> Result<()> {
        let key_path = cert_dir.join(KEY_FILE);
        let cert_path = cert_dir.join(CERT_FILE);

        if key_path.is_file() && cert_path.is_file() {
            debug!("{id}: reusing certificate in {:?}", cert_dir);
            return Ok(());
        }

        self.layout.ensure_dir(cert_dir)?;
        info!("Issuing self-signed certificate for {}", self.host.ip);

        self.issuer.issue(&CertificateRequest {
            service: id.as_str(),
            key_path: &key_path,
            cert_path: &cert_path,
            common_name: &self.host.ip,
            days: CERT_DAYS,
            key_bits: CERT_KEY_BITS,
        })?;

        if !key_path.is_file() || !cert_path.is_file() {
            return Err(Error::generation(
                id.as_str(),
                "certificate",
                "issuer reported success but produced no keypair",
            ));
        }

        fs::set_permissions(&key_path, fs::Permissions::from_mode(PRIVATE_MODE))
            .map_err(|e| Error::io(&key_path, e))?;
        self.layout.apply_owner(&key_path)?;
        self.layout.apply_owner(&cert_path)
    }
}
