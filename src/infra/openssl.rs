use crate::domain::{CertificateIssuer, CertificateRequest};
use crate::error::{Error, Result};
use std::process::{Command, Stdio};
use tracing::debug;

/// Self-signed certificates through `openssl req -x509`.
#[derive(Debug, Clone, Default)]
pub struct OpensslIssuer;

impl OpensslIssuer {
    pub fn new() -> Self {
        Self
    }
}

impl CertificateIssuer for OpensslIssuer {
    fn is_available(&self) -> bool {
        Command::new("openssl")
            .arg("version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    fn issue(&self, request: &CertificateRequest<'_>) -> Result<()> {
        let mut cmd = Command::new("openssl");
        cmd.args(["req", "-x509", "-nodes", "-newkey"])
            .arg(format!("rsa:{}", request.key_bits))
            .arg("-keyout")
            .arg(request.key_path)
            .arg("-out")
            .arg(request.cert_path)
            .arg("-days")
            .arg(request.days.to_string())
            .arg("-subj")
            .arg(format!("/CN={}", request.common_name))
            .stdin(Stdio::null());
        debug!(command = ?cmd, "issuing certificate");

        let output = cmd
            .output()
            .map_err(|e| Error::generation(request.service, "certificate", e))?;

        if !output.status.success() {
            return Err(Error::generation(
                request.service,
                "certificate",
                String::from_utf8_lossy(&output.stderr).trim(),
            ));
        }

        Ok(())
    }
}
