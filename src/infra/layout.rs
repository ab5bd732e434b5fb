//! On-disk layout of generated artifacts and the writes that create them.

use crate::domain::ServiceId;
use crate::error::{Error, Result};
use crate::infra::config::OwnerConfig;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt, chown};
use std::path::{Path, PathBuf};

/// Manifests readable by the operator group.
pub const MANIFEST_MODE: u32 = 0o640;
/// Credential records and private keys.
pub const PRIVATE_MODE: u32 = 0o600;
pub const DIR_MODE: u32 = 0o750;

#[derive(Debug, Clone)]
pub struct ServiceLayout {
    root: PathBuf,
    owner: Option<OwnerConfig>,
}

impl ServiceLayout {
    pub fn new(root: impl Into<PathBuf>, owner: Option<OwnerConfig>) -> Self {
        Self {
            root: root.into(),
            owner,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest_path(&self, id: ServiceId) -> PathBuf {
        self.root.join(format!("{id}.yml"))
    }

    pub fn credentials_path(&self, id: ServiceId) -> PathBuf {
        self.root.join(format!("{id}.credentials"))
    }

    pub fn cert_dir(&self, id: ServiceId) -> PathBuf {
        self.root.join(format!("{id}-ssl"))
    }

    pub fn is_installed(&self, id: ServiceId) -> bool {
        self.manifest_path(id).is_file()
    }

    /// Creates `dir` (and parents) with `DIR_MODE` and the configured owner.
    pub fn ensure_dir(&self, dir: &Path) -> Result<()> {
        if dir.is_dir() {
            return Ok(());
        }

        fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
        fs::set_permissions(dir, fs::Permissions::from_mode(DIR_MODE))
            .map_err(|e| Error::io(dir, e))?;
        self.apply_owner(dir)
    }

    /// Writes `content` to a temp file next to `path` and renames it into
    /// place, so readers never observe a partial file.
    pub fn write_atomic(&self, path: &Path, content: &str, mode: u32) -> Result<()> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let temp_path = path.with_file_name(format!(".{file_name}.tmp"));

        // Leftover from an interrupted write.
        if temp_path.exists() {
            fs::remove_file(&temp_path).map_err(|e| Error::io(&temp_path, e))?;
        }

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .mode(mode)
            .open(&temp_path)
            .map_err(|e| Error::io(&temp_path, e))?;

        file.write_all(content.as_bytes())
            .and_then(|_| file.sync_all())
            .map_err(|e| Error::io(&temp_path, e))?;

        // create_new honours the umask; pin the exact mode.
        fs::set_permissions(&temp_path, fs::Permissions::from_mode(mode))
            .map_err(|e| Error::io(&temp_path, e))?;
        self.apply_owner(&temp_path)?;

        fs::rename(&temp_path, path).map_err(|e| Error::io(path, e))
    }

    pub fn apply_owner(&self, path: &Path) -> Result<()> {
        if let Some(owner) = self.owner {
            chown(path, owner.uid, owner.gid).map_err(|e| Error::io(path, e))?;
        }
        Ok(())
    }
}
