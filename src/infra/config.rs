use crate::domain::{Alphabet, SecretPolicy};
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "pistack.toml";
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../../config/default_pistack.toml");

const DEFAULT_SERVICES_DIR: &str = "~/pistack";
const DEFAULT_RUNTIME_BINARY: &str = "docker";

pub fn default_config_dir() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/root"))
        .join(".config/pistack")
}

pub fn ensure_config_dir(config_dir: &Path) -> Result<()> {
    fs::create_dir_all(config_dir).with_context(|| format!("creating {:?}", config_dir))
}

#[derive(Deserialize, Debug, Default)]
pub struct PathsConfig {
    pub services_dir: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct RuntimeConfig {
    pub binary: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct HostConfig {
    pub ip: Option<String>,
    pub timezone: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct SecretsConfig {
    pub standard_length: Option<usize>,
    pub high_length: Option<usize>,
    pub alphabet: Option<Alphabet>,
}

#[derive(Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct OwnerConfig {
    pub uid: Option<u32>,
    pub gid: Option<u32>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
    #[serde(default)]
    pub host: HostConfig,
    #[serde(default)]
    pub secrets: SecretsConfig,
    #[serde(default)]
    pub owner: OwnerConfig,
}

/// Fully resolved configuration, threaded explicitly through every component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub services_dir: PathBuf,
    pub runtime_binary: String,
    pub host_ip: Option<String>,
    pub timezone: Option<String>,
    pub secrets: SecretPolicy,
    pub owner: Option<OwnerConfig>,
}

impl AppConfig {
    pub fn into_settings(self) -> Result<Settings> {
        let services_dir = self
            .paths
            .services_dir
            .unwrap_or_else(|| DEFAULT_SERVICES_DIR.to_string());
        let services_dir = PathBuf::from(shellexpand::tilde(&services_dir).into_owned());
        if !services_dir.is_absolute() {
            bail!("paths.services_dir must be absolute, got {:?}", services_dir);
        }

        let runtime_binary = self
            .runtime
            .binary
            .unwrap_or_else(|| DEFAULT_RUNTIME_BINARY.to_string());
        if runtime_binary.trim().is_empty() {
            bail!("runtime.binary must not be empty");
        }

        let defaults = SecretPolicy::default();
        let secrets = SecretPolicy {
            standard_length: self
                .secrets
                .standard_length
                .unwrap_or(defaults.standard_length),
            high_length: self.secrets.high_length.unwrap_or(defaults.high_length),
            alphabet: self.secrets.alphabet.unwrap_or(defaults.alphabet),
        };
        if secrets.standard_length == 0 || secrets.high_length == 0 {
            bail!("secret lengths must be greater than zero");
        }

        let owner = (self.owner.uid.is_some() || self.owner.gid.is_some()).then_some(self.owner);

        Ok(Settings {
            services_dir,
            runtime_binary,
            host_ip: self.host.ip.filter(|ip| !ip.trim().is_empty()),
            timezone: self.host.timezone.filter(|tz| !tz.trim().is_empty()),
            secrets,
            owner,
        })
    }
}

pub fn config_path(config_dir: &Path) -> PathBuf {
    config_dir.join(CONFIG_FILE_NAME)
}

pub fn load_app_config(config_dir: &Path) -> Result<AppConfig> {
    let path = config_path(config_dir);
    if !path.exists() {
        return Ok(AppConfig::default());
    }

    let content = fs::read_to_string(&path).with_context(|| format!("reading {:?}", path))?;
    toml::from_str(&content).with_context(|| format!("parsing {:?}", path))
}

pub fn load_settings(config_dir: &Path) -> Result<Settings> {
    load_app_config(config_dir)?
        .into_settings()
        .with_context(|| format!("validating {:?}", config_path(config_dir)))
}

/// Writes the commented default config unless one already exists.
/// Returns whether a file was written.
pub fn install_default_config(config_dir: &Path) -> Result<bool> {
    ensure_config_dir(config_dir)?;

    let target = config_path(config_dir);
    if target.exists() {
        return Ok(false);
    }

    fs::write(&target, DEFAULT_CONFIG_TOML)
        .with_context(|| format!("writing default config to {:?}", target))?;

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let settings = AppConfig::default().into_settings().unwrap();

        assert_eq!(settings.runtime_binary, "docker");
        assert_eq!(settings.secrets, SecretPolicy::default());
        assert!(settings.services_dir.ends_with("pistack"));
        assert!(settings.owner.is_none());
        assert!(settings.host_ip.is_none());
    }

    #[test]
    fn parses_all_sections() {
        let toml = r#"
[paths]
services_dir = "/srv/pistack"

[runtime]
binary = "podman"

[host]
ip = "192.168.1.10"
timezone = "Europe/Berlin"

[secrets]
standard_length = 16
alphabet = "extended"

[owner]
gid = 1000
"#;
        let config: AppConfig = toml::from_str(toml).unwrap();
        let settings = config.into_settings().unwrap();

        assert_eq!(settings.services_dir, PathBuf::from("/srv/pistack"));
        assert_eq!(settings.runtime_binary, "podman");
        assert_eq!(settings.host_ip.as_deref(), Some("192.168.1.10"));
        assert_eq!(settings.timezone.as_deref(), Some("Europe/Berlin"));
        assert_eq!(settings.secrets.standard_length, 16);
        assert_eq!(settings.secrets.high_length, 24);
        assert_eq!(settings.secrets.alphabet, Alphabet::Extended);
        assert_eq!(
            settings.owner,
            Some(OwnerConfig {
                uid: None,
                gid: Some(1000)
            })
        );
    }

    #[test]
    fn rejects_relative_services_dir() {
        let config: AppConfig = toml::from_str("[paths]\nservices_dir = \"pistack\"\n").unwrap();
        assert!(config.into_settings().is_err());
    }

    #[test]
    fn rejects_zero_secret_length() {
        let config: AppConfig = toml::from_str("[secrets]\nhigh_length = 0\n").unwrap();
        assert!(config.into_settings().is_err());
    }

    #[test]
    fn rejects_unknown_sections() {
        assert!(toml::from_str::<AppConfig>("[databases]\npg = 1\n").is_err());
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings(dir.path()).unwrap();
        assert_eq!(settings.runtime_binary, "docker");
    }

    #[test]
    fn installs_default_config_once() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested");

        assert!(install_default_config(&target).unwrap());
        let written = fs::read_to_string(config_path(&target)).unwrap();
        assert_eq!(written, DEFAULT_CONFIG_TOML);

        fs::write(config_path(&target), "[runtime]\nbinary = \"podman\"\n").unwrap();
        assert!(!install_default_config(&target).unwrap());

        let settings = load_settings(&target).unwrap();
        assert_eq!(settings.runtime_binary, "podman");
    }

    #[test]
    fn default_template_parses() {
        let config: AppConfig = toml::from_str(DEFAULT_CONFIG_TOML).unwrap();
        assert!(config.into_settings().is_ok());
    }
}
