//! Credential records: one `NAME=value` line per generated secret.

use crate::domain::SecretSet;
use crate::domain::secret::GeneratedSecret;
use crate::error::{Error, Result};
use crate::infra::layout::{PRIVATE_MODE, ServiceLayout};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

pub fn read(path: &Path) -> Result<SecretSet> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(parse(&content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(SecretSet::default()),
        Err(e) => Err(Error::io(path, e)),
    }
}

pub fn write(layout: &ServiceLayout, path: &Path, secrets: &SecretSet) -> Result<()> {
    layout.write_atomic(path, &render(secrets), PRIVATE_MODE)
}

fn parse(content: &str) -> SecretSet {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(name, value)| GeneratedSecret {
            name: name.trim().to_string(),
            value: value.to_string(),
        })
        .collect()
}

fn render(secrets: &SecretSet) -> String {
    let mut out = String::from("# generated by pistack; delete together with the manifest\n");
    for (name, value) in secrets.iter() {
        out.push_str(name);
        out.push('=');
        out.push_str(value);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    #[test]
    fn missing_record_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let secrets = read(&dir.path().join("nope.credentials")).unwrap();
        assert!(secrets.is_empty());
    }

    #[test]
    fn written_record_is_owner_only_and_readable_back() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ServiceLayout::new(dir.path(), None);
        let path = dir.path().join("wikijs.credentials");
        let secrets: SecretSet = [GeneratedSecret {
            name: "WIKIJS_DB_PASSWORD".into(),
            value: "a=b+c".into(),
        }]
        .into_iter()
        .collect();

        write(&layout, &path, &secrets).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
        assert_eq!(read(&path).unwrap(), secrets);
    }

    #[test]
    fn parse_skips_comments_and_garbage() {
        let secrets = parse("# header\n\nGARBAGE\nPIHOLE_PASSWORD=abc\n");
        assert_eq!(secrets.get("PIHOLE_PASSWORD"), Some("abc"));
        assert!(!secrets.contains("GARBAGE"));
    }
}
