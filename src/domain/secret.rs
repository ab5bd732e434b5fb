use crate::error::{Error, Result};
use rand::Rng;
use serde::Deserialize;
use std::collections::BTreeMap;

const ALPHANUMERIC: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
// Safe inside YAML double-quoted scalars and unquoted shell words.
const EXTENDED: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_.+!@%";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alphabet {
    #[default]
    Alphanumeric,
    Extended,
}

impl Alphabet {
    pub fn chars(&self) -> &'static [u8] {
        match self {
            Self::Alphanumeric => ALPHANUMERIC,
            Self::Extended => EXTENDED,
        }
    }
}

/// How long a generated secret should be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sensitivity {
    /// Passwords a human types into a web UI.
    Standard,
    /// Database credentials and keys nobody types.
    High,
}

/// A secret a catalog entry needs before its manifest can be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecretSpec {
    pub name: &'static str,
    pub sensitivity: Sensitivity,
}

impl SecretSpec {
    pub const fn standard(name: &'static str) -> Self {
        Self {
            name,
            sensitivity: Sensitivity::Standard,
        }
    }

    pub const fn high(name: &'static str) -> Self {
        Self {
            name,
            sensitivity: Sensitivity::High,
        }
    }
}

/// Length and alphabet used for every generated secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecretPolicy {
    pub standard_length: usize,
    pub high_length: usize,
    pub alphabet: Alphabet,
}

impl Default for SecretPolicy {
    fn default() -> Self {
        Self {
            standard_length: 12,
            high_length: 24,
            alphabet: Alphabet::Alphanumeric,
        }
    }
}

impl SecretPolicy {
    pub fn length_for(&self, sensitivity: Sensitivity) -> usize {
        match sensitivity {
            Sensitivity::Standard => self.standard_length,
            Sensitivity::High => self.high_length,
        }
    }

    /// Generates a value for `spec`, uniformly random over the alphabet.
    pub fn generate(&self, service: &str, spec: &SecretSpec) -> Result<GeneratedSecret> {
        let length = self.length_for(spec.sensitivity);
        let value = random_string(length, self.alphabet.chars())
            .map_err(|reason| Error::generation(service, spec.name, reason))?;

        Ok(GeneratedSecret {
            name: spec.name.to_string(),
            value,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedSecret {
    pub name: String,
    pub value: String,
}

/// Secrets for one service, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecretSet {
    values: BTreeMap<String, String>,
}

impl SecretSet {
    pub fn insert(&mut self, secret: GeneratedSecret) {
        self.values.insert(secret.name, secret.value);
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Value for a secret the catalog declared. Rendering only happens after
    /// every declared secret is present, so a miss is a generation failure.
    pub fn require(&self, service: &str, name: &str) -> Result<&str> {
        self.get(name)
            .ok_or_else(|| Error::generation(service, name, "secret missing at render time"))
    }
}

impl FromIterator<GeneratedSecret> for SecretSet {
    fn from_iter<T: IntoIterator<Item = GeneratedSecret>>(iter: T) -> Self {
        let mut set = Self::default();
        for secret in iter {
            set.insert(secret);
        }
        set
    }
}

fn random_string(length: usize, alphabet: &[u8]) -> std::result::Result<String, &'static str> {
    if length == 0 {
        return Err("secret length must be greater than zero");
    }
    if alphabet.is_empty() {
        return Err("empty alphabet");
    }

    let mut rng = rand::rng();
    Ok((0..length)
        .map(|_| alphabet[rng.random_range(0..alphabet.len())] as char)
        .collect())
}
