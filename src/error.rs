use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors produced by the catalog, reconciler and lifecycle layers.
#[derive(Error, Debug)]
pub enum Error {
    /// Identifier is not part of the catalog.
    #[error("unknown service '{0}'")]
    UnknownService(String),

    /// The runtime has no container with this name.
    #[error("'{0}' is not known to the container runtime")]
    NotFound(String),

    /// The runtime binary is missing or its daemon does not answer.
    #[error("container runtime unavailable: {0}")]
    RuntimeUnavailable(String),

    #[error("failed to generate {what} for {service}: {reason}")]
    GenerationFailure {
        service: String,
        what: String,
        reason: String,
    },

    /// A single-target operation received several targets.
    #[error("expected exactly one service, got {0}")]
    AmbiguousSelection(usize),

    #[error("runtime command failed with status {}: {output}", display_code(*code))]
    ExternalCommandFailure { code: Option<i32>, output: String },

    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("manifest serialization: {0}")]
    Manifest(#[from] serde_yml::Error),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn generation(
        service: impl Into<String>,
        what: impl Into<String>,
        reason: impl std::fmt::Display,
    ) -> Self {
        Self::GenerationFailure {
            service: service.into(),
            what: what.into(),
            reason: reason.to_string(),
        }
    }
}

fn display_code(code: Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "signal".to_string(),
    }
}
