pub mod catalog;
pub mod compose;
mod container;
pub mod secret;
mod selection;
mod templates;
pub mod traits;

pub use catalog::{HostParams, RenderContext, ServiceDefinition, ServiceId};
pub use compose::ComposeFile;
pub use container::{Container, ServiceState};
pub use secret::{Alphabet, SecretPolicy, SecretSet, SecretSpec, Sensitivity};
pub use selection::SelectionSet;
pub use traits::{CertificateIssuer, CertificateRequest, ContainerRuntime};
