pub mod cli;
pub mod domain;
pub mod error;
pub mod infra;
pub mod services;

// Make test_support available for integration tests
pub mod test_support;

pub use domain::{
    Container, ContainerRuntime, HostParams, SelectionSet, ServiceDefinition, ServiceId,
    ServiceState,
};
pub use error::{Error, Result};
pub use infra::DockerAdapter;
pub use services::{
    Action, CatalogResolver, LifecycleController, ManifestFile, Outcome, Reconciler,
    ServiceOutcome,
};
