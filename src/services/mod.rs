pub mod lifecycle;
pub mod outcome;
pub mod reconciler;
pub mod resolver;

pub use lifecycle::{Action, LifecycleController};
pub use outcome::{Outcome, ServiceOutcome, any_failed};
pub use reconciler::Reconciler;
pub use resolver::{CatalogResolver, ManifestFile};
