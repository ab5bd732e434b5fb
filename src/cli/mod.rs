pub mod context;
pub mod install;
pub mod lifecycle;
pub mod report;
pub mod setup;

pub use context::AppContext;
