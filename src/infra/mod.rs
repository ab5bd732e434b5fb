pub mod config;
pub mod credentials;
pub mod docker_adapter;
pub mod host;
pub mod layout;
pub mod openssl;

pub use docker_adapter::DockerAdapter;
pub use layout::ServiceLayout;
pub use openssl::OpensslIssuer;
