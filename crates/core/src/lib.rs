pub mod artifact;
pub mod config;
pub mod util;

pub use artifact::Artifact;
pub use config::ActionConfig;
