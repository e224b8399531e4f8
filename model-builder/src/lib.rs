pub mod config;
pub mod job;

pub use config::BuilderConfig;
pub use job::{build_model, BuildError, BuildReport};
