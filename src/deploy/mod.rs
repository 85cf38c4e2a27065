//! Deployment contract: the two-unit container topology, the environment it
//! is parameterised by, and the driver that hands it to Docker Compose.
//!
//! - [`descriptor`] - Runtime units, named volume, Compose rendering
//! - [`env`] - Binding the required variables from process env and `.env`
//! - [`orchestrator`] - `up`, `down`, `down -v` and one-off `exec`

pub mod descriptor;
pub mod env;
pub mod orchestrator;

use std::path::PathBuf;
use thiserror::Error;

pub use descriptor::{Descriptor, Interpolation, RuntimeUnit};
pub use env::StackEnv;
pub use orchestrator::{ComposeCli, Orchestrator, Teardown, UpOptions};

#[derive(Debug, Error)]
pub enum StackError {
    #[error("required environment variables are not set: {}", .0.join(", "))]
    MissingVariables(Vec<String>),

    #[error("{name} must be a port number between 1 and 65535, got '{value}'")]
    InvalidPort { name: String, value: String },

    #[error("duplicate runtime unit '{0}'")]
    DuplicateUnit(String),

    #[error("unit '{unit}' depends on unknown unit '{dependency}'")]
    UnknownDependency { unit: String, dependency: String },

    #[error("dependency cycle between units: {}", .0.join(", "))]
    DependencyCycle(Vec<String>),

    #[error("unit '{unit}' mounts undeclared volume '{volume}'")]
    UndeclaredVolume { unit: String, volume: String },

    #[error("volume '{volume}' is mounted by more than one unit: {}", .units.join(", "))]
    SharedVolume { volume: String, units: Vec<String> },

    #[error("failed to render compose document: {0}")]
    Render(#[from] serde_yaml::Error),

    #[error("failed to read env file {}: {source}", .path.display())]
    EnvFile {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },

    #[error("failed to run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{command}' exited with {}", .code.map_or_else(|| "a signal".to_string(), |c| format!("status {c}")))]
    CommandFailed { command: String, code: Option<i32> },
}
