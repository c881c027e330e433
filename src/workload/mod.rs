//! Workload container
//!
//! File access, command execution and process supervision inside the CU
//! container. The production implementation talks to Pebble
//! ([`crate::pebble::PebbleClient`]); tests use in-memory fakes.

mod layer;

pub use layer::{desired_layer, Layer, Service};

use crate::error::Result;

/// Operations on the workload container
#[cfg_attr(test, mockall::automock)]
pub trait Workload {
    /// The container's supervisor answers
    fn can_connect(&self) -> bool;

    /// A path exists in the container
    fn exists(&self, path: &str) -> Result<bool>;

    /// Read a file; `None` when it does not exist
    fn pull(&self, path: &str) -> Result<Option<String>>;

    /// Write a file, replacing any previous content
    fn push(&self, path: &str, content: &str) -> Result<()>;

    /// Run a command to completion and return its standard output
    fn exec(&self, command: &[String]) -> Result<String>;

    /// Current supervision plan
    fn plan(&self) -> Result<Layer>;

    /// Add (or combine) a layer under `label`
    fn add_layer(&self, label: &str, layer: &Layer) -> Result<()>;

    /// Bring running services in line with the plan
    fn replan(&self) -> Result<()>;

    /// Restart a service
    fn restart(&self, service: &str) -> Result<()>;
}
