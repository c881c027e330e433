//! # ran-cu-operator
//!
//! Kubernetes operator for an OAI RAN Central Unit.
//!
//! Each invocation observes the unit (leadership, charm config, relations,
//! workload container, cluster objects), reports a single status and, when
//! the unit is ready, converges the environment: renders `cu.conf`, keeps the
//! Pebble layer in place, restarts the CU on config change, grants the
//! privileged security context, creates the N3 route and publishes relation
//! data.

pub mod config;
pub mod error;
pub mod hook_tools;
pub mod logging;
pub mod network;
pub mod operator;
pub mod pebble;
mod process;
pub mod relations;
pub mod render;
pub mod workload;

pub use error::{OperatorError, Result};
pub use operator::{dispatch, Context, Trigger};
