//! Configuration
//!
//! Two kinds of configuration live here: the charm options validated on
//! every invocation ([`validate`]) and the operator's own runtime
//! [`Settings`].

mod loader;
mod types;
mod validation;

pub use loader::{
    ConfigLoader, HookToolSettings, KubernetesSettings, LoggingSettings, PebbleSettings,
    Settings, WorkloadSettings,
};
pub use types::{CniType, ConfigValue, RawConfig, TypedConfig};
pub use validation::{defaults, validate, FieldErrors};
pub(crate) use validation::{MCC_PATTERN, MNC_PATTERN};
