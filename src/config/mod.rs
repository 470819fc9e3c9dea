//! Configuration management module
//!
//! Runtime settings come from the environment; the provider registry is
//! loaded from a JSON file at startup.

pub mod file;
pub mod settings;

pub use file::{AppConfig, ProviderConfig, ServerConfig, WireFamily};
pub use settings::{AdmissionSettings, Settings};
