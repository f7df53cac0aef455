//! Layered configuration
//!
//! Three layers, later layers win:
//! 1. Built-in defaults
//! 2. Repo config (`<repo>/.cca/report.toml`), optional
//! 3. CLI flags
//!
//! The merged document is kept as JSON for provenance and deserialized
//! into typed [`Settings`] for use.

mod defaults;
mod effective;
mod merge;
mod settings;

pub use defaults::BuiltinDefaults;
pub use effective::{ConfigError, ConfigOrigin, ConfigSource, EffectiveConfig};
pub use merge::{deep_merge, merge_layers};
pub use settings::{GateSettings, ReportSettings, RunnerSettings, Settings, ThresholdSetting};

/// Repo config location, relative to the repository root
pub const REPO_CONFIG_PATH: &str = ".cca/report.toml";
