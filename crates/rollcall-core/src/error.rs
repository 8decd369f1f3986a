//! Errors for shared types and configuration loading.
//!
//! Extraction failures live in `rollcall-scanner`; browser failures in
//! `rollcall-browser`.

use thiserror::Error;

/// Errors raised while building shared values.
#[derive(Error, Debug)]
pub enum RollcallError {
    /// Config could not be loaded
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Text that should have been a single http(s) URL was not.
    #[error("invalid source URL: '{0}'")]
    InvalidSource(String),
}

/// Failures reading, parsing or checking the config file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No home directory to anchor the default config path
    #[error("could not determine config directory")]
    NoConfigDir,

    /// Malformed TOML
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config could not be rendered back to TOML
    #[error("failed to write config TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Reading or writing the file failed
    #[error("config file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// A value that parses but cannot be used
    #[error("invalid config value for {field}: {reason}")]
    InvalidValue {
        /// Dotted path of the offending key
        field: String,
        /// What was wrong with it
        reason: String,
    },
}

/// Result alias for shared operations.
pub type Result<T> = std::result::Result<T, RollcallError>;

/// Result alias for config loading.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
