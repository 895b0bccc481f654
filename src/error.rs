use thiserror::Error;

/// Problems with the settings a run was started with. Always raised before
/// any request goes out.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be set (flag or environment variable)")]
    Missing { name: &'static str },

    #[error("invalid value {value:?} for {name}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Reasons a README section cannot be replaced.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpliceError {
    #[error("marker '{marker}' not found in document")]
    MissingMarker { marker: String },

    #[error("marker '{marker}' appears more than once in document")]
    DuplicateMarker { marker: String },

    #[error("end marker '{end}' appears before start marker '{start}'")]
    MarkersOutOfOrder { start: String, end: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;
