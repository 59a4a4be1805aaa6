//! Error type shared by the particle, registry and orbit modules

use thiserror::Error;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Malformed vector, bad mass/radius, or an `add` call with neither
    /// cartesian state nor orbital elements
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Lookup by index or name that does not match a registered particle
    #[error("particle does not exist: {0}")]
    NotFound(String),

    /// Scenario file that could not be parsed
    #[error("scenario config: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }
}
