//! Error types (spec §7). Library code returns typed errors via
//! `thiserror`; binaries unwrap them into `anyhow::Result` at `main`.

use thiserror::Error;

/// Rejections from `RegisterPlayer` (spec §6).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("paddle side is already taken")]
    SideTaken,

    #[error("match has already started")]
    MatchInProgress,

    #[error("a player with this identity is already registered")]
    DuplicateIdentity,
}

impl From<RegistrationError> for tonic::Status {
    fn from(err: RegistrationError) -> Self {
        match err {
            RegistrationError::SideTaken | RegistrationError::DuplicateIdentity => {
                tonic::Status::already_exists(err.to_string())
            }
            RegistrationError::MatchInProgress => {
                tonic::Status::failed_precondition(err.to_string())
            }
        }
    }
}

/// Configuration loading failures, fatal at startup (spec §7).
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read configuration file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
}
