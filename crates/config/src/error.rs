use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {var}: \"{value}\" ({reason})")]
    InvalidValue {
        var: String,
        value: String,
        reason: String,
    },

    #[error("Unknown store backend: {0}. Must be one of: postgres, memory")]
    UnknownStoreBackend(String),
}
