use thiserror::Error;

/// Failures preparing the working environment
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot create working directory {path}: {source}")]
    WorkDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot create log directory {path}: {source}")]
    LogDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
