use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ColorError {
    #[error("color `{0}` must start with `#`")]
    MissingHash(String),
    #[error("color `{0}` must have 6 or 8 hex digits")]
    BadLength(String),
    #[error("color `{0}` contains a non-hex digit")]
    BadDigit(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config `{path}`: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog `{path}`: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unknown category `{0}`")]
    UnknownCategory(String),
    #[error("project #{index}: {reason}")]
    InvalidProject { index: usize, reason: String },
    #[error("duplicate project id `{0}`")]
    DuplicateId(String),
}
