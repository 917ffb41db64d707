use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("failed to spawn search worker: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("needle too long: {len} bytes exceeds {max} bytes")]
    NeedleTooLong { len: usize, max: usize },

    #[error("corpus length mismatch: {keys} keys for {haystacks} haystacks")]
    LengthMismatch { keys: usize, haystacks: usize },
}

/// Errors that can occur when loading or saving search config.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}
