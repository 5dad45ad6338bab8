/// Error returned when a record cannot be turned into an event.
///
/// Any of these drops the whole record: nothing is submitted and the
/// writer reports zero bytes consumed.
#[derive(thiserror::Error, Debug)]
pub enum ParseError {
    #[error("malformed record: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("record has no `{0}` field")]
    MissingField(String),
}

impl From<ParseError> for std::io::Error {
    fn from(err: ParseError) -> Self {
        std::io::Error::new(std::io::ErrorKind::InvalidData, err)
    }
}

/// Error type returned when building a [`WriterConfig`](crate::config::WriterConfig)
/// from text or the environment.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown log level `{0}`")]
    UnknownLevel(String),

    #[error("invalid flush timeout `{0}`, expected milliseconds")]
    InvalidTimeout(String),
}

/// Error type returned when installing the global subscriber.
#[derive(thiserror::Error, Debug)]
pub enum InitError {
    #[error("failed to set global subscriber: {0}")]
    SetGlobalDefault(#[from] tracing::subscriber::SetGlobalDefaultError),
}
