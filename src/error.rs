use thiserror::Error;

/// Errors raised by the I/O edges of the crate (corpora, config, results log).
///
/// The typing engine itself never fails: bad input is ignored and degenerate
/// numbers fall back to fixed values.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("results log error: {0}")]
    Csv(#[from] csv::Error),

    #[error("corpus file not found: {0}")]
    MissingCorpus(String),

    #[error("corpus `{0}` has no entries")]
    EmptyCorpus(String),

    #[error("could not resolve an application directory")]
    NoAppDir,
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_convert() {
        let err: Error = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(err.to_string(), "I/O error: gone");
    }

    #[test]
    fn corpus_messages() {
        assert_eq!(
            Error::MissingCorpus("quotes.json".into()).to_string(),
            "corpus file not found: quotes.json"
        );
        assert_eq!(
            Error::EmptyCorpus("normal".into()).to_string(),
            "corpus `normal` has no entries"
        );
    }
}
