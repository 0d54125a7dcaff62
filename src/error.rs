use thiserror::Error;

#[derive(Debug, Error)]
pub enum HmmError {
    #[error("I/O error while {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error while {context}: {source}")]
    Json {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("{context}: line {line}: {message}")]
    Parse {
        context: &'static str,
        line: usize,
        message: String,
    },
    #[error("invalid model: {message}")]
    InvalidModel { message: String },
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

impl HmmError {
    pub(crate) fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }

    pub(crate) fn json(context: &'static str, source: serde_json::Error) -> Self {
        Self::Json { context, source }
    }

    pub(crate) fn parse(context: &'static str, line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            context,
            line,
            message: message.into(),
        }
    }

    pub(crate) fn invalid_model(message: impl Into<String>) -> Self {
        Self::InvalidModel {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context() {
        let err = HmmError::io(
            "read model file",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(err.to_string(), "I/O error while read model file: gone");

        let err = HmmError::parse("read path table", 7, "expected integer");
        assert_eq!(err.to_string(), "read path table: line 7: expected integer");
    }

    #[test]
    fn invalid_input_message() {
        let err = HmmError::invalid_input("steps must be >= 1");
        assert!(matches!(err, HmmError::InvalidInput { .. }));
        assert_eq!(err.to_string(), "invalid input: steps must be >= 1");
    }
}
