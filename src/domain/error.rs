//! Domain error types.

/// Top-level error type for signalbook.
#[derive(Debug, thiserror::Error)]
pub enum SignalbookError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("data error in {source_name} at line {line}: {reason}")]
    DataParse {
        source_name: String,
        line: u64,
        reason: String,
    },

    #[error("no observations in {source_name}")]
    NoData { source_name: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SignalbookError {
    pub(crate) fn invalid_parameter(name: &str, reason: impl Into<String>) -> Self {
        SignalbookError::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&SignalbookError> for std::process::ExitCode {
    fn from(err: &SignalbookError) -> Self {
        let code: u8 = match err {
            SignalbookError::Io(_) => 1,
            SignalbookError::ConfigParse { .. }
            | SignalbookError::ConfigMissing { .. }
            | SignalbookError::ConfigInvalid { .. } => 2,
            SignalbookError::InvalidParameter { .. } => 3,
            SignalbookError::DataParse { .. } | SignalbookError::NoData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
