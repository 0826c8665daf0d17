use ort::Error as OrtError;
use std::fmt;

/// Represents the different types of errors that can occur while tagging text.
#[derive(Debug)]
pub enum TaggerError {
    /// Error occurred while loading or using the tokenizer
    TokenizerError(String),
    /// Error occurred while loading or running the ONNX model
    ModelError(String),
    /// Error occurred during the build phase
    BuildError(String),
    /// Error occurred while making predictions
    PredictionError(String),
    /// Error occurred due to invalid input parameters
    ValidationError(String),
    /// Error occurred while loading or reading the label set
    LabelError(String),
}

impl fmt::Display for TaggerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TokenizerError(msg) => write!(f, "Tokenizer error: {}", msg),
            Self::ModelError(msg) => write!(f, "Model error: {}", msg),
            Self::BuildError(msg) => write!(f, "Build error: {}", msg),
            Self::PredictionError(msg) => write!(f, "Prediction error: {}", msg),
            Self::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            Self::LabelError(msg) => write!(f, "Label error: {}", msg),
        }
    }
}

impl std::error::Error for TaggerError {}

impl From<OrtError> for TaggerError {
    fn from(err: OrtError) -> Self {
        TaggerError::BuildError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes() {
        let err = TaggerError::ValidationError("Input text cannot be empty".into());
        assert_eq!(err.to_string(), "Validation error: Input text cannot be empty");

        let err = TaggerError::LabelError("no labels".into());
        assert_eq!(err.to_string(), "Label error: no labels");
    }
}
