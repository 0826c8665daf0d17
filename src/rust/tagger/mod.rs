mod error;
mod encoding;
mod labels;
#[allow(clippy::module_inception)]
mod tagger;
pub mod builder;
mod utils;

pub use error::TaggerError;
pub use labels::LabelSet;
pub use tagger::{rank_tags, TagPredictor, TagScore, Tagger};
pub use builder::{TaggerBuilder, DEFAULT_TOP_K};

/// Information about the current state and configuration of a tagger
#[derive(Debug, Clone)]
pub struct TaggerInfo {
    /// Name reported alongside predictions
    pub model_name: String,
    /// Path to the ONNX model file
    pub model_path: String,
    /// Path to the tokenizer file
    pub tokenizer_path: String,
    /// Path to the label set
    pub labels_path: String,
    /// Number of tags the model can predict
    pub num_labels: usize,
    /// Number of tags returned per prediction
    pub top_k: usize,
    /// Tokens kept after truncation
    pub max_sequence_length: usize,
}
