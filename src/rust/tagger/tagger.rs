use std::sync::Arc;
use ort::session::Session;
use tokenizers::Tokenizer;
use ndarray::Array1;
use serde::Serialize;

use super::error::TaggerError;
use super::encoding::SequenceClassification;
use super::labels::LabelSet;
use super::utils::{sigmoid, top_k_indices};

/// A predicted tag and its sigmoid probability.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagScore {
    pub tag: String,
    pub score: f32,
}

/// Anything that can turn a question into ranked tags.
///
/// The HTTP layer holds one of these so it does not depend on ONNX directly.
pub trait TagPredictor: Send + Sync {
    /// Returns the highest-scoring tags for `text`, best first.
    fn predict(&self, text: &str) -> Result<Vec<TagScore>, TaggerError>;

    /// Name reported to clients alongside predictions.
    fn model_name(&self) -> &str;
}

/// A thread-safe multi-label tagger backed by an ONNX sequence classifier.
///
/// # Thread Safety
///
/// This type is automatically `Send + Sync`: the tokenizer, session and
/// label set are immutable after construction and shared through `Arc`.
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use tagwizard::Tagger;
///
/// let tagger = Tagger::builder()
///     .with_model_dir("models/distilbert-finetuned-stackexchange-multi-label", 512)?
///     .with_top_k(5)?
///     .build()?;
///
/// let tags = tagger.predict_tags("How do I reverse a list in Python?")?;
/// println!("{:?}", tags);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Tagger {
    pub model_name: String,
    pub model_path: String,
    pub tokenizer_path: String,
    pub labels_path: String,
    pub tokenizer: Arc<Tokenizer>,
    pub session: Arc<Session>,
    pub labels: Arc<LabelSet>,
    pub top_k: usize,
    pub max_sequence_length: usize,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<Tagger>();
    }
};

impl SequenceClassification for Tagger {
    fn tokenizer(&self) -> Option<&Tokenizer> {
        Some(&*self.tokenizer)
    }

    fn session(&self) -> Option<&Session> {
        Some(&*self.session)
    }

    fn max_sequence_length(&self) -> Option<usize> {
        Some(self.max_sequence_length)
    }
}

impl Tagger {
    /// Creates a new TaggerBuilder for fluent construction
    pub fn builder() -> super::builder::TaggerBuilder {
        super::builder::TaggerBuilder::new()
    }

    /// Returns information about the tagger's current state
    pub fn info(&self) -> super::TaggerInfo {
        super::TaggerInfo {
            model_name: self.model_name.clone(),
            model_path: self.model_path.clone(),
            tokenizer_path: self.tokenizer_path.clone(),
            labels_path: self.labels_path.clone(),
            num_labels: self.labels.len(),
            top_k: self.top_k,
            max_sequence_length: self.max_sequence_length,
        }
    }

    /// Returns the number of tokens the model sees for `text`, after truncation.
    pub fn count_tokens(&self, text: &str) -> Result<usize, TaggerError> {
        SequenceClassification::count_tokens(self, text)
    }

    /// Predicts the top-k tags for `text` with their probabilities.
    ///
    /// # Errors
    /// - `ValidationError` if `text` is empty or only whitespace
    /// - `TokenizerError` / `ModelError` if tokenization or inference fails
    /// - `PredictionError` if the model output does not match the label set
    pub fn predict(&self, text: &str) -> Result<Vec<TagScore>, TaggerError> {
        if text.trim().is_empty() {
            return Err(TaggerError::ValidationError("Input text cannot be empty".into()));
        }

        let logits = self.logits_for_text(text)?;
        log::debug!("Raw logits: {:?}", logits);

        rank_tags(&logits, &self.labels, self.top_k)
    }

    /// Like [`Tagger::predict`] but returns only the tag names.
    pub fn predict_tags(&self, text: &str) -> Result<Vec<String>, TaggerError> {
        Ok(self.predict(text)?.into_iter().map(|t| t.tag).collect())
    }
}

impl TagPredictor for Tagger {
    fn predict(&self, text: &str) -> Result<Vec<TagScore>, TaggerError> {
        Tagger::predict(self, text)
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// Applies sigmoid to `logits` and maps the `k` best indices through `labels`.
pub fn rank_tags(
    logits: &Array1<f32>,
    labels: &LabelSet,
    k: usize,
) -> Result<Vec<TagScore>, TaggerError> {
    if logits.len() != labels.len() {
        return Err(TaggerError::PredictionError(format!(
            "Model produced {} logits but {} labels are loaded",
            logits.len(),
            labels.len()
        )));
    }

    let probs = sigmoid(logits);
    let top = top_k_indices(&probs, k);
    log::debug!("Top indices: {:?}", top);

    top.into_iter()
        .map(|i| {
            let tag = labels.get(i).ok_or_else(|| {
                TaggerError::PredictionError(format!("No label for index {}", i))
            })?;
            Ok(TagScore { tag: tag.to_string(), score: probs[i] })
        })
        .collect()
}
