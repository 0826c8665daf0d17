//! TagWizard: multi-label tag prediction for free-text questions.
//!
//! The [`Tagger`] wraps a fine-tuned sequence classifier exported to ONNX.
//! A question is tokenized, run through the model once, the logits are
//! passed through a sigmoid and the highest-probability labels are returned.
//!
//! # Basic Usage
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use tagwizard::{BuiltinModel, ModelManager, Tagger};
//!
//! let manager = ModelManager::new_default()?;
//! let tagger = Tagger::builder()
//!     .with_model(BuiltinModel::StackExchangeDistilBert, &manager)?
//!     .build()?;
//!
//! for tag in tagger.predict("How do I read a file line by line in Rust?")? {
//!     println!("{}: {:.2}", tag.tag, tag.score);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! The HTTP side lives in [`web`] (pages, session auth, `/get_tags`) and
//! [`login_api`] (the standalone `/api/login` service).

pub mod auth;
pub mod config;
pub mod login_api;
pub mod model_manager;
pub mod models;
mod runtime;
mod shutdown;
pub mod store;
pub mod tagger;
pub mod web;

pub use config::{AppConfig, ConfigError, DatabaseConfig, LoginApiConfig};
pub use model_manager::{ModelError, ModelManager};
pub use models::{BuiltinModel, ModelCharacteristics, ModelInfo};
pub use runtime::{create_session_builder, RuntimeConfig};
pub use shutdown::shutdown_signal;
pub use tagger::{LabelSet, TagPredictor, TagScore, Tagger, TaggerBuilder, TaggerError, TaggerInfo};

/// Initialise `env_logger`, defaulting to `info` when `RUST_LOG` is unset.
pub fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}
