//! `selah-llm` — text generation for weekly recaps.
//!
//! The rest of the workspace talks to the model through one seam, the
//! [`TextGenerator`] trait: a system prompt and a user prompt in, raw text
//! out. [`ModelClient`] is the production implementation, speaking the
//! OpenAI-compatible `/chat/completions` protocol so vLLM, Ollama, and hosted
//! APIs are all interchangeable via configuration. Validation of the reply is
//! deliberately not this crate's job; callers own their output contract.

pub mod client;
pub mod error;

pub use client::ModelClient;
pub use error::LlmError;

use futures::future::BoxFuture;

/// Convenience `Result` alias for this crate.
pub type Result<T> = std::result::Result<T, LlmError>;

/// A source of generated text. Object-safe so handlers can hold a
/// `dyn TextGenerator` and tests can substitute a scripted one.
pub trait TextGenerator: Send + Sync {
    fn generate<'a>(&'a self, system_prompt: &'a str, user_prompt: &'a str) -> BoxFuture<'a, Result<String>>;
}
