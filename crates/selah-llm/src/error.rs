use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("model returned HTTP {status}: {body}")]
    BadStatus { status: u16, body: String },

    #[error("could not parse model response: {0}")]
    Parse(String),

    #[error("model returned no choices")]
    EmptyResponse,

    #[error("request timed out after {0}s")]
    Timeout(u64),
}
