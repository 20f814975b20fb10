use kyoshi_types::GrammarInput;
use tokio::sync::mpsc;

pub mod gemini;
pub mod prompt;

pub use gemini::GeminiClient;

/// Finite, non-restartable sequence of streamed text fragments. The sender
/// side closes the channel when the stream ends; dropping the receiver
/// aborts the underlying request.
pub type ChunkStream = mpsc::Receiver<Result<String, TutorError>>;

/// Model-calling collaborator.
#[async_trait::async_trait]
pub trait Tutor: Send + Sync {
    /// Streamed grammar analysis of text or an image of text. Fragments
    /// arrive in order; the stream may end with a failure item.
    async fn explain_grammar(&self, input: &GrammarInput) -> Result<ChunkStream, TutorError>;

    /// Single-shot vocabulary explanation.
    async fn explain_vocabulary(&self, word: &str) -> Result<String, TutorError>;

    /// Provider metadata
    fn metadata(&self) -> ProviderMetadata;
}

#[derive(Debug, Clone)]
pub struct ProviderMetadata {
    pub name: String,
    pub model: String,
    pub requires_api_key: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum TutorError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("GEMINI_API_KEY is not set")]
    MissingApiKey,

    #[error("model returned an empty response")]
    EmptyResponse,
}
