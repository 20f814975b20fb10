use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use futures_util::StreamExt;
use kyoshi_config::tutor::TutorConfig;
use kyoshi_types::GrammarInput;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::{ChunkStream, ProviderMetadata, Tutor, TutorError, prompt};

/// Gemini REST client. Grammar requests use the SSE streaming endpoint,
/// vocabulary requests the single-shot one.
#[derive(Clone)]
pub struct GeminiClient {
    config: TutorConfig,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: TutorConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self, method: &str) -> String {
        format!(
            "{}/models/{}:{}",
            self.config.api_url, self.config.model, method
        )
    }

    fn require_key(&self) -> Result<&str, TutorError> {
        if self.config.api_key.is_empty() {
            return Err(TutorError::MissingApiKey);
        }
        Ok(&self.config.api_key)
    }

    fn request_for(&self, input: &GrammarInput) -> GenerateRequest {
        let mut parts = vec![Part::text(prompt::grammar_prompt(input))];
        if let GrammarInput::Image { data, mime, .. } = input {
            parts.push(Part::inline(mime.clone(), BASE64.encode(data)));
        }
        GenerateRequest::new(parts)
    }
}

#[async_trait::async_trait]
impl Tutor for GeminiClient {
    async fn explain_grammar(&self, input: &GrammarInput) -> Result<ChunkStream, TutorError> {
        let key = self.require_key()?.to_string();
        let url = format!("{}?alt=sse&key={key}", self.endpoint("streamGenerateContent"));
        let body = self.request_for(input);

        let (tx, rx) = mpsc::channel(32);
        let client = self.client.clone();
        tokio::spawn(async move {
            if let Err(e) = stream_sse(client, &url, body, &tx).await {
                // receiver may already be gone; nothing to do then
                let _ = tx.send(Err(e)).await;
            }
        });

        Ok(rx)
    }

    async fn explain_vocabulary(&self, word: &str) -> Result<String, TutorError> {
        let key = self.require_key()?;
        let url = format!("{}?key={key}", self.endpoint("generateContent"));
        let body = GenerateRequest::new(vec![Part::text(prompt::vocabulary_prompt(word))]);

        let response = self.client.post(&url).json(&body).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(TutorError::Api(format!("{status}: {detail}")));
        }

        let parsed: GenerateResponse = response.json().await?;
        let text = parsed.text();
        if text.is_empty() {
            return Err(TutorError::EmptyResponse);
        }
        Ok(text)
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            name: "gemini".to_string(),
            model: self.config.model.clone(),
            requires_api_key: true,
        }
    }
}

/// Forward SSE `data:` payload text into the chunk channel. Event payloads
/// can split across network reads, so lines are reassembled from a buffer.
/// Stops when the receiver is dropped.
async fn stream_sse(
    client: reqwest::Client,
    url: &str,
    body: GenerateRequest,
    tx: &mpsc::Sender<Result<String, TutorError>>,
) -> Result<(), TutorError> {
    let response = client.post(url).json(&body).send().await?;
    if !response.status().is_success() {
        let status = response.status();
        let detail = response.text().await.unwrap_or_default();
        return Err(TutorError::Api(format!("{status}: {detail}")));
    }

    let mut bytes = response.bytes_stream();
    let mut buffer = String::new();
    while let Some(chunk) = bytes.next().await {
        let chunk = chunk?;
        buffer.push_str(&String::from_utf8_lossy(&chunk));

        while let Some(pos) = buffer.find('\n') {
            let line = buffer[..pos].trim_end_matches('\r').to_string();
            buffer.drain(..pos + 1);

            let Some(payload) = line.strip_prefix("data:") else {
                continue;
            };
            let payload = payload.trim();
            if payload.is_empty() || payload == "[DONE]" {
                continue;
            }

            match serde_json::from_str::<GenerateResponse>(payload) {
                Ok(event) => {
                    let text = event.text();
                    if !text.is_empty() && tx.send(Ok(text)).await.is_err() {
                        tracing::debug!("chunk receiver dropped, aborting stream");
                        return Ok(());
                    }
                }
                Err(e) => tracing::warn!("skipping unparseable SSE event: {e}"),
            }
        }
    }

    Ok(())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    system_instruction: Content,
}

impl GenerateRequest {
    fn new(parts: Vec<Part>) -> Self {
        Self {
            contents: vec![Content { parts }],
            system_instruction: Content {
                parts: vec![Part::text(prompt::SYSTEM_PROMPT.to_string())],
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(rename = "inlineData", skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

impl Part {
    fn text(text: String) -> Self {
        Self {
            text: Some(text),
            inline_data: None,
        }
    }

    fn inline(mime_type: String, data: String) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData { mime_type, data }),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate's parts.
    fn text(&self) -> String {
        self.candidates
            .first()
            .map(|candidate| {
                candidate
                    .content
                    .parts
                    .iter()
                    .filter_map(|part| part.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}
