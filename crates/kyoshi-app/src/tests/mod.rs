use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use kanal::{AsyncReceiver, AsyncSender};
use kyoshi_config::Config;
use kyoshi_storage::{KeyValueStore, MemoryStore};
use kyoshi_tutor::{ChunkStream, ProviderMetadata, Tutor, TutorError};
use kyoshi_types::{AppEvent, GrammarInput};
use tokio::sync::mpsc;
use tokio::time::timeout;

use crate::state::AppState;

mod session_flow_tests;

pub fn test_state(store: Arc<dyn KeyValueStore>) -> Arc<AppState> {
    Arc::new(AppState::new(Config::new(), store))
}

pub fn test_channels() -> (AsyncSender<AppEvent>, AsyncReceiver<AppEvent>) {
    kanal::unbounded_async::<AppEvent>()
}

pub async fn recv_event(rx: &AsyncReceiver<AppEvent>) -> AppEvent {
    timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for event")
        .expect("channel closed")
}

#[derive(Clone)]
pub enum ScriptStep {
    /// Deliver one stream fragment.
    Chunk(&'static str),
    /// Fail the stream.
    Fail(&'static str),
    /// Keep the stream open until the receiver is dropped.
    Hold,
}

/// Tutor double that replays one scripted stream per explain call.
pub struct ScriptedTutor {
    scripts: Mutex<VecDeque<Vec<ScriptStep>>>,
}

impl ScriptedTutor {
    pub fn new(scripts: Vec<Vec<ScriptStep>>) -> Arc<Self> {
        Arc::new(Self {
            scripts: Mutex::new(scripts.into()),
        })
    }

    pub fn empty() -> Arc<Self> {
        Self::new(Vec::new())
    }
}

#[async_trait::async_trait]
impl Tutor for ScriptedTutor {
    async fn explain_grammar(&self, _input: &GrammarInput) -> Result<ChunkStream, TutorError> {
        let steps = self
            .scripts
            .lock()
            .expect("script lock poisoned")
            .pop_front()
            .unwrap_or_default();

        let (tx, rx) = mpsc::channel(8);
        tokio::spawn(async move {
            for step in steps {
                match step {
                    ScriptStep::Chunk(fragment) => {
                        if tx.send(Ok(fragment.to_string())).await.is_err() {
                            return;
                        }
                    }
                    ScriptStep::Fail(message) => {
                        let _ = tx.send(Err(TutorError::Api(message.to_string()))).await;
                        return;
                    }
                    ScriptStep::Hold => {
                        tx.closed().await;
                        return;
                    }
                }
            }
        });
        Ok(rx)
    }

    async fn explain_vocabulary(&self, word: &str) -> Result<String, TutorError> {
        Ok(format!("definition of {word}"))
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            name: "scripted".to_string(),
            model: "none".to_string(),
            requires_api_key: false,
        }
    }
}

pub fn memory_store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::new())
}
