use std::sync::Arc;

use kanal::{AsyncReceiver, AsyncSender};
use kyoshi_types::AppEvent;
use kyoshi_tutor::{GeminiClient, Tutor};

use crate::state::AppState;

pub mod explain_grammar;
pub mod explain_vocabulary;
pub mod library_ops;
pub mod session_ops;

use explain_grammar::handle_explain_grammar;
use explain_vocabulary::handle_explain_vocabulary;
use library_ops::{handle_delete, handle_reorder, handle_save_grammar, handle_save_vocabulary};
use session_ops::{handle_login, handle_logout, resolve_session};

/// App's main loop
pub async fn event_loop(
    state: Arc<AppState>,
    ui_to_app_rx: AsyncReceiver<AppEvent>,
    app_to_ui_tx: AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    let tutor: Arc<dyn Tutor> = {
        let config = state.config.read().await;
        if config.tutor.api_key.is_empty() {
            tracing::warn!("GEMINI_API_KEY is not set; explain commands will fail");
        }
        Arc::new(GeminiClient::new(config.tutor.clone()))
    };

    // Restore the persisted identity and its library before accepting
    // mutations; nothing persists while the session is unresolved.
    resolve_session(&state, &app_to_ui_tx).await?;

    tracing::info!("event loop started");
    loop {
        let event = ui_to_app_rx.recv().await?;
        handle_event(state.clone(), tutor.clone(), &app_to_ui_tx, event).await?;
    }
}

pub async fn handle_event(
    state: Arc<AppState>,
    tutor: Arc<dyn Tutor>,
    app_to_ui_tx: &AsyncSender<AppEvent>,
    event: AppEvent,
) -> anyhow::Result<()> {
    match event {
        AppEvent::Login(username) => {
            handle_login(&state, &username, app_to_ui_tx).await?;
        }
        AppEvent::Logout => {
            handle_logout(&state, app_to_ui_tx).await?;
        }
        AppEvent::ExplainGrammar(input) => {
            handle_explain_grammar(state, input, tutor, app_to_ui_tx.clone()).await?;
        }
        AppEvent::ExplainVocabulary(word) => {
            handle_explain_vocabulary(word, tutor, app_to_ui_tx.clone()).await?;
        }
        AppEvent::SaveGrammar(records) => {
            handle_save_grammar(&state, &records, app_to_ui_tx).await?;
        }
        AppEvent::SaveVocabulary { word, explanation } => {
            handle_save_vocabulary(&state, &word, &explanation, app_to_ui_tx).await?;
        }
        AppEvent::DeleteEntry { kind, id } => {
            handle_delete(&state, kind, &id, app_to_ui_tx).await?;
        }
        AppEvent::ReorderEntries { kind, order } => {
            handle_reorder(&state, kind, &order, app_to_ui_tx).await?;
        }

        // app -> UI events never arrive on this channel
        AppEvent::SessionChanged(_)
        | AppEvent::LibraryChanged { .. }
        | AppEvent::PatternParsed(_)
        | AppEvent::ExplainFinished
        | AppEvent::VocabularyExplained { .. }
        | AppEvent::ShowError(_) => {}
    }

    Ok(())
}
