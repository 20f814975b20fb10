use std::sync::Arc;

use kanal::AsyncSender;
use kyoshi_types::{AppEvent, CollectionKind, PatternRecord};

use crate::state::AppState;

use super::session_ops::send_library_changed;

/// Save a batch of parsed patterns. The markdown emphasis around the form is
/// stripped for the entry's `source`, which doubles as the dedup key.
pub async fn handle_save_grammar(
    state: &Arc<AppState>,
    records: &[PatternRecord],
    app_to_ui_tx: &AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    if records.is_empty() {
        return Ok(());
    }

    {
        let mut library = state.library.write().await;
        for record in records {
            let source = record.form.replace("**", "");
            library.add_grammar(&source, &record.explanation);
        }
    }
    tracing::info!(count = records.len(), "saved grammar patterns");

    send_library_changed(state, app_to_ui_tx).await
}

pub async fn handle_save_vocabulary(
    state: &Arc<AppState>,
    word: &str,
    explanation: &str,
    app_to_ui_tx: &AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    {
        let mut library = state.library.write().await;
        library.add_vocabulary(word, explanation);
    }
    tracing::info!(word, "saved vocabulary entry");

    send_library_changed(state, app_to_ui_tx).await
}

pub async fn handle_delete(
    state: &Arc<AppState>,
    kind: CollectionKind,
    id: &str,
    app_to_ui_tx: &AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    let removed = {
        let mut library = state.library.write().await;
        library.delete(kind, id)
    };
    if !removed {
        tracing::debug!(id, "delete of unknown id ignored");
    }

    send_library_changed(state, app_to_ui_tx).await
}

pub async fn handle_reorder(
    state: &Arc<AppState>,
    kind: CollectionKind,
    order: &[String],
    app_to_ui_tx: &AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    let result = {
        let mut library = state.library.write().await;
        library.reorder(kind, order)
    };

    if let Err(e) = result {
        app_to_ui_tx.send(AppEvent::ShowError(e.to_string())).await?;
        return Ok(());
    }

    send_library_changed(state, app_to_ui_tx).await
}
