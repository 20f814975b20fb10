use std::sync::Arc;

use kanal::AsyncSender;
use kyoshi_core::preprocess::normalize_query;
use kyoshi_types::AppEvent;
use kyoshi_tutor::Tutor;

/// Single-shot vocabulary explanation. Runs in its own task so a slow call
/// never stalls the event loop.
pub async fn handle_explain_vocabulary(
    word: String,
    tutor: Arc<dyn Tutor>,
    app_to_ui_tx: AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    let word = normalize_query(&word);
    if word.is_empty() {
        app_to_ui_tx
            .send(AppEvent::ShowError("Please enter a word.".to_string()))
            .await?;
        return Ok(());
    }

    tokio::spawn(async move {
        let event = match tutor.explain_vocabulary(&word).await {
            Ok(explanation) => AppEvent::VocabularyExplained { word, explanation },
            Err(e) => AppEvent::ShowError(e.to_string()),
        };
        if let Err(e) = app_to_ui_tx.send(event).await {
            tracing::error!("failed to deliver vocabulary result: {e}");
        }
    });

    Ok(())
}
