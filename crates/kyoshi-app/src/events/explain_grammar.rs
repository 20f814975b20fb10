use std::sync::Arc;

use kanal::AsyncSender;
use kyoshi_core::parser::SegmentParser;
use kyoshi_types::{AppEvent, GrammarInput};
use kyoshi_tutor::{ChunkStream, Tutor};
use tokio_util::sync::CancellationToken;

use crate::state::AppState;

/// Start a streamed grammar explanation. Any in-flight stream is cancelled
/// first; its buffer is discarded but records it already emitted stand.
pub async fn handle_explain_grammar(
    state: Arc<AppState>,
    input: GrammarInput,
    tutor: Arc<dyn Tutor>,
    app_to_ui_tx: AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    if input.is_empty() {
        app_to_ui_tx
            .send(AppEvent::ShowError(
                "Please provide text or an image.".to_string(),
            ))
            .await?;
        return Ok(());
    }
    tracing::debug!(input = %input.label(), "explain grammar requested");

    let token = CancellationToken::new();
    {
        let mut inflight = state.explain_token.lock().await;
        if let Some(previous) = inflight.replace(token.clone()) {
            tracing::debug!("cancelling previous explain stream");
            previous.cancel();
        }
    }

    let stream = match tutor.explain_grammar(&input).await {
        Ok(stream) => stream,
        Err(e) => {
            app_to_ui_tx.send(AppEvent::ShowError(e.to_string())).await?;
            return Ok(());
        }
    };

    tokio::spawn(async move {
        if let Err(e) = pump_stream(stream, token, &app_to_ui_tx).await {
            tracing::error!("explain stream task failed: {e}");
        }
    });

    Ok(())
}

/// Feed stream fragments through the segment parser, emitting one
/// `PatternParsed` per completed record, strictly in arrival order.
async fn pump_stream(
    mut stream: ChunkStream,
    cancel: CancellationToken,
    app_to_ui_tx: &AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    let mut parser = SegmentParser::new();

    loop {
        let chunk = tokio::select! {
            _ = cancel.cancelled() => {
                // dropping the receiver closes the underlying stream
                tracing::debug!("explain stream cancelled");
                return Ok(());
            }
            chunk = stream.recv() => chunk,
        };

        match chunk {
            Some(Ok(fragment)) => {
                for record in parser.push(&fragment) {
                    app_to_ui_tx.send(AppEvent::PatternParsed(record)).await?;
                }
            }
            Some(Err(e)) => {
                // already-emitted records are kept, not rolled back
                app_to_ui_tx.send(AppEvent::ShowError(e.to_string())).await?;
                return Ok(());
            }
            None => break,
        }
    }

    if let Some(record) = parser.finish() {
        app_to_ui_tx.send(AppEvent::PatternParsed(record)).await?;
    }
    app_to_ui_tx.send(AppEvent::ExplainFinished).await?;
    Ok(())
}
