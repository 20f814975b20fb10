use std::sync::Arc;

use kanal::AsyncSender;
use kyoshi_types::AppEvent;

use crate::state::AppState;

/// Startup: resolve the persisted identity, load its library, and push both
/// snapshots to the UI.
pub async fn resolve_session(
    state: &Arc<AppState>,
    app_to_ui_tx: &AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    let scope = {
        let mut session = state.session.write().await;
        session.resolve();
        session.scope()
    };

    let user = state.session.read().await.current_user().cloned();
    if let Some(scope) = scope {
        let mut library = state.library.write().await;
        library.load(scope);
    }

    app_to_ui_tx.send(AppEvent::SessionChanged(user)).await?;
    send_library_changed(state, app_to_ui_tx).await
}

pub async fn handle_login(
    state: &Arc<AppState>,
    username: &str,
    app_to_ui_tx: &AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    let user = {
        let mut session = state.session.write().await;
        match session.login(username) {
            Ok(user) => user,
            Err(e) => {
                app_to_ui_tx.send(AppEvent::ShowError(e.to_string())).await?;
                return Ok(());
            }
        }
    };
    tracing::info!(username = %user.username, "logged in");

    {
        let scope = state.session.read().await.scope();
        let mut library = state.library.write().await;
        if let Some(scope) = scope {
            library.load(scope);
        }
    }

    app_to_ui_tx.send(AppEvent::SessionChanged(Some(user))).await?;
    send_library_changed(state, app_to_ui_tx).await
}

/// Back to anonymous: drop the in-memory collections, keep persisted data,
/// and reload the legacy anonymous pair.
pub async fn handle_logout(
    state: &Arc<AppState>,
    app_to_ui_tx: &AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    let scope = {
        let mut session = state.session.write().await;
        session.logout();
        session.scope()
    };
    tracing::info!("logged out");

    {
        let mut library = state.library.write().await;
        library.clear();
        if let Some(scope) = scope {
            library.load(scope);
        }
    }

    app_to_ui_tx.send(AppEvent::SessionChanged(None)).await?;
    send_library_changed(state, app_to_ui_tx).await
}

pub async fn send_library_changed(
    state: &Arc<AppState>,
    app_to_ui_tx: &AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    let (grammar, vocabulary) = {
        let library = state.library.read().await;
        (library.grammar().to_vec(), library.vocabulary().to_vec())
    };
    app_to_ui_tx
        .send(AppEvent::LibraryChanged {
            grammar,
            vocabulary,
        })
        .await?;
    Ok(())
}
