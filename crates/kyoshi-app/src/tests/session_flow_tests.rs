use kyoshi_storage::KeyValueStore;
use kyoshi_types::{AppEvent, CollectionKind, PatternRecord};

use crate::events::session_ops::resolve_session;
use crate::events::{event_loop, handle_event};
use crate::tests::{ScriptedTutor, memory_store, recv_event, test_channels, test_state};

fn pattern(form: &str, explanation: &str) -> PatternRecord {
    PatternRecord {
        form: form.to_string(),
        explanation: explanation.to_string(),
    }
}

async fn expect_library(rx: &kanal::AsyncReceiver<AppEvent>) -> (usize, usize) {
    loop {
        if let AppEvent::LibraryChanged {
            grammar,
            vocabulary,
        } = recv_event(rx).await
        {
            return (grammar.len(), vocabulary.len());
        }
    }
}

#[tokio::test]
async fn switching_identities_isolates_storage_keys() {
    let store = memory_store();
    let state = test_state(store.clone());
    let (tx, rx) = test_channels();
    let tutor = ScriptedTutor::empty();

    resolve_session(&state, &tx).await.unwrap();
    expect_library(&rx).await;

    handle_event(state.clone(), tutor.clone(), &tx, AppEvent::Login("ana".to_string()))
        .await
        .unwrap();
    assert_eq!(expect_library(&rx).await, (0, 0));

    handle_event(
        state.clone(),
        tutor.clone(),
        &tx,
        AppEvent::SaveGrammar(vec![pattern("**N+から**", "starting point")]),
    )
    .await
    .unwrap();
    assert_eq!(expect_library(&rx).await, (1, 0));

    handle_event(state.clone(), tutor.clone(), &tx, AppEvent::Login("ben".to_string()))
        .await
        .unwrap();
    assert_eq!(expect_library(&rx).await, (0, 0));

    handle_event(
        state.clone(),
        tutor,
        &tx,
        AppEvent::SaveGrammar(vec![pattern("**V+始める**", "begins an action")]),
    )
    .await
    .unwrap();
    assert_eq!(expect_library(&rx).await, (1, 0));

    let ana = store.get("userData_ana").unwrap().expect("ana snapshot");
    let ben = store.get("userData_ben").unwrap().expect("ben snapshot");
    assert!(ana.contains("N+から") && !ana.contains("V+始める"));
    assert!(ben.contains("V+始める") && !ben.contains("N+から"));
}

#[tokio::test]
async fn empty_username_is_rejected_without_a_session_change() {
    let state = test_state(memory_store());
    let (tx, rx) = test_channels();

    resolve_session(&state, &tx).await.unwrap();
    assert!(matches!(recv_event(&rx).await, AppEvent::SessionChanged(None)));
    expect_library(&rx).await;

    handle_event(
        state,
        ScriptedTutor::empty(),
        &tx,
        AppEvent::Login("   ".to_string()),
    )
    .await
    .unwrap();

    assert!(matches!(recv_event(&rx).await, AppEvent::ShowError(_)));
    assert!(rx.is_empty());
}

#[tokio::test]
async fn saves_before_resolve_never_touch_storage() {
    let store = memory_store();
    let state = test_state(store.clone());
    let (tx, rx) = test_channels();

    handle_event(
        state,
        ScriptedTutor::empty(),
        &tx,
        AppEvent::SaveGrammar(vec![pattern("**early**", "before resolve")]),
    )
    .await
    .unwrap();

    // in-memory only; no record was written under any key
    assert_eq!(expect_library(&rx).await, (1, 0));
    assert!(store.get("grammarLibrary").unwrap().is_none());
}

#[tokio::test]
async fn logout_clears_memory_but_not_disk() {
    let store = memory_store();
    let state = test_state(store.clone());
    let (tx, rx) = test_channels();
    let tutor = ScriptedTutor::empty();

    resolve_session(&state, &tx).await.unwrap();
    expect_library(&rx).await;

    handle_event(state.clone(), tutor.clone(), &tx, AppEvent::Login("ana".to_string()))
        .await
        .unwrap();
    expect_library(&rx).await;

    handle_event(
        state.clone(),
        tutor.clone(),
        &tx,
        AppEvent::SaveVocabulary {
            word: "犬".to_string(),
            explanation: "dog".to_string(),
        },
    )
    .await
    .unwrap();
    assert_eq!(expect_library(&rx).await, (0, 1));

    handle_event(state.clone(), tutor, &tx, AppEvent::Logout)
        .await
        .unwrap();
    assert!(matches!(recv_event(&rx).await, AppEvent::SessionChanged(None)));
    assert_eq!(expect_library(&rx).await, (0, 0));

    assert!(store.get("userData_ana").unwrap().is_some());
    assert!(store.get("currentUser").unwrap().is_none());
}

#[tokio::test]
async fn duplicate_saves_replace_by_dedup_key() {
    let state = test_state(memory_store());
    let (tx, rx) = test_channels();
    let tutor = ScriptedTutor::empty();

    resolve_session(&state, &tx).await.unwrap();
    expect_library(&rx).await;

    handle_event(
        state.clone(),
        tutor.clone(),
        &tx,
        AppEvent::SaveGrammar(vec![pattern("**N+から**", "first take")]),
    )
    .await
    .unwrap();
    expect_library(&rx).await;

    handle_event(
        state.clone(),
        tutor,
        &tx,
        AppEvent::SaveGrammar(vec![pattern("**N+から**", "second take")]),
    )
    .await
    .unwrap();

    let AppEvent::LibraryChanged { grammar, .. } = recv_event(&rx).await else {
        panic!("expected library update");
    };
    assert_eq!(grammar.len(), 1);
    // saved source has the markdown emphasis stripped
    assert_eq!(grammar[0].source, "N+から");
    assert_eq!(grammar[0].explanation, "second take");
}

#[tokio::test]
async fn event_loop_serves_commands_end_to_end() {
    let state = test_state(memory_store());
    let (app_tx, app_rx) = kanal::unbounded_async();
    let (ui_tx, ui_rx) = kanal::unbounded_async();

    tokio::spawn(event_loop(state, ui_rx, app_tx));

    assert!(matches!(recv_event(&app_rx).await, AppEvent::SessionChanged(None)));
    expect_library(&app_rx).await;

    ui_tx.send(AppEvent::Login("ana".to_string())).await.unwrap();
    loop {
        if let AppEvent::SessionChanged(Some(user)) = recv_event(&app_rx).await {
            assert_eq!(user.username, "ana");
            break;
        }
    }
}

#[tokio::test]
async fn reorder_mismatch_is_surfaced_and_ignored() {
    let state = test_state(memory_store());
    let (tx, rx) = test_channels();
    let tutor = ScriptedTutor::empty();

    resolve_session(&state, &tx).await.unwrap();
    expect_library(&rx).await;

    handle_event(
        state.clone(),
        tutor.clone(),
        &tx,
        AppEvent::SaveGrammar(vec![pattern("**a**", "1"), pattern("**b**", "2")]),
    )
    .await
    .unwrap();
    assert_eq!(expect_library(&rx).await, (2, 0));

    handle_event(
        state.clone(),
        tutor.clone(),
        &tx,
        AppEvent::ReorderEntries {
            kind: CollectionKind::Grammar,
            order: vec!["bogus".to_string()],
        },
    )
    .await
    .unwrap();
    assert!(matches!(recv_event(&rx).await, AppEvent::ShowError(_)));

    // a valid permutation still applies afterwards
    let order: Vec<String> = {
        let library = state.library.read().await;
        library.grammar().iter().rev().map(|e| e.id.clone()).collect()
    };
    handle_event(
        state.clone(),
        tutor,
        &tx,
        AppEvent::ReorderEntries {
            kind: CollectionKind::Grammar,
            order: order.clone(),
        },
    )
    .await
    .unwrap();

    let AppEvent::LibraryChanged { grammar, .. } = recv_event(&rx).await else {
        panic!("expected library update");
    };
    let ids: Vec<String> = grammar.iter().map(|e| e.id.clone()).collect();
    assert_eq!(ids, order);
}
