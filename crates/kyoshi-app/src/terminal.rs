use kanal::{AsyncReceiver, AsyncSender};
use kyoshi_core::reorder::{DropEdge, drag_reorder, id_order};
use kyoshi_types::{
    AppEvent, CollectionKind, GrammarEntry, GrammarInput, PatternRecord, VocabularyEntry,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

const HELP: &str = "commands:
  login <name>                  switch to a named library
  logout                        back to the anonymous library
  explain <japanese text>       streamed grammar analysis
  vocab <word>                  vocabulary explanation
  save                          save the last grammar results
  savevocab                     save the last vocabulary result
  list g|v                      show the saved library
  delete g|v <n>                delete the n-th entry
  move g|v <n> before|after <m> reorder by dragging entry n onto m
  quit";

/// Read-only view over the library plus whatever the current explain
/// produced; all mutations go through the event loop.
#[derive(Default)]
struct ViewState {
    user: Option<String>,
    grammar: Vec<GrammarEntry>,
    vocabulary: Vec<VocabularyEntry>,
    pending_patterns: Vec<PatternRecord>,
    pending_vocab: Option<(String, String)>,
}

/// Terminal front-end loop: translates stdin commands into app events and
/// renders app events as they arrive.
pub async fn terminal_loop(
    app_to_ui_rx: AsyncReceiver<AppEvent>,
    ui_to_app_tx: AsyncSender<AppEvent>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut view = ViewState::default();

    println!("kyōshi — Japanese grammar tutor (Burmese explanations)");
    println!("{HELP}");

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            event = app_to_ui_rx.recv() => {
                render_event(&mut view, event?);
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if !dispatch_command(&mut view, line.trim(), &ui_to_app_tx).await? {
                    break;
                }
            }
        }
    }

    Ok(())
}

fn render_event(view: &mut ViewState, event: AppEvent) {
    match event {
        AppEvent::SessionChanged(user) => {
            view.user = user.map(|u| u.username);
            view.pending_patterns.clear();
            view.pending_vocab = None;
            match &view.user {
                Some(name) => println!("logged in as {name}"),
                None => println!("anonymous session"),
            }
        }
        AppEvent::LibraryChanged {
            grammar,
            vocabulary,
        } => {
            println!(
                "library: {} grammar, {} vocabulary",
                grammar.len(),
                vocabulary.len()
            );
            view.grammar = grammar;
            view.vocabulary = vocabulary;
        }
        AppEvent::PatternParsed(record) => {
            println!("\n{}\n{}", record.form, record.explanation);
            view.pending_patterns.push(record);
        }
        AppEvent::ExplainFinished => {
            println!(
                "\n{} pattern(s) found; `save` adds them to the library",
                view.pending_patterns.len()
            );
        }
        AppEvent::VocabularyExplained { word, explanation } => {
            println!("\n{word}\n{explanation}");
            view.pending_vocab = Some((word, explanation));
        }
        AppEvent::ShowError(message) => println!("error: {message}"),

        // UI -> app events never arrive on this channel
        _ => {}
    }
}

/// Returns false when the loop should exit.
async fn dispatch_command(
    view: &mut ViewState,
    line: &str,
    ui_to_app_tx: &AsyncSender<AppEvent>,
) -> anyhow::Result<bool> {
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    match command {
        "" => {}
        "help" => println!("{HELP}"),
        "quit" | "exit" => return Ok(false),

        "login" => ui_to_app_tx.send(AppEvent::Login(rest.to_string())).await?,
        "logout" => ui_to_app_tx.send(AppEvent::Logout).await?,

        "explain" => {
            view.pending_patterns.clear();
            ui_to_app_tx
                .send(AppEvent::ExplainGrammar(GrammarInput::Text(
                    rest.to_string(),
                )))
                .await?;
        }
        "vocab" => {
            ui_to_app_tx
                .send(AppEvent::ExplainVocabulary(rest.to_string()))
                .await?;
        }

        "save" => {
            if view.pending_patterns.is_empty() {
                println!("nothing to save; run `explain` first");
            } else {
                ui_to_app_tx
                    .send(AppEvent::SaveGrammar(view.pending_patterns.clone()))
                    .await?;
            }
        }
        "savevocab" => match view.pending_vocab.clone() {
            Some((word, explanation)) => {
                ui_to_app_tx
                    .send(AppEvent::SaveVocabulary { word, explanation })
                    .await?;
            }
            None => println!("nothing to save; run `vocab` first"),
        },

        "list" => match parse_kind(rest) {
            Some(CollectionKind::Grammar) => {
                for (i, entry) in view.grammar.iter().enumerate() {
                    println!("{:>3}. {}", i + 1, entry.source);
                }
            }
            Some(CollectionKind::Vocabulary) => {
                for (i, entry) in view.vocabulary.iter().enumerate() {
                    println!("{:>3}. {}", i + 1, entry.word);
                }
            }
            None => println!("usage: list g|v"),
        },

        "delete" => match parse_delete(view, rest) {
            Some((kind, id)) => {
                ui_to_app_tx
                    .send(AppEvent::DeleteEntry { kind, id })
                    .await?;
            }
            None => println!("usage: delete g|v <n>"),
        },

        "move" => match parse_move(view, rest) {
            Some((kind, order)) => {
                ui_to_app_tx
                    .send(AppEvent::ReorderEntries { kind, order })
                    .await?;
            }
            None => println!("usage: move g|v <n> before|after <m> (distinct positions)"),
        },

        _ => println!("unknown command `{command}`; try `help`"),
    }

    Ok(true)
}

fn parse_kind(token: &str) -> Option<CollectionKind> {
    match token {
        "g" | "grammar" => Some(CollectionKind::Grammar),
        "v" | "vocab" | "vocabulary" => Some(CollectionKind::Vocabulary),
        _ => None,
    }
}

fn parse_delete(view: &ViewState, rest: &str) -> Option<(CollectionKind, String)> {
    let mut args = rest.split_whitespace();
    let kind = parse_kind(args.next()?)?;
    let index = args.next()?.parse::<usize>().ok()?.checked_sub(1)?;

    let id = match kind {
        CollectionKind::Grammar => view.grammar.get(index)?.id.clone(),
        CollectionKind::Vocabulary => view.vocabulary.get(index)?.id.clone(),
    };
    Some((kind, id))
}

/// `move g 3 before 1` — apply the drag algorithm locally, send the
/// resulting id order to the store.
fn parse_move(view: &ViewState, rest: &str) -> Option<(CollectionKind, Vec<String>)> {
    let mut args = rest.split_whitespace();
    let kind = parse_kind(args.next()?)?;
    let from = args.next()?.parse::<usize>().ok()?.checked_sub(1)?;
    let edge = match args.next()? {
        "before" => DropEdge::Before,
        "after" => DropEdge::After,
        _ => return None,
    };
    let target = args.next()?.parse::<usize>().ok()?.checked_sub(1)?;

    let order = match kind {
        CollectionKind::Grammar => {
            let dragged = view.grammar.get(from)?.id.clone();
            id_order(&drag_reorder(&view.grammar, &dragged, target, edge)?)
        }
        CollectionKind::Vocabulary => {
            let dragged = view.vocabulary.get(from)?.id.clone();
            id_order(&drag_reorder(&view.vocabulary, &dragged, target, edge)?)
        }
    };
    Some((kind, order))
}
