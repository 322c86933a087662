//! Decoration synchronizer tests: idempotence, atomicity, supersession

mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use common::FakeEditor;
use mark_occurrences::decorations::{
    AnnotationModel, Commit, Decoration, DecorationHost, DecorationModel, DecorationSynchronizer,
};
use mark_occurrences::occurrences::Span;
use mark_occurrences::syntax::LanguageId;

fn spans(offsets: &[usize]) -> Vec<Span> {
    offsets.iter().map(|&o| Span::new(o, 1)).collect()
}

fn synchronizer(editor: &Arc<FakeEditor>) -> DecorationSynchronizer {
    let host: Arc<dyn DecorationHost> = editor.clone();
    DecorationSynchronizer::new(host, true)
}

#[test]
fn test_replace_all_is_idempotent() {
    let editor = FakeEditor::open("let x = 1; print(x)", LanguageId::JavaScript);
    let sync = synchronizer(&editor);
    let set = spans(&[4, 17]);

    sync.replace_all(&set);
    let after_first = editor.highlighted();
    sync.replace_all(&set);

    assert_eq!(editor.highlighted(), after_first);
    assert_eq!(editor.model().lock().unwrap().len(), 2);
    assert_eq!(sync.current().len(), 2);
}

#[test]
fn test_empty_replace_clears() {
    let editor = FakeEditor::open("let x = 1; print(x)", LanguageId::JavaScript);
    let sync = synchronizer(&editor);
    sync.replace_all(&spans(&[4, 17]));
    assert_eq!(sync.replace_all(&[]), Commit::Applied { removed: 2, added: 0 });
    assert!(editor.highlighted().is_empty());
}

#[test]
fn test_readers_never_see_partial_sets() {
    let editor = FakeEditor::open("", LanguageId::JavaScript);
    let sync = Arc::new(synchronizer(&editor));
    let small = spans(&[1, 2, 3]);
    let large = spans(&[1, 2, 3, 4, 5]);
    sync.replace_all(&small);

    let done = Arc::new(AtomicBool::new(false));
    let reader = {
        let model = editor.model();
        let done = Arc::clone(&done);
        thread::spawn(move || {
            let mut seen = Vec::new();
            while !done.load(Ordering::SeqCst) {
                seen.push(model.lock().unwrap().len());
            }
            seen
        })
    };

    let writer = {
        let sync = Arc::clone(&sync);
        thread::spawn(move || {
            for i in 0..500 {
                sync.replace_all(if i % 2 == 0 { &large } else { &small });
            }
        })
    };

    writer.join().unwrap();
    done.store(true, Ordering::SeqCst);
    let seen = reader.join().unwrap();
    assert!(seen.iter().all(|&n| n == 3 || n == 5), "{:?}", seen);
}

#[test]
fn test_older_ticket_cannot_overwrite_newer() {
    let editor = FakeEditor::open("", LanguageId::JavaScript);
    let sync = synchronizer(&editor);
    let slow = sync.next_ticket();
    let fast = sync.next_ticket();

    sync.commit(fast, &spans(&[17]));
    assert!(matches!(sync.commit(slow, &spans(&[30, 31])), Commit::Superseded { .. }));
    assert_eq!(editor.highlighted(), spans(&[17]));
}

#[test]
fn test_closed_document_is_a_no_op() {
    let editor = FakeEditor::open("let x = 1;", LanguageId::JavaScript);
    let sync = synchronizer(&editor);
    editor.close();
    assert_eq!(sync.replace_all(&spans(&[4])), Commit::ModelUnavailable);
    assert!(sync.current().is_empty());
}

#[test]
fn test_swapped_model_keeps_foreign_decorations() {
    let editor = FakeEditor::open("let x = 1; print(x)", LanguageId::JavaScript);
    let sync = synchronizer(&editor);
    sync.replace_all(&spans(&[4, 17]));

    let fresh = AnnotationModel::shared();
    fresh.lock().unwrap().replace(
        &[],
        vec![Decoration {
            category: "error",
            description: String::new(),
            span: Span::new(0, 3),
        }],
    );
    editor.replace_model(fresh.clone());

    assert!(matches!(sync.replace_all(&spans(&[4])), Commit::Applied { removed: 0, .. }));
    let categories: Vec<&str> = fresh
        .lock()
        .unwrap()
        .decorations()
        .into_iter()
        .map(|(_, d)| d.category)
        .collect();
    assert_eq!(categories, vec!["error", "occurrence"]);
    assert_eq!(editor.highlighted(), spans(&[4]));
}
