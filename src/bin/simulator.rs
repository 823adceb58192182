use crossterm::style::Stylize;
use proof_core::core::replace::word_pattern;
use proof_core::core::types::{Correction, TextUnit};
use proof_core::host::memory::MemoryDocument;
use proof_core::host::{DocumentHost, Rect};
use proof_core::messages::{UiEvent, UiRequest};
use proof_core::CheckSession;
use std::collections::HashMap;
use std::io::{stdin, stdout, Write};
use std::time::Instant;

const CHECK_TYPE: &str = "SPELLING";

// Stand-in for the external checker: common typos and their fixes.
const DEMO_TYPOS: &[(&str, &str)] = &[
    ("teh", "the"),
    ("adress", "address"),
    ("recieve", "receive"),
    ("seperate", "separate"),
];

fn main() {
    let mut doc = seed_document();
    let mut session = CheckSession::new();
    let mut corrections: HashMap<String, Correction> = HashMap::new();

    println!("{}", "Canvas Proofer Simulator".bold());
    println!("------------------------------------------------------------");
    println!("Commands: check | list | goto <word> | next <word> | prev <word>");
    println!("          highlight <word> | replace <old> <new> | clear | exit");

    loop {
        pump(&mut session, &mut doc, &mut corrections);
        print!("\n> ");
        stdout().flush().unwrap();

        let mut input = String::new();
        stdin().read_line(&mut input).unwrap();
        let parts: Vec<&str> = input.split_whitespace().collect();

        match parts.as_slice() {
            ["exit"] => break,
            ["check"] => {
                let all: Vec<_> = doc.all_text_units().iter().map(|u| u.id.clone()).collect();
                doc.select(&all);
                dispatch(
                    &mut session,
                    &mut doc,
                    UiRequest::RunCheck {
                        check_type: CHECK_TYPE.to_string(),
                    },
                    &mut corrections,
                );
            }
            ["list"] => print_corrections(&corrections),
            ["goto", word] => {
                let ids = corrections
                    .get(*word)
                    .map(|c| c.matched_locations.clone());
                dispatch(
                    &mut session,
                    &mut doc,
                    UiRequest::NavigateToWord {
                        word: word.to_string(),
                        location_ids: ids,
                    },
                    &mut corrections,
                );
            }
            ["next", word] => dispatch(
                &mut session,
                &mut doc,
                UiRequest::NavigateNext {
                    word: word.to_string(),
                },
                &mut corrections,
            ),
            ["prev", word] => dispatch(
                &mut session,
                &mut doc,
                UiRequest::NavigatePrev {
                    word: word.to_string(),
                },
                &mut corrections,
            ),
            ["highlight", word] => {
                let ids = corrections
                    .get(*word)
                    .map(|c| c.matched_locations.clone())
                    .unwrap_or_default();
                dispatch(
                    &mut session,
                    &mut doc,
                    UiRequest::HighlightAndNavigate { location_ids: ids },
                    &mut corrections,
                );
            }
            ["replace", old, new] => {
                let ids = corrections
                    .get(*old)
                    .map(|c| c.matched_locations.clone())
                    .unwrap_or_default();
                dispatch(
                    &mut session,
                    &mut doc,
                    UiRequest::ReplaceWord {
                        location_ids: ids,
                        old_word: old.to_string(),
                        new_word: new.to_string(),
                    },
                    &mut corrections,
                );
            }
            ["clear"] => {
                dispatch(&mut session, &mut doc, UiRequest::ClearHighlights, &mut corrections);
                dispatch(&mut session, &mut doc, UiRequest::ClearNavigation, &mut corrections);
            }
            [] => {}
            _ => println!("{}", "Unrecognized command.".dark_yellow()),
        }
    }
}

fn seed_document() -> MemoryDocument {
    let mut doc = MemoryDocument::new();
    let layers = [
        ("10:2", "Teh quick brown fox"),
        ("10:5", "Enter your adress here"),
        ("10:7", "You will recieve a confirmation"),
        ("10:9", "Keep teh settings seperate"),
    ];
    for (i, (id, text)) in layers.iter().enumerate() {
        doc.add_text_layer(
            id,
            text,
            Rect {
                x: 0.0,
                y: i as f64 * 40.0,
                width: 240.0,
                height: 24.0,
            },
        );
    }
    doc
}

fn dispatch(
    session: &mut CheckSession,
    doc: &mut MemoryDocument,
    request: UiRequest,
    corrections: &mut HashMap<String, Correction>,
) {
    let events = session.handle(doc, request, Instant::now());
    for event in events {
        handle_event(session, doc, event, corrections);
    }
    pump(session, doc, corrections);
}

// Plays the UI panel's role: turns text-to-check into corrections and
// saves them back through the session, so the cache path is exercised.
fn handle_event(
    session: &mut CheckSession,
    doc: &mut MemoryDocument,
    event: UiEvent,
    corrections: &mut HashMap<String, Correction>,
) {
    match event {
        UiEvent::TextToCheck {
            fingerprint,
            check_type,
            units,
        } => {
            let found = run_demo_checker(&units);
            corrections.clear();
            for c in &found {
                corrections.insert(c.word.clone(), c.clone());
            }
            let events = session.handle(
                doc,
                UiRequest::SaveResultsToCache {
                    fingerprint,
                    check_type,
                    corrections: found,
                },
                Instant::now(),
            );
            debug_assert!(events.is_empty());
            print_corrections(corrections);
        }
        UiEvent::CachedResultsFound { corrections: found } => {
            println!("{}", "(served from cache)".dark_grey());
            corrections.clear();
            for c in found {
                corrections.insert(c.word.clone(), c);
            }
            print_corrections(corrections);
        }
        UiEvent::NavigationUpdate { word, index, total } => {
            println!(
                "{} {} ({} of {})",
                "focused".dark_green(),
                word.clone().bold(),
                index + 1,
                total
            );
        }
        UiEvent::WordReplaced { word } => {
            corrections.remove(&word);
            println!("{} \"{}\"", "replaced".dark_green(), word);
        }
        UiEvent::NoSelection => println!("{}", "Nothing selected.".dark_yellow()),
        UiEvent::ReCheckDocument => {
            println!("{}", "Document changed — run `check` again.".dark_yellow())
        }
        UiEvent::ExtractionStarted | UiEvent::AllTextData { .. } => {}
    }
}

fn run_demo_checker(units: &[TextUnit]) -> Vec<Correction> {
    let mut found = Vec::new();
    for (typo, fix) in DEMO_TYPOS {
        let pattern = word_pattern(typo).expect("demo typo list is regex-safe");
        let matched: Vec<_> = units
            .iter()
            .filter(|u| pattern.is_match(&u.text))
            .map(|u| u.id.clone())
            .collect();
        if !matched.is_empty() {
            found.push(Correction {
                word: typo.to_string(),
                matched_locations: matched,
                suggestions: vec![fix.to_string()],
            });
        }
    }
    found
}

fn print_corrections(corrections: &HashMap<String, Correction>) {
    if corrections.is_empty() {
        println!("{}", "No issues found.".dark_green());
        return;
    }
    println!("{}", "Flagged words:".bold());
    let mut words: Vec<_> = corrections.values().collect();
    words.sort_by(|a, b| a.word.cmp(&b.word));
    for c in words {
        println!(
            "  {} ({} instances) -> {}",
            c.word.clone().dark_red(),
            c.matched_locations.len(),
            c.suggestions.join(", ")
        );
    }
}

/// Deliver pending host notifications and show toasts and due notices.
fn pump(
    session: &mut CheckSession,
    doc: &mut MemoryDocument,
    corrections: &mut HashMap<String, Correction>,
) {
    let mut events = Vec::new();
    for _ in 0..doc.take_change_events() {
        events.extend(session.document_changed());
    }
    for event in events {
        handle_event(session, doc, event, corrections);
    }
    session.poll_notices(doc, Instant::now());
    for notice in std::mem::take(&mut doc.notices) {
        println!("{} {}", "[toast]".dark_cyan(), notice);
    }
}
