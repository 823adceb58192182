use proof_core::host::memory::MemoryDocument;
use proof_core::host::Rect;
use proof_core::messages::UiRequest;
use proof_core::CheckSession;
use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Instant;

// Line protocol spoken with the plugin shim:
//   ADD_LAYER <id> <x> <y> <w> <h> <text...>   seed a text layer
//   SELECT <id,id,...>                         set the user selection
//   EDIT <id> <text...>                        user edits a layer
//   REMOVE <id>                                user deletes a layer
//   MSG <json UiRequest>                       one UI panel message
//   EXIT                                       save the cache and quit
// Responses: `EVENT <json UiEvent>` and `NOTIFY <text>` lines.

fn get_cache_path() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("canvas-proofer");
    path.push("result_cache.bin");
    path
}

fn get_log_path() -> PathBuf {
    let mut path = PathBuf::from("target");
    path.push("proof_engine.log");
    path
}

fn log(message: &str) {
    if let Ok(mut file) = File::options().create(true).append(true).open(get_log_path()) {
        let _ = writeln!(file, "{}", message);
    }
}

fn main() -> io::Result<()> {
    let _ = std::fs::remove_file(get_log_path());
    log("--- Proofing Engine Starting ---");

    let cache_path = get_cache_path();
    let mut session = CheckSession::from_cache_file_or_new(&cache_path);
    let mut doc = MemoryDocument::new();
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let input = line?;
        log(&format!("Engine <- '{:?}'", input));
        let (command, rest) = match input.split_once(' ') {
            Some((c, r)) => (c, r),
            None => (input.as_str(), ""),
        };

        match command {
            "ADD_LAYER" => {
                if let Err(e) = add_layer(&mut doc, rest) {
                    log(&format!("Engine: bad ADD_LAYER: {}", e));
                }
            }
            "SELECT" => {
                let ids: Vec<_> = rest
                    .split(',')
                    .filter(|s| !s.is_empty())
                    .map(Into::into)
                    .collect();
                doc.select(&ids);
            }
            "EDIT" => {
                if let Some((id, text)) = rest.split_once(' ') {
                    doc.user_edit_text(&id.into(), text);
                }
            }
            "REMOVE" => {
                doc.user_remove_element(&rest.into());
            }
            "MSG" => match serde_json::from_str::<UiRequest>(rest) {
                Ok(request) => {
                    let events = session.handle(&mut doc, request, Instant::now());
                    for event in events {
                        let payload = serde_json::to_string(&event)?;
                        log(&format!("Engine -> 'EVENT {}'", payload));
                        writeln!(stdout, "EVENT {}", payload)?;
                    }
                }
                Err(e) => log(&format!("Engine: unparseable message: {}", e)),
            },
            "EXIT" => {
                log("Engine: received EXIT, saving result cache.");
                if let Err(e) = session.save_cache() {
                    log(&format!("Engine: error saving cache: {}", e));
                }
                break;
            }
            _ => log("Engine: received unknown command."),
        }

        pump(&mut session, &mut doc, &mut stdout)?;
    }

    log("Engine: shutting down.");
    Ok(())
}

fn add_layer(doc: &mut MemoryDocument, rest: &str) -> Result<(), String> {
    let mut parts = rest.splitn(6, ' ');
    let id = parts.next().ok_or("missing id")?;
    let mut num = || -> Result<f64, String> {
        parts
            .next()
            .ok_or("missing geometry")?
            .parse()
            .map_err(|e| format!("{e}"))
    };
    let (x, y, width, height) = (num()?, num()?, num()?, num()?);
    let text = parts.next().unwrap_or("");
    doc.add_text_layer(id, text, Rect { x, y, width, height });
    Ok(())
}

/// Deliver queued change notifications and any due coalesced notice.
fn pump(
    session: &mut CheckSession,
    doc: &mut MemoryDocument,
    stdout: &mut io::Stdout,
) -> io::Result<()> {
    let mut events = Vec::new();
    for _ in 0..doc.take_change_events() {
        events.extend(session.document_changed());
    }
    session.poll_notices(doc, Instant::now());

    for event in events {
        let payload = serde_json::to_string(&event)?;
        log(&format!("Engine -> 'EVENT {}'", payload));
        writeln!(stdout, "EVENT {}", payload)?;
    }
    for notice in std::mem::take(&mut doc.notices) {
        log(&format!("Engine -> 'NOTIFY {}'", notice));
        writeln!(stdout, "NOTIFY {}", notice)?;
    }
    stdout.flush()
}
