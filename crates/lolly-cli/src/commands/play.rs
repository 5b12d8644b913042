use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use colored::Colorize;
use tracing::info;

use lolly_core::{LollySession, SessionConfig};

pub fn run(
    seed: Option<u64>,
    roster: Option<&Path>,
    class: Option<&str>,
    store: PathBuf,
) -> Result<(), String> {
    let mut config = SessionConfig::default().with_class_store(store);
    if let Some(seed) = seed {
        config = config.with_seed(seed);
    }
    let mut session = LollySession::new(config);

    if let Some(class) = class {
        let loaded = session
            .process(&format!("load {class}"))
            .map_err(|e| format!("failed to load class: {e}"))?;
        println!("  {loaded}");
    }
    if let Some(path) = roster {
        let added = session
            .process(&format!("import {}", path.display()))
            .map_err(|e| format!("failed to import roster: {e}"))?;
        println!("  {added}");
    }

    info!(seed = ?seed, students = session.controller().roster().len(), "session started");
    println!("  {} Lollypop Questions", "Starting".bold());
    println!("  Type 'help' for commands, 'quit' to exit.\n");

    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut line = String::new();

    loop {
        print!("> ");
        io::stdout().flush().map_err(|e| e.to_string())?;

        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) => break, // EOF
            Err(e) => return Err(e.to_string()),
            _ => {}
        }

        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match session.process(input) {
            Ok(output) => {
                if !output.is_empty() {
                    println!("{output}\n");
                }
                if input.eq_ignore_ascii_case("quit") || input.eq_ignore_ascii_case("q") {
                    break;
                }
            }
            Err(e) => {
                println!("{}\n", e.to_string().yellow());
            }
        }
    }

    Ok(())
}
