use std::path::Path;

use anyhow::{Context, Result};
use rustyline::{error::ReadlineError, Editor};
use structopt::StructOpt;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use ddbms::backend::{Backend, HttpBackend, SqliteBackend};
use ddbms::{Config, SchemaCatalog, Session};

fn report<B: Backend>(session: &Session<B>) {
    match session.error() {
        Some(err) => println!("{}", err),
        None => println!("{}", session.view()),
    }
}

/// A statement is submitted once it ends with a semicolon or is followed by
/// an empty line.
fn is_complete(buffer: &str) -> bool {
    buffer.trim_end().ends_with(';')
}

fn repl<B: Backend>(session: &mut Session<B>, history: Option<&Path>) -> Result<()> {
    let mut editor = Editor::<()>::new();
    if let Some(path) = history {
        if let Err(err) = editor.load_history(path) {
            debug!(?path, %err, "no history loaded");
        }
    }

    let mut buffer = String::new();
    loop {
        let prompt = if buffer.is_empty() { "sql> " } else { "  -> " };
        match editor.readline(prompt) {
            Ok(line) => {
                let blank = line.trim().is_empty();
                if !blank {
                    if !buffer.is_empty() {
                        buffer.push('\n');
                    }
                    buffer.push_str(&line);
                }
                if buffer.is_empty() || !(blank || is_complete(&buffer)) {
                    continue;
                }

                editor.add_history_entry(buffer.as_str());
                session.submit(&buffer);
                report(session);
                buffer.clear();
            }
            Err(ReadlineError::Interrupted) if !buffer.is_empty() => buffer.clear(),
            Err(ReadlineError::Interrupted) => break,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Error: {}", err);
                break;
            }
        }
    }

    if let Some(path) = history {
        editor
            .save_history(path)
            .with_context(|| format!("saving history to {}", path.display()))?;
    }
    Ok(())
}

fn run<B: Backend>(config: &Config, catalog: &SchemaCatalog, backend: B) -> Result<()> {
    let mut session = Session::new(catalog, backend);

    match &config.execute {
        Some(sql) => {
            session.submit(sql);
            report(&session);
            if session.error().is_some() {
                std::process::exit(1);
            }
            Ok(())
        }
        None => repl(&mut session, config.history.as_deref()),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_args();
    let catalog = SchemaCatalog::default();

    if config.local {
        let backend = SqliteBackend::in_memory(&catalog)?;
        if let Some(path) = &config.seed {
            let sql = std::fs::read_to_string(path)
                .with_context(|| format!("reading seed script {}", path.display()))?;
            backend.execute_batch(&sql)?;
        }
        run(&config, &catalog, backend)
    } else {
        let backend = HttpBackend::new(config.endpoints(), config.timeout());
        run(&config, &catalog, backend)
    }
}
