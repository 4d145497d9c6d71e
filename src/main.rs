#![forbid(unsafe_code)]
//! sfs binary: argument parsing and the read-eval-print loop.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use sfs::{Reply, Session, SfsConfig};

#[derive(Parser, Debug)]
#[command(
    name = "sfs",
    version,
    about = "Virtual filesystem shell with reversible tree encryption"
)]
struct Cli {
    /// Storage directory the shell manages (created when missing)
    #[arg(default_value = "storage")]
    storage: PathBuf,

    /// Path to the key/config file
    #[arg(long, default_value = "sfs.toml")]
    config: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if !cli.storage.exists() {
        println!(
            "Storage directory not found. Creating {}...",
            cli.storage.display()
        );
        fs::create_dir_all(&cli.storage)
            .with_context(|| format!("cannot create {}", cli.storage.display()))?;
    }
    let root = cli
        .storage
        .canonicalize()
        .with_context(|| format!("cannot resolve {}", cli.storage.display()))?;

    let (config, created) =
        SfsConfig::load_or_create(&cli.config).with_context(|| "loading configuration failed")?;
    if created {
        println!("Welcome to sfs! Type 'help' to show a list of commands.");
        println!(
            "Generated a fresh key and stored it in {}.",
            cli.config.display()
        );
    }

    let mut session = Session::new(root, config, cli.config.clone())
        .with_context(|| "the stored key is not usable")?;

    let mut editor = DefaultEditor::new()?;
    loop {
        let line = match editor.readline(&session.prompt()) {
            Ok(line) => line,
            // Ctrl-C cancels the line, Ctrl-D leaves the shell.
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };
        let _ = editor.add_history_entry(line.as_str());
        match session.dispatch(&line) {
            Reply::Message(text) => println!("{text}"),
            Reply::Exit => break,
        }
    }
    Ok(())
}
