//! The interactive shell: session state, tokenizer, and command dispatch.
//!
//! Dispatch is deliberately dumb: split on whitespace, match the first
//! token against a fixed table. Argument and parse errors come back as
//! messages, never as a crash; only `exit`/`quit` escape the loop.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::Command as OsCommand;

use crate::config::SfsConfig;
use crate::engine::{self, BatchReport};
use crate::fsops;
use crate::key::{Key, KeyProvider};
use crate::types::SfsError;

pub const HELP: &[&str] = &[
    "Most system commands also work by prefixing them with 'os:'",
    "exit | quit   > leave sfs",
    "ls | dir      > list the current directory",
    "cd <dir>      > change directory",
    "mkdir <dir>   > create a directory",
    "rmdir <dir>   > remove a directory and its contents",
    "rndir <a> <b> > rename a directory",
    "mkfile <file> > create an empty file",
    "rmfile <file> > remove a file",
    "cat <file>    > display a file",
    "encrypt       > encrypt all files under the current directory",
    "decrypt       > decrypt all files under the current directory",
    "getkey        > show the active key",
    "changekey     > install a new key (prompts when no key is given)",
    "generatekey   > print a fresh key without installing it",
    "cmdcount      > show how many commands this session has run",
];

/// What the REPL loop should do with a dispatched line.
pub enum Reply {
    Message(String),
    Exit,
}

/// All per-session state: working directory, key, command counter.
///
/// Carried explicitly instead of process globals so several sessions (or
/// tests) can coexist, and so `cd` never touches the process-wide cwd.
pub struct Session {
    root: PathBuf,
    cwd: PathBuf,
    provider: KeyProvider,
    config: SfsConfig,
    config_path: PathBuf,
    command_count: u64,
}

impl Session {
    pub fn new(root: PathBuf, config: SfsConfig, config_path: PathBuf) -> Result<Self, SfsError> {
        let key = Key::from_encoded(&config.key)?;
        Ok(Self {
            cwd: root.clone(),
            root,
            provider: KeyProvider::new(key),
            config,
            config_path,
            command_count: 0,
        })
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn command_count(&self) -> u64 {
        self.command_count
    }

    /// The prompt shown before each line: command count plus the working
    /// directory relative to the storage root.
    pub fn prompt(&self) -> String {
        let shown = match self.cwd.strip_prefix(&self.root) {
            Ok(rel) if rel.as_os_str().is_empty() => "/".to_string(),
            Ok(rel) => format!("/{}", rel.display()),
            Err(_) => self.cwd.display().to_string(),
        };
        format!("[SFS {}] {}> ", self.command_count, shown)
    }

    /// Dispatch one input line and render the outcome as a message.
    pub fn dispatch(&mut self, line: &str) -> Reply {
        self.command_count += 1;
        match self.run_command(line) {
            Ok(reply) => reply,
            Err(e) => Reply::Message(format!("sfs: {e}")),
        }
    }

    fn run_command(&mut self, line: &str) -> Result<Reply, SfsError> {
        let line = line.trim();
        if line.is_empty() {
            return Err(SfsError::EmptyCommand);
        }
        if let Some(raw) = line.strip_prefix("os:") {
            return self.run_os(raw.trim());
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let (&cmd, args) = match tokens.split_first() {
            Some(split) => split,
            None => return Err(SfsError::EmptyCommand),
        };
        match cmd {
            "exit" | "quit" => Ok(Reply::Exit),
            "help" => Ok(message(HELP.join("\n"))),
            "ls" | "dir" => Ok(message(fsops::list_dir(&self.cwd)?)),
            "cd" => self.change_dir(arg(args, "cd needs a directory")?),
            "mkdir" => {
                let dir = arg(args, "mkdir needs a directory")?;
                fsops::make_dir(&self.cwd.join(dir))?;
                Ok(message(format!("Created directory: {dir}")))
            }
            "rmdir" => {
                let dir = arg(args, "rmdir needs a directory")?;
                fsops::remove_dir(&self.cwd.join(dir))?;
                Ok(message(format!("Removed directory: {dir}")))
            }
            "rndir" => {
                let old = arg(args, "rndir needs an old and a new name")?;
                let new = args
                    .get(1)
                    .copied()
                    .ok_or(SfsError::Invalid("rndir needs an old and a new name"))?;
                fsops::rename_dir(&self.cwd.join(old), &self.cwd.join(new))?;
                Ok(message(format!("Renamed directory {old} to {new}")))
            }
            "mkfile" => {
                let file = arg(args, "mkfile needs a file name")?;
                fsops::make_file(&self.cwd.join(file))?;
                Ok(message(format!("Created file: {file}")))
            }
            "rmfile" => {
                let file = arg(args, "rmfile needs a file name")?;
                fsops::remove_file(&self.cwd.join(file))?;
                Ok(message(format!("Removed file: {file}")))
            }
            "cat" => {
                let file = arg(args, "cat needs a file name")?;
                Ok(message(fsops::cat(&self.cwd.join(file))?))
            }
            "encrypt" => {
                let report = engine::encrypt_tree(&self.cwd, self.provider.key())?;
                Ok(message(render_report("Encrypted", &report)))
            }
            "decrypt" => {
                let report = engine::decrypt_tree(&self.cwd, self.provider.key())?;
                Ok(message(render_report("Decrypted", &report)))
            }
            "getkey" => Ok(message(format!(
                "Current key: {}",
                self.provider.key().encoded()
            ))),
            "changekey" => self.change_key(args.first().copied()),
            "generatekey" => Ok(message(format!(
                "Generated key: {}\nNot installed; use changekey to adopt it.",
                Key::generate()?.encoded()
            ))),
            "cmdcount" | "commandcount" => {
                Ok(message(format!("Commands used: {}", self.command_count)))
            }
            other => Err(SfsError::UnknownCommand(other.to_string())),
        }
    }

    fn change_dir(&mut self, target: &str) -> Result<Reply, SfsError> {
        let next = self.cwd.join(target).canonicalize()?;
        if !next.is_dir() {
            return Err(SfsError::Invalid("not a directory"));
        }
        self.cwd = next;
        Ok(message(format!("New directory: {}", self.cwd.display())))
    }

    /// Install a new key and persist it. Never re-encrypts anything: data
    /// sealed under the previous key stays unreadable until that key is
    /// restored.
    fn change_key(&mut self, given: Option<&str>) -> Result<Reply, SfsError> {
        let text = match given {
            Some(t) => t.to_string(),
            None => rpassword::prompt_password("New key: ")?,
        };
        let key = Key::from_encoded(&text)?;
        self.provider.set_key(key);
        self.config.key = self.provider.key().encoded();
        self.config.save(&self.config_path)?;
        Ok(message(
            "Key changed and saved. Data encrypted under the previous key \
             stays unreadable until that key is restored."
                .to_string(),
        ))
    }

    fn run_os(&mut self, raw: &str) -> Result<Reply, SfsError> {
        if raw.is_empty() {
            return Err(SfsError::Invalid("os: needs a command"));
        }
        #[cfg(unix)]
        let status = OsCommand::new("sh")
            .arg("-c")
            .arg(raw)
            .current_dir(&self.cwd)
            .status()?;
        #[cfg(windows)]
        let status = OsCommand::new("cmd")
            .arg("/C")
            .arg(raw)
            .current_dir(&self.cwd)
            .status()?;
        Ok(message(format!("os command exited with {status}")))
    }
}

fn arg<'a>(args: &[&'a str], what: &'static str) -> Result<&'a str, SfsError> {
    args.first().copied().ok_or(SfsError::Invalid(what))
}

fn message(text: String) -> Reply {
    Reply::Message(text)
}

/// Render a batch report for the user. A pass where nothing could be
/// transformed must read as a failure, and a marker that no longer matches
/// most of the tree gets an explicit warning.
fn render_report(verb: &str, report: &BatchReport) -> String {
    let mut out = if report.total_failure() {
        format!("{verb} nothing: all {} files failed", report.attempted)
    } else {
        format!("{verb} {}/{} files", report.transformed, report.attempted)
    };
    for (path, why) in &report.failed {
        let _ = write!(out, "\n  failed: {} ({why})", path.display());
    }
    if report.mostly_failed() {
        out.push_str("\nwarning: the lock marker no longer reflects most of the tree");
    }
    out
}
