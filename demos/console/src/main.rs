//! Conch Console
//!
//! An interactive console feeding standard input to a conch interpreter.
//!
//! Every line is one command. Replies are printed as they arrive; questions
//! and selections take the next line as their answer.
//!
//! # Modules
//!
//! ```text
//! ping                 - pong
//! echo <text>          - repeats the text
//! greet [name]         - asks for a name when none is given
//! pick                 - rock, paper or scissors
//! reload <module>      - re-creates a module
//! ```
//!
//! # Usage
//!
//! ```bash
//! cargo run --package console -- --config conch.toml
//! ```

mod modules;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use conch::prelude::*;
use conch::runtime::logging;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

/// Interactive conch console
#[derive(Parser, Debug)]
#[command(name = "conch-console")]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file (defaults to searching for conch.toml)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Activate a profile (overrides CONCH_PROFILE env var)
    #[arg(long)]
    profile: Option<String>,

    /// Commands to run before reading standard input
    #[arg(trailing_var_arg = true)]
    commands: Vec<String>,
}

/// Prints a reply the way its tags ask for.
fn print_reply(reply: Reply) {
    if reply.is_error() {
        eprintln!("! {}", reply.text);
    } else if reply.has_tag(tags::QUESTION) || reply.has_tag(tags::SELECT) {
        println!("? {}", reply.text);
    } else {
        println!("{}", reply.text);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut loader = ConfigLoader::new();
    if let Some(profile) = &args.profile {
        loader = loader.profile(profile);
    }
    if let Some(path) = &args.config {
        loader = loader.file(path);
    }
    let config = loader.load()?;

    logging::init_from_config(&config.logging);

    let interpreter = Interpreter::builder()
        .config(&config)
        .sink(print_reply)
        .thread_name("console-worker")
        .spawn()?;

    for command in &args.commands {
        interpreter.put_command(command.as_str())?;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "quit" | "exit" => break,
            _ => interpreter.put_command(line)?,
        }
    }

    info!("Input closed, shutting down");
    interpreter.stop()?;
    tokio::task::spawn_blocking(move || interpreter.join()).await??;

    Ok(())
}
