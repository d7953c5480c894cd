//! Sample modules exported into the interpreter's catalog.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use conch::prelude::*;
use serde_json::Value;

// ============================================================================
// ping
// ============================================================================

struct Ping;

impl Module for Ping {
    fn name(&self) -> &str {
        "ping"
    }

    fn priority(&self) -> i32 {
        10
    }

    fn commands(&self) -> Option<CommandNode> {
        Some(
            Branch::new()
                .handler("ping", |_, _, _| Ok(Message::reply("pong")))
                .into(),
        )
    }
}

export_module!(PING, "ping", || Ok(Box::new(Ping)));

// ============================================================================
// echo
// ============================================================================

struct Echo;

impl Module for Echo {
    fn name(&self) -> &str {
        "echo"
    }

    fn priority(&self) -> i32 {
        20
    }

    fn commands(&self) -> Option<CommandNode> {
        Some(
            Branch::new()
                .handler("echo", |_, args, count| {
                    if count == 0 {
                        // Let another module have a go at a bare "echo"
                        return Ok(Message::empty());
                    }
                    Ok(Message::reply(args.join(" ")))
                })
                .into(),
        )
    }
}

export_module!(ECHO, "echo", || Ok(Box::new(Echo)));

// ============================================================================
// greet
// ============================================================================

/// Greets by name, asking for it when not given.
///
/// Reads `greeting` from the client configuration.
struct Greet {
    greeting: String,
}

impl Default for Greet {
    fn default() -> Self {
        Self {
            greeting: "Hello".to_string(),
        }
    }
}

impl Module for Greet {
    fn name(&self) -> &str {
        "greet"
    }

    fn priority(&self) -> i32 {
        30
    }

    fn commands(&self) -> Option<CommandNode> {
        let greeting = self.greeting.clone();
        Some(
            Branch::new()
                .handler("greet", move |_, args, _| {
                    if !args.is_empty() {
                        return Ok(Message::reply(format!("{greeting}, {}!", args.join(" "))));
                    }
                    let greeting = greeting.clone();
                    Ok(Message::question("What is your name?", move |_, answer| {
                        if answer.count == 0 {
                            return Ok(answer.reprompt_with("Please tell me your name."));
                        }
                        Ok(Message::reply(format!("{greeting}, {}!", answer.text())))
                    }))
                })
                .into(),
        )
    }

    fn configure(&mut self, _ctx: &ModuleContext, cfg: &Value) -> Result<(), BoxError> {
        match cfg.get("greeting") {
            Some(Value::String(greeting)) => self.greeting.clone_from(greeting),
            Some(other) => return Err(format!("greeting must be a string, got {other}").into()),
            None => {}
        }
        Ok(())
    }
}

export_module!(GREET, "greet", || Ok(Box::new(Greet::default())));

// ============================================================================
// pick
// ============================================================================

/// Rock, paper, scissors against an opponent cycling through the hands.
#[derive(Default)]
struct Pick {
    rounds: Arc<AtomicU64>,
}

const HANDS: [&str; 3] = ["rock", "paper", "scissors"];

impl Module for Pick {
    fn name(&self) -> &str {
        "pick"
    }

    fn priority(&self) -> i32 {
        40
    }

    fn commands(&self) -> Option<CommandNode> {
        let rounds = Arc::clone(&self.rounds);
        Some(
            Branch::new()
                .handler("pick", move |_, _, _| {
                    let round = rounds.fetch_add(1, Ordering::Relaxed);
                    let choices = HANDS
                        .iter()
                        .enumerate()
                        .map(|(i, hand)| Choice::new(*hand, i))
                        .collect();
                    Ok(Message::select("Pick a hand:", play, choices).with_arg("round", round))
                })
                .into(),
        )
    }

    fn initialize(&mut self, ctx: &ModuleContext) -> Result<(), BoxError> {
        self.rounds.store(0, Ordering::Relaxed);
        ctx.notify(Reply::new("pick is ready, type 'pick' to play", tags::REPLY));
        Ok(())
    }
}

fn play(_ctx: &ModuleContext, answer: Answer<'_>) -> HandlerResult {
    let Some(choice) = answer.choice() else {
        return Ok(answer.reprompt());
    };
    let Some(hand) = choice.payload.as_u64() else {
        return Err("choice without a hand".into());
    };
    let round = answer.arg("round").and_then(Value::as_u64).unwrap_or(0);
    let theirs = round % 3;
    let outcome = match (hand + 3 - theirs) % 3 {
        0 => "Draw",
        1 => "You win",
        _ => "You lose",
    };
    Ok(Message::reply(format!(
        "{outcome}: {} against {}",
        choice.label, HANDS[theirs as usize]
    )))
}

export_module!(PICK, "pick", || Ok(Box::new(Pick::default())));
